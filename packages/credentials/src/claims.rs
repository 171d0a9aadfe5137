//! Claim sets carried by the two credential tiers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claim naming the numeric user identity on both tiers.
pub const USER_ID_CLAIM: &str = "userId";
/// Claim marking which trust tier minted a credential.
pub const CREDENTIAL_CLASS_CLAIM: &str = "credentialClass";
/// The only `credentialClass` value a downstream service accepts.
pub const INTERNAL_CREDENTIAL_CLASS: &str = "internal";
/// `token_type` value the identity service stamps on external credentials.
pub const USER_ACCESS_TOKEN_TYPE: &str = "user_access";

/// Who the request is for, as established by a verified credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Username (`sub`).
    pub subject: String,
    pub user_id: i64,
}

impl Identity {
    pub fn new(subject: impl Into<String>, user_id: i64) -> Self {
        Self {
            subject: subject.into(),
            user_id,
        }
    }
}

/// Claims of a verified external credential.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalClaims {
    pub identity: Identity,
    /// Issued-at (seconds since epoch), when the identity service set one.
    pub issued_at: Option<i64>,
    /// Expiry (seconds since epoch)
    pub expires_at: i64,
    /// Every other claim the identity service put in the token.
    /// Never copied into an internal credential.
    pub additional: Map<String, Value>,
}

/// Claims of a gateway-minted internal credential, exactly as they appear on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalClaims {
    pub sub: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "credentialClass")]
    pub credential_class: String,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

impl InternalClaims {
    pub fn identity(&self) -> Identity {
        Identity::new(self.sub.clone(), self.user_id)
    }
}
