//! External (client-facing) credentials, signed with the external secret.

use std::time::{Duration, SystemTime};

use serde_json::{Map, Value};

use crate::claims::{ExternalClaims, Identity, USER_ID_CLAIM};
use crate::error::CredentialError;
use crate::jwt::{self, RawClaims};
use crate::secret::SigningSecret;

const STANDARD_CLAIMS: [&str; 4] = ["sub", USER_ID_CLAIM, "iat", "exp"];

/// Verify a client-presented credential (scheme prefix already stripped).
///
/// All failures are equivalent to the caller; the variant is for logs only.
pub fn verify_external(
    raw_token: &str,
    external_secret: &SigningSecret,
) -> Result<ExternalClaims, CredentialError> {
    verify_external_at(raw_token, external_secret, SystemTime::now())
}

pub fn verify_external_at(
    raw_token: &str,
    external_secret: &SigningSecret,
    now: SystemTime,
) -> Result<ExternalClaims, CredentialError> {
    let mut claims = jwt::decode_verified(raw_token, external_secret, now)?;

    let identity = Identity::new(jwt::subject(&claims)?, jwt::user_id(&claims)?);
    let issued_at = jwt::optional_integer_claim(&claims, "iat")?;
    let expires_at = jwt::integer_claim(&claims, "exp")?;

    for name in STANDARD_CLAIMS {
        claims.remove(name);
    }

    Ok(ExternalClaims {
        identity,
        issued_at,
        expires_at,
        additional: claims,
    })
}

/// Mint an external credential the way the identity service does at login.
///
/// `extra` claims are written first so they can never override `sub`,
/// `userId`, `iat` or `exp`.
pub fn issue_external(
    identity: &Identity,
    extra: Map<String, Value>,
    external_secret: &SigningSecret,
    ttl: Duration,
    now: SystemTime,
) -> Result<String, CredentialError> {
    let iat = jwt::unix_seconds(now)
        .ok_or_else(|| CredentialError::IssueFailed("system clock before epoch".to_string()))?;
    let ttl = i64::try_from(ttl.as_secs())
        .map_err(|_| CredentialError::IssueFailed("ttl out of range".to_string()))?;

    let mut claims: RawClaims = extra;
    claims.insert("sub".into(), Value::from(identity.subject.clone()));
    claims.insert(USER_ID_CLAIM.into(), Value::from(identity.user_id));
    claims.insert("iat".into(), Value::from(iat));
    claims.insert("exp".into(), Value::from(iat.saturating_add(ttl)));

    jwt::sign(&claims, external_secret)
}
