//! Internal credentials: minted by the Gateway per request, verified by every
//! downstream service.

use std::time::{Duration, SystemTime};

use serde_json::Value;

use crate::claims::{
    ExternalClaims, InternalClaims, CREDENTIAL_CLASS_CLAIM, INTERNAL_CREDENTIAL_CLASS,
    USER_ID_CLAIM,
};
use crate::error::CredentialError;
use crate::jwt::{self, RawClaims};
use crate::secret::SigningSecret;

/// Mint a fresh internal credential from verified external claims.
///
/// The new claim set is built from scratch: `sub`, `userId`, `credentialClass`,
/// `iat`, `exp`. Nothing in `claims.additional` crosses into it.
pub fn issue_internal(
    claims: &ExternalClaims,
    internal_secret: &SigningSecret,
    ttl: Duration,
) -> Result<String, CredentialError> {
    issue_internal_at(claims, internal_secret, ttl, SystemTime::now())
}

pub fn issue_internal_at(
    claims: &ExternalClaims,
    internal_secret: &SigningSecret,
    ttl: Duration,
    now: SystemTime,
) -> Result<String, CredentialError> {
    let iat = jwt::unix_seconds(now)
        .ok_or_else(|| CredentialError::IssueFailed("system clock before epoch".to_string()))?;
    let ttl = i64::try_from(ttl.as_secs())
        .map_err(|_| CredentialError::IssueFailed("ttl out of range".to_string()))?;

    let internal = InternalClaims {
        sub: claims.identity.subject.clone(),
        user_id: claims.identity.user_id,
        credential_class: INTERNAL_CREDENTIAL_CLASS.to_string(),
        iat,
        exp: iat.saturating_add(ttl),
    };

    let value =
        serde_json::to_value(&internal).map_err(|e| CredentialError::IssueFailed(e.to_string()))?;
    jwt::sign(&claim_map(value)?, internal_secret)
}

/// Claims must serialize to a JSON object; anything else is never signed.
fn claim_map(value: Value) -> Result<RawClaims, CredentialError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(CredentialError::IssueFailed(format!(
            "claims serialized to {other}, not an object"
        ))),
    }
}

/// Verify a gateway-issued credential.
///
/// Beyond signature and expiry, `credentialClass` must be exactly `"internal"`.
pub fn verify_internal(
    raw_token: &str,
    internal_secret: &SigningSecret,
) -> Result<InternalClaims, CredentialError> {
    verify_internal_at(raw_token, internal_secret, SystemTime::now())
}

pub fn verify_internal_at(
    raw_token: &str,
    internal_secret: &SigningSecret,
    now: SystemTime,
) -> Result<InternalClaims, CredentialError> {
    let claims = jwt::decode_verified(raw_token, internal_secret, now)?;

    match claims.get(CREDENTIAL_CLASS_CLAIM) {
        Some(Value::String(class)) if class == INTERNAL_CREDENTIAL_CLASS => {}
        _ => return Err(CredentialError::WrongCredentialClass),
    }

    Ok(InternalClaims {
        sub: jwt::subject(&claims)?,
        user_id: jwt::integer_claim(&claims, USER_ID_CLAIM)?,
        credential_class: INTERNAL_CREDENTIAL_CLASS.to_string(),
        iat: jwt::integer_claim(&claims, "iat")?,
        exp: jwt::integer_claim(&claims, "exp")?,
    })
}
