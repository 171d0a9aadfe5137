//! HS256 compact-token signing and verification shared by both tiers.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, Header, Validation};
use serde_json::{Map, Value};

use crate::claims::USER_ID_CLAIM;
use crate::error::CredentialError;
use crate::secret::SigningSecret;

pub(crate) type RawClaims = Map<String, Value>;

/// Seconds since the Unix epoch; `None` for a clock set before 1970.
pub(crate) fn unix_seconds(now: SystemTime) -> Option<i64> {
    now.duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| i64::try_from(d.as_secs()).ok())
}

pub(crate) fn sign(claims: &RawClaims, secret: &SigningSecret) -> Result<String, CredentialError> {
    encode(&Header::new(Algorithm::HS256), claims, &secret.encoding_key())
        .map_err(|e| CredentialError::IssueFailed(e.to_string()))
}

/// Check signature, algorithm, required claims and strict expiry (`now < exp`).
pub(crate) fn decode_verified(
    token: &str,
    secret: &SigningSecret,
    now: SystemTime,
) -> Result<RawClaims, CredentialError> {
    // Expiry is checked below against the injected clock, without leeway.
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let claims = decode::<RawClaims>(token, &secret.decoding_key(), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => CredentialError::SignatureMismatch,
            ErrorKind::ExpiredSignature => CredentialError::Expired,
            ErrorKind::MissingRequiredClaim(name) => CredentialError::MissingClaim(name.clone()),
            _ => CredentialError::MalformedCredential,
        })?;

    let exp = integer_claim(&claims, "exp")?;
    let now = unix_seconds(now).ok_or(CredentialError::Expired)?;
    if now >= exp {
        return Err(CredentialError::Expired);
    }

    Ok(claims)
}

pub(crate) fn integer_claim(claims: &RawClaims, name: &str) -> Result<i64, CredentialError> {
    match claims.get(name) {
        None | Some(Value::Null) => Err(CredentialError::MissingClaim(name.to_string())),
        Some(value) => value.as_i64().ok_or(CredentialError::MalformedCredential),
    }
}

pub(crate) fn optional_integer_claim(
    claims: &RawClaims,
    name: &str,
) -> Result<Option<i64>, CredentialError> {
    match claims.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_i64()
            .map(Some)
            .ok_or(CredentialError::MalformedCredential),
    }
}

pub(crate) fn subject(claims: &RawClaims) -> Result<String, CredentialError> {
    match claims.get("sub") {
        None | Some(Value::Null) => Err(CredentialError::MissingClaim("sub".to_string())),
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(_) => Err(CredentialError::MalformedCredential),
    }
}

pub(crate) fn user_id(claims: &RawClaims) -> Result<i64, CredentialError> {
    integer_claim(claims, USER_ID_CLAIM)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine as _;
    use serde_json::json;

    use super::*;

    fn secret(byte: u8) -> SigningSecret {
        SigningSecret::from_bytes("TEST", vec![byte; 32]).unwrap()
    }

    fn claims(value: Value) -> RawClaims {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn now_secs() -> i64 {
        unix_seconds(SystemTime::now()).unwrap()
    }

    #[test]
    fn sign_and_decode_roundtrip() {
        let raw = claims(json!({"sub": "alice", "userId": 7, "exp": now_secs() + 60}));
        let token = sign(&raw, &secret(1)).unwrap();
        let decoded = decode_verified(&token, &secret(1), SystemTime::now()).unwrap();
        assert_eq!(decoded, raw);
    }

    #[test]
    fn expiry_is_strict() {
        let now = SystemTime::now();
        let exp = unix_seconds(now).unwrap();
        let token = sign(&claims(json!({"sub": "alice", "exp": exp})), &secret(1)).unwrap();

        assert_eq!(
            decode_verified(&token, &secret(1), now),
            Err(CredentialError::Expired)
        );
        assert!(decode_verified(&token, &secret(1), now - Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn wrong_secret_is_signature_mismatch() {
        let token = sign(
            &claims(json!({"sub": "alice", "exp": now_secs() + 60})),
            &secret(1),
        )
        .unwrap();
        assert_eq!(
            decode_verified(&token, &secret(2), SystemTime::now()),
            Err(CredentialError::SignatureMismatch)
        );
    }

    #[test]
    fn missing_exp_is_missing_claim() {
        let token = sign(&claims(json!({"sub": "alice"})), &secret(1)).unwrap();
        assert_eq!(
            decode_verified(&token, &secret(1), SystemTime::now()),
            Err(CredentialError::MissingClaim("exp".to_string()))
        );
    }

    #[test]
    fn garbage_is_malformed() {
        for token in ["", "abc", "a.b.c", "a.b"] {
            assert_eq!(
                decode_verified(token, &secret(1), SystemTime::now()),
                Err(CredentialError::MalformedCredential),
                "token {token:?}"
            );
        }
    }

    #[test]
    fn unsigned_token_is_rejected() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(
            json!({"sub": "alice", "userId": 7, "exp": now_secs() + 60})
                .to_string()
                .as_bytes(),
        );
        let token = format!("{header}.{body}.");
        assert!(decode_verified(&token, &secret(1), SystemTime::now()).is_err());
    }

    #[test]
    fn user_id_must_be_an_integer() {
        let raw = claims(json!({"userId": "7"}));
        assert_eq!(user_id(&raw), Err(CredentialError::MalformedCredential));
        assert_eq!(
            user_id(&RawClaims::new()),
            Err(CredentialError::MissingClaim("userId".to_string()))
        );
    }
}
