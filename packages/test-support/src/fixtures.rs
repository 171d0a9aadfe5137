//! Secrets and credentials for tests.

use std::time::{Duration, SystemTime};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use credentials::config::DEFAULT_INTERNAL_TTL;
use credentials::{
    issue_external, GatewayTrust, Identity, PublicEndpointRegistry, ServiceTrust, SigningSecret,
    USER_ACCESS_TOKEN_TYPE,
};
use serde_json::{json, Map, Value};

const EXTERNAL_KEY: [u8; 32] = *b"external-test-key-0123456789abcd";
const INTERNAL_KEY: [u8; 32] = *b"internal-test-key-0123456789abcd";

/// Base64 value of the external secret, as it would appear in the environment.
pub fn external_secret_b64() -> String {
    STANDARD.encode(EXTERNAL_KEY)
}

pub fn internal_secret_b64() -> String {
    STANDARD.encode(INTERNAL_KEY)
}

pub fn external_secret() -> SigningSecret {
    SigningSecret::from_bytes("JWT_USER_SECRET_KEY", EXTERNAL_KEY.to_vec())
        .expect("fixture key is long enough")
}

pub fn internal_secret() -> SigningSecret {
    SigningSecret::from_bytes("JWT_INTERNAL_SECRET_KEY", INTERNAL_KEY.to_vec())
        .expect("fixture key is long enough")
}

pub fn gateway_trust() -> GatewayTrust {
    GatewayTrust::new(
        external_secret(),
        internal_secret(),
        DEFAULT_INTERNAL_TTL,
        PublicEndpointRegistry::default(),
    )
    .expect("fixture secrets differ")
}

pub fn service_trust() -> ServiceTrust {
    ServiceTrust::new(internal_secret(), PublicEndpointRegistry::default())
}

pub fn alice() -> Identity {
    Identity::new("alice", 7)
}

/// Claims the identity service adds on top of the identity, plus one that
/// must never reach a downstream service.
pub fn login_claims() -> Map<String, Value> {
    let mut extra = Map::new();
    extra.insert("token_type".into(), json!(USER_ACCESS_TOKEN_TYPE));
    extra.insert("role".into(), json!("admin"));
    extra
}

/// External credential as the identity service would hand it out at login.
pub fn external_token(identity: &Identity) -> String {
    issue_external(
        identity,
        login_claims(),
        &external_secret(),
        Duration::from_secs(3600),
        SystemTime::now(),
    )
    .expect("sign external credential")
}

pub fn expired_external_token(identity: &Identity) -> String {
    issue_external(
        identity,
        login_claims(),
        &external_secret(),
        Duration::from_secs(60),
        SystemTime::now() - Duration::from_secs(3600),
    )
    .expect("sign external credential")
}

/// A credential that verifies under `secret` but was minted by nobody we trust.
pub fn token_signed_with(identity: &Identity, secret: &SigningSecret) -> String {
    issue_external(
        identity,
        Map::new(),
        secret,
        Duration::from_secs(3600),
        SystemTime::now(),
    )
    .expect("sign credential")
}
