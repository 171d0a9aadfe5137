#![allow(dead_code)]

use std::time::Duration;

use credentials::{issue_internal, issue_internal_at, verify_external, Identity};
use test_support::fixtures;

#[ctor::ctor]
fn init_logging() {
    test_support::logging::init();
}

/// What the gateway would forward for `identity`.
pub fn internal_token_for(identity: &Identity) -> String {
    let external = fixtures::external_token(identity);
    let claims = verify_external(&external, &fixtures::external_secret()).unwrap();
    issue_internal(&claims, &fixtures::internal_secret(), Duration::from_secs(300)).unwrap()
}

pub fn expired_internal_token_for(identity: &Identity) -> String {
    let external = fixtures::external_token(identity);
    let claims = verify_external(&external, &fixtures::external_secret()).unwrap();
    issue_internal_at(
        &claims,
        &fixtures::internal_secret(),
        Duration::from_secs(60),
        std::time::SystemTime::now() - Duration::from_secs(600),
    )
    .unwrap()
}
