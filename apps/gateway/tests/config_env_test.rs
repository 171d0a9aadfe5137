mod common;

use std::io::Write;
use std::time::Duration;

use credentials::ConfigurationError;
use gateway::GatewayConfig;
use serial_test::serial;
use test_support::fixtures;

const SETTINGS: [&str; 8] = [
    "JWT_USER_SECRET_KEY",
    "JWT_USER_SECRET_KEY_FILE",
    "JWT_INTERNAL_SECRET_KEY",
    "JWT_INTERNAL_SECRET_KEY_FILE",
    "JWT_INTERNAL_EXPIRATION_SECS",
    "PUBLIC_ENDPOINTS",
    "GATEWAY_ROUTES",
    "GATEWAY_PORT",
];

fn clear_env() {
    for name in SETTINGS {
        std::env::remove_var(name);
    }
}

#[test]
#[serial]
fn loads_from_process_environment() {
    clear_env();
    std::env::set_var("JWT_USER_SECRET_KEY", fixtures::external_secret_b64());
    std::env::set_var("JWT_INTERNAL_SECRET_KEY", fixtures::internal_secret_b64());
    std::env::set_var("JWT_INTERNAL_EXPIRATION_SECS", "120");
    std::env::set_var("PUBLIC_ENDPOINTS", "/api/auth/login, /api/catalog/**");
    std::env::set_var("GATEWAY_ROUTES", "/api=http://api:9000");
    std::env::set_var("GATEWAY_PORT", "9443");

    let config = GatewayConfig::from_env().unwrap();
    clear_env();

    assert_eq!(config.port, 9443);
    assert_eq!(config.trust.internal_ttl, Duration::from_secs(120));
    assert!(config.trust.public_endpoints.is_public("/api/catalog/items/3"));
    assert!(!config.trust.public_endpoints.is_public("/api/auth/register"));
}

#[test]
#[serial]
fn secret_file_takes_precedence() {
    clear_env();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{}", fixtures::internal_secret_b64()).unwrap();

    std::env::set_var("JWT_USER_SECRET_KEY", fixtures::external_secret_b64());
    // Would be rejected as equal to the external secret if it were read.
    std::env::set_var("JWT_INTERNAL_SECRET_KEY", fixtures::external_secret_b64());
    std::env::set_var("JWT_INTERNAL_SECRET_KEY_FILE", file.path());
    std::env::set_var("GATEWAY_ROUTES", "/api=http://api:9000");

    let config = GatewayConfig::from_env();
    clear_env();

    let config = config.unwrap();
    assert!(config
        .trust
        .internal_secret
        .same_key_as(&fixtures::internal_secret()));
}

#[test]
#[serial]
fn missing_internal_secret_prevents_startup() {
    clear_env();
    std::env::set_var("JWT_USER_SECRET_KEY", fixtures::external_secret_b64());
    std::env::set_var("GATEWAY_ROUTES", "/api=http://api:9000");

    let err = GatewayConfig::from_env().unwrap_err();
    clear_env();

    assert!(matches!(
        err,
        ConfigurationError::MissingSetting { ref name } if name == "JWT_INTERNAL_SECRET_KEY"
    ));
}
