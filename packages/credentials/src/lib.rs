//! Two-tier credential translation.
//!
//! The Gateway verifies a client's external credential with
//! [`verify_external`] and mints a minimal internal credential with
//! [`issue_internal`]; every downstream service accepts only what
//! [`verify_internal`] accepts. All three are pure: no I/O, no shared state.

pub mod bearer;
pub mod claims;
pub mod config;
pub mod error;
pub mod external;
pub mod internal;
mod jwt;
pub mod public_paths;
pub mod secret;

pub use bearer::{bearer_header_value, parse_bearer};
pub use claims::{
    ExternalClaims, Identity, InternalClaims, CREDENTIAL_CLASS_CLAIM, INTERNAL_CREDENTIAL_CLASS,
    USER_ACCESS_TOKEN_TYPE, USER_ID_CLAIM,
};
pub use config::{GatewayTrust, ProcessEnv, ServiceTrust, SettingSource};
pub use error::{ConfigurationError, CredentialError};
pub use external::{issue_external, verify_external, verify_external_at};
pub use internal::{issue_internal, issue_internal_at, verify_internal, verify_internal_at};
pub use public_paths::{PathPattern, PublicEndpointRegistry};
pub use secret::SigningSecret;
