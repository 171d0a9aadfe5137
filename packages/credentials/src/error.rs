//! Error taxonomy for credential verification, issuance and startup configuration.
//!
//! Per-request failures (`CredentialError`) are diagnostic only: the HTTP
//! boundary collapses all of them to a single 401 (Gateway) or 403 (service)
//! outcome. `ConfigurationError` is fatal at startup.

use std::path::PathBuf;

use thiserror::Error;

/// Why a presented credential was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum CredentialError {
    /// Not a well-formed HS256 compact token, or a claim has the wrong shape.
    #[error("malformed credential")]
    MalformedCredential,
    /// Signature does not verify against the expected secret.
    #[error("signature mismatch")]
    SignatureMismatch,
    /// `now >= exp`.
    #[error("credential expired")]
    Expired,
    /// `credentialClass` absent or not `"internal"`.
    #[error("wrong credential class")]
    WrongCredentialClass,
    /// A required claim is absent.
    #[error("missing claim: {0}")]
    MissingClaim(String),
    /// No usable `Authorization: Bearer <token>` header.
    #[error("missing or malformed bearer header")]
    MissingHeader,
    /// Signing a new credential failed.
    #[error("credential issuance failed: {0}")]
    IssueFailed(String),
}

impl CredentialError {
    /// Stable snake_case reason used in security logs.
    pub fn reason_code(&self) -> &'static str {
        match self {
            CredentialError::MalformedCredential => "malformed_credential",
            CredentialError::SignatureMismatch => "signature_mismatch",
            CredentialError::Expired => "expired",
            CredentialError::WrongCredentialClass => "wrong_credential_class",
            CredentialError::MissingClaim(_) => "missing_claim",
            CredentialError::MissingHeader => "missing_header",
            CredentialError::IssueFailed(_) => "issue_failed",
        }
    }
}

/// Startup configuration problems. A component that hits one must not serve traffic.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigurationError {
    #[error("{name} must be set")]
    MissingSetting { name: String },

    #[error("{name} is not valid: {detail}")]
    InvalidSetting { name: String, detail: String },

    #[error("failed to read secret file {path:?} for {name}: {source}")]
    SecretFile {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("external and internal signing secrets must differ")]
    SharedSecret,

    #[error("{name} must not be configured for a downstream service")]
    ExternalSecretExposed { name: String },
}

impl ConfigurationError {
    pub fn missing(name: impl Into<String>) -> Self {
        Self::MissingSetting { name: name.into() }
    }

    pub fn invalid(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidSetting {
            name: name.into(),
            detail: detail.into(),
        }
    }
}
