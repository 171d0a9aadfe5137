use credentials::CredentialError;
use tracing::{debug, warn};

use crate::trace_ctx;

/// Which side of the trust boundary made a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStage {
    Gateway,
    Service,
}

impl AuthStage {
    pub const fn as_str(self) -> &'static str {
        match self {
            AuthStage::Gateway => "gateway",
            AuthStage::Service => "service",
        }
    }
}

/// Log a rejected credential. The reason never leaves the process.
pub fn credential_rejected(stage: AuthStage, reason: &CredentialError, path: &str) {
    let trace_id = trace_ctx::trace_id();

    warn!(
        event = "SECURITY_CREDENTIAL_REJECTED",
        %trace_id,
        stage = stage.as_str(),
        reason = reason.reason_code(),
        path,
        "Credential rejected"
    );
}

pub fn internal_credential_issued(subject: &str, user_id: i64) {
    let trace_id = trace_ctx::trace_id();

    debug!(
        event = "SECURITY_INTERNAL_CREDENTIAL_ISSUED",
        %trace_id,
        subject,
        user_id,
        "Internal credential issued"
    );
}
