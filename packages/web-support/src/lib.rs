//! actix-web plumbing shared by the Gateway and every downstream service:
//! problem-details errors, request tracing, access logging, and the
//! service-side authorization stage.

#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod auth_header;
pub mod error;
pub mod error_code;
pub mod extractors;
pub mod logging;
pub mod middleware;
pub mod telemetry;
pub mod trace_ctx;

pub use error::{AppError, ProblemDetails};
pub use error_code::ErrorCode;
pub use extractors::AuthenticatedUser;
pub use middleware::{RequestTrace, ServiceAuth, StructuredLogger, TraceId, TraceSpan};
