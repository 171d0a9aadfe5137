pub mod request_trace;
pub mod service_auth;
pub mod structured_logger;
pub mod trace_span;

pub use request_trace::{RequestTrace, TraceId};
pub use service_auth::ServiceAuth;
pub use structured_logger::StructuredLogger;
pub use trace_span::TraceSpan;
