//! Task-local trace id for the request currently being served.
//!
//! `RequestTrace` runs the rest of the request inside [`with_trace_id`], so
//! anything rendered during the request (notably problem-details bodies and
//! security log events) can read the id with [`trace_id`].

use std::future::Future;

use tokio::task_local;

const OUTSIDE_REQUEST: &str = "unknown";

task_local! {
    static TRACE_ID: String;
}

/// Trace id of the current request, or `"unknown"` outside a request.
pub fn trace_id() -> String {
    TRACE_ID
        .try_with(Clone::clone)
        .unwrap_or_else(|_| OUTSIDE_REQUEST.to_string())
}

pub async fn with_trace_id<F: Future>(trace_id: String, future: F) -> F::Output {
    TRACE_ID.scope(trace_id, future).await
}
