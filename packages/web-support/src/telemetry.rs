use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the JSON subscriber used by the gateway and services.
///
/// `RUST_LOG` overrides `default_filter`. Each event carries the fields of the
/// enclosing `request` span (see `TraceSpan`) but not the full span list.
pub fn init_tracing(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let json = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(false)
        .with_target(false)
        .with_ansi(false);

    tracing_subscriber::registry().with(env_filter).with(json).init();
}
