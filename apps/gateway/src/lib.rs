//! Edge gateway: verifies client credentials, swaps them for short-lived
//! internal credentials, and forwards to the routed downstream service.

#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod routing;
pub mod state;

pub use config::GatewayConfig;
pub use error::StartupError;
pub use middleware::gateway_auth::{authorize_external, GatewayAuth, GatewayGrant};
pub use routing::{Route, RouteTable};
pub use state::AppState;

#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_support::logging::init();
}
