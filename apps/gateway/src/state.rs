use std::time::Duration;

use crate::error::StartupError;
use crate::routing::RouteTable;

/// Shared, read-only per-process state for the forwarding handler.
#[derive(Clone)]
pub struct AppState {
    pub routes: RouteTable,
    pub client: reqwest::Client,
}

impl AppState {
    pub fn new(routes: RouteTable, upstream_timeout: Duration) -> Result<Self, StartupError> {
        let client = reqwest::Client::builder()
            .timeout(upstream_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { routes, client })
    }
}
