use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use gateway::{routes, AppState, GatewayConfig, StartupError};
use tracing::{info, warn};
use web_support::telemetry::init_tracing;
use web_support::{RequestTrace, StructuredLogger, TraceSpan};

const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[actix_web::main]
async fn main() {
    init_tracing("info");

    if let Err(e) = run().await {
        eprintln!("❌ Gateway failed to start: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    // Settings come from the runtime environment (docker env_file, k8s
    // secrets mounted via *_FILE, or a sourced .env for local dev).
    let config = GatewayConfig::from_env()?;

    for pattern in config
        .trust
        .public_endpoints
        .not_covered_by(&config.routes.reachable())
    {
        warn!(%pattern, "public endpoint is not routed to any upstream");
    }

    let state = web::Data::new(AppState::new(
        config.routes.clone(),
        config.upstream_timeout,
    )?);
    let trust = Arc::new(config.trust);

    info!(
        host = %config.host,
        port = config.port,
        routes = config.routes.routes().len(),
        public_endpoints = trust.public_endpoints.patterns().len(),
        "starting gateway"
    );

    HttpServer::new(move || {
        let trust = Arc::clone(&trust);
        App::new()
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(MAX_BODY_BYTES))
            .configure(|cfg| routes::configure(cfg, trust))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}
