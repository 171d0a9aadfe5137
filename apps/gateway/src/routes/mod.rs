use std::sync::Arc;

use actix_web::web;
use credentials::GatewayTrust;

use crate::middleware::GatewayAuth;

pub mod health;
pub mod proxy;

/// Gateway routes: `/health` is answered here, everything else is checked
/// by [`GatewayAuth`] and forwarded.
pub fn configure(cfg: &mut web::ServiceConfig, trust: Arc<GatewayTrust>) {
    cfg.service(web::scope("/health").configure(health::configure_routes));

    cfg.service(
        web::scope("")
            .default_service(web::to(proxy::forward))
            .wrap(GatewayAuth::new(trust)),
    );
}
