#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use serde_json::{json, Value};
use test_support::fixtures;
use web_support::{AuthenticatedUser, RequestTrace, ServiceAuth};

#[ctor::ctor]
fn init_logging() {
    test_support::logging::init();
}

/// In-process gateway over `RouteTable::parse($routes)`, wired like `main`.
#[allow(unused_macros)]
macro_rules! gateway_app {
    ($routes:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(web_support::RequestTrace)
                .app_data(actix_web::web::Data::new(
                    gateway::AppState::new(
                        gateway::RouteTable::parse($routes).unwrap(),
                        std::time::Duration::from_secs(5),
                    )
                    .unwrap(),
                ))
                .configure(|cfg| {
                    gateway::routes::configure(
                        cfg,
                        std::sync::Arc::new(test_support::fixtures::gateway_trust()),
                    )
                }),
        )
        .await
    };
}

/// A downstream service listening on a real port, guarded by `ServiceAuth`.
pub struct Upstream {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl Upstream {
    /// Requests that reached a handler.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn routes(&self) -> String {
        format!(
            "/api/auth={base},/collections={base}",
            base = self.base_url
        )
    }
}

fn header(req: &HttpRequest, name: &str) -> Value {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map_or(Value::Null, |v| json!(v))
}

async fn echo_protected(
    req: HttpRequest,
    user: AuthenticatedUser,
    hits: web::Data<AtomicUsize>,
) -> HttpResponse {
    hits.fetch_add(1, Ordering::SeqCst);
    HttpResponse::Ok().json(json!({
        "subject": user.subject,
        "userId": user.user_id,
        "authorization": header(&req, "authorization"),
        "authorizationCount": req.headers().get_all("authorization").count(),
        "xUserId": header(&req, "x-user-id"),
        "requestId": header(&req, "x-request-id"),
    }))
}

async fn echo_public(req: HttpRequest, hits: web::Data<AtomicUsize>) -> HttpResponse {
    hits.fetch_add(1, Ordering::SeqCst);
    HttpResponse::Ok().json(json!({
        "authorization": header(&req, "authorization"),
        "xUserId": header(&req, "x-user-id"),
    }))
}

/// Must be called from inside an actix runtime.
pub fn spawn_upstream() -> Upstream {
    let hits = Arc::new(AtomicUsize::new(0));
    let data = web::Data::from(Arc::clone(&hits));
    let trust = Arc::new(fixtures::service_trust());

    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(ServiceAuth::new(Arc::clone(&trust)))
            .wrap(RequestTrace)
            .route("/collections/games", web::get().to(echo_protected))
            .route("/api/auth/login", web::post().to(echo_public))
    })
    .workers(1)
    .disable_signals()
    .bind(("127.0.0.1", 0))
    .expect("bind upstream");

    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());

    Upstream {
        base_url: format!("http://{addr}"),
        hits,
    }
}
