//! Forwarding to the routed upstream.
//!
//! actix-web and reqwest sit on different `http` crate versions, so method,
//! header and status values cross over as strings and bytes.

use actix_web::http::header::{HeaderMap as InboundHeaders, HeaderName as InboundName};
use actix_web::http::StatusCode;
use actix_web::{web, HttpMessage, HttpRequest, HttpResponse};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use tracing::{debug, warn};
use web_support::middleware::request_trace::REQUEST_ID_HEADER;
use web_support::{AppError, TraceId};

use crate::state::AppState;

/// Per-connection headers, plus `content-length`, which is recomputed for the relayed body.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.contains(&name) || name.starts_with("proxy-")
}

fn upstream_headers(inbound: &InboundHeaders) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in inbound.iter() {
        if is_hop_by_hop(name.as_str()) {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_str().as_bytes()),
            HeaderValue::from_bytes(value.as_bytes()),
        ) {
            headers.append(name, value);
        }
    }
    headers
}

pub async fn forward(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let route = state
        .routes
        .resolve(req.path())
        .ok_or_else(|| AppError::not_found(format!("No route for {}", req.path())))?;

    let path_and_query = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.path(), |pq| pq.as_str());
    let url = route.target(path_and_query);

    let method = Method::from_bytes(req.method().as_str().as_bytes())
        .map_err(|e| AppError::internal(format!("unsupported method: {e}")))?;

    let mut headers = upstream_headers(req.headers());
    if let Some(trace_id) = req.extensions().get::<TraceId>() {
        if let Ok(value) = HeaderValue::from_str(trace_id.as_str()) {
            headers.insert(REQUEST_ID_HEADER, value);
        }
    }

    debug!(upstream = route.upstream(), %method, "forwarding request");

    let upstream = state
        .client
        .request(method, &url)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|e| {
            warn!(upstream = route.upstream(), error = %e, "upstream request failed");
            AppError::bad_gateway(e.to_string())
        })?;

    let status = StatusCode::from_u16(upstream.status().as_u16())
        .map_err(|e| AppError::bad_gateway(format!("upstream status: {e}")))?;

    let mut response = HttpResponse::build(status);
    for (name, value) in upstream.headers() {
        if is_hop_by_hop(name.as_str()) {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            InboundName::from_bytes(name.as_str().as_bytes()),
            actix_web::http::header::HeaderValue::from_bytes(value.as_bytes()),
        ) {
            response.append_header((name, value));
        }
    }

    let bytes = upstream.bytes().await.map_err(|e| {
        warn!(upstream = route.upstream(), error = %e, "upstream body failed");
        AppError::bad_gateway(e.to_string())
    })?;

    Ok(response.body(bytes))
}
