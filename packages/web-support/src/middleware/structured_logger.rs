//! Access log: one `request_completed` event per request.

use std::future::{ready, Ready};
use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::StatusCode;
use actix_web::{Error, HttpMessage};
use credentials::Identity;
use futures_util::future::LocalBoxFuture;
use tracing::{error, info, warn};

use super::request_trace::TraceId;
use crate::extractors::AuthenticatedUser;

/// Logs method, path, status, latency and, once a credential has been
/// accepted, the caller's user id. 5xx log at error, 4xx at warn.
pub struct StructuredLogger;

impl<S, B> Transform<S, ServiceRequest> for StructuredLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = StructuredLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(StructuredLoggerMiddleware { service }))
    }
}

pub struct StructuredLoggerMiddleware<S> {
    service: S,
}

/// User id bound by either authorization stage, if any.
fn bound_user_id<B>(res: &ServiceResponse<B>) -> Option<i64> {
    let extensions = res.request().extensions();
    let user_id = extensions
        .get::<AuthenticatedUser>()
        .map(|user| user.user_id)
        .or_else(|| extensions.get::<Identity>().map(|identity| identity.user_id));
    user_id
}

struct Completion {
    method: String,
    path: String,
    trace_id: String,
    started: Instant,
}

impl Completion {
    fn log(&self, status: StatusCode, user_id: Option<i64>) {
        let Completion {
            method,
            path,
            trace_id,
            started,
        } = self;
        let duration_us = started.elapsed().as_micros() as u64;
        let status_code = status.as_u16();

        macro_rules! completed {
            ($level:ident) => {
                $level!(
                    http.method = %method,
                    url.path = %path,
                    http.status_code = status_code,
                    duration_us,
                    trace_id = %trace_id,
                    user_id,
                    message = "request_completed"
                )
            };
        }

        if status.is_server_error() {
            completed!(error);
        } else if status.is_client_error() {
            completed!(warn);
        } else {
            completed!(info);
        }
    }
}

impl<S, B> Service<ServiceRequest> for StructuredLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let completion = Completion {
            method: req.method().to_string(),
            path: req.path().to_string(),
            trace_id: req
                .extensions()
                .get::<TraceId>()
                .map_or_else(|| "unknown".to_string(), ToString::to_string),
            started: Instant::now(),
        };

        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;
            match &result {
                Ok(res) => completion.log(res.status(), bound_user_id(res)),
                Err(err) => completion.log(err.as_response_error().status_code(), None),
            }
            result
        })
    }
}
