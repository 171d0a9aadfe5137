//! Service authorization stage, wired into every downstream service.
//!
//! RECEIVED → PUBLIC_EXEMPT when the path is in the service's public registry;
//! otherwise RECEIVED → VERIFIED → CONTEXT_SET → CONTINUE when the bearer
//! token is a valid internal credential, or RECEIVED → REJECTED (403).

use std::sync::Arc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::HeaderMap;
use actix_web::{Error, HttpMessage};
use credentials::{verify_internal, CredentialError, ServiceTrust};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use tracing::debug;

use crate::auth_header::bearer_token;
use crate::error::AppError;
use crate::extractors::AuthenticatedUser;
use crate::logging::security::{self, AuthStage};

/// Verify the gateway-issued credential on one request's headers.
pub fn authorize_internal(
    trust: &ServiceTrust,
    headers: &HeaderMap,
) -> Result<AuthenticatedUser, CredentialError> {
    let token = bearer_token(headers)?;
    let claims = verify_internal(token, &trust.internal_secret)?;
    Ok(AuthenticatedUser::from(claims))
}

#[derive(Clone)]
pub struct ServiceAuth {
    trust: Arc<ServiceTrust>,
}

impl ServiceAuth {
    pub fn new(trust: Arc<ServiceTrust>) -> Self {
        Self { trust }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ServiceAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ServiceAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ServiceAuthMiddleware {
            service,
            trust: Arc::clone(&self.trust),
        }))
    }
}

pub struct ServiceAuthMiddleware<S> {
    service: S,
    trust: Arc<ServiceTrust>,
}

impl<S, B> Service<ServiceRequest> for ServiceAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if self.trust.public_endpoints.is_public(req.path()) {
            debug!(path = %req.path(), "public endpoint, credential check skipped");
            let fut = self.service.call(req);
            return Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) });
        }

        match authorize_internal(&self.trust, req.headers()) {
            Ok(user) => {
                req.extensions_mut().insert(user);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(reason) => {
                security::credential_rejected(AuthStage::Service, &reason, req.path());
                let res = req.error_response(AppError::forbidden(reason));
                Box::pin(async move { Ok(res.map_into_right_body()) })
            }
        }
    }
}
