//! Gateway authorization stage.
//!
//! RECEIVED → PUBLIC_EXEMPT forwards the request without a credential check,
//! dropping only a client-supplied `X-User-Id`. Otherwise the
//! external credential is verified and exchanged for an internal one, and the
//! request continues with its `Authorization` header replaced and `X-User-Id`
//! set. Any verification failure ends the request with 401.

use std::sync::Arc;
use std::time::SystemTime;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use actix_web::{Error, HttpMessage};
use credentials::{
    bearer_header_value, issue_internal_at, verify_external_at, CredentialError, GatewayTrust,
    Identity,
};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use tracing::{debug, error};
use web_support::auth_header::bearer_token;
use web_support::logging::security::{self, AuthStage};
use web_support::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Result of a successful exchange: who the caller is, and what to forward.
#[derive(Debug, Clone)]
pub struct GatewayGrant {
    pub identity: Identity,
    pub internal_token: String,
}

/// Verify the client credential in `headers` and mint its internal replacement.
///
/// The issuer only runs once verification has succeeded.
pub fn authorize_external(
    trust: &GatewayTrust,
    headers: &HeaderMap,
    now: SystemTime,
) -> Result<GatewayGrant, CredentialError> {
    let token = bearer_token(headers)?;
    let claims = verify_external_at(token, &trust.external_secret, now)?;
    let internal_token =
        issue_internal_at(&claims, &trust.internal_secret, trust.internal_ttl, now)?;

    Ok(GatewayGrant {
        identity: claims.identity,
        internal_token,
    })
}

/// Swap the client's credential for the internal one.
///
/// `insert` drops every previous value, so neither a second client
/// `Authorization` header nor a client-supplied `X-User-Id` survives.
pub fn rewrite_headers(headers: &mut HeaderMap, grant: &GatewayGrant) -> Result<(), CredentialError> {
    let authorization = HeaderValue::from_str(&bearer_header_value(&grant.internal_token))
        .map_err(|e| CredentialError::IssueFailed(e.to_string()))?;

    headers.insert(header::AUTHORIZATION, authorization);
    headers.insert(
        HeaderName::from_static(USER_ID_HEADER),
        HeaderValue::from(grant.identity.user_id),
    );
    Ok(())
}

/// Only the gateway sets `X-User-Id`; a client-sent value never reaches an upstream.
pub fn strip_identity_header(headers: &mut HeaderMap) {
    headers.remove(USER_ID_HEADER);
}

#[derive(Clone)]
pub struct GatewayAuth {
    trust: Arc<GatewayTrust>,
}

impl GatewayAuth {
    pub fn new(trust: Arc<GatewayTrust>) -> Self {
        Self { trust }
    }
}

impl<S, B> Transform<S, ServiceRequest> for GatewayAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = GatewayAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(GatewayAuthMiddleware {
            service,
            trust: Arc::clone(&self.trust),
        }))
    }
}

pub struct GatewayAuthMiddleware<S> {
    service: S,
    trust: Arc<GatewayTrust>,
}

impl<S, B> Service<ServiceRequest> for GatewayAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        if self.trust.public_endpoints.is_public(req.path()) {
            debug!(path = %req.path(), "public endpoint, credential check skipped");
            strip_identity_header(req.headers_mut());
            let fut = self.service.call(req);
            return Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) });
        }

        let outcome = match authorize_external(&self.trust, req.headers(), SystemTime::now()) {
            Ok(grant) => rewrite_headers(req.headers_mut(), &grant).map(|()| grant),
            Err(reason) => Err(reason),
        };

        match outcome {
            Ok(grant) => {
                security::internal_credential_issued(
                    &grant.identity.subject,
                    grant.identity.user_id,
                );
                req.extensions_mut().insert(grant.identity);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(CredentialError::IssueFailed(detail)) => {
                error!(error = %detail, path = %req.path(), "internal credential could not be issued");
                let res = req.error_response(AppError::internal(detail));
                Box::pin(async move { Ok(res.map_into_right_body()) })
            }
            Err(reason) => {
                security::credential_rejected(AuthStage::Gateway, &reason, req.path());
                let res = req.error_response(AppError::unauthorized(reason));
                Box::pin(async move { Ok(res.map_into_right_body()) })
            }
        }
    }
}
