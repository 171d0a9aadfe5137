//! Request-scoped identity established by `ServiceAuth`.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use credentials::{CredentialError, InternalClaims};

use crate::error::AppError;

/// The caller a downstream service is acting for.
///
/// Inserted into request extensions once the internal credential verifies;
/// handlers take it as an extractor instead of reading any global holder.
/// On an endpoint that skipped verification the extractor fails with 403.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub subject: String,
    pub user_id: i64,
}

impl From<InternalClaims> for AuthenticatedUser {
    fn from(claims: InternalClaims) -> Self {
        Self {
            subject: claims.sub,
            user_id: claims.user_id,
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthenticatedUser>()
                .cloned()
                .ok_or_else(|| AppError::forbidden(CredentialError::MissingHeader)),
        )
    }
}
