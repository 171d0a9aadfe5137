use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use credentials::CredentialError;
use serde::Serialize;
use thiserror::Error;

use crate::error_code::ErrorCode;
use crate::trace_ctx;

#[derive(Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
    pub trace_id: String,
}

/// Request-level error rendered as `application/problem+json`.
///
/// Credential failures carry their reason for logging, but the rendered
/// response is identical for every reason.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: CredentialError },
    #[error("Forbidden: {reason}")]
    Forbidden { reason: CredentialError },
    #[error("Not found: {detail}")]
    NotFound { detail: String },
    #[error("Bad gateway: {detail}")]
    BadGateway { detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Unauthorized { .. } => ErrorCode::Unauthorized,
            AppError::Forbidden { .. } => ErrorCode::Forbidden,
            AppError::NotFound { .. } => ErrorCode::NotFound,
            AppError::BadGateway { .. } => ErrorCode::BadGateway,
            AppError::Internal { .. } => ErrorCode::Internal,
        }
    }

    /// Client-facing detail. Never includes verification or upstream internals.
    fn public_detail(&self) -> String {
        match self {
            AppError::Unauthorized { .. } => "Authentication required".to_string(),
            AppError::Forbidden { .. } => "Access denied".to_string(),
            AppError::NotFound { detail } => detail.clone(),
            AppError::BadGateway { .. } => "Upstream service unavailable".to_string(),
            AppError::Internal { .. } => "Internal server error".to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn unauthorized(reason: CredentialError) -> Self {
        Self::Unauthorized { reason }
    }

    pub fn forbidden(reason: CredentialError) -> Self {
        Self::Forbidden { reason }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::NotFound {
            detail: detail.into(),
        }
    }

    pub fn bad_gateway(detail: impl Into<String>) -> Self {
        Self::BadGateway {
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    fn humanize_code(code: &str) -> String {
        code.split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.flat_map(char::to_lowercase))
                        .collect(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let code = self.code().as_str();
        let trace_id = trace_ctx::trace_id();

        let problem_details = ProblemDetails {
            type_: format!("https://gatehouse.dev/errors/{code}"),
            title: Self::humanize_code(code),
            status: status.as_u16(),
            detail: self.public_detail(),
            code: code.to_string(),
            trace_id: trace_id.clone(),
        };

        HttpResponse::build(status)
            .content_type("application/problem+json")
            .insert_header(("x-trace-id", trace_id))
            .json(problem_details)
    }
}
