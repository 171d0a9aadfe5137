use actix_web::http::header::{self, HeaderMap};
use credentials::{parse_bearer, CredentialError};

/// Bearer token from the request's single `Authorization` header.
///
/// More than one `Authorization` header is treated as malformed.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, CredentialError> {
    let mut values = headers.get_all(header::AUTHORIZATION);
    let first = values.next();
    if values.next().is_some() {
        return Err(CredentialError::MissingHeader);
    }

    let value = match first {
        Some(value) => Some(value.to_str().map_err(|_| CredentialError::MissingHeader)?),
        None => None,
    };

    parse_bearer(value)
}
