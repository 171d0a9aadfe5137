use crate::error::CredentialError;

pub const BEARER_SCHEME: &str = "Bearer";

/// Extract the token from an `Authorization` header value of the form `Bearer <token>`.
pub fn parse_bearer(header_value: Option<&str>) -> Result<&str, CredentialError> {
    let value = header_value.ok_or(CredentialError::MissingHeader)?;

    let parts: Vec<&str> = value.split_whitespace().collect();
    if parts.len() != 2 || parts[0] != BEARER_SCHEME {
        return Err(CredentialError::MissingHeader);
    }

    let token = parts[1];
    if token.is_empty() {
        return Err(CredentialError::MissingHeader);
    }

    Ok(token)
}

/// Render an `Authorization` header value for `token`.
pub fn bearer_header_value(token: &str) -> String {
    format!("{BEARER_SCHEME} {token}")
}
