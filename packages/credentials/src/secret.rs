use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::error::ConfigurationError;

/// Minimum decoded key length for HS256 (256 bits).
pub const MIN_SECRET_BYTES: usize = 32;

/// Symmetric HMAC key for one trust domain.
///
/// Key material never appears in `Debug` output.
#[derive(Clone)]
pub struct SigningSecret {
    key: Vec<u8>,
}

impl SigningSecret {
    /// Decode a base64 (standard alphabet) secret as it appears in configuration.
    ///
    /// `name` is the setting the value came from and is only used in errors.
    pub fn from_base64(name: &str, encoded: &str) -> Result<Self, ConfigurationError> {
        let key = STANDARD
            .decode(encoded.trim())
            .map_err(|e| ConfigurationError::invalid(name, format!("not valid base64: {e}")))?;
        Self::from_bytes(name, key)
    }

    pub fn from_bytes(name: &str, key: impl Into<Vec<u8>>) -> Result<Self, ConfigurationError> {
        let key = key.into();
        if key.len() < MIN_SECRET_BYTES {
            return Err(ConfigurationError::invalid(
                name,
                format!(
                    "decoded key is {} bytes, at least {MIN_SECRET_BYTES} required",
                    key.len()
                ),
            ));
        }
        Ok(Self { key })
    }

    pub fn same_key_as(&self, other: &SigningSecret) -> bool {
        self.key == other.key
    }

    pub(crate) fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(&self.key)
    }

    pub(crate) fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(&self.key)
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningSecret")
            .field("key", &"<redacted>")
            .finish()
    }
}
