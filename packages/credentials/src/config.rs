//! Process configuration for both trust tiers.
//!
//! Settings come from the environment. Any setting `NAME` may instead be
//! provided as `NAME_FILE=/path/to/file` (e.g. a mounted container secret);
//! the file content is trimmed and takes precedence over `NAME`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::error::ConfigurationError;
use crate::public_paths::PublicEndpointRegistry;
use crate::secret::SigningSecret;

pub const EXTERNAL_SECRET_SETTING: &str = "JWT_USER_SECRET_KEY";
pub const INTERNAL_SECRET_SETTING: &str = "JWT_INTERNAL_SECRET_KEY";
pub const INTERNAL_TTL_SETTING: &str = "JWT_INTERNAL_EXPIRATION_SECS";
pub const PUBLIC_ENDPOINTS_SETTING: &str = "PUBLIC_ENDPOINTS";
pub const SERVICE_ROUTE_PREFIX_SETTING: &str = "SERVICE_ROUTE_PREFIX";

pub const DEFAULT_INTERNAL_TTL: Duration = Duration::from_secs(5 * 60);

const FILE_SUFFIX: &str = "_FILE";

/// Where raw setting values come from.
pub trait SettingSource {
    fn get(&self, name: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl SettingSource for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl SettingSource for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

/// Resolve `name`, honouring the `NAME_FILE` indirection. Blank values count as unset.
pub fn read_setting(
    source: &impl SettingSource,
    name: &str,
) -> Result<Option<String>, ConfigurationError> {
    let file_setting = format!("{name}{FILE_SUFFIX}");
    if let Some(path) = source.get(&file_setting) {
        let path = path.trim();
        if !path.is_empty() {
            let content =
                std::fs::read_to_string(path).map_err(|source| ConfigurationError::SecretFile {
                    name: name.to_string(),
                    path: PathBuf::from(path),
                    source,
                })?;
            debug!(setting = name, "loaded setting from file");
            return Ok(Some(content.trim().to_string()).filter(|v| !v.is_empty()));
        }
    }

    Ok(source
        .get(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

fn is_present(source: &impl SettingSource, name: &str) -> bool {
    let file_setting = format!("{name}{FILE_SUFFIX}");
    [name, file_setting.as_str()]
        .iter()
        .any(|key| source.get(key).is_some_and(|v| !v.trim().is_empty()))
}

fn required_secret(
    source: &impl SettingSource,
    name: &str,
) -> Result<SigningSecret, ConfigurationError> {
    let encoded = read_setting(source, name)?.ok_or_else(|| ConfigurationError::missing(name))?;
    SigningSecret::from_base64(name, &encoded)
}

fn public_endpoints(
    source: &impl SettingSource,
) -> Result<PublicEndpointRegistry, ConfigurationError> {
    match read_setting(source, PUBLIC_ENDPOINTS_SETTING)? {
        Some(list) => PublicEndpointRegistry::parse_list(&list),
        None => Ok(PublicEndpointRegistry::default()),
    }
}

fn internal_ttl(source: &impl SettingSource) -> Result<Duration, ConfigurationError> {
    let Some(raw) = read_setting(source, INTERNAL_TTL_SETTING)? else {
        return Ok(DEFAULT_INTERNAL_TTL);
    };
    let secs = raw.parse::<u64>().map_err(|e| {
        ConfigurationError::invalid(INTERNAL_TTL_SETTING, format!("{raw:?} is not a number: {e}"))
    })?;
    Ok(Duration::from_secs(secs))
}

/// Everything the Gateway needs to translate credentials.
#[derive(Debug, Clone)]
pub struct GatewayTrust {
    pub external_secret: SigningSecret,
    pub internal_secret: SigningSecret,
    pub internal_ttl: Duration,
    pub public_endpoints: PublicEndpointRegistry,
}

impl GatewayTrust {
    pub fn new(
        external_secret: SigningSecret,
        internal_secret: SigningSecret,
        internal_ttl: Duration,
        public_endpoints: PublicEndpointRegistry,
    ) -> Result<Self, ConfigurationError> {
        if external_secret.same_key_as(&internal_secret) {
            return Err(ConfigurationError::SharedSecret);
        }
        if internal_ttl.as_secs() == 0 {
            return Err(ConfigurationError::invalid(
                INTERNAL_TTL_SETTING,
                "must be at least one second",
            ));
        }
        Ok(Self {
            external_secret,
            internal_secret,
            internal_ttl,
            public_endpoints,
        })
    }

    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_source(&ProcessEnv)
    }

    pub fn from_source(source: &impl SettingSource) -> Result<Self, ConfigurationError> {
        Self::new(
            required_secret(source, EXTERNAL_SECRET_SETTING)?,
            required_secret(source, INTERNAL_SECRET_SETTING)?,
            internal_ttl(source)?,
            public_endpoints(source)?,
        )
    }
}

/// What a downstream service needs to verify gateway-issued credentials.
#[derive(Debug, Clone)]
pub struct ServiceTrust {
    pub internal_secret: SigningSecret,
    pub public_endpoints: PublicEndpointRegistry,
}

impl ServiceTrust {
    pub fn new(internal_secret: SigningSecret, public_endpoints: PublicEndpointRegistry) -> Self {
        Self {
            internal_secret,
            public_endpoints,
        }
    }

    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_source(&ProcessEnv)
    }

    /// Refuses to start when the external secret is visible to the service.
    pub fn from_source(source: &impl SettingSource) -> Result<Self, ConfigurationError> {
        if is_present(source, EXTERNAL_SECRET_SETTING) {
            return Err(ConfigurationError::ExternalSecretExposed {
                name: EXTERNAL_SECRET_SETTING.to_string(),
            });
        }

        let internal_secret = required_secret(source, INTERNAL_SECRET_SETTING)?;
        let shared = public_endpoints(source)?;
        let public_endpoints = match read_setting(source, SERVICE_ROUTE_PREFIX_SETTING)? {
            Some(prefix) => shared.scoped(&prefix),
            None => shared,
        };

        Ok(Self::new(internal_secret, public_endpoints))
    }
}
