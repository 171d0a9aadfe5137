use std::time::Duration;

use credentials::config::read_setting;
use credentials::{ConfigurationError, GatewayTrust, ProcessEnv, SettingSource};

use crate::routing::{RouteTable, ROUTES_SETTING};

pub const HOST_SETTING: &str = "GATEWAY_HOST";
pub const PORT_SETTING: &str = "GATEWAY_PORT";
pub const UPSTREAM_TIMEOUT_SETTING: &str = "GATEWAY_UPSTREAM_TIMEOUT_SECS";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything the gateway process reads at startup.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub trust: GatewayTrust,
    pub routes: RouteTable,
    pub upstream_timeout: Duration,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_source(&ProcessEnv)
    }

    pub fn from_source(source: &impl SettingSource) -> Result<Self, ConfigurationError> {
        let host = read_setting(source, HOST_SETTING)?.unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match read_setting(source, PORT_SETTING)? {
            Some(raw) => raw.parse::<u16>().map_err(|_| {
                ConfigurationError::invalid(PORT_SETTING, format!("{raw:?} is not a valid port"))
            })?,
            None => DEFAULT_PORT,
        };

        let upstream_timeout = match read_setting(source, UPSTREAM_TIMEOUT_SETTING)? {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigurationError::invalid(
                        UPSTREAM_TIMEOUT_SETTING,
                        format!("{raw:?} is not a positive number of seconds"),
                    ))
                }
            },
            None => DEFAULT_UPSTREAM_TIMEOUT,
        };

        let routes = read_setting(source, ROUTES_SETTING)?
            .ok_or_else(|| ConfigurationError::missing(ROUTES_SETTING))?;

        Ok(Self {
            host,
            port,
            trust: GatewayTrust::from_source(source)?,
            routes: RouteTable::parse(&routes)?,
            upstream_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const EXTERNAL: &str = "ZXh0ZXJuYWwtdGVzdC1rZXktMDEyMzQ1Njc4OWFiY2Q=";
    const INTERNAL: &str = "aW50ZXJuYWwtdGVzdC1rZXktMDEyMzQ1Njc4OWFiY2Q=";

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        let mut map: HashMap<String, String> = [
            ("JWT_USER_SECRET_KEY", EXTERNAL),
            ("JWT_INTERNAL_SECRET_KEY", INTERNAL),
            (ROUTES_SETTING, "/collections=http://collections:8082"),
        ]
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
        for (k, v) in pairs {
            map.insert((*k).to_string(), (*v).to_string());
        }
        map
    }

    #[test]
    fn defaults() {
        let config = GatewayConfig::from_source(&source(&[])).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.upstream_timeout, Duration::from_secs(30));
        assert_eq!(config.routes.routes().len(), 1);
    }

    #[test]
    fn overrides() {
        let config = GatewayConfig::from_source(&source(&[
            (HOST_SETTING, "127.0.0.1"),
            (PORT_SETTING, "9090"),
            (UPSTREAM_TIMEOUT_SETTING, "5"),
        ]))
        .unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9090);
        assert_eq!(config.upstream_timeout, Duration::from_secs(5));
    }

    #[test]
    fn routes_are_required() {
        let mut map = source(&[]);
        map.remove(ROUTES_SETTING);
        let err = GatewayConfig::from_source(&map).unwrap_err();
        assert!(matches!(err, ConfigurationError::MissingSetting { ref name } if name == ROUTES_SETTING));
    }

    #[test]
    fn rejects_bad_numbers() {
        for (name, value) in [
            (PORT_SETTING, "http"),
            (PORT_SETTING, "70000"),
            (UPSTREAM_TIMEOUT_SETTING, "0"),
            (UPSTREAM_TIMEOUT_SETTING, "-3"),
        ] {
            let err = GatewayConfig::from_source(&source(&[(name, value)])).unwrap_err();
            assert!(
                matches!(err, ConfigurationError::InvalidSetting { name: ref n, .. } if n == name),
                "{name}={value} gave {err}"
            );
        }
    }

    #[test]
    fn shared_secret_is_fatal() {
        let err = GatewayConfig::from_source(&source(&[("JWT_INTERNAL_SECRET_KEY", EXTERNAL)]))
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::SharedSecret));
    }
}
