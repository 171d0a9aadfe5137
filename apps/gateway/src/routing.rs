//! Static route table: request path prefix → upstream base URL.
//!
//! `GATEWAY_ROUTES` is a comma-separated list of `prefix=url` entries, e.g.
//! `/api/auth=http://identity:8081,/collections=http://collections:8082`.
//! The longest prefix that matches on a segment boundary wins, and the
//! original path and query are appended to the upstream base URL unchanged.

use credentials::{ConfigurationError, PathPattern, PublicEndpointRegistry};
use reqwest::Url;

pub const ROUTES_SETTING: &str = "GATEWAY_ROUTES";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    prefix: String,
    upstream: String,
}

impl Route {
    pub fn new(prefix: &str, upstream: &str) -> Result<Self, ConfigurationError> {
        let prefix = match PathPattern::parse(prefix) {
            Ok(PathPattern::Exact(prefix)) => prefix,
            _ => {
                return Err(ConfigurationError::invalid(
                    ROUTES_SETTING,
                    format!("route prefix {prefix:?} must be a plain absolute path"),
                ))
            }
        };

        let url = Url::parse(upstream.trim()).map_err(|e| {
            ConfigurationError::invalid(ROUTES_SETTING, format!("upstream {upstream:?}: {e}"))
        })?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ConfigurationError::invalid(
                ROUTES_SETTING,
                format!("upstream {upstream:?} must be an http(s) URL with a host"),
            ));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(ConfigurationError::invalid(
                ROUTES_SETTING,
                format!("upstream {upstream:?} must not carry a query or fragment"),
            ));
        }

        Ok(Self {
            prefix,
            upstream: url.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn upstream(&self) -> &str {
        &self.upstream
    }

    fn matches(&self, path: &str) -> bool {
        if self.prefix == "/" {
            return true;
        }
        path == self.prefix
            || path
                .strip_prefix(self.prefix.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Upstream URL for an inbound `path_and_query`.
    pub fn target(&self, path_and_query: &str) -> String {
        format!("{}{}", self.upstream, path_and_query)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    pub fn parse(list: &str) -> Result<Self, ConfigurationError> {
        let mut routes = Vec::new();
        for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (prefix, upstream) = entry.split_once('=').ok_or_else(|| {
                ConfigurationError::invalid(
                    ROUTES_SETTING,
                    format!("entry {entry:?} is not of the form prefix=url"),
                )
            })?;
            let route = Route::new(prefix, upstream)?;
            if routes.iter().any(|r: &Route| r.prefix == route.prefix) {
                return Err(ConfigurationError::invalid(
                    ROUTES_SETTING,
                    format!("prefix {:?} is routed twice", route.prefix),
                ));
            }
            routes.push(route);
        }

        if routes.is_empty() {
            return Err(ConfigurationError::invalid(
                ROUTES_SETTING,
                "at least one route is required",
            ));
        }
        Ok(Self::new(routes))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn resolve(&self, path: &str) -> Option<&Route> {
        self.routes
            .iter()
            .filter(|route| route.matches(path))
            .max_by_key(|route| route.prefix.len())
    }

    /// Every path some route would forward, as a registry.
    pub fn reachable(&self) -> PublicEndpointRegistry {
        PublicEndpointRegistry::new(
            self.routes
                .iter()
                .map(|route| PathPattern::Subtree(route.prefix.clone()))
                .collect(),
        )
    }
}
