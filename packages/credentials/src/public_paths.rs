//! Public-endpoint registry: paths exempt from credential checks.
//!
//! The Gateway and every downstream service build their registry from the same
//! policy table (`PUBLIC_ENDPOINTS`), so one endpoint cannot drift to being
//! public on one tier and protected on the other. A service may narrow the
//! table to its own route prefix with [`PublicEndpointRegistry::scoped`].
//!
//! Matching policy:
//! - `"/api/auth/login"` matches exactly that path.
//! - `"/api/catalog/**"` matches `/api/catalog` and anything below it, on a
//!   segment boundary (`/api/catalogue` does not match).
//! - The request path is canonicalized first. Paths that cannot be
//!   canonicalized safely (percent-encoding, backslashes, empty, `.` or `..`
//!   segments) are never public, so they fall through to the credential check.

use std::fmt;

use crate::error::ConfigurationError;

/// Policy table used when `PUBLIC_ENDPOINTS` is not configured.
pub const DEFAULT_PUBLIC_ENDPOINTS: [&str; 3] = [
    "/api/auth/register",
    "/api/auth/login",
    "/api/auth/validate",
];

const SUBTREE_SUFFIX: &str = "/**";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    Exact(String),
    Subtree(String),
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Result<Self, ConfigurationError> {
        let pattern = pattern.trim();
        let (base, subtree) = match pattern.strip_suffix(SUBTREE_SUFFIX) {
            Some(base) => (if base.is_empty() { "/" } else { base }, true),
            None => (pattern, false),
        };

        if base.contains('*') {
            return Err(ConfigurationError::invalid(
                "PUBLIC_ENDPOINTS",
                format!("unsupported wildcard in {pattern:?}; only a trailing /** is allowed"),
            ));
        }

        let canonical = canonicalize(base).ok_or_else(|| {
            ConfigurationError::invalid(
                "PUBLIC_ENDPOINTS",
                format!("{pattern:?} is not a canonical absolute path"),
            )
        })?;

        Ok(if subtree {
            PathPattern::Subtree(canonical)
        } else {
            PathPattern::Exact(canonical)
        })
    }

    fn base(&self) -> &str {
        match self {
            PathPattern::Exact(path) | PathPattern::Subtree(path) => path,
        }
    }

    /// `path` must already be canonical.
    fn matches_canonical(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(exact) => path == exact,
            PathPattern::Subtree(base) => is_under(path, base),
        }
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathPattern::Exact(path) => f.write_str(path),
            PathPattern::Subtree(base) if base == "/" => f.write_str(SUBTREE_SUFFIX),
            PathPattern::Subtree(base) => write!(f, "{base}{SUBTREE_SUFFIX}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicEndpointRegistry {
    patterns: Vec<PathPattern>,
}

impl PublicEndpointRegistry {
    pub fn new(patterns: Vec<PathPattern>) -> Self {
        Self { patterns }
    }

    /// Registry with no public endpoints: every path requires a credential.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Parse a comma-separated policy table. Blank entries are ignored.
    pub fn parse_list(list: &str) -> Result<Self, ConfigurationError> {
        let patterns = list
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(PathPattern::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(patterns))
    }

    pub fn patterns(&self) -> &[PathPattern] {
        &self.patterns
    }

    pub fn is_public(&self, path: &str) -> bool {
        match canonicalize(path) {
            Some(canonical) => self
                .patterns
                .iter()
                .any(|pattern| pattern.matches_canonical(&canonical)),
            None => false,
        }
    }

    /// Entries that fall under `prefix`, for a service that only owns that subtree.
    pub fn scoped(&self, prefix: &str) -> Self {
        let Some(prefix) = canonicalize(prefix) else {
            return Self::empty();
        };
        Self::new(
            self.patterns
                .iter()
                .filter(|pattern| is_under(pattern.base(), &prefix))
                .cloned()
                .collect(),
        )
    }

    /// Entries public here that `other` would still protect.
    pub fn not_covered_by<'a>(&'a self, other: &PublicEndpointRegistry) -> Vec<&'a PathPattern> {
        self.patterns
            .iter()
            .filter(|pattern| match pattern {
                PathPattern::Exact(path) => !other.is_public(path),
                PathPattern::Subtree(base) => !other.patterns.iter().any(|theirs| match theirs {
                    PathPattern::Subtree(their_base) => is_under(base, their_base),
                    PathPattern::Exact(_) => false,
                }),
            })
            .collect()
    }
}

impl Default for PublicEndpointRegistry {
    fn default() -> Self {
        Self::new(
            DEFAULT_PUBLIC_ENDPOINTS
                .iter()
                .map(|path| PathPattern::Exact((*path).to_string()))
                .collect(),
        )
    }
}

fn is_under(path: &str, base: &str) -> bool {
    if base == "/" {
        return true;
    }
    path == base
        || path
            .strip_prefix(base)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Canonical form of a request path, or `None` when it cannot be trusted.
fn canonicalize(path: &str) -> Option<String> {
    if !path.starts_with('/') || path.contains('%') || path.contains('\\') {
        return None;
    }

    if path == "/" {
        return Some("/".to_string());
    }

    let trimmed = path.strip_suffix('/').unwrap_or(path);
    let suspicious = trimmed[1..]
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if suspicious {
        return None;
    }

    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(list: &str) -> PublicEndpointRegistry {
        PublicEndpointRegistry::parse_list(list).unwrap()
    }

    #[test]
    fn default_table_exempts_auth_entry_points_only() {
        let reg = PublicEndpointRegistry::default();
        assert!(reg.is_public("/api/auth/login"));
        assert!(reg.is_public("/api/auth/register"));
        assert!(reg.is_public("/api/auth/validate"));
        assert!(!reg.is_public("/api/auth/me"));
        assert!(!reg.is_public("/collections/games"));
    }

    #[test]
    fn exact_match_is_not_a_prefix_or_substring_match() {
        let reg = registry("/api/auth/login");
        assert!(reg.is_public("/api/auth/login/"));
        assert!(!reg.is_public("/api/auth/login/admin"));
        assert!(!reg.is_public("/api/auth/loginx"));
        assert!(!reg.is_public("/evil/api/auth/login"));
    }

    #[test]
    fn traversal_and_encoded_paths_are_never_public() {
        let reg = registry("/api/auth/login, /api/catalog/**");
        for path in [
            "/api/auth/login/../admin",
            "/api/auth/./login",
            "/api/catalog/../../admin",
            "/api/catalog//x",
            "/api/auth/%6cogin",
            "/api/catalog/%2e%2e/admin",
            "/api\\auth\\login",
            "api/auth/login",
            "",
        ] {
            assert!(!reg.is_public(path), "{path:?} must not be public");
        }
    }

    #[test]
    fn subtree_matches_on_segment_boundary() {
        let reg = registry("/api/catalog/**");
        assert!(reg.is_public("/api/catalog"));
        assert!(reg.is_public("/api/catalog/games/42"));
        assert!(!reg.is_public("/api/catalogue"));
        assert!(!reg.is_public("/api"));
    }

    #[test]
    fn rejects_unsupported_patterns() {
        assert!(PublicEndpointRegistry::parse_list("/api/*/login").is_err());
        assert!(PublicEndpointRegistry::parse_list("api/auth/login").is_err());
        assert!(PublicEndpointRegistry::parse_list("/api/../admin").is_err());
    }

    #[test]
    fn blank_entries_are_ignored() {
        let reg = registry(" /api/auth/login , ,");
        assert_eq!(reg.patterns().len(), 1);
    }

    #[test]
    fn scoped_keeps_entries_under_prefix() {
        let reg = registry("/api/auth/login,/api/auth/register,/api/games/public/**");
        let auth = reg.scoped("/api/auth");
        assert_eq!(auth.patterns().len(), 2);
        assert!(auth.is_public("/api/auth/login"));
        assert!(!auth.is_public("/api/games/public/top"));

        let games = reg.scoped("/api/games");
        assert_eq!(
            games.patterns(),
            &[PathPattern::Subtree("/api/games/public".into())]
        );
    }

    #[test]
    fn reports_entries_public_on_one_tier_only() {
        let gateway = registry("/api/auth/login,/api/catalog/**");
        let service = registry("/api/auth/login,/api/auth/validate,/api/catalog/top/**");

        let drift: Vec<String> = service
            .not_covered_by(&gateway)
            .into_iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(drift, vec!["/api/auth/validate".to_string()]);

        let reverse: Vec<String> = gateway
            .not_covered_by(&service)
            .into_iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(reverse, vec!["/api/catalog/**".to_string()]);
    }
}
