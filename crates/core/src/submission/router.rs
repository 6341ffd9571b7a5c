//! Endpoint selection between the legacy and modernized integrations.

use std::fmt;

use declarations_domain::{EndpointKind, ResponseTaxonomy, SubmissionConfig};

/// Where a submission is sent and which credential it carries.
#[derive(Clone, PartialEq, Eq)]
pub struct RoutingTarget {
    pub kind: EndpointKind,
    pub base_url: String,
    pub path: String,
    pub bearer_token: String,
}

impl RoutingTarget {
    /// Absolute URL for the POST: base URL and versioned path joined by a
    /// single slash.
    pub fn url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.path.trim_start_matches('/'))
    }
}

impl fmt::Debug for RoutingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutingTarget")
            .field("kind", &self.kind)
            .field("base_url", &self.base_url)
            .field("path", &self.path)
            .field("bearer_token", &"<redacted>")
            .finish()
    }
}

/// Result of routing: the target plus the taxonomy its outcomes are
/// reported in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub target: RoutingTarget,
    pub taxonomy: ResponseTaxonomy,
}

/// Chooses the downstream integration from the process-wide feature flag.
///
/// Both targets are resolved once at construction; [`EndpointRouter::route`]
/// is a lookup with no error conditions.
#[derive(Debug, Clone)]
pub struct EndpointRouter {
    modernized_enabled: bool,
    legacy: RoutingTarget,
    modernized: RoutingTarget,
}

impl EndpointRouter {
    pub fn from_config(config: &SubmissionConfig) -> Self {
        Self {
            modernized_enabled: config.modernized_enabled,
            legacy: RoutingTarget {
                kind: EndpointKind::Legacy,
                base_url: config.legacy.base_url.clone(),
                path: config.legacy.legacy_path().to_string(),
                bearer_token: config.legacy.bearer_token.clone(),
            },
            modernized: RoutingTarget {
                kind: EndpointKind::Modernized,
                base_url: config.modernized.base_url.clone(),
                path: config.modernized.modernized_path().to_string(),
                bearer_token: config.modernized.bearer_token.clone(),
            },
        }
    }

    pub fn route(&self) -> Route {
        let target = if self.modernized_enabled { &self.modernized } else { &self.legacy };
        Route { target: target.clone(), taxonomy: target.kind.taxonomy() }
    }
}

#[cfg(test)]
mod tests {
    use declarations_domain::{BreakerSettings, EndpointConfig};

    use super::*;

    fn config(modernized_enabled: bool) -> SubmissionConfig {
        SubmissionConfig {
            legacy: EndpointConfig {
                base_url: "http://legacy.local:9000/".to_string(),
                path: None,
                bearer_token: "legacy-token".to_string(),
            },
            modernized: EndpointConfig {
                base_url: "http://modern.local:9001".to_string(),
                path: Some("/v2/declarations".to_string()),
                bearer_token: "modern-token".to_string(),
            },
            modernized_enabled,
            circuit_breaker: BreakerSettings::default(),
            request_timeout_secs: 30,
        }
    }

    #[test]
    fn flag_off_routes_to_legacy() {
        let route = EndpointRouter::from_config(&config(false)).route();

        assert_eq!(route.target.kind, EndpointKind::Legacy);
        assert_eq!(route.target.bearer_token, "legacy-token");
        assert_eq!(route.taxonomy, ResponseTaxonomy::Legacy);
        assert_eq!(
            route.target.url(),
            "http://legacy.local:9000/declarations/passengerdeclaration/v1"
        );
    }

    #[test]
    fn flag_on_routes_to_modernized() {
        let route = EndpointRouter::from_config(&config(true)).route();

        assert_eq!(route.target.kind, EndpointKind::Modernized);
        assert_eq!(route.target.bearer_token, "modern-token");
        assert_eq!(route.taxonomy, ResponseTaxonomy::Modernized);
        assert_eq!(route.target.url(), "http://modern.local:9001/v2/declarations");
    }

    #[test]
    fn routing_is_stable_across_calls() {
        let router = EndpointRouter::from_config(&config(true));
        assert_eq!(router.route(), router.route());
    }

    #[test]
    fn debug_redacts_bearer_token() {
        let route = EndpointRouter::from_config(&config(false)).route();
        let rendered = format!("{:?}", route.target);
        assert!(!rendered.contains("legacy-token"));
        assert!(rendered.contains("<redacted>"));
    }
}
