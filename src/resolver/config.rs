//! Resolver configuration.

use crate::event::ProxyType;
use crate::response::CorsConfig;
use crate::routing::RouteOptions;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Environment variable that switches on debug mode in [`ResolverConfig::from_env`].
pub const DEBUG_ENV: &str = "PROXY_RESOLVER_DEBUG";

/// Configuration for a [`Resolver`](crate::Resolver).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Front door whose events this resolver receives.
    pub proxy_type: ProxyType,
    /// Application-wide CORS configuration. Routes inherit it unless their
    /// options say otherwise.
    pub cors: Option<CorsConfig>,
    /// Include a traceback in error bodies.
    pub debug: bool,
    /// Reject a second route with the same method and template.
    pub strict_routes: bool,
}

impl ResolverConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config with `debug` taken from `PROXY_RESOLVER_DEBUG`.
    pub fn from_env() -> Self {
        let debug = std::env::var(DEBUG_ENV)
            .map(|value| is_truthy(&value))
            .unwrap_or(false);
        Self::default().debug(debug)
    }

    /// Set the proxy type.
    pub fn proxy_type(mut self, proxy_type: ProxyType) -> Self {
        self.proxy_type = proxy_type;
        self
    }

    /// Enable CORS for every route that does not opt out.
    pub fn cors(mut self, cors: CorsConfig) -> Self {
        self.cors = Some(cors);
        self
    }

    /// Set debug mode.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set strict route registration.
    pub fn strict_routes(mut self, strict: bool) -> Self {
        self.strict_routes = strict;
        self
    }

    /// CORS configuration applying to a route with `options`, if any.
    ///
    /// A route that forces CORS on while the application has none gets the
    /// default configuration.
    pub fn cors_for(&self, options: &RouteOptions) -> Option<Cow<'_, CorsConfig>> {
        if !options.cors_enabled(self.cors.is_some()) {
            return None;
        }
        Some(match &self.cors {
            Some(cors) => Cow::Borrowed(cors),
            None => Cow::Owned(CorsConfig::default()),
        })
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthy_values() {
        for value in ["1", "true", "TRUE", " yes ", "on"] {
            assert!(is_truthy(value), "{value}");
        }
        for value in ["", "0", "false", "off", "debug"] {
            assert!(!is_truthy(value), "{value}");
        }
    }

    #[test]
    fn test_cors_inheritance() {
        let plain = ResolverConfig::new();
        assert!(plain.cors_for(&RouteOptions::new()).is_none());
        assert_eq!(
            plain.cors_for(&RouteOptions::new().cors(true)).as_deref(),
            Some(&CorsConfig::default())
        );

        let custom = CorsConfig::new().allow_origin("https://example.com");
        let with_cors = ResolverConfig::new().cors(custom.clone());
        assert_eq!(
            with_cors.cors_for(&RouteOptions::new()).as_deref(),
            Some(&custom)
        );
        assert!(with_cors
            .cors_for(&RouteOptions::new().cors(false))
            .is_none());
    }

    #[test]
    fn test_config_from_json() {
        let config: ResolverConfig = serde_json::from_str(
            r#"{"proxy_type": "http_api_v2", "debug": true, "cors": {"max_age": 60}}"#,
        )
        .unwrap();

        assert_eq!(config.proxy_type, ProxyType::HttpApiV2);
        assert!(config.debug);
        assert!(!config.strict_routes);
        assert_eq!(config.cors.unwrap().allow_origin, "*");
    }
}
