//! CORS (Cross-Origin Resource Sharing) configuration and headers.

use crate::http::Method;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Headers always allowed, whatever the configuration adds.
pub const REQUIRED_HEADERS: [&str; 5] = [
    "Authorization",
    "Content-Type",
    "X-Amz-Date",
    "X-Api-Key",
    "X-Amz-Security-Token",
];

/// CORS configuration.
///
/// Created once with the resolver and shared by every route that has CORS
/// enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Value of `Access-Control-Allow-Origin`.
    pub allow_origin: String,
    /// Extra allowed headers, on top of [`REQUIRED_HEADERS`].
    pub allow_headers: Vec<String>,
    /// Headers exposed to the browser.
    pub expose_headers: Vec<String>,
    /// Preflight cache lifetime in seconds.
    pub max_age: Option<u32>,
    /// Allow credentials (cookies, authorization headers).
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: "*".to_string(),
            allow_headers: Vec::new(),
            expose_headers: Vec::new(),
            max_age: None,
            allow_credentials: false,
        }
    }
}

impl CorsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_origin(mut self, origin: impl Into<String>) -> Self {
        self.allow_origin = origin.into();
        self
    }

    pub fn allow_header(mut self, header: impl Into<String>) -> Self {
        self.allow_headers.push(header.into());
        self
    }

    pub fn expose_header(mut self, header: impl Into<String>) -> Self {
        self.expose_headers.push(header.into());
        self
    }

    pub fn allow_credentials(mut self) -> Self {
        self.allow_credentials = true;
        self
    }

    pub fn max_age(mut self, seconds: u32) -> Self {
        self.max_age = Some(seconds);
        self
    }

    /// Sorted, de-duplicated union of the required and configured headers.
    fn allow_headers_string(&self) -> String {
        REQUIRED_HEADERS
            .iter()
            .copied()
            .chain(self.allow_headers.iter().map(String::as_str))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Sorted, de-duplicated expose list.
    fn expose_headers_string(&self) -> String {
        self.expose_headers
            .iter()
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Headers added to every response of a CORS-enabled route.
    pub fn headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![
            (
                "Access-Control-Allow-Origin".to_string(),
                self.allow_origin.clone(),
            ),
            (
                "Access-Control-Allow-Headers".to_string(),
                self.allow_headers_string(),
            ),
        ];

        if !self.expose_headers.is_empty() {
            headers.push((
                "Access-Control-Expose-Headers".to_string(),
                self.expose_headers_string(),
            ));
        }

        if let Some(max_age) = self.max_age {
            headers.push(("Access-Control-Max-Age".to_string(), max_age.to_string()));
        }

        if self.allow_credentials {
            headers.push((
                "Access-Control-Allow-Credentials".to_string(),
                "true".to_string(),
            ));
        }

        headers
    }

    /// Headers for a preflight answer: the regular set plus
    /// `Access-Control-Allow-Methods` listing `methods` and `OPTIONS`,
    /// sorted by name.
    pub fn preflight_headers(&self, methods: &[Method]) -> Vec<(String, String)> {
        let allowed = methods
            .iter()
            .chain(std::iter::once(&Method::Options))
            .map(Method::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>()
            .join(",");

        let mut headers = self.headers();
        headers.push(("Access-Control-Allow-Methods".to_string(), allowed));
        headers
    }
}
