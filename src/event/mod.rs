//! Event normalization.
//!
//! Each front door delivers a differently shaped event. The resolver is
//! told which one to expect through [`ProxyType`] and normalizes through
//! that shape's extraction strategy only; payloads are never sniffed.

mod alb;
mod http_v2;
mod rest;
mod v1;

use crate::error::{ResolverError, Result};
use crate::http::{Method, Request};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Front door that produced the event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyType {
    /// API Gateway REST API (payload format 1.0).
    #[default]
    RestApi,
    /// API Gateway HTTP API (payload format 2.0).
    HttpApiV2,
    /// Application Load Balancer target.
    Alb,
}

impl ProxyType {
    /// Normalize a raw event of this type into a [`Request`].
    pub fn normalize(&self, event: Value) -> Result<Request> {
        match self {
            ProxyType::RestApi => rest::normalize(event),
            ProxyType::HttpApiV2 => http_v2::normalize(event),
            ProxyType::Alb => alb::normalize(event),
        }
    }
}

impl std::fmt::Display for ProxyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProxyType::RestApi => write!(f, "API Gateway REST"),
            ProxyType::HttpApiV2 => write!(f, "API Gateway HTTP v2"),
            ProxyType::Alb => write!(f, "ALB"),
        }
    }
}

impl std::str::FromStr for ProxyType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "rest" | "rest_api" | "v1" => Ok(ProxyType::RestApi),
            "http" | "http_api_v2" | "v2" => Ok(ProxyType::HttpApiV2),
            "alb" => Ok(ProxyType::Alb),
            other => Err(format!("unknown proxy type '{}'", other)),
        }
    }
}

/// Build the error for an event that does not fit `proxy_type`.
fn shape_error(proxy_type: ProxyType, err: impl std::fmt::Display) -> ResolverError {
    ResolverError::UnsupportedEventShape {
        proxy_type,
        reason: err.to_string(),
    }
}

fn parse_method(method: &str, path: &str) -> Result<Method> {
    method
        .parse()
        .map_err(|_| ResolverError::UnsupportedMethod {
            method: method.to_string(),
            path: path.to_string(),
        })
}

/// Single-value map as events carry it; `null` values are allowed.
type SingleMap = HashMap<String, Option<String>>;

/// Entries of a single-value map that actually carry a value.
fn present_values(map: Option<SingleMap>) -> impl Iterator<Item = (String, String)> {
    map.unwrap_or_default()
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| (name, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_proxy_type_from_str() {
        assert_eq!("rest".parse::<ProxyType>(), Ok(ProxyType::RestApi));
        assert_eq!("http-api-v2".parse::<ProxyType>(), Ok(ProxyType::HttpApiV2));
        assert_eq!("ALB".parse::<ProxyType>(), Ok(ProxyType::Alb));
        assert!("sqs".parse::<ProxyType>().is_err());
    }

    #[test]
    fn test_proxy_type_serde() {
        let value = serde_json::to_value(ProxyType::HttpApiV2).unwrap();
        assert_eq!(value, json!("http_api_v2"));
    }

    #[test]
    fn test_selected_strategy_is_used() {
        // A REST-shaped event is not accepted as HTTP v2 even though it has
        // everything a REST event needs.
        let event = json!({"httpMethod": "GET", "path": "/hello"});

        assert!(ProxyType::RestApi.normalize(event.clone()).is_ok());
        assert!(matches!(
            ProxyType::HttpApiV2.normalize(event),
            Err(ResolverError::UnsupportedEventShape { proxy_type: ProxyType::HttpApiV2, .. })
        ));
    }

    #[test]
    fn test_present_values_drop_nulls() {
        let map = HashMap::from([
            ("kept".to_string(), Some("1".to_string())),
            ("dropped".to_string(), None),
        ]);

        let values: Vec<_> = present_values(Some(map)).collect();
        assert_eq!(values, vec![("kept".to_string(), "1".to_string())]);
        assert_eq!(present_values(None).count(), 0);
    }
}
