//! Resolver error types.

use crate::event::ProxyType;
use crate::handler::HandlerError;
use crate::http::{Method, StatusCode};
use thiserror::Error;

/// Result type for resolver operations.
pub type Result<T> = std::result::Result<T, ResolverError>;

/// Errors raised while registering routes or resolving an event.
///
/// Only the registration-time variants (`InvalidTemplate`, `DuplicateRoute`)
/// ever reach the caller; everything else is turned into a response by the
/// resolver.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// A route template could not be compiled.
    #[error("invalid route template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    /// Strict mode rejected a second route with the same method and template.
    #[error("route {method} {template} is already registered")]
    DuplicateRoute { method: Method, template: String },

    /// The event lacks fields required by the configured proxy type.
    #[error("unsupported {proxy_type} event: {reason}")]
    UnsupportedEventShape { proxy_type: ProxyType, reason: String },

    /// The event carries a method no route can be registered for.
    #[error("unsupported HTTP method '{method}' for {path}")]
    UnsupportedMethod { method: String, path: String },

    /// No route matches the path under any method.
    #[error("no route for {method} {path}")]
    RouteNotFound { method: String, path: String },

    /// The path matches, but only under other methods.
    #[error("method {method} not allowed for {path}")]
    MethodNotAllowed {
        method: String,
        path: String,
        allowed: Vec<Method>,
    },

    /// The handler failed.
    #[error(transparent)]
    Handler(#[from] HandlerError),
}

impl ResolverError {
    /// HTTP status used when this error becomes a response.
    pub fn status(&self) -> StatusCode {
        match self {
            ResolverError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            ResolverError::MethodNotAllowed { .. } | ResolverError::UnsupportedMethod { .. } => {
                StatusCode::METHOD_NOT_ALLOWED
            }
            ResolverError::Handler(err) => StatusCode(err.code),
            ResolverError::InvalidTemplate { .. }
            | ResolverError::DuplicateRoute { .. }
            | ResolverError::UnsupportedEventShape { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the JSON error body.
    ///
    /// Client errors use a fixed phrase so the response never echoes
    /// internals; handler errors keep the handler's own message.
    pub fn public_message(&self) -> String {
        match self {
            ResolverError::RouteNotFound { .. } => "Not found".to_string(),
            ResolverError::MethodNotAllowed { .. } | ResolverError::UnsupportedMethod { .. } => {
                "Method not allowed".to_string()
            }
            ResolverError::Handler(err) => err.message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let not_found = ResolverError::RouteNotFound {
            method: "GET".to_string(),
            path: "/missing".to_string(),
        };
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.public_message(), "Not found");

        let not_allowed = ResolverError::MethodNotAllowed {
            method: "POST".to_string(),
            path: "/hello".to_string(),
            allowed: vec![Method::Get],
        };
        assert_eq!(not_allowed.status(), StatusCode::METHOD_NOT_ALLOWED);

        let shape = ResolverError::UnsupportedEventShape {
            proxy_type: ProxyType::HttpApiV2,
            reason: "missing field `requestContext`".to_string(),
        };
        assert_eq!(shape.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(shape.to_string().contains("requestContext"));
    }

    #[test]
    fn test_handler_error_keeps_code() {
        let err: ResolverError = HandlerError::with_code(418, "teapot").into();

        assert_eq!(err.status(), StatusCode(418));
        assert_eq!(err.public_message(), "teapot");
    }
}
