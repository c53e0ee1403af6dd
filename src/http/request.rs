//! Normalized request handed to route handlers.

use crate::http::MultiValueMap;
use crate::routing::PathParams;
use base64::Engine;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// HTTP method enumeration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl Method {
    /// Canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a method name is not one of the routable methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMethod(pub String);

impl std::fmt::Display for UnknownMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown HTTP method '{}'", self.0)
    }
}

impl std::error::Error for UnknownMethod {}

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "PATCH" => Ok(Method::Patch),
            "HEAD" => Ok(Method::Head),
            "OPTIONS" => Ok(Method::Options),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

/// Identity and correlation metadata taken from the event's `requestContext`.
///
/// Fields a front door does not provide are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Front-door request id, used for log correlation.
    pub request_id: Option<String>,
    /// API stage name.
    pub stage: Option<String>,
    /// Custom or default domain the request arrived on.
    pub domain_name: Option<String>,
    /// Caller IP address.
    pub source_ip: Option<String>,
    /// Caller user agent.
    pub user_agent: Option<String>,
    /// AWS account owning the API.
    pub account_id: Option<String>,
    /// ALB target group that forwarded the request.
    pub target_group_arn: Option<String>,
}

/// Normalized proxy request.
///
/// Built fresh by the event normalizer for every invocation. Handlers get
/// their own copy; nothing they do to it is seen by the resolver.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Request path exactly as the front door reported it.
    pub path: String,
    /// Parameters bound by the matched route template.
    pub path_parameters: PathParams,
    /// Query string parameters.
    pub query: MultiValueMap,
    /// Headers, looked up case-insensitively.
    pub headers: MultiValueMap,
    /// Raw body, still base64 text when `is_base64_encoded` is set.
    pub body: Option<String>,
    /// Whether `body` is base64 text.
    pub is_base64_encoded: bool,
    /// Identity metadata.
    pub context: RequestContext,
    /// The untouched event, for fields the normalizer does not model.
    pub raw_event: Value,
}

impl Request {
    /// Create an empty request for `method` and `path`.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            path_parameters: PathParams::default(),
            query: MultiValueMap::new(),
            headers: MultiValueMap::case_insensitive(),
            body: None,
            is_base64_encoded: false,
            context: RequestContext::default(),
            raw_event: Value::Null,
        }
    }

    /// Add a header to the request.
    pub fn header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.headers.append(key, value);
        self
    }

    /// Set the request body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Get a header value (last one on duplicates).
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Get a query parameter value (last one on duplicates).
    pub fn get_query(&self, name: &str) -> Option<&str> {
        self.query.get(name)
    }

    /// Get a parameter bound by the route template.
    pub fn path_parameter(&self, name: &str) -> Option<&str> {
        self.path_parameters.get(name)
    }

    /// Body bytes with base64 transport encoding removed.
    pub fn decoded_body(&self) -> Result<Option<Bytes>, base64::DecodeError> {
        match &self.body {
            None => Ok(None),
            Some(body) if self.is_base64_encoded => {
                let bytes = base64::engine::general_purpose::STANDARD.decode(body)?;
                Ok(Some(Bytes::from(bytes)))
            }
            Some(body) => Ok(Some(Bytes::from(body.clone()))),
        }
    }

    /// Get the body as text if present.
    pub fn text(&self) -> Option<String> {
        match self.decoded_body() {
            Ok(Some(bytes)) => Some(String::from_utf8_lossy(&bytes).to_string()),
            Ok(None) => None,
            Err(_) => self.body.clone(),
        }
    }

    /// Parse the body as JSON if present.
    pub fn json_body<T: serde::de::DeserializeOwned>(
        &self,
    ) -> Option<Result<T, serde_json::Error>> {
        self.text().map(|text| serde_json::from_str(&text))
    }
}

impl Default for Request {
    fn default() -> Self {
        Self::new(Method::Get, "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_from_str() {
        assert_eq!("GET".parse::<Method>(), Ok(Method::Get));
        assert_eq!("patch".parse::<Method>(), Ok(Method::Patch));
        assert!("CUSTOM".parse::<Method>().is_err());
    }

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Delete.to_string(), "DELETE");
        assert_eq!(Method::Options.to_string(), "OPTIONS");
    }

    #[test]
    fn test_base64_body_is_decoded() {
        let mut request = Request::new(Method::Post, "/upload").body("aGVsbG8=");
        request.is_base64_encoded = true;

        assert_eq!(request.text(), Some("hello".to_string()));
    }

    #[test]
    fn test_json_body() {
        let request = Request::new(Method::Post, "/users").body(r#"{"username": "tom"}"#);
        let body: Value = request.json_body().unwrap().unwrap();

        assert_eq!(body["username"], "tom");
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let request = Request::new(Method::Get, "/").header("X-Api-Key", "secret");

        assert_eq!(request.get_header("x-api-key"), Some("secret"));
    }
}
