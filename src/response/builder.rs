//! Turns handler results into proxy response envelopes.

use super::cors::CorsConfig;
use super::encoding::{accepts_gzip, encode_base64, gzip};
use crate::error::ResolverError;
use crate::event::ProxyType;
use crate::handler::{HandlerError, Reply};
use crate::http::{Body, Method, ProxyResponse, Request, Response, StatusCode};
use crate::routing::RouteOptions;
use serde_json::json;
use std::collections::HashMap;
use tracing::warn;

/// Step-by-step response assembly.
///
/// Each `with_*` step is a no-op when it does not apply, so the resolver can
/// chain all of them unconditionally.
#[derive(Debug)]
pub struct ResponseBuilder {
    response: Response,
}

impl ResponseBuilder {
    pub fn new(response: Response) -> Self {
        Self { response }
    }

    /// Typed responses are used as-is; plain values become compact JSON.
    pub fn from_reply(reply: Reply) -> Self {
        match reply {
            Reply::Response(response) => Self::new(response),
            Reply::Json(value) => match serde_json::to_string(&value) {
                Ok(body) => Self::new(
                    Response::new(StatusCode::OK)
                        .content_type("application/json")
                        .body(body),
                ),
                Err(e) => Self::from_error(&HandlerError::internal(e).into(), false),
            },
        }
    }

    /// JSON error body `{"message": ...}`, with a `traceback` in debug mode.
    ///
    /// `405` responses also get an `Allow` header.
    pub fn from_error(err: &ResolverError, debug: bool) -> Self {
        let mut body = json!({ "message": err.public_message() });
        if debug {
            let trace = match err {
                ResolverError::Handler(handler_err) => handler_err.trace(),
                other => other.to_string(),
            };
            body["traceback"] = json!(trace);
        }

        let mut response = Response::new(err.status())
            .content_type("application/json")
            .body(body.to_string());

        if let ResolverError::MethodNotAllowed { allowed, .. } = err {
            let allow = allowed
                .iter()
                .map(Method::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            response = response.header("Allow", allow);
        }

        Self::new(response)
    }

    /// Bodiless `204` answering a CORS preflight.
    pub fn preflight(cors: &CorsConfig, methods: &[Method]) -> Self {
        let mut response = Response::new(StatusCode::NO_CONTENT);
        for (name, value) in cors.preflight_headers(methods) {
            set_header(&mut response.headers, name, value);
        }
        Self::new(response)
    }

    pub fn with_cors(mut self, cors: Option<&CorsConfig>) -> Self {
        if let Some(cors) = cors {
            for (name, value) in cors.headers() {
                set_header(&mut self.response.headers, name, value);
            }
        }
        self
    }

    /// `value` on a `200`, `no-cache` on anything else.
    pub fn with_cache_control(mut self, value: Option<&str>) -> Self {
        if let Some(value) = value {
            let value = if self.response.status == StatusCode::OK {
                value
            } else {
                "no-cache"
            };
            set_header(&mut self.response.headers, "Cache-Control".to_string(), value.to_string());
        }
        self
    }

    /// Gzip the body when the client accepts it.
    ///
    /// Bodies that are empty or already carry a `Content-Encoding` are left
    /// alone. A compression failure keeps the uncompressed body.
    pub fn with_compression(mut self, request: &Request) -> Self {
        let accepted = request
            .get_header("accept-encoding")
            .is_some_and(accepts_gzip);
        if !accepted
            || self.response.body.is_empty()
            || self.response.get_header("content-encoding").is_some()
        {
            return self;
        }

        match gzip(self.response.body.as_bytes()) {
            Ok(compressed) => {
                self.response.body = Body::from(compressed);
                set_header(
                    &mut self.response.headers,
                    "Content-Encoding".to_string(),
                    "gzip".to_string(),
                );
            }
            Err(e) => warn!("Compression failed, sending uncompressed body: {}", e),
        }
        self
    }

    /// Borrow the response assembled so far.
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Produce the envelope for `proxy_type`. Binary bodies are base64-encoded.
    pub fn finish(self, proxy_type: ProxyType) -> ProxyResponse {
        let Response {
            status,
            content_type,
            mut headers,
            body,
        } = self.response;

        let (body, is_base64_encoded) = match body {
            body if body.is_empty() => (None, false),
            Body::Binary(bytes) => (Some(encode_base64(&bytes)), true),
            Body::Text(text) => (Some(text), false),
            Body::Empty => (None, false),
        };

        if body.is_some() {
            let has_content_type = headers
                .keys()
                .any(|name| name.eq_ignore_ascii_case("content-type"));
            if let Some(content_type) = content_type.filter(|_| !has_content_type) {
                headers.insert("Content-Type".to_string(), content_type);
            }
        }

        let status_description = match proxy_type {
            ProxyType::Alb => Some(match status.reason_phrase() {
                Some(phrase) => format!("{} {}", status.0, phrase),
                None => status.0.to_string(),
            }),
            ProxyType::RestApi | ProxyType::HttpApiV2 => None,
        };

        ProxyResponse {
            status_code: status.0,
            status_description,
            headers,
            body,
            is_base64_encoded,
        }
    }
}

/// Run the full pipeline for one handler outcome.
///
/// `cors` is the configuration that applies to this route, or `None` when
/// the route has CORS disabled.
pub fn build(
    outcome: Result<Reply, ResolverError>,
    options: &RouteOptions,
    cors: Option<&CorsConfig>,
    request: &Request,
    debug: bool,
    proxy_type: ProxyType,
) -> ProxyResponse {
    let builder = match outcome {
        Ok(reply) => ResponseBuilder::from_reply(reply),
        Err(err) => ResponseBuilder::from_error(&err, debug),
    };

    let mut builder = builder
        .with_cors(cors)
        .with_cache_control(options.cache_control.as_deref());
    if options.compress {
        builder = builder.with_compression(request);
    }
    builder.finish(proxy_type)
}

/// Insert a header, replacing any existing entry that differs only in case.
fn set_header(headers: &mut HashMap<String, String>, name: String, value: String) {
    headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
    headers.insert(name, value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn ok_json(text: &str) -> Result<Reply, ResolverError> {
        Ok(Reply::Json(serde_json::from_str(text).unwrap()))
    }

    #[test]
    fn test_plain_value_becomes_compact_json() {
        let out = build(
            ok_json(r#"{"amount": 1.1, "name": "x"}"#),
            &RouteOptions::default(),
            None,
            &Request::default(),
            false,
            ProxyType::RestApi,
        );

        assert_eq!(out.status_code, 200);
        assert_eq!(out.header("Content-Type"), Some("application/json"));
        assert_eq!(out.body.as_deref(), Some(r#"{"amount":1.1,"name":"x"}"#));
        assert!(!out.is_base64_encoded);
    }

    #[test]
    fn test_handler_error_body() {
        let err: ResolverError = HandlerError::with_code(418, "I'm a teapot").into();
        let out = ResponseBuilder::from_error(&err, false).finish(ProxyType::RestApi);

        assert_eq!(out.status_code, 418);
        let body: serde_json::Value = out.json_body().unwrap().unwrap();
        assert_eq!(body["message"], "I'm a teapot");
        assert!(body.get("traceback").is_none());
    }

    #[test]
    fn test_debug_error_has_traceback() {
        let err: ResolverError = HandlerError::new("boom")
            .with_source(std::io::Error::new(std::io::ErrorKind::Other, "disk"))
            .into();
        let out = ResponseBuilder::from_error(&err, true).finish(ProxyType::RestApi);

        assert_eq!(out.status_code, 500);
        let body: serde_json::Value = out.json_body().unwrap().unwrap();
        let trace = body["traceback"].as_str().unwrap();
        assert!(trace.contains("boom"));
        assert!(trace.contains("disk"));
    }

    #[test]
    fn test_method_not_allowed_sets_allow() {
        let err = ResolverError::MethodNotAllowed {
            method: "POST".to_string(),
            path: "/hello".to_string(),
            allowed: vec![Method::Get, Method::Put],
        };
        let out = ResponseBuilder::from_error(&err, false).finish(ProxyType::RestApi);

        assert_eq!(out.status_code, 405);
        assert_eq!(out.header("Allow"), Some("GET, PUT"));
    }

    #[test]
    fn test_header_content_type_wins() {
        let response = Response::text("<p>hi</p>").header("content-type", "text/html");
        let out = ResponseBuilder::new(response).finish(ProxyType::RestApi);

        assert_eq!(out.headers.len(), 1);
        assert_eq!(out.header("Content-Type"), Some("text/html"));
    }

    #[test]
    fn test_empty_body_is_null_without_content_type() {
        let response = Response::new(StatusCode::NO_CONTENT).content_type("application/json");
        let out = ResponseBuilder::new(response).finish(ProxyType::RestApi);

        assert!(out.body.is_none());
        assert!(out.header("Content-Type").is_none());
    }

    #[test]
    fn test_binary_body_is_base64() {
        let response = Response::binary("image/png", vec![0x89u8, b'P', b'N', b'G']);
        let out = ResponseBuilder::new(response).finish(ProxyType::RestApi);

        assert!(out.is_base64_encoded);
        assert_eq!(out.body.as_deref(), Some("iVBORw=="));
        assert_eq!(out.header("Content-Type"), Some("image/png"));
    }

    #[test]
    fn test_compression_requires_accept_encoding() {
        let options = RouteOptions::new().compress(true);
        let plain = build(
            ok_json(r#"{"test": "value"}"#),
            &options,
            None,
            &Request::default(),
            false,
            ProxyType::RestApi,
        );
        assert!(!plain.is_base64_encoded);
        assert!(plain.header("Content-Encoding").is_none());

        let request = Request::default().header("Accept-Encoding", "gzip, deflate");
        let out = build(
            ok_json(r#"{"test": "value"}"#),
            &options,
            None,
            &request,
            false,
            ProxyType::RestApi,
        );
        assert!(out.is_base64_encoded);
        assert_eq!(out.header("Content-Encoding"), Some("gzip"));

        let compressed = base64::engine::general_purpose::STANDARD
            .decode(out.body.unwrap())
            .unwrap();
        let mut text = String::new();
        GzDecoder::new(compressed.as_slice())
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, r#"{"test":"value"}"#);
    }

    #[test]
    fn test_cache_control_depends_on_status() {
        let options = RouteOptions::new().cache_control("max-age=600");

        let ok = build(
            ok_json("{}"),
            &options,
            None,
            &Request::default(),
            false,
            ProxyType::RestApi,
        );
        assert_eq!(ok.header("Cache-Control"), Some("max-age=600"));

        let failed = build(
            Err(HandlerError::new("nope").into()),
            &options,
            None,
            &Request::default(),
            false,
            ProxyType::RestApi,
        );
        assert_eq!(failed.header("Cache-Control"), Some("no-cache"));
    }

    #[test]
    fn test_preflight_response() {
        let out = ResponseBuilder::preflight(&CorsConfig::default(), &[Method::Get])
            .finish(ProxyType::HttpApiV2);

        assert_eq!(out.status_code, 204);
        assert!(out.body.is_none());
        assert!(out.header("Content-Type").is_none());
        assert_eq!(out.header("Access-Control-Allow-Methods"), Some("GET,OPTIONS"));
        assert_eq!(out.header("Access-Control-Allow-Origin"), Some("*"));
    }

    #[test]
    fn test_alb_status_description() {
        let out = ResponseBuilder::new(Response::text("ok")).finish(ProxyType::Alb);
        assert_eq!(out.status_description.as_deref(), Some("200 OK"));

        let odd = ResponseBuilder::new(Response::new(299u16)).finish(ProxyType::Alb);
        assert_eq!(odd.status_description.as_deref(), Some("299"));
    }
}
