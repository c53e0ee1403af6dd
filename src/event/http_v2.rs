//! API Gateway HTTP API events (payload format 2.0).
//!
//! Format 2.0 has no multi-value maps: repeated headers arrive comma-joined,
//! cookies arrive in their own array and the query string is available
//! verbatim as `rawQueryString`.

use super::{parse_method, present_values, shape_error, ProxyType, SingleMap};
use crate::error::Result;
use crate::http::{MultiValueMap, Request, RequestContext};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HttpApiEvent {
    request_context: HttpRequestContext,
    #[serde(default)]
    raw_query_string: Option<String>,
    #[serde(default)]
    cookies: Option<Vec<String>>,
    #[serde(default)]
    headers: Option<SingleMap>,
    #[serde(default)]
    query_string_parameters: Option<SingleMap>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    is_base64_encoded: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HttpRequestContext {
    http: HttpDescription,
    request_id: Option<String>,
    stage: Option<String>,
    domain_name: Option<String>,
    account_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HttpDescription {
    method: String,
    path: String,
    source_ip: Option<String>,
    user_agent: Option<String>,
}

pub(super) fn normalize(event: Value) -> Result<Request> {
    let parsed =
        HttpApiEvent::deserialize(&event).map_err(|e| shape_error(ProxyType::HttpApiV2, e))?;
    let ctx = parsed.request_context;
    let method = parse_method(&ctx.http.method, &ctx.http.path)?;

    let mut request = Request::new(method, ctx.http.path);

    let mut headers = MultiValueMap::case_insensitive();
    for (name, value) in present_values(parsed.headers) {
        headers.append(&name, value);
    }
    if let Some(cookies) = parsed.cookies.filter(|c| !c.is_empty()) {
        headers.insert("cookie", cookies.join("; "));
    }
    request.headers = headers;

    request.query = match parsed.raw_query_string.as_deref() {
        Some(raw) if !raw.is_empty() => parse_query_string(raw),
        _ => split_joined_params(parsed.query_string_parameters),
    };

    request.body = parsed.body;
    request.is_base64_encoded = parsed.is_base64_encoded;
    request.context = RequestContext {
        request_id: ctx.request_id,
        stage: ctx.stage,
        domain_name: ctx.domain_name,
        source_ip: ctx.http.source_ip,
        user_agent: ctx.http.user_agent,
        account_id: ctx.account_id,
        target_group_arn: None,
    };
    request.raw_event = event;
    Ok(request)
}

fn parse_query_string(raw: &str) -> MultiValueMap {
    let mut query = MultiValueMap::new();
    for (name, value) in url::form_urlencoded::parse(raw.as_bytes()) {
        query.append(&name, value.into_owned());
    }
    query
}

/// Fallback for events without `rawQueryString`: repeated parameters are
/// comma-joined in `queryStringParameters`.
fn split_joined_params(params: Option<SingleMap>) -> MultiValueMap {
    let mut query = MultiValueMap::new();
    for (name, joined) in present_values(params) {
        for value in joined.split(',') {
            query.append(&name, value);
        }
    }
    query
}
