//! Payload format 1.0, shared by REST APIs and ALB targets.
//!
//! Both front doors use the same top-level fields and differ only in their
//! `requestContext`, which each caller extracts with its own step.

use super::{parse_method, present_values, shape_error, ProxyType, SingleMap};
use crate::error::Result;
use crate::http::{MultiValueMap, Request, RequestContext};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Multi-value view; a `null` list or a `null` entry carries no value.
type MultiMap = HashMap<String, Option<Vec<Option<String>>>>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct V1Event<C> {
    http_method: String,
    path: String,
    #[serde(default)]
    headers: Option<SingleMap>,
    #[serde(default)]
    multi_value_headers: Option<MultiMap>,
    #[serde(default)]
    query_string_parameters: Option<SingleMap>,
    #[serde(default)]
    multi_value_query_string_parameters: Option<MultiMap>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    is_base64_encoded: bool,
    #[serde(default)]
    request_context: Option<C>,
}

/// Normalize a format 1.0 event. `context` turns the front door's own
/// `requestContext` (and the already merged headers) into a
/// [`RequestContext`].
pub(super) fn normalize<C, F>(proxy_type: ProxyType, event: Value, context: F) -> Result<Request>
where
    C: DeserializeOwned + Default,
    F: FnOnce(C, &MultiValueMap) -> RequestContext,
{
    let parsed = V1Event::<C>::deserialize(&event).map_err(|e| shape_error(proxy_type, e))?;
    let method = parse_method(&parsed.http_method, &parsed.path)?;

    let mut request = Request::new(method, parsed.path);
    request.headers = merge_views(
        MultiValueMap::case_insensitive(),
        parsed.headers,
        parsed.multi_value_headers,
    );
    request.query = merge_views(
        MultiValueMap::new(),
        parsed.query_string_parameters,
        parsed.multi_value_query_string_parameters,
    );
    request.body = parsed.body;
    request.is_base64_encoded = parsed.is_base64_encoded;
    request.context = context(parsed.request_context.unwrap_or_default(), &request.headers);
    request.raw_event = event;
    Ok(request)
}

/// Merge the single- and multi-value views.
///
/// The multi-value view is authoritative; single values only fill in names
/// it does not have.
fn merge_views(
    mut target: MultiValueMap,
    single: Option<SingleMap>,
    multi: Option<MultiMap>,
) -> MultiValueMap {
    for (name, values) in multi.unwrap_or_default() {
        for value in values.unwrap_or_default().into_iter().flatten() {
            target.append(&name, value);
        }
    }
    for (name, value) in present_values(single) {
        target.insert_missing(&name, vec![value]);
    }
    target
}
