//! API Gateway REST API events (payload format 1.0).

use super::{v1, ProxyType};
use crate::error::Result;
use crate::http::{Request, RequestContext};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestRequestContext {
    request_id: Option<String>,
    stage: Option<String>,
    domain_name: Option<String>,
    account_id: Option<String>,
    #[serde(default)]
    identity: Option<Identity>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Identity {
    source_ip: Option<String>,
    user_agent: Option<String>,
}

pub(super) fn normalize(event: Value) -> Result<Request> {
    v1::normalize(ProxyType::RestApi, event, |ctx: RestRequestContext, _| {
        let identity = ctx.identity.unwrap_or_default();
        RequestContext {
            request_id: ctx.request_id,
            stage: ctx.stage,
            domain_name: ctx.domain_name,
            source_ip: identity.source_ip,
            user_agent: identity.user_agent,
            account_id: ctx.account_id,
            target_group_arn: None,
        }
    })
}
