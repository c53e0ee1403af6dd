//! Application Load Balancer target events.
//!
//! ALB uses the v1 field names. Depending on the target group's
//! multi-value setting an event carries either the single-value maps or the
//! multi-value ones, never both. Query values are passed through exactly as
//! ALB delivers them.

use super::{v1, ProxyType};
use crate::error::Result;
use crate::http::{MultiValueMap, Request, RequestContext};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
struct AlbRequestContext {
    #[serde(default)]
    elb: Option<ElbContext>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ElbContext {
    target_group_arn: Option<String>,
}

pub(super) fn normalize(event: Value) -> Result<Request> {
    v1::normalize(
        ProxyType::Alb,
        event,
        |ctx: AlbRequestContext, headers: &MultiValueMap| RequestContext {
            source_ip: headers.get("x-forwarded-for").map(str::to_string),
            user_agent: headers.get("user-agent").map(str::to_string),
            target_group_arn: ctx.elb.unwrap_or_default().target_group_arn,
            ..RequestContext::default()
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolverError;
    use crate::http::Method;
    use serde_json::json;

    fn alb_event() -> Value {
        json!({
            "requestContext": {
                "elb": {
                    "targetGroupArn": "arn:aws:elasticloadbalancing:us-east-2:123456789012:targetgroup/lambda-279XGJDqGZ5rsrHC2Fjr/49e9d65c45c6791a"
                }
            },
            "httpMethod": "GET",
            "path": "/lambda",
            "queryStringParameters": {"query": "1234ABCD"},
            "headers": {
                "accept": "text/html",
                "user-agent": "Mozilla/5.0",
                "x-forwarded-for": "72.12.164.125"
            },
            "body": "",
            "isBase64Encoded": false
        })
    }

    #[test]
    fn test_normalize_alb_event() {
        let request = normalize(alb_event()).unwrap();

        assert_eq!(request.method, Method::Get);
        assert_eq!(request.path, "/lambda");
        assert_eq!(request.get_query("query"), Some("1234ABCD"));
        assert_eq!(request.get_header("Accept"), Some("text/html"));
        assert_eq!(request.context.source_ip.as_deref(), Some("72.12.164.125"));
        assert!(request
            .context
            .target_group_arn
            .as_deref()
            .is_some_and(|arn| arn.contains("targetgroup/lambda")));
        assert!(request.context.request_id.is_none());
    }

    #[test]
    fn test_multi_value_alb_event() {
        let mut event = alb_event();
        event.as_object_mut().unwrap().remove("headers");
        event.as_object_mut().unwrap().remove("queryStringParameters");
        event["multiValueHeaders"] = json!({"Cookie": ["a=1", "b=2"]});
        event["multiValueQueryStringParameters"] = json!({"tag": ["x", "y"]});

        let request = normalize(event).unwrap();
        assert_eq!(request.headers.get_all("cookie").len(), 2);
        assert_eq!(request.get_query("tag"), Some("y"));
    }

    #[test]
    fn test_missing_path() {
        let err = normalize(json!({"httpMethod": "GET"})).unwrap_err();

        assert!(matches!(
            err,
            ResolverError::UnsupportedEventShape { proxy_type: ProxyType::Alb, .. }
        ));
    }

    #[test]
    fn test_null_multi_values_are_skipped() {
        let request = normalize(json!({
            "httpMethod": "GET",
            "path": "/lambda",
            "multiValueHeaders": {"accept": ["text/html"], "x-empty": null},
            "multiValueQueryStringParameters": {"tag": [null, "x"], "none": null}
        }))
        .unwrap();

        assert_eq!(request.get_header("accept"), Some("text/html"));
        assert!(request.get_header("x-empty").is_none());
        assert_eq!(request.query.get_all("tag"), ["x".to_string()]);
        assert!(request.get_query("none").is_none());
    }
}
