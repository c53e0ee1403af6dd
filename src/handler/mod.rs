//! Route handler trait and the values handlers return.

mod context;
mod error;

pub use context::InvocationContext;
pub use error::HandlerError;

use crate::http::{Request, Response};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;

/// What a handler produced.
#[derive(Debug, Clone)]
pub enum Reply {
    /// A plain value, serialized as a `200 application/json` response.
    Json(Value),
    /// A fully specified response, used as-is.
    Response(Response),
}

impl Reply {
    /// Serialize `data` into a JSON reply.
    pub fn json<T: Serialize>(data: &T) -> Result<Self, HandlerError> {
        let value = serde_json::to_value(data).map_err(HandlerError::internal)?;
        Ok(Reply::Json(value))
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Reply::Json(value)
    }
}

impl From<Response> for Reply {
    fn from(response: Response) -> Self {
        Reply::Response(response)
    }
}

/// Result returned by every handler.
pub type HandlerResult = Result<Reply, HandlerError>;

/// A route handler.
///
/// Implemented directly for stateful handlers, and blanket-implemented for
/// any `Fn(Request) -> impl Future<Output = HandlerResult>`, so plain
/// `async fn hello(req: Request) -> HandlerResult` can be registered.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Handle one request. Path parameters are already bound on `request`.
    async fn handle(&self, request: Request, ctx: &InvocationContext) -> HandlerResult;
}

#[async_trait]
impl<F, Fut> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send,
{
    async fn handle(&self, request: Request, _ctx: &InvocationContext) -> HandlerResult {
        (self)(request).await
    }
}
