//! # proxy-resolver - event router for serverless HTTP proxies
//!
//! Dispatches API Gateway REST (payload 1.0), API Gateway HTTP API
//! (payload 2.0) and Application Load Balancer target events to registered
//! handlers, and turns handler results into the response envelope each
//! front door expects.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │             Host runtime (one parsed event + context)            │
//! └──────────────────────────────────────────────────────────────────┘
//!                                  │
//!                                  ▼
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                             Resolver                             │
//! │  ┌────────────┐   ┌─────────────┐   ┌─────────┐   ┌───────────┐  │
//! │  │   Event    │──▶│ Route table │──▶│ Handler │──▶│ Response  │  │
//! │  │ normalizer │   │ + templates │   │         │   │  builder  │  │
//! │  └────────────┘   └─────────────┘   └─────────┘   └───────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//!                                  │
//!                                  ▼
//!            {statusCode, headers, body, isBase64Encoded}
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use proxy_resolver::prelude::*;
//! use serde_json::json;
//!
//! async fn hello(_request: Request) -> HandlerResult {
//!     Ok(json!({ "message": "hello" }).into())
//! }
//!
//! #[path_handler]
//! async fn greet(name: String) -> HandlerResult {
//!     Ok(json!({ "message": format!("hello {}", name) }).into())
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ResolverError> {
//!     let mut resolver = Resolver::new(
//!         ResolverConfig::from_env().cors(CorsConfig::default()),
//!     );
//!     resolver
//!         .get("/hello", RouteOptions::new(), hello)?
//!         .get("/hello/<name>", RouteOptions::new().compress(true), GreetHandler)?;
//!
//!     let event = json!({ "httpMethod": "GET", "path": "/hello/lessa" });
//!     let response = resolver
//!         .resolve(event, &InvocationContext::new("demo", "req-1"))
//!         .await;
//!     println!("{}", serde_json::to_string(&response).unwrap_or_default());
//!     Ok(())
//! }
//! ```
//!
//! ## Invocation phases
//!
//! Every `resolve` call goes `Normalizing -> Resolving -> Invoking ->
//! Building -> Done`. Any phase may end in `Failed`, which still produces a
//! response: `404` for unknown paths, `405` with `Allow` for known paths
//! under another method, the handler's status for handler errors and `500`
//! for malformed events or panics.

pub mod error;
pub mod event;
pub mod handler;
pub mod http;
pub mod resolver;
pub mod response;
pub mod routing;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::error::ResolverError;
    pub use crate::event::ProxyType;
    pub use crate::handler::{Handler, HandlerError, HandlerResult, InvocationContext, Reply};
    pub use crate::http::{Body, Method, ProxyResponse, Request, Response, StatusCode};
    pub use crate::resolver::{Resolver, ResolverConfig};
    pub use crate::response::CorsConfig;
    pub use crate::routing::RouteOptions;
    pub use async_trait::async_trait;
    pub use proxy_resolver_macro::path_handler;
}

// Re-export for convenience
pub use async_trait::async_trait;
pub use error::{ResolverError, Result};
pub use event::ProxyType;
pub use handler::{Handler, HandlerError, HandlerResult, InvocationContext, Reply};
pub use http::{ProxyResponse, Request, Response};
pub use proxy_resolver_macro::path_handler;
pub use resolver::{Resolver, ResolverConfig};
pub use response::CorsConfig;
pub use routing::RouteOptions;
