//! Event resolver: normalize, route, invoke, build.

use crate::error::{ResolverError, Result};
use crate::handler::{Handler, HandlerError, InvocationContext, Reply};
use crate::http::{Method, ProxyResponse, Request};
use crate::resolver::ResolverConfig;
use crate::response::{self, CorsConfig, ResponseBuilder};
use crate::routing::{PathParams, Resolution, Route, RouteOptions, RouteTable};
use futures_util::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::{debug, error, info_span, trace, warn, Instrument};

/// Where an invocation currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Normalizing,
    Resolving,
    Invoking,
    Building,
    Done,
    Failed,
}

impl Phase {
    fn advance(&mut self, next: Phase) {
        trace!("{:?} -> {:?}", self, next);
        *self = next;
    }

    /// Phase after the handler returns: a reply moves on to building, a
    /// handler error or panic marks the invocation failed.
    fn after_invoke<T>(outcome: &std::result::Result<T, ResolverError>) -> Phase {
        match outcome {
            Ok(_) => Phase::Building,
            Err(_) => Phase::Failed,
        }
    }
}

/// Routes proxy events to registered handlers.
///
/// Routes are registered at start-up through `&mut self`; [`resolve`]
/// only takes `&self`, so one resolver can serve any number of warm
/// invocations.
///
/// [`resolve`]: Resolver::resolve
#[derive(Debug)]
pub struct Resolver {
    config: ResolverConfig,
    routes: RouteTable,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

impl Resolver {
    /// Create a resolver with no routes.
    pub fn new(config: ResolverConfig) -> Self {
        let routes = if config.strict_routes {
            RouteTable::strict()
        } else {
            RouteTable::new()
        };
        Self { config, routes }
    }

    /// The configuration this resolver was built with.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The registered routes.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Register `handler` for `method` and `path`.
    ///
    /// Fails on a malformed template, or on a duplicate in strict mode.
    pub fn route<H>(
        &mut self,
        method: Method,
        path: &str,
        options: RouteOptions,
        handler: H,
    ) -> Result<&mut Self>
    where
        H: Handler + 'static,
    {
        self.routes
            .register(method, path, options, Box::new(handler))?;
        Ok(self)
    }

    pub fn get<H: Handler + 'static>(
        &mut self,
        path: &str,
        options: RouteOptions,
        handler: H,
    ) -> Result<&mut Self> {
        self.route(Method::Get, path, options, handler)
    }

    pub fn post<H: Handler + 'static>(
        &mut self,
        path: &str,
        options: RouteOptions,
        handler: H,
    ) -> Result<&mut Self> {
        self.route(Method::Post, path, options, handler)
    }

    pub fn put<H: Handler + 'static>(
        &mut self,
        path: &str,
        options: RouteOptions,
        handler: H,
    ) -> Result<&mut Self> {
        self.route(Method::Put, path, options, handler)
    }

    pub fn patch<H: Handler + 'static>(
        &mut self,
        path: &str,
        options: RouteOptions,
        handler: H,
    ) -> Result<&mut Self> {
        self.route(Method::Patch, path, options, handler)
    }

    pub fn delete<H: Handler + 'static>(
        &mut self,
        path: &str,
        options: RouteOptions,
        handler: H,
    ) -> Result<&mut Self> {
        self.route(Method::Delete, path, options, handler)
    }

    pub fn head<H: Handler + 'static>(
        &mut self,
        path: &str,
        options: RouteOptions,
        handler: H,
    ) -> Result<&mut Self> {
        self.route(Method::Head, path, options, handler)
    }

    /// Register an explicit `OPTIONS` handler. It takes precedence over the
    /// automatic CORS preflight for its path.
    pub fn options<H: Handler + 'static>(
        &mut self,
        path: &str,
        options: RouteOptions,
        handler: H,
    ) -> Result<&mut Self> {
        self.route(Method::Options, path, options, handler)
    }

    /// Resolve one proxy event into the response envelope for the
    /// configured front door.
    ///
    /// Never fails: every error becomes a response.
    pub async fn resolve(&self, event: Value, ctx: &InvocationContext) -> ProxyResponse {
        let span = info_span!(
            "resolve",
            request_id = %ctx.request_id,
            proxy_type = %self.config.proxy_type
        );
        self.dispatch(event, ctx).instrument(span).await
    }

    async fn dispatch(&self, event: Value, ctx: &InvocationContext) -> ProxyResponse {
        let mut phase = Phase::Idle;

        phase.advance(Phase::Normalizing);
        let request = match self.config.proxy_type.normalize(event) {
            Ok(request) => request,
            Err(ResolverError::UnsupportedMethod { method, path }) => {
                let allowed = self.routes.allowed_methods(&path, |_| true);
                let err = ResolverError::MethodNotAllowed {
                    method,
                    path,
                    allowed,
                };
                return self.fail(&mut phase, err);
            }
            Err(err) => return self.fail(&mut phase, err),
        };

        phase.advance(Phase::Resolving);
        debug!("Dispatching {} {}", request.method, request.path);

        match self.routes.resolve(request.method, &request.path) {
            Resolution::Matched { route, params } => {
                self.invoke(&mut phase, route, params, request, ctx).await
            }
            Resolution::MethodNotAllowed { allowed } => {
                if request.method == Method::Options {
                    if let Some(response) = self.preflight(&request.path) {
                        phase.advance(Phase::Done);
                        return response;
                    }
                }
                let err = ResolverError::MethodNotAllowed {
                    method: request.method.to_string(),
                    path: request.path,
                    allowed,
                };
                self.fail(&mut phase, err)
            }
            Resolution::NotFound => {
                let err = ResolverError::RouteNotFound {
                    method: request.method.to_string(),
                    path: request.path,
                };
                self.fail(&mut phase, err)
            }
        }
    }

    async fn invoke(
        &self,
        phase: &mut Phase,
        route: &Route,
        params: PathParams,
        mut request: Request,
        ctx: &InvocationContext,
    ) -> ProxyResponse {
        request.path_parameters = params;

        phase.advance(Phase::Invoking);
        let call = route.handler().handle(request.clone(), ctx);
        let outcome: std::result::Result<Reply, ResolverError> =
            match AssertUnwindSafe(call).catch_unwind().await {
                Ok(Ok(reply)) => Ok(reply),
                Ok(Err(err)) => {
                    error!(
                        "Handler for {} {} failed: {}",
                        route.method, route.template, err
                    );
                    Err(err.into())
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    error!(
                        "Handler for {} {} panicked: {}",
                        route.method, route.template, message
                    );
                    Err(HandlerError::new("Internal server error")
                        .with_source(format!("handler panicked: {}", message))
                        .into())
                }
            };

        phase.advance(Phase::after_invoke(&outcome));
        let cors = self.config.cors_for(&route.options);
        let response = response::build(
            outcome,
            &route.options,
            cors.as_deref(),
            &request,
            self.config.debug,
            self.config.proxy_type,
        );

        if *phase == Phase::Building {
            phase.advance(Phase::Done);
        }
        response
    }

    /// Automatic preflight, when some CORS-enabled route serves `path`.
    fn preflight(&self, path: &str) -> Option<ProxyResponse> {
        let methods = self.routes.cors_methods(path, self.config.cors.is_some());
        if methods.is_empty() {
            return None;
        }

        debug!("Answering CORS preflight for {}", path);
        let default_cors = CorsConfig::default();
        let cors = self.config.cors.as_ref().unwrap_or(&default_cors);
        Some(ResponseBuilder::preflight(cors, &methods).finish(self.config.proxy_type))
    }

    /// Error response outside a route: app-level CORS, no route options.
    fn fail(&self, phase: &mut Phase, err: ResolverError) -> ProxyResponse {
        match &err {
            ResolverError::RouteNotFound { .. } | ResolverError::MethodNotAllowed { .. } => {
                debug!("{}", err)
            }
            _ => warn!("Failed to resolve event: {}", err),
        }

        phase.advance(Phase::Failed);
        ResponseBuilder::from_error(&err, self.config.debug)
            .with_cors(self.config.cors.as_ref())
            .finish(self.config.proxy_type)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ProxyType;
    use crate::handler::HandlerResult;
    use serde_json::json;

    async fn hello(_request: Request) -> HandlerResult {
        Ok(json!({"message": "hello"}).into())
    }

    async fn boom(_request: Request) -> HandlerResult {
        panic!("kaboom")
    }

    fn rest_event(method: &str, path: &str) -> Value {
        json!({"httpMethod": method, "path": path})
    }

    #[test]
    fn test_phase_advance() {
        let mut phase = Phase::Idle;
        phase.advance(Phase::Normalizing);
        assert_eq!(phase, Phase::Normalizing);
    }

    #[test]
    fn test_failed_handler_ends_in_failed_phase() {
        let ok: std::result::Result<(), ResolverError> = Ok(());
        let failed: std::result::Result<(), ResolverError> = Err(HandlerError::new("nope").into());

        assert_eq!(Phase::after_invoke(&ok), Phase::Building);
        assert_eq!(Phase::after_invoke(&failed), Phase::Failed);
    }

    #[test]
    fn test_panic_message() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42u8), "unknown panic");
    }

    #[tokio::test]
    async fn test_registration_is_chainable() {
        let mut resolver = Resolver::default();
        resolver
            .get("/a", RouteOptions::new(), hello)
            .unwrap()
            .post("/a", RouteOptions::new(), hello)
            .unwrap();

        assert_eq!(resolver.routes().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_template_rejected() {
        let mut resolver = Resolver::default();
        let err = resolver
            .get("/users/<id>/<id>", RouteOptions::new(), hello)
            .unwrap_err();

        assert!(matches!(err, ResolverError::InvalidTemplate { .. }));
    }

    #[tokio::test]
    async fn test_panicking_handler_becomes_500() {
        let mut resolver = Resolver::default();
        resolver.get("/boom", RouteOptions::new(), boom).unwrap();

        let response = resolver
            .resolve(rest_event("GET", "/boom"), &InvocationContext::default())
            .await;

        assert_eq!(response.status_code, 500);
        let body: Value = response.json_body().unwrap().unwrap();
        assert_eq!(body["message"], "Internal server error");
        assert!(body.get("traceback").is_none());
    }

    #[tokio::test]
    async fn test_panic_traceback_in_debug_mode() {
        let mut resolver = Resolver::new(ResolverConfig::new().debug(true));
        resolver.get("/boom", RouteOptions::new(), boom).unwrap();

        let response = resolver
            .resolve(rest_event("GET", "/boom"), &InvocationContext::default())
            .await;

        assert_eq!(response.status_code, 500);
        let body: Value = response.json_body().unwrap().unwrap();
        assert_eq!(body["message"], "Internal server error");
        let trace = body["traceback"].as_str().unwrap();
        assert!(trace.contains("handler panicked: kaboom"));
    }

    #[tokio::test]
    async fn test_bad_event_shape_is_500() {
        let resolver = Resolver::new(ResolverConfig::new().proxy_type(ProxyType::HttpApiV2));

        let response = resolver
            .resolve(rest_event("GET", "/hello"), &InvocationContext::default())
            .await;

        assert_eq!(response.status_code, 500);
    }

    #[tokio::test]
    async fn test_unknown_method_is_405() {
        let mut resolver = Resolver::default();
        resolver.get("/hello", RouteOptions::new(), hello).unwrap();

        let response = resolver
            .resolve(rest_event("TRACE", "/hello"), &InvocationContext::default())
            .await;

        assert_eq!(response.status_code, 405);
        assert_eq!(response.header("Allow"), Some("GET"));
    }
}
