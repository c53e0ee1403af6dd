//! Route table.
//!
//! Maps a method and a request path to a registered handler. Routes are
//! tried in registration order and the first one whose template matches
//! wins; there is no specificity ranking.

use crate::error::{ResolverError, Result};
use crate::handler::Handler;
use crate::http::Method;
use crate::routing::{PathParams, RouteTemplate};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Per-route options, fixed at registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteOptions {
    /// `None` inherits the resolver setting (enabled when it has a CORS
    /// config); `Some(_)` overrides it for this route.
    pub cors: Option<bool>,
    /// Gzip the body when the client advertises support.
    pub compress: bool,
    /// `Cache-Control` value for `200` responses; other statuses get
    /// `no-cache`.
    pub cache_control: Option<String>,
}

impl RouteOptions {
    /// Create default route options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable CORS for this route.
    pub fn cors(mut self, enabled: bool) -> Self {
        self.cors = Some(enabled);
        self
    }

    /// Enable compression for this route.
    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Set the `Cache-Control` value for successful responses.
    pub fn cache_control(mut self, value: impl Into<String>) -> Self {
        self.cache_control = Some(value.into());
        self
    }

    /// Whether CORS applies, given whether the resolver has a CORS config.
    pub fn cors_enabled(&self, app_cors: bool) -> bool {
        self.cors.unwrap_or(app_cors)
    }
}

/// A registered route.
pub struct Route {
    /// HTTP method for this route.
    pub method: Method,
    /// Compiled path template.
    pub template: RouteTemplate,
    /// Options fixed at registration.
    pub options: RouteOptions,
    handler: Box<dyn Handler>,
}

impl Route {
    /// Create a new route, compiling its template.
    pub fn new(
        method: Method,
        template: &str,
        options: RouteOptions,
        handler: Box<dyn Handler>,
    ) -> Result<Self> {
        Ok(Self {
            method,
            template: RouteTemplate::compile(template)?,
            options,
            handler,
        })
    }

    /// The route handler.
    pub fn handler(&self) -> &dyn Handler {
        self.handler.as_ref()
    }

    /// Check if this route matches the given method and path.
    pub fn matches(&self, method: Method, path: &str) -> Option<PathParams> {
        if self.method != method {
            return None;
        }
        self.template.matches(path)
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("template", &self.template.as_str())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Outcome of looking up a method and path.
#[derive(Debug)]
pub enum Resolution<'a> {
    /// A route matched; parameters are bound.
    Matched {
        route: &'a Route,
        params: PathParams,
    },
    /// The path matches under other methods only, listed in registration
    /// order without duplicates.
    MethodNotAllowed { allowed: Vec<Method> },
    /// Nothing matches the path.
    NotFound,
}

/// Ordered route table.
///
/// Filled during start-up through `&mut self` and only read afterwards, so
/// a table shared across warm invocations needs no locking.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    strict: bool,
}

impl RouteTable {
    /// Create a new route table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table that rejects a second route with the same method and
    /// template.
    pub fn strict() -> Self {
        Self {
            routes: Vec::new(),
            strict: true,
        }
    }

    /// Add a route to the table.
    pub fn register(
        &mut self,
        method: Method,
        template: &str,
        options: RouteOptions,
        handler: Box<dyn Handler>,
    ) -> Result<()> {
        let route = Route::new(method, template, options, handler)?;

        if self.strict
            && self
                .routes
                .iter()
                .any(|r| r.method == method && r.template == route.template)
        {
            return Err(ResolverError::DuplicateRoute {
                method,
                template: template.to_string(),
            });
        }

        info!("Registered route: {} {}", method, template);
        self.routes.push(route);
        Ok(())
    }

    /// Find the route for the given method and path.
    pub fn resolve(&self, method: Method, path: &str) -> Resolution<'_> {
        if let Some((route, params)) = self
            .routes
            .iter()
            .find_map(|r| r.matches(method, path).map(|params| (r, params)))
        {
            return Resolution::Matched { route, params };
        }

        let allowed = self.allowed_methods(path, |_| true);
        if allowed.is_empty() {
            Resolution::NotFound
        } else {
            Resolution::MethodNotAllowed { allowed }
        }
    }

    /// Methods whose routes match `path` and satisfy `filter`, in
    /// registration order without duplicates.
    pub fn allowed_methods<F>(&self, path: &str, filter: F) -> Vec<Method>
    where
        F: Fn(&Route) -> bool,
    {
        let mut methods = Vec::new();
        for route in &self.routes {
            if !methods.contains(&route.method)
                && filter(route)
                && route.template.matches(path).is_some()
            {
                methods.push(route.method);
            }
        }
        methods
    }

    /// Methods of CORS-enabled routes matching `path`, sorted by name, used
    /// to answer preflight requests.
    pub fn cors_methods(&self, path: &str, app_cors: bool) -> Vec<Method> {
        let mut methods =
            self.allowed_methods(path, |route| route.options.cors_enabled(app_cors));
        methods.sort_by_key(|method| method.as_str());
        methods
    }

    /// List all routes.
    pub fn list(&self) -> &[Route] {
        &self.routes
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
