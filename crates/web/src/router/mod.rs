pub mod filter;

use crate::error::RouteError;
use crate::handler::RequestHandler;
use crate::schema::{RouteSchema, Validator};
use crate::PathParams;

use filter::{AllFilter, Filter, MethodFilter};
use http::Method;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

type InnerRouter<T> = matchit::Router<T>;

/// Everything needed to declare one route.
///
/// `url` is a template whose `:name` segments are path parameters, e.g. `/books/:id`.
/// `config` holds extra route properties; handlers read them back through
/// [`RequestContext::route_config`](crate::RequestContext::route_config).
pub struct RouteOptions {
    pub method: Method,
    pub url: String,
    pub schema: Option<RouteSchema>,
    pub config: Map<String, Value>,
    pub handler: Box<dyn RequestHandler>,
}

impl RouteOptions {
    pub fn new<H: RequestHandler + 'static>(method: Method, url: impl Into<String>, handler: H) -> Self {
        Self { method, url: url.into(), schema: None, config: Map::new(), handler: Box::new(handler) }
    }

    #[must_use]
    pub fn with_schema(mut self, schema: RouteSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: Map<String, Value>) -> Self {
        self.config = config;
        self
    }
}

impl fmt::Debug for RouteOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteOptions")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("schema", &self.schema)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Main router structure that handles HTTP request routing
pub struct Router {
    inner_router: InnerRouter<Vec<RouterItem>>,
    declared: HashSet<(Method, String)>,
}

/// A router item containing a filter, the request validator and the handler
pub struct RouterItem {
    filter: AllFilter,
    validator: Validator,
    config: Arc<Map<String, Value>>,
    handler: Box<dyn RequestHandler>,
}

/// Result of matching a route, containing matched items and path parameters
pub struct RouteResult<'router> {
    router_items: &'router [RouterItem],
    params: PathParams,
}

impl Router {
    /// Creates a new, empty router builder
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Matches a path against the router's routes
    ///
    /// Returns a `RouteResult` containing matched handlers and path parameters
    ///
    /// # Arguments
    /// * `path` - The path to match against
    pub fn at(&self, path: &str) -> RouteResult<'_> {
        self.inner_router
            .at(path)
            .map(|matched| RouteResult { router_items: matched.value.as_slice(), params: matched.params.into() })
            .unwrap_or_else(|e| {
                debug!("match '{}' error: {}", path, e);
                RouteResult::empty()
            })
    }

    /// Returns true when a route was declared for this method and url template
    pub fn has_route(&self, method: &Method, url: &str) -> bool {
        self.declared.contains(&(method.clone(), url.to_owned()))
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router").field("declared", &self.declared).finish_non_exhaustive()
    }
}

impl RouterItem {
    /// Gets the filter for this router item
    pub fn filter(&self) -> &dyn Filter {
        &self.filter
    }

    /// Gets the request handler for this router item
    pub fn handler(&self) -> &dyn RequestHandler {
        self.handler.as_ref()
    }

    pub(crate) fn validator(&self) -> &Validator {
        &self.validator
    }

    pub(crate) fn config(&self) -> &Arc<Map<String, Value>> {
        &self.config
    }
}

impl fmt::Debug for RouterItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterItem").field("validator", &self.validator).field("config", &self.config).finish_non_exhaustive()
    }
}

impl<'router> RouteResult<'router> {
    fn empty() -> Self {
        Self { router_items: &[], params: PathParams::empty() }
    }

    /// Returns true if no routes were matched
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.router_items.is_empty()
    }

    /// Gets the path parameters from the matched route
    pub fn params(&self) -> &PathParams {
        &self.params
    }

    /// Splits the result into the matched router items and the path parameters
    pub fn into_parts(self) -> (&'router [RouterItem], PathParams) {
        (self.router_items, self.params)
    }
}

pub struct RouterBuilder {
    data: HashMap<String, Vec<RouterItem>>,
    declared: HashSet<(Method, String)>,
}

impl RouterBuilder {
    fn new() -> Self {
        Self { data: HashMap::new(), declared: HashSet::new() }
    }

    /// Declares a route.
    ///
    /// Fails when the url does not start with `/`, when the same method and url were
    /// already declared, or when one of the route's schemas does not compile.
    pub fn route(&mut self, options: RouteOptions) -> Result<&mut Self, RouteError> {
        let RouteOptions { method, url, schema, config, handler } = options;

        if !url.starts_with('/') {
            return Err(RouteError::invalid_url(url));
        }
        if self.declared.contains(&(method.clone(), url.clone())) {
            return Err(RouteError::duplicate(method, url));
        }

        let validator = Validator::compile(&schema.unwrap_or_default())
            .map_err(|(location, reason)| RouteError::invalid_schema(method.clone(), &url, location, reason))?;

        let mut filter = filter::all_filter();
        filter.and(MethodFilter::new(method.clone()));

        debug!(%method, url = %url, "route declared");
        self.data.entry(to_matchit_path(&url)).or_default().push(RouterItem {
            filter,
            validator,
            config: Arc::new(config),
            handler,
        });
        self.declared.insert((method, url));
        Ok(self)
    }

    /// Returns true when a route was declared for this method and url template
    pub fn has_route(&self, method: &Method, url: &str) -> bool {
        self.declared.contains(&(method.clone(), url.to_owned()))
    }

    /// Builds the router from the accumulated routes
    pub fn build(self) -> Result<Router, RouteError> {
        let mut inner_router = InnerRouter::new();

        for (path, router_items) in self.data {
            inner_router.insert(path.as_str(), router_items).map_err(|e| {
                error!(path = %path, cause = %e, "failed to insert route");
                RouteError::from(e)
            })?;
        }

        Ok(Router { inner_router, declared: self.declared })
    }
}

impl fmt::Debug for RouterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterBuilder").field("declared", &self.declared).finish_non_exhaustive()
    }
}

/// Translates a `:name` style template into matchit's `{name}` syntax.
fn to_matchit_path(url: &str) -> String {
    url.split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) if !name.is_empty() => format!("{{{name}}}"),
            _ => segment.replace('{', "{{").replace('}', "}}"),
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::filter::Filter;
    use super::{to_matchit_path, RouteOptions, Router};
    use crate::error::{HandlerError, RouteError};
    use crate::reply::Reply;
    use crate::{handler_fn, PathParams, RequestContext};
    use http::{Method, Request};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn route(method: Method, url: &str) -> RouteOptions {
        RouteOptions::new(method, url, handler_fn(|_req: RequestContext, _body: Option<Value>| async { Ok::<_, HandlerError>(Reply::new()) }))
    }

    fn request_context(method: Method) -> RequestContext {
        let (parts, ()) = Request::builder().method(method).uri("/").body(()).unwrap().into_parts();
        RequestContext::new(Arc::new(parts), PathParams::empty())
    }

    fn router() -> Router {
        let mut builder = Router::builder();
        builder
            .route(route(Method::POST, "/books"))
            .unwrap()
            .route(route(Method::GET, "/books/:id"))
            .unwrap()
            .route(route(Method::DELETE, "/books/:id"))
            .unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_matchit_path() {
        assert_eq!(to_matchit_path("/books"), "/books");
        assert_eq!(to_matchit_path("/books/:id"), "/books/{id}");
        assert_eq!(to_matchit_path("/a/:b/c/:d"), "/a/{b}/c/{d}");
        assert_eq!(to_matchit_path("/"), "/");
    }

    #[test]
    fn test_route_with_params() {
        let router = router();
        let route_result = router.at("/books/123");

        assert_eq!(route_result.params().get_str("id"), Some("123"));

        let (items, _params) = route_result.into_parts();
        assert_eq!(items.len(), 2);

        let ctx = request_context(Method::DELETE);
        assert!(!items[0].filter().matches(&ctx));
        assert!(items[1].filter().matches(&ctx));
    }

    #[test]
    fn test_route_not_matched() {
        let router = router();

        assert!(router.at("/authors").is_empty());
        assert!(router.at("/books/1/extra").is_empty());
    }

    #[test]
    fn test_has_route() {
        let router = router();

        assert!(router.has_route(&Method::POST, "/books"));
        assert!(router.has_route(&Method::GET, "/books/:id"));
        assert!(!router.has_route(&Method::PATCH, "/books/:id"));
    }

    #[test]
    fn test_duplicate_route_is_rejected() {
        let mut builder = Router::builder();
        builder.route(route(Method::GET, "/books/:id")).unwrap();

        let err = builder.route(route(Method::GET, "/books/:id")).unwrap_err();
        assert!(matches!(err, RouteError::Duplicate { .. }));
    }

    #[test]
    fn test_relative_url_is_rejected() {
        let err = Router::builder().route(route(Method::GET, "books")).unwrap_err();
        assert!(matches!(err, RouteError::InvalidUrl { .. }));
    }

    #[test]
    fn test_invalid_schema_is_rejected() {
        let options = route(Method::POST, "/books")
            .with_schema(crate::RouteSchema { body: Some(json!({"type": 12})), params: None });

        let err = Router::builder().route(options).unwrap_err();
        assert!(matches!(err, RouteError::InvalidSchema { .. }));
    }

    #[test]
    fn test_conflicting_params_fail_to_build() {
        let mut builder = Router::builder();
        builder.route(route(Method::GET, "/books/:id")).unwrap();
        builder.route(route(Method::DELETE, "/books/:name")).unwrap();

        assert!(matches!(builder.build(), Err(RouteError::Conflict { .. })));
    }
}
