//! Request handling module that provides access to HTTP request information and path parameters.
//!
//! This module contains the core types for working with HTTP requests in the web framework:
//! - `RequestContext`: Provides access to the request head, path parameters and route metadata
//! - `PathParams`: Handles URL path parameters extracted from request paths

use http::request::Parts;
use http::{HeaderMap, Method, Uri, Version};
use matchit::Params;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Represents the context of an HTTP request, providing access to the request head,
/// the path parameters extracted from the URL and the metadata the matched route was
/// declared with.
///
/// Cloning is cheap: the head and the route metadata are shared.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_header: Arc<Parts>,
    path_params: PathParams,
    route_config: Arc<Map<String, Value>>,
}

impl RequestContext {
    /// Creates a new RequestContext with the given request head and path parameters
    pub fn new(request_header: Arc<Parts>, path_params: PathParams) -> Self {
        Self { request_header, path_params, route_config: Arc::default() }
    }

    pub(crate) fn with_route_config(mut self, route_config: Arc<Map<String, Value>>) -> Self {
        self.route_config = route_config;
        self
    }

    /// Returns a reference to the underlying request head
    pub fn request_header(&self) -> &Parts {
        &self.request_header
    }

    /// Returns the HTTP method of the request
    pub fn method(&self) -> &Method {
        &self.request_header.method
    }

    /// Returns the URI of the request
    pub fn uri(&self) -> &Uri {
        &self.request_header.uri
    }

    /// Returns the HTTP version of the request
    pub fn version(&self) -> Version {
        self.request_header.version
    }

    /// Returns the HTTP headers of the request
    pub fn headers(&self) -> &HeaderMap {
        &self.request_header.headers
    }

    /// Returns a reference to the path parameters extracted from the request URL
    pub fn path_params(&self) -> &PathParams {
        &self.path_params
    }

    pub(crate) fn path_params_mut(&mut self) -> &mut PathParams {
        &mut self.path_params
    }

    /// Returns the extra properties the matched route was declared with
    pub fn route_config(&self) -> &Map<String, Value> {
        &self.route_config
    }
}

/// Represents path parameters extracted from the URL path of an HTTP request.
///
/// Values start out as JSON strings. When the route declares a schema for a parameter the
/// server may replace the raw string with a coerced value (a number, for instance) before
/// the handler runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathParams {
    params: Vec<(String, Value)>,
}

impl PathParams {
    /// Creates an empty PathParams instance with no parameters
    #[inline]
    pub fn empty() -> Self {
        Self { params: Vec::new() }
    }

    /// Returns true if there are no path parameters
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the number of path parameters
    #[inline]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Gets the value of a path parameter by its name
    /// Returns None if the parameter doesn't exist
    pub fn get(&self, key: impl AsRef<str>) -> Option<&Value> {
        let key = key.as_ref();
        self.params.iter().find(|(name, _)| name == key).map(|(_, value)| value)
    }

    /// Gets a parameter as a string, only when it was not coerced to another type
    pub fn get_str(&self, key: impl AsRef<str>) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub(crate) fn replace(&mut self, key: &str, value: Value) {
        if let Some((_, slot)) = self.params.iter_mut().find(|(name, _)| name == key) {
            *slot = value;
        }
    }
}

impl From<Params<'_, '_>> for PathParams {
    fn from(params: Params<'_, '_>) -> Self {
        let params = params.iter().map(|(key, value)| (key.to_owned(), Value::String(value.to_owned()))).collect();
        Self { params }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let params = iter.into_iter().map(|(key, value)| (key.into(), Value::String(value.into()))).collect();
        Self { params }
    }
}
