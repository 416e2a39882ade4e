use http::Method;
use std::error::Error;
use thiserror::Error;

/// Error returned by a [`RequestHandler`](crate::RequestHandler), usually coming straight from user code.
pub type HandlerError = Box<dyn Error + Send + Sync>;

/// Errors raised while declaring routes or freezing the router.
#[derive(Error, Debug)]
pub enum RouteError {
    #[error("invalid route url '{url}': must start with '/'")]
    InvalidUrl { url: String },

    #[error("route {method}:{url} already declared")]
    Duplicate { method: Method, url: String },

    #[error("invalid {location} schema for route {method}:{url}: {reason}")]
    InvalidSchema { method: Method, url: String, location: String, reason: String },

    #[error("route conflict: {source}")]
    Conflict {
        #[from]
        source: matchit::InsertError,
    },
}

impl RouteError {
    pub fn invalid_url<S: ToString>(url: S) -> Self {
        Self::InvalidUrl { url: url.to_string() }
    }

    pub fn duplicate<S: ToString>(method: Method, url: S) -> Self {
        Self::Duplicate { method, url: url.to_string() }
    }

    pub fn invalid_schema<S: ToString, L: ToString, R: ToString>(method: Method, url: S, location: L, reason: R) -> Self {
        Self::InvalidSchema { method, url: url.to_string(), location: location.to_string(), reason: reason.to_string() }
    }
}

/// Errors raised while dispatching a single request.
///
/// Each variant maps to one HTTP status, see the [`Responder`](crate::Responder) impl.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Route {method}:{url} not found")]
    RouteNotFound { method: Method, url: String },

    #[error("Unsupported Media Type: {content_type}")]
    UnsupportedMediaType { content_type: String },

    #[error("invalid json body: {reason}")]
    InvalidJson { reason: String },

    #[error("{location}: {reason}")]
    Validation { location: String, reason: String },

    #[error("{source}")]
    Handler { source: HandlerError },
}

impl RequestError {
    pub fn route_not_found<S: ToString>(method: Method, url: S) -> Self {
        Self::RouteNotFound { method, url: url.to_string() }
    }

    pub fn unsupported_media_type<S: ToString>(content_type: S) -> Self {
        Self::UnsupportedMediaType { content_type: content_type.to_string() }
    }

    pub fn invalid_json<S: ToString>(reason: S) -> Self {
        Self::InvalidJson { reason: reason.to_string() }
    }

    pub fn validation<L: ToString, R: ToString>(location: L, reason: R) -> Self {
        Self::Validation { location: location.to_string(), reason: reason.to_string() }
    }

    pub fn handler(source: HandlerError) -> Self {
        Self::Handler { source }
    }
}
