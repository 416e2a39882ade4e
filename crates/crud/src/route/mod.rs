//! Route descriptors, one builder per route kind.
//!
//! Each builder looks at the [`Configuration`], returns `None` when its callback is
//! absent, and otherwise produces a [`RouteDescriptor`] whose handler forwards to the
//! callback and maps its result to a reply.

mod create;
mod delete;
mod read;
mod update;

use crate::config::Configuration;
use http::{Method, StatusCode};
use micro_crud_web::{HandlerError, Reply, RequestContext, RequestHandler, RouteOptions, RouteSchema};
use serde_json::{Map, Value};
use std::fmt;

/// Name of the path parameter carrying the resource id
pub const ID_PARAM: &str = "id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKind {
    Create,
    Read,
    Update,
    Delete,
}

impl RouteKind {
    /// Every kind, in the order routes are registered
    pub const ALL: [RouteKind; 4] = [RouteKind::Create, RouteKind::Read, RouteKind::Update, RouteKind::Delete];

    pub fn method(self) -> Method {
        match self {
            RouteKind::Create => Method::POST,
            RouteKind::Read => Method::GET,
            RouteKind::Update => Method::PATCH,
            RouteKind::Delete => Method::DELETE,
        }
    }

    /// Builds this kind's descriptor, `None` when its callback is absent.
    pub fn descriptor(self, configuration: &Configuration) -> Option<RouteDescriptor> {
        match self {
            RouteKind::Create => create::descriptor(configuration),
            RouteKind::Read => read::descriptor(configuration),
            RouteKind::Update => update::descriptor(configuration),
            RouteKind::Delete => delete::descriptor(configuration),
        }
    }
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RouteKind::Create => "create",
            RouteKind::Read => "read",
            RouteKind::Update => "update",
            RouteKind::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// One endpoint, ready to be handed to the server.
///
/// `params` is this route's own copy of the configured route template.
pub struct RouteDescriptor {
    pub kind: RouteKind,
    pub url: String,
    pub method: Method,
    pub schema: Option<RouteSchema>,
    pub params: Map<String, Value>,
    pub handler: Box<dyn RequestHandler>,
}

impl RouteDescriptor {
    fn new<H>(kind: RouteKind, url: String, schema: RouteSchema, params: Map<String, Value>, handler: H) -> Self
    where
        H: RequestHandler + 'static,
    {
        Self {
            kind,
            url,
            method: kind.method(),
            schema: (!schema.is_empty()).then_some(schema),
            params,
            handler: Box::new(handler),
        }
    }
}

impl fmt::Debug for RouteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDescriptor")
            .field("kind", &self.kind)
            .field("url", &self.url)
            .field("method", &self.method)
            .field("schema", &self.schema)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl From<RouteDescriptor> for RouteOptions {
    fn from(descriptor: RouteDescriptor) -> Self {
        RouteOptions {
            method: descriptor.method,
            url: descriptor.url,
            schema: descriptor.schema,
            config: descriptor.params,
            handler: descriptor.handler,
        }
    }
}

/// `{base}/:id`, without doubling the separator under the root path.
fn id_url(base_url: &str) -> String {
    let base_url = base_url.strip_suffix('/').unwrap_or(base_url);
    format!("{base_url}/:{ID_PARAM}")
}

/// The `id` path parameter, after any coercion the server applied.
fn path_id(ctx: &RequestContext) -> Value {
    ctx.path_params().get(ID_PARAM).cloned().unwrap_or_default()
}

/// Objects and arrays; everything else counts as a primitive.
fn is_structured(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// Replies with the JSON text of `value`. Only structured values force a JSON
/// content type, primitives keep the server's default.
fn stringified_reply(status: StatusCode, value: &Value) -> Result<Reply, HandlerError> {
    let mut reply = Reply::new().status(status);
    if is_structured(value) {
        reply = reply.content_type(mime::APPLICATION_JSON);
    }
    Ok(reply.send(serde_json::to_string(value)?))
}
