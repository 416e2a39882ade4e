//! An in-process web framework: a matchit router with method filters, JSON-schema
//! request validation and a small reply model.
//!
//! Routes are declared on a [`ServerBuilder`] with [`RouteOptions`]; the built
//! [`Server`] dispatches requests through [`Server::inject`].

mod body;
mod error;
mod handler;
mod reply;
mod request;
mod responder;
mod schema;
mod server;

pub mod router;

pub use body::ResponseBody;
pub use error::{HandlerError, RequestError, RouteError};
pub use handler::{handler_fn, FnHandler, RequestHandler};
pub use reply::{Payload, Reply};
pub use request::{PathParams, RequestContext};
pub use responder::Responder;
pub use router::{RouteOptions, Router};
pub use schema::RouteSchema;
pub use server::{Server, ServerBuilder};
