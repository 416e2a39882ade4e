//! CRUD route generation on top of [`micro_crud_web`].
//!
//! Describe a resource with [`CrudOptions`] (a base url plus up to four callbacks) and
//! [`register`] it on a host. Each present callback enables one route:
//!
//! | callback | route                  | success status        |
//! |----------|------------------------|-----------------------|
//! | create   | `POST {base}`          | 201                   |
//! | read     | `GET {base}/:id`       | 200                   |
//! | update   | `PATCH {base}/:id`     | 200                   |
//! | delete   | `DELETE {base}/:id`    | 200, or 204 when none |
//!
//! ```
//! use micro_crud::{register, CrudOptions};
//! use micro_crud_web::{HandlerError, RequestContext, Server};
//! use serde_json::{json, Value};
//!
//! let options = CrudOptions::new("api/v1/books/")
//!     .read(|_ctx: RequestContext, id: Value| async move { Ok::<_, HandlerError>(json!({ "id": id })) });
//!
//! let mut builder = Server::builder();
//! register(&mut builder, &options).unwrap();
//! let server = builder.build().unwrap();
//! assert!(server.has_route(&http::Method::GET, "/api/v1/books/:id"));
//! ```

mod base_url;
mod callback;
mod config;
mod error;
mod registrar;

pub mod route;

pub use base_url::normalize;
pub use callback::{CallbackResult, Callbacks, CreateCallback, DeleteCallback, ReadCallback, UpdateCallback};
pub use config::{Configuration, CrudOptions, CrudSettings, Schemas};
pub use error::{ConfigError, CrudError};
pub use registrar::{register, RouteHost};
pub use route::{RouteDescriptor, RouteKind};
