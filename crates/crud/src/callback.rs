//! The user callbacks behind the four routes.
//!
//! Every callback takes the request context first, then its domain arguments, and
//! returns a boxed future. Errors are passed through to the server untouched.

use crate::route::RouteKind;
use futures::future::BoxFuture;
use micro_crud_web::{HandlerError, RequestContext};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub type CallbackResult<T> = Result<T, HandlerError>;

/// `create(ctx, body)`, resolves to the created resource or its identifier.
pub type CreateCallback = Arc<dyn Fn(RequestContext, Value) -> BoxFuture<'static, CallbackResult<Value>> + Send + Sync>;

/// `read(ctx, id)`, resolves to the resource.
pub type ReadCallback = Arc<dyn Fn(RequestContext, Value) -> BoxFuture<'static, CallbackResult<Value>> + Send + Sync>;

/// `update(ctx, id, body)`, resolves to the updated resource.
pub type UpdateCallback =
    Arc<dyn Fn(RequestContext, Value, Value) -> BoxFuture<'static, CallbackResult<Value>> + Send + Sync>;

/// `delete(ctx, id)`, resolves to the number of deleted items.
pub type DeleteCallback = Arc<dyn Fn(RequestContext, Value) -> BoxFuture<'static, CallbackResult<u64>> + Send + Sync>;

/// One optional callback per route kind. A present callback enables its route.
#[derive(Clone, Default)]
pub struct Callbacks {
    pub create: Option<CreateCallback>,
    pub read: Option<ReadCallback>,
    pub update: Option<UpdateCallback>,
    pub delete: Option<DeleteCallback>,
}

impl Callbacks {
    pub fn is_enabled(&self, kind: RouteKind) -> bool {
        match kind {
            RouteKind::Create => self.create.is_some(),
            RouteKind::Read => self.read.is_some(),
            RouteKind::Update => self.update.is_some(),
            RouteKind::Delete => self.delete.is_some(),
        }
    }

    /// The enabled kinds, in registration order
    pub fn enabled(&self) -> Vec<RouteKind> {
        RouteKind::ALL.into_iter().filter(|kind| self.is_enabled(*kind)).collect()
    }
}

fn same<T: ?Sized>(a: Option<&Arc<T>>, b: Option<&Arc<T>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        _ => false,
    }
}

/// Two sets are equal when they hold the very same callbacks.
impl PartialEq for Callbacks {
    fn eq(&self, other: &Self) -> bool {
        same(self.create.as_ref(), other.create.as_ref())
            && same(self.read.as_ref(), other.read.as_ref())
            && same(self.update.as_ref(), other.update.as_ref())
            && same(self.delete.as_ref(), other.delete.as_ref())
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks").field("enabled", &self.enabled()).finish()
    }
}
