use crate::error::HandlerError;
use crate::reply::Reply;
use crate::RequestContext;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::future::Future;

#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Handles one request. `body` is the decoded JSON body, `None` when the request had none.
    async fn invoke(&self, req: RequestContext, body: Option<Value>) -> Result<Reply, HandlerError>;
}

/// a holder which turns any async closure taking `(RequestContext, Option<Value>)` into a [`RequestHandler`]
pub struct FnHandler<F> {
    f: F,
}

impl<F> FnHandler<F> {
    fn new(f: F) -> Self {
        Self { f }
    }
}

pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(RequestContext, Option<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Reply, HandlerError>> + Send + 'static,
{
    FnHandler::new(f)
}

#[async_trait]
impl<F, Fut> RequestHandler for FnHandler<F>
where
    F: Fn(RequestContext, Option<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Reply, HandlerError>> + Send + 'static,
{
    async fn invoke(&self, req: RequestContext, body: Option<Value>) -> Result<Reply, HandlerError> {
        (self.f)(req, body).await
    }
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}
