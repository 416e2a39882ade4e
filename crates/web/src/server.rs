use crate::error::{RequestError, RouteError};
use crate::responder::Responder;
use crate::router::{RouteOptions, Router, RouterBuilder};
use crate::{RequestContext, ResponseBody};
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::request::Parts;
use http::{Method, Request, Response};
use mime::Mime;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

/// Collects routes until the server is built.
#[derive(Debug)]
pub struct ServerBuilder {
    router: RouterBuilder,
}

impl ServerBuilder {
    fn new() -> Self {
        Self { router: Router::builder() }
    }

    /// Declares a route, see [`RouterBuilder::route`].
    pub fn route(&mut self, options: RouteOptions) -> Result<&mut Self, RouteError> {
        self.router.route(options)?;
        Ok(self)
    }

    pub fn has_route(&self, method: &Method, url: &str) -> bool {
        self.router.has_route(method, url)
    }

    pub fn build(self) -> Result<Server, RouteError> {
        let router = self.router.build()?;
        info!("server ready");
        Ok(Server { router })
    }
}

/// An in-process server: requests are dispatched with [`Server::inject`] and never
/// touch a socket.
#[derive(Debug)]
pub struct Server {
    router: Router,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn has_route(&self, method: &Method, url: &str) -> bool {
        self.router.has_route(method, url)
    }

    /// Dispatches one request through routing, body decoding, schema validation and
    /// the matched handler. Every failure is turned into an error response.
    pub async fn inject(&self, request: Request<Bytes>) -> Response<ResponseBody> {
        let (parts, body) = request.into_parts();
        let header = Arc::new(parts);

        let (router_items, params) = self.router.at(header.uri.path()).into_parts();
        let mut request_context = RequestContext::new(Arc::clone(&header), params);

        let Some(item) = router_items.iter().find(|item| item.filter().matches(&request_context)) else {
            let url = header.uri.path_and_query().map_or_else(|| header.uri.path(), |pq| pq.as_str());
            return RequestError::route_not_found(header.method.clone(), url).response_to(&request_context);
        };
        request_context = request_context.with_route_config(Arc::clone(item.config()));

        let body = match decode_body(&header, &body) {
            Ok(body) => body,
            Err(e) => return e.response_to(&request_context),
        };

        let validated = item
            .validator()
            .validate_params(request_context.path_params_mut())
            .and_then(|()| item.validator().validate_body(body.as_ref()));
        if let Err(e) = validated {
            return e.response_to(&request_context);
        }

        match item.handler().invoke(request_context.clone(), body).await {
            Ok(reply) => reply.response_to(&request_context),
            Err(e) => {
                error!(method = %header.method, path = header.uri.path(), cause = %e, "handler failed");
                RequestError::handler(e).response_to(&request_context)
            }
        }
    }
}

/// Decodes a JSON request body; an empty body decodes to `None`.
fn decode_body(header: &Parts, body: &Bytes) -> Result<Option<Value>, RequestError> {
    if body.is_empty() {
        return Ok(None);
    }

    let content_type = header.headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok()).unwrap_or_default();
    let is_json = content_type
        .parse::<Mime>()
        .is_ok_and(|mime| mime.subtype() == mime::JSON || mime.suffix() == Some(mime::JSON));
    if !is_json {
        return Err(RequestError::unsupported_media_type(content_type));
    }

    serde_json::from_slice(body).map(Some).map_err(RequestError::invalid_json)
}
