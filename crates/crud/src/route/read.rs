use super::{id_url, path_id, RouteDescriptor, RouteKind, ID_PARAM};
use crate::config::Configuration;
use http::StatusCode;
use micro_crud_web::{handler_fn, HandlerError, Reply, RequestContext, RouteSchema};
use serde_json::Value;
use std::sync::Arc;

/// `GET {base}/:id`. The resource is left to the server's JSON serialization.
pub(super) fn descriptor(configuration: &Configuration) -> Option<RouteDescriptor> {
    let read = configuration.callbacks.read.clone()?;

    let mut schema = RouteSchema::default();
    if let Some(id) = configuration.schema(|schemas| schemas.id_param.as_ref()) {
        schema.set_param(ID_PARAM, id.clone());
    }

    let handler = handler_fn(move |ctx: RequestContext, _body: Option<Value>| {
        let read = Arc::clone(&read);
        async move {
            let id = path_id(&ctx);
            let resource = read(ctx, id).await?;
            Ok::<_, HandlerError>(Reply::new().status(StatusCode::OK).content_type(mime::APPLICATION_JSON).json(resource))
        }
    });

    Some(RouteDescriptor::new(
        RouteKind::Read,
        id_url(&configuration.base_url),
        schema,
        configuration.route_params(),
        handler,
    ))
}
