use super::{id_url, path_id, RouteDescriptor, RouteKind, ID_PARAM};
use crate::config::Configuration;
use http::StatusCode;
use micro_crud_web::{handler_fn, HandlerError, Reply, RequestContext, RouteSchema};
use serde_json::Value;
use std::sync::Arc;

/// `DELETE {base}/:id`. `200 OK` when something was deleted, `204 No Content`
/// otherwise; never a body.
pub(super) fn descriptor(configuration: &Configuration) -> Option<RouteDescriptor> {
    let delete = configuration.callbacks.delete.clone()?;

    let mut schema = RouteSchema::default();
    if let Some(id) = configuration.schema(|schemas| schemas.id_param.as_ref()) {
        schema.set_param(ID_PARAM, id.clone());
    }

    let handler = handler_fn(move |ctx: RequestContext, _body: Option<Value>| {
        let delete = Arc::clone(&delete);
        async move {
            let id = path_id(&ctx);
            let deleted = delete(ctx, id).await?;
            let status = if deleted > 0 { StatusCode::OK } else { StatusCode::NO_CONTENT };
            Ok::<_, HandlerError>(Reply::new().status(status))
        }
    });

    Some(RouteDescriptor::new(
        RouteKind::Delete,
        id_url(&configuration.base_url),
        schema,
        configuration.route_params(),
        handler,
    ))
}
