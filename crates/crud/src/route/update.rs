use super::{id_url, path_id, stringified_reply, RouteDescriptor, RouteKind, ID_PARAM};
use crate::config::Configuration;
use http::StatusCode;
use micro_crud_web::{handler_fn, RequestContext, RouteSchema};
use serde_json::Value;
use std::sync::Arc;

/// `PATCH {base}/:id`, answering `200 OK` with the stringified result.
pub(super) fn descriptor(configuration: &Configuration) -> Option<RouteDescriptor> {
    let update = configuration.callbacks.update.clone()?;

    let mut schema = RouteSchema::default();
    if let Some(body) = configuration.schema(|schemas| schemas.update_body.as_ref()) {
        schema.body = Some(body.clone());
    }
    if let Some(id) = configuration.schema(|schemas| schemas.id_param.as_ref()) {
        schema.set_param(ID_PARAM, id.clone());
    }

    let handler = handler_fn(move |ctx: RequestContext, body: Option<Value>| {
        let update = Arc::clone(&update);
        async move {
            let id = path_id(&ctx);
            let resource = update(ctx, id, body.unwrap_or_default()).await?;
            stringified_reply(StatusCode::OK, &resource)
        }
    });

    Some(RouteDescriptor::new(
        RouteKind::Update,
        id_url(&configuration.base_url),
        schema,
        configuration.route_params(),
        handler,
    ))
}
