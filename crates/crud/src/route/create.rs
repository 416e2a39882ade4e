use super::{stringified_reply, RouteDescriptor, RouteKind};
use crate::config::Configuration;
use http::StatusCode;
use micro_crud_web::{handler_fn, RequestContext, RouteSchema};
use serde_json::Value;
use std::sync::Arc;

/// `POST {base}`, answering `201 Created` with the stringified result.
pub(super) fn descriptor(configuration: &Configuration) -> Option<RouteDescriptor> {
    let create = configuration.callbacks.create.clone()?;

    let mut schema = RouteSchema::default();
    if let Some(body) = configuration.schema(|schemas| schemas.create_body.as_ref()) {
        schema.body = Some(body.clone());
    }

    let handler = handler_fn(move |ctx: RequestContext, body: Option<Value>| {
        let create = Arc::clone(&create);
        async move {
            let resource = create(ctx, body.unwrap_or_default()).await?;
            stringified_reply(StatusCode::CREATED, &resource)
        }
    });

    Some(RouteDescriptor::new(
        RouteKind::Create,
        configuration.base_url.clone(),
        schema,
        configuration.route_params(),
        handler,
    ))
}

#[cfg(test)]
mod tests {
    use crate::config::{Configuration, CrudOptions, Schemas};
    use crate::route::tests::request_context;
    use crate::route::RouteKind;
    use http::{Method, StatusCode};
    use micro_crud_web::{HandlerError, PathParams, Payload, RequestContext};
    use serde_json::{json, Value};

    fn options() -> CrudOptions {
        CrudOptions::new("/api/v1/books").create(|_ctx: RequestContext, body: Value| async move {
            Ok::<_, HandlerError>(json!({"id": 123, "title": body["title"]}))
        })
    }

    #[test]
    fn test_not_applicable_without_callback() {
        let configuration = Configuration::build(&CrudOptions::new("/api/v1/books")).unwrap();
        assert!(RouteKind::Create.descriptor(&configuration).is_none());
    }

    #[test]
    fn test_descriptor_shape() {
        let configuration = Configuration::build(&options()).unwrap();
        let descriptor = RouteKind::Create.descriptor(&configuration).unwrap();

        assert_eq!(descriptor.url, "/api/v1/books");
        assert_eq!(descriptor.method, Method::POST);
        assert!(descriptor.schema.is_none());
    }

    #[test]
    fn test_body_schema_only() {
        let schemas = Schemas::default()
            .create_body(json!({"type": "object", "required": ["title"]}))
            .id_param(json!({"type": "number"}));
        let configuration = Configuration::build(&options().schemas(schemas)).unwrap();

        let schema = RouteKind::Create.descriptor(&configuration).unwrap().schema.unwrap();
        assert_eq!(schema.body, Some(json!({"type": "object", "required": ["title"]})));
        assert_eq!(schema.params, None);
    }

    #[tokio::test]
    async fn test_handler_replies_created() {
        let configuration = Configuration::build(&options()).unwrap();
        let descriptor = RouteKind::Create.descriptor(&configuration).unwrap();

        let ctx = request_context(Method::POST, "/api/v1/books", PathParams::empty());
        let reply = descriptor.handler.invoke(ctx, Some(json!({"title": "Harry Potter"}))).await.unwrap();

        assert_eq!(reply.status_code(), StatusCode::CREATED);
        assert_eq!(reply.get_content_type(), Some(&mime::APPLICATION_JSON));
        let Payload::Text(text) = reply.payload() else { panic!("expected pre-serialized text") };
        assert_eq!(serde_json::from_str::<Value>(text).unwrap(), json!({"id": 123, "title": "Harry Potter"}));
    }

    #[tokio::test]
    async fn test_primitive_result_keeps_default_content_type() {
        let options = CrudOptions::new("/books")
            .create(|_ctx: RequestContext, _body: Value| async { Ok::<_, HandlerError>(json!(42)) });
        let configuration = Configuration::build(&options).unwrap();
        let descriptor = RouteKind::Create.descriptor(&configuration).unwrap();

        let ctx = request_context(Method::POST, "/books", PathParams::empty());
        let reply = descriptor.handler.invoke(ctx, None).await.unwrap();

        assert_eq!(reply.status_code(), StatusCode::CREATED);
        assert_eq!(reply.get_content_type(), None);
        assert_eq!(reply.payload(), &Payload::Text("42".into()));
    }

    #[tokio::test]
    async fn test_callback_failure_propagates() {
        let options = CrudOptions::new("/books")
            .create(|_ctx: RequestContext, _body: Value| async { Err::<Value, HandlerError>("duplicate title".into()) });
        let configuration = Configuration::build(&options).unwrap();
        let descriptor = RouteKind::Create.descriptor(&configuration).unwrap();

        let ctx = request_context(Method::POST, "/books", PathParams::empty());
        let err = descriptor.handler.invoke(ctx, None).await.unwrap_err();

        assert_eq!(err.to_string(), "duplicate title");
    }
}
