use crate::config::{Configuration, CrudOptions};
use crate::error::CrudError;
use crate::route::{RouteDescriptor, RouteKind};
use micro_crud_web::{RouteError, ServerBuilder};
use tracing::{debug, error, info};

/// Anything routes can be registered on.
#[cfg_attr(test, mockall::automock)]
pub trait RouteHost {
    fn add_route(&mut self, descriptor: RouteDescriptor) -> Result<(), RouteError>;
}

impl RouteHost for ServerBuilder {
    fn add_route(&mut self, descriptor: RouteDescriptor) -> Result<(), RouteError> {
        self.route(descriptor.into()).map(|_| ())
    }
}

/// Registers the CRUD routes described by `options` on `host`.
///
/// Routes are registered in a fixed order: create, read, update, delete; kinds without a
/// callback are skipped. A configuration error is reported before anything is
/// registered. A route the host rejects stops the registration.
pub fn register<H>(host: &mut H, options: &CrudOptions) -> Result<(), CrudError>
where
    H: RouteHost + ?Sized,
{
    let configuration = Configuration::build(options).inspect_err(|e| error!(cause = %e, "crud configuration rejected"))?;

    let mut registered = Vec::with_capacity(RouteKind::ALL.len());
    for kind in RouteKind::ALL {
        let Some(descriptor) = kind.descriptor(&configuration) else {
            debug!(%kind, "no callback, route skipped");
            continue;
        };

        debug!(%kind, method = %descriptor.method, url = %descriptor.url, "registering route");
        host.add_route(descriptor).map_err(|source| {
            error!(%kind, cause = %source, "host rejected route");
            CrudError::host(kind, source)
        })?;
        registered.push(kind);
    }

    info!(base_url = %configuration.base_url, routes = ?registered, "crud routes registered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{register, MockRouteHost};
    use crate::config::{CrudOptions, Schemas};
    use crate::error::{ConfigError, CrudError};
    use crate::route::RouteKind;
    use bytes::Bytes;
    use http::header::CONTENT_TYPE;
    use http::{Method, Request, Response, StatusCode};
    use http_body_util::BodyExt;
    use micro_crud_web::{HandlerError, RequestContext, ResponseBody, RouteError, Server};
    use mockall::Sequence;
    use serde_json::{json, Map, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    const BOOKS: &str = "/api/v1/books";

    fn book() -> Value {
        json!({"id": 123, "title": "Harry Potter"})
    }

    fn book_schema() -> Value {
        json!({
            "type": "object",
            "properties": { "title": { "type": "string" } },
            "required": ["title"]
        })
    }

    fn full_options() -> CrudOptions {
        CrudOptions::new(BOOKS)
            .create(|_ctx: RequestContext, _body: Value| async { Ok::<_, HandlerError>(book()) })
            .read(|_ctx: RequestContext, _id: Value| async { Ok::<_, HandlerError>(book()) })
            .update(|_ctx: RequestContext, _id: Value, _body: Value| async { Ok::<_, HandlerError>(book()) })
            .delete(|_ctx: RequestContext, _id: Value| async { Ok::<u64, HandlerError>(1) })
    }

    fn server(options: &CrudOptions) -> Server {
        let mut builder = Server::builder();
        register(&mut builder, options).unwrap();
        builder.build().unwrap()
    }

    fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Bytes> {
        let builder = Request::builder().method(method).uri(uri);
        match body {
            Some(body) => builder.header(CONTENT_TYPE, "application/json").body(Bytes::from(body.to_string())),
            None => builder.body(Bytes::new()),
        }
        .unwrap()
    }

    async fn body_bytes(response: Response<ResponseBody>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[test]
    fn test_missing_base_url_registers_nothing() {
        for options in [CrudOptions::default(), full_options().base_url("")] {
            let mut host = MockRouteHost::new();
            host.expect_add_route().never();

            let err = register(&mut host, &options).unwrap_err();
            assert!(matches!(err, CrudError::Config(ConfigError::MissingBaseUrl)));
            assert_eq!(err.to_string(), "No baseUrl found");
        }
    }

    #[test]
    fn test_routes_are_registered_in_fixed_order() {
        let mut host = MockRouteHost::new();
        let mut seq = Sequence::new();
        for kind in RouteKind::ALL {
            host.expect_add_route()
                .withf(move |descriptor| descriptor.kind == kind && descriptor.method == kind.method())
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_| Ok(()));
        }

        register(&mut host, &full_options()).unwrap();
    }

    #[test]
    fn test_absent_callbacks_are_skipped() {
        let options = CrudOptions::new(BOOKS)
            .delete(|_ctx: RequestContext, _id: Value| async { Ok::<u64, HandlerError>(0) })
            .create(|_ctx: RequestContext, body: Value| async move { Ok::<_, HandlerError>(body) });

        let mut host = MockRouteHost::new();
        let mut seq = Sequence::new();
        host.expect_add_route()
            .withf(|descriptor| descriptor.kind == RouteKind::Create && descriptor.url == BOOKS)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        host.expect_add_route()
            .withf(|descriptor| descriptor.kind == RouteKind::Delete && descriptor.url == "/api/v1/books/:id")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        register(&mut host, &options).unwrap();
    }

    #[test]
    fn test_host_rejection_stops_registration() {
        let mut host = MockRouteHost::new();
        let mut seq = Sequence::new();
        host.expect_add_route().times(1).in_sequence(&mut seq).returning(|_| Ok(()));
        host.expect_add_route()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|descriptor| Err(RouteError::duplicate(descriptor.method, descriptor.url)));

        let err = register(&mut host, &full_options()).unwrap_err();
        assert!(matches!(err, CrudError::Host { kind: RouteKind::Read, .. }));
    }

    #[test]
    fn test_route_params_are_copied_per_route() {
        let mut template = Map::new();
        template.insert("logLevel".into(), json!("warn"));
        let options = full_options().default_route_params(template.clone());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut host = MockRouteHost::new();
        let recorded = Arc::clone(&seen);
        host.expect_add_route().times(4).returning(move |mut descriptor| {
            assert_eq!(descriptor.params, template);
            descriptor.params.insert("url".into(), json!(descriptor.url.clone()));
            recorded.lock().unwrap().push(descriptor.params);
            Ok(())
        });

        register(&mut host, &options).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0]["url"], BOOKS);
        assert_eq!(seen[3]["url"], "/api/v1/books/:id");
        assert_eq!(options.settings().default_route_params.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_normalized_base_url_is_routed() {
        let options = CrudOptions::new("api/").create(|_ctx: RequestContext, body: Value| async move { Ok::<_, HandlerError>(body) });
        let server = server(&options);

        assert!(server.has_route(&Method::POST, "/api"));
        assert!(!server.has_route(&Method::GET, "/api/:id"));
    }

    #[tokio::test]
    async fn test_disabled_routes_are_not_found() {
        let cases = [
            (Method::POST, BOOKS),
            (Method::GET, "/api/v1/books/123"),
            (Method::PATCH, "/api/v1/books/123"),
            (Method::DELETE, "/api/v1/books/123"),
        ];

        for (disabled, (method, uri)) in cases.iter().enumerate() {
            let mut options = CrudOptions::new(BOOKS);
            for (index, kind) in RouteKind::ALL.into_iter().enumerate() {
                if index == disabled {
                    continue;
                }
                options = match kind {
                    RouteKind::Create => options.create(|_ctx: RequestContext, _body: Value| async { Ok::<_, HandlerError>(book()) }),
                    RouteKind::Read => options.read(|_ctx: RequestContext, _id: Value| async { Ok::<_, HandlerError>(book()) }),
                    RouteKind::Update => {
                        options.update(|_ctx: RequestContext, _id: Value, _body: Value| async { Ok::<_, HandlerError>(book()) })
                    }
                    RouteKind::Delete => options.delete(|_ctx: RequestContext, _id: Value| async { Ok::<u64, HandlerError>(1) }),
                };
            }
            let server = server(&options);

            let body = (*method == Method::POST || *method == Method::PATCH).then(|| json!({"title": "Harry Potter"}));
            let response = server.inject(request(method.clone(), uri, body)).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            let message: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
            assert_eq!(message["message"], format!("Route {method}:{uri} not found"));

            for (other, (method, uri)) in cases.iter().enumerate().filter(|(other, _)| *other != disabled) {
                let body = (*method == Method::POST || *method == Method::PATCH).then(|| json!({"title": "Harry Potter"}));
                let response = server.inject(request(method.clone(), uri, body)).await;
                assert_ne!(response.status(), StatusCode::NOT_FOUND, "route #{other} should stay registered");
            }
        }
    }

    #[tokio::test]
    async fn test_create_route() {
        let options = CrudOptions::new(BOOKS).create(|_ctx: RequestContext, body: Value| async move {
            assert_eq!(body, json!({"title": "Harry Potter"}));
            Ok::<_, HandlerError>(book())
        });
        let server = server(&options);

        let response = server.inject(request(Method::POST, BOOKS, Some(json!({"title": "Harry Potter"})))).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body, book());
    }

    #[tokio::test]
    async fn test_read_route() {
        let options = CrudOptions::new(BOOKS).read(|_ctx: RequestContext, id: Value| async move {
            assert_eq!(id, json!("123"));
            Ok::<_, HandlerError>(book())
        });
        let server = server(&options);

        let response = server.inject(request(Method::GET, "/api/v1/books/123", None)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body, book());
    }

    #[tokio::test]
    async fn test_update_route() {
        let options = CrudOptions::new(BOOKS).update(|_ctx: RequestContext, id: Value, body: Value| async move {
            assert_eq!(id, json!("123"));
            assert_eq!(body, json!({"title": "Harry Potter"}));
            Ok::<_, HandlerError>(book())
        });
        let server = server(&options);

        let response =
            server.inject(request(Method::PATCH, "/api/v1/books/123", Some(json!({"title": "Harry Potter"})))).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body, book());
    }

    #[tokio::test]
    async fn test_delete_route_status_follows_count() {
        for (deleted, status) in [(0, StatusCode::NO_CONTENT), (1, StatusCode::OK), (3, StatusCode::OK)] {
            let options = CrudOptions::new(BOOKS).delete(move |_ctx: RequestContext, id: Value| async move {
                assert_eq!(id, json!("123"));
                Ok::<u64, HandlerError>(deleted)
            });
            let server = server(&options);

            let response = server.inject(request(Method::DELETE, "/api/v1/books/123", None)).await;

            assert_eq!(response.status(), status);
            assert!(body_bytes(response).await.is_empty());
        }
    }

    #[tokio::test]
    async fn test_create_body_schema_rejects_before_callback() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let options = CrudOptions::new(BOOKS).schemas(Schemas::default().create_body(book_schema())).create(
            move |_ctx: RequestContext, body: Value| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, HandlerError>(body)
                }
            },
        );
        let server = server(&options);

        let response = server.inject(request(Method::POST, BOOKS, Some(json!({"not_title": "Harry Potter"})))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let response = server.inject(request(Method::POST, BOOKS, Some(json!({"title": "Harry Potter"})))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_id_schema_coerces_and_rejects() {
        let options = CrudOptions::new(BOOKS)
            .schemas(Schemas::default().id_param(json!({"type": "number"})).update_body(book_schema()))
            .update(|_ctx: RequestContext, id: Value, body: Value| async move {
                assert_eq!(id, json!(123));
                Ok::<_, HandlerError>(json!({"id": id, "title": body["title"]}))
            })
            .delete(|_ctx: RequestContext, id: Value| async move {
                assert_eq!(id, json!(123));
                Ok::<u64, HandlerError>(1)
            });
        let server = server(&options);

        let response =
            server.inject(request(Method::PATCH, "/api/v1/books/123", Some(json!({"title": "Harry Potter"})))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body, book());

        let response =
            server.inject(request(Method::PATCH, "/api/v1/books/not-a-number", Some(json!({"title": "Harry Potter"})))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = server.inject(request(Method::PATCH, "/api/v1/books/123", Some(json!({"name": "x"})))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        assert_eq!(server.inject(request(Method::DELETE, "/api/v1/books/123", None)).await.status(), StatusCode::OK);
        assert_eq!(
            server.inject(request(Method::DELETE, "/api/v1/books/string", None)).await.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_callback_failure_reaches_server_error_boundary() {
        let options = CrudOptions::new(BOOKS)
            .read(|_ctx: RequestContext, _id: Value| async { Err::<Value, HandlerError>("database unavailable".into()) });
        let server = server(&options);

        let response = server.inject(request(Method::GET, "/api/v1/books/1", None)).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body["message"], "database unavailable");
    }

    #[tokio::test]
    async fn test_route_params_reach_handlers() {
        let mut template = Map::new();
        template.insert("resource".into(), json!("book"));
        let options = CrudOptions::new(BOOKS).default_route_params(template).read(|ctx: RequestContext, _id: Value| async move {
            Ok::<_, HandlerError>(Value::Object(ctx.route_config().clone()))
        });
        let server = server(&options);

        let response = server.inject(request(Method::GET, "/api/v1/books/1", None)).await;

        let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(body, json!({"resource": "book"}));
    }

    #[test]
    fn test_two_resources_share_a_server() {
        let mut builder = Server::builder();
        register(&mut builder, &full_options()).unwrap();
        register(&mut builder, &full_options().base_url("/api/v1/authors")).unwrap();

        let server = builder.build().unwrap();
        assert!(server.has_route(&Method::DELETE, "/api/v1/books/:id"));
        assert!(server.has_route(&Method::DELETE, "/api/v1/authors/:id"));
    }

    #[test]
    fn test_registering_twice_is_rejected_by_host() {
        let mut builder = Server::builder();
        register(&mut builder, &full_options()).unwrap();

        let err = register(&mut builder, &full_options()).unwrap_err();
        assert!(matches!(err, CrudError::Host { kind: RouteKind::Create, source: RouteError::Duplicate { .. } }));
    }
}
