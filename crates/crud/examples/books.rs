//! An in-memory book store exposed through generated CRUD routes.
//!
//! Requests are injected straight into the server, run with
//! `cargo run -p micro-crud --example books`.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Method, Request};
use http_body_util::BodyExt;
use micro_crud::{register, CrudOptions, CrudSettings};
use micro_crud_web::{HandlerError, RequestContext, Server};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Default)]
struct BookStore {
    next_id: AtomicU64,
    books: Mutex<HashMap<u64, Value>>,
}

fn book_id(id: &Value) -> Result<u64, HandlerError> {
    id.as_u64().ok_or_else(|| format!("invalid book id: {id}").into())
}

fn options(store: &Arc<BookStore>) -> Result<CrudOptions, HandlerError> {
    let settings = CrudSettings::from_json(
        r#"{
            "baseUrl": "api/v1/books/",
            "defaultRouteParams": { "resource": "book" },
            "schemas": {
                "IdParam": { "type": "integer", "minimum": 1 },
                "CreateBody": {
                    "type": "object",
                    "properties": { "title": { "type": "string" }, "author": { "type": "string" } },
                    "required": ["title"]
                },
                "UpdateBody": {
                    "type": "object",
                    "properties": { "title": { "type": "string" }, "author": { "type": "string" } }
                }
            }
        }"#,
    )?;

    let create_store = Arc::clone(store);
    let read_store = Arc::clone(store);
    let update_store = Arc::clone(store);
    let delete_store = Arc::clone(store);

    Ok(CrudOptions::from_settings(settings)
        .create(move |_ctx: RequestContext, mut body: Value| {
            let store = Arc::clone(&create_store);
            async move {
                let id = store.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                body["id"] = json!(id);
                store.books.lock().await.insert(id, body.clone());
                Ok::<_, HandlerError>(body)
            }
        })
        .read(move |_ctx: RequestContext, id: Value| {
            let store = Arc::clone(&read_store);
            async move {
                let id = book_id(&id)?;
                Ok::<_, HandlerError>(store.books.lock().await.get(&id).cloned().unwrap_or_default())
            }
        })
        .update(move |_ctx: RequestContext, id: Value, body: Value| {
            let store = Arc::clone(&update_store);
            async move {
                let id = book_id(&id)?;
                let mut books = store.books.lock().await;
                let Some(Value::Object(book)) = books.get_mut(&id) else {
                    return Err::<Value, HandlerError>(format!("book {id} not found").into());
                };
                if let Value::Object(changes) = body {
                    book.extend(changes);
                }
                Ok(Value::Object(book.clone()))
            }
        })
        .delete(move |_ctx: RequestContext, id: Value| {
            let store = Arc::clone(&delete_store);
            async move {
                let id = book_id(&id)?;
                let removed = store.books.lock().await.remove(&id);
                Ok::<u64, HandlerError>(u64::from(removed.is_some()))
            }
        }))
}

async fn send(server: &Server, method: Method, uri: &str, body: Option<Value>) -> Result<(), HandlerError> {
    let request = Request::builder().method(method.clone()).uri(uri);
    let request = match body {
        Some(body) => request.header(CONTENT_TYPE, mime::APPLICATION_JSON.as_ref()).body(Bytes::from(body.to_string())),
        None => request.body(Bytes::new()),
    }?;

    let response = server.inject(request).await;
    let status = response.status();
    let bytes = response.into_body().collect().await?.to_bytes();
    info!(%method, uri, %status, body = %String::from_utf8_lossy(&bytes), "response");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), HandlerError> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let store = Arc::new(BookStore::default());
    let mut builder = Server::builder();
    register(&mut builder, &options(&store)?)?;
    let server = builder.build()?;

    send(&server, Method::POST, "/api/v1/books", Some(json!({"title": "Dune", "author": "Frank Herbert"}))).await?;
    send(&server, Method::POST, "/api/v1/books", Some(json!({"author": "nobody"}))).await?;
    send(&server, Method::GET, "/api/v1/books/1", None).await?;
    send(&server, Method::GET, "/api/v1/books/abc", None).await?;
    send(&server, Method::PATCH, "/api/v1/books/1", Some(json!({"title": "Dune Messiah"}))).await?;
    send(&server, Method::DELETE, "/api/v1/books/1", None).await?;
    send(&server, Method::DELETE, "/api/v1/books/1", None).await?;
    send(&server, Method::PUT, "/api/v1/books/1", None).await?;

    Ok(())
}
