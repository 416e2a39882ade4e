//! Response handling module that converts handler results into HTTP responses.
//!
//! This module provides the [`Responder`] trait which defines how different types
//! can be converted into HTTP responses. It is implemented for [`Reply`], the value
//! handlers produce, and for [`RequestError`], which covers everything the server
//! itself rejects.

use crate::body::ResponseBody;
use crate::error::RequestError;
use crate::reply::{Payload, Reply};
use crate::RequestContext;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Response, StatusCode};
use mime::Mime;
use serde_json::json;
use tracing::error;

/// A trait for types that can be converted into HTTP responses.
pub trait Responder {
    fn response_to(self, req: &RequestContext) -> Response<ResponseBody>;
}

impl<T: Responder, E: Responder> Responder for Result<T, E> {
    fn response_to(self, req: &RequestContext) -> Response<ResponseBody> {
        match self {
            Ok(t) => t.response_to(req),
            Err(e) => e.response_to(req),
        }
    }
}

impl Responder for Reply {
    fn response_to(self, _req: &RequestContext) -> Response<ResponseBody> {
        let (status, content_type, payload) = self.into_parts();
        let (content_type, body) = match payload {
            Payload::Empty => (content_type, ResponseBody::empty()),
            Payload::Text(text) => (content_type.or(Some(mime::TEXT_PLAIN_UTF_8)), ResponseBody::from(text)),
            Payload::Json(value) => match serde_json::to_string(&value) {
                Ok(text) => (content_type.or(Some(mime::APPLICATION_JSON)), ResponseBody::from(text)),
                Err(e) => {
                    error!(cause = %e, "failed to serialize reply payload");
                    return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
                }
            },
        };
        build_response(status, content_type.as_ref(), body)
    }
}

impl Responder for RequestError {
    fn response_to(self, _req: &RequestContext) -> Response<ResponseBody> {
        let status = match &self {
            RequestError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            RequestError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            RequestError::InvalidJson { .. } | RequestError::Validation { .. } => StatusCode::BAD_REQUEST,
            RequestError::Handler { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error_response(status, self.to_string())
    }
}

/// Builds the JSON error body shared by every rejection: `{statusCode, error, message}`.
fn error_response(status: StatusCode, message: String) -> Response<ResponseBody> {
    let body = json!({
        "statusCode": status.as_u16(),
        "error": status.canonical_reason().unwrap_or_default(),
        "message": message,
    });
    build_response(status, Some(&mime::APPLICATION_JSON), ResponseBody::from(body.to_string()))
}

fn build_response(status: StatusCode, content_type: Option<&Mime>, body: ResponseBody) -> Response<ResponseBody> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    if let Some(value) = content_type.and_then(|mime| HeaderValue::from_str(mime.as_ref()).ok()) {
        response.headers_mut().insert(CONTENT_TYPE, value);
    }
    response
}
