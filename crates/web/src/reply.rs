use http::StatusCode;
use mime::Mime;
use serde_json::Value;

/// What a handler wants sent back.
///
/// A `Reply` is rendered into an `http::Response` by the server, see the
/// [`Responder`](crate::Responder) impl. The payload decides who serializes:
/// [`Payload::Text`] is sent as is, [`Payload::Json`] is serialized by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    status: StatusCode,
    content_type: Option<Mime>,
    payload: Payload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Empty,
    Text(String),
    Json(Value),
}

impl Reply {
    /// An empty `200 OK` reply
    pub fn new() -> Self {
        Self { status: StatusCode::OK, content_type: None, payload: Payload::Empty }
    }

    #[must_use]
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn content_type(mut self, content_type: Mime) -> Self {
        self.content_type = Some(content_type);
        self
    }

    /// Sends already serialized text. Without an explicit content type the server
    /// answers `text/plain`.
    #[must_use]
    pub fn send(mut self, text: impl Into<String>) -> Self {
        self.payload = Payload::Text(text.into());
        self
    }

    /// Hands a value to the server's JSON serialization.
    #[must_use]
    pub fn json(mut self, value: Value) -> Self {
        self.payload = Payload::Json(value);
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn get_content_type(&self) -> Option<&Mime> {
        self.content_type.as_ref()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub(crate) fn into_parts(self) -> (StatusCode, Option<Mime>, Payload) {
        (self.status, self.content_type, self.payload)
    }
}

impl Default for Reply {
    fn default() -> Self {
        Self::new()
    }
}
