//! Caller-facing options and the configuration they are turned into.
//!
//! [`CrudOptions`] pairs the declarative [`CrudSettings`] (loadable from JSON) with
//! the callbacks. [`Configuration::build`] checks the single precondition, a base url,
//! and normalizes it.

use crate::base_url;
use crate::callback::{CallbackResult, Callbacks};
use crate::error::ConfigError;
use futures::FutureExt;
use micro_crud_web::RequestContext;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;

/// Validation schemas handed to the server untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schemas {
    /// Schema of the `:id` path parameter
    #[serde(rename = "IdParam", default, skip_serializing_if = "Option::is_none")]
    pub id_param: Option<Value>,
    /// Schema of the `POST {base}` body
    #[serde(rename = "CreateBody", default, skip_serializing_if = "Option::is_none")]
    pub create_body: Option<Value>,
    /// Schema of the `PATCH {base}/:id` body
    #[serde(rename = "UpdateBody", default, skip_serializing_if = "Option::is_none")]
    pub update_body: Option<Value>,
}

impl Schemas {
    #[must_use]
    pub fn id_param(mut self, schema: Value) -> Self {
        self.id_param = Some(schema);
        self
    }

    #[must_use]
    pub fn create_body(mut self, schema: Value) -> Self {
        self.create_body = Some(schema);
        self
    }

    #[must_use]
    pub fn update_body(mut self, schema: Value) -> Self {
        self.update_body = Some(schema);
        self
    }
}

/// The declarative part of the options.
///
/// ```
/// use micro_crud::CrudSettings;
///
/// let settings = CrudSettings::from_json(r#"{
///     "baseUrl": "api/v1/books/",
///     "defaultRouteParams": { "logLevel": "warn" },
///     "schemas": { "IdParam": { "type": "number" } }
/// }"#).unwrap();
/// assert_eq!(settings.base_url.as_deref(), Some("api/v1/books/"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrudSettings {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_route_params: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schemas: Option<Schemas>,
}

impl CrudSettings {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// Everything [`register`](crate::register) needs: settings plus callbacks.
#[derive(Debug, Clone, Default)]
pub struct CrudOptions {
    settings: CrudSettings,
    callbacks: Callbacks,
}

impl CrudOptions {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::default().base_url(base_url)
    }

    pub fn from_settings(settings: CrudSettings) -> Self {
        Self { settings, callbacks: Callbacks::default() }
    }

    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.settings.base_url = Some(base_url.into());
        self
    }

    /// Extra route properties copied into every generated route
    #[must_use]
    pub fn default_route_params(mut self, params: Map<String, Value>) -> Self {
        self.settings.default_route_params = Some(params);
        self
    }

    #[must_use]
    pub fn schemas(mut self, schemas: Schemas) -> Self {
        self.settings.schemas = Some(schemas);
        self
    }

    /// Enables `POST {base}`
    #[must_use]
    pub fn create<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(RequestContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallbackResult<Value>> + Send + 'static,
    {
        self.callbacks.create = Some(Arc::new(move |ctx: RequestContext, body: Value| f(ctx, body).boxed()));
        self
    }

    /// Enables `GET {base}/:id`
    #[must_use]
    pub fn read<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(RequestContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallbackResult<Value>> + Send + 'static,
    {
        self.callbacks.read = Some(Arc::new(move |ctx: RequestContext, id: Value| f(ctx, id).boxed()));
        self
    }

    /// Enables `PATCH {base}/:id`
    #[must_use]
    pub fn update<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(RequestContext, Value, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallbackResult<Value>> + Send + 'static,
    {
        self.callbacks.update =
            Some(Arc::new(move |ctx: RequestContext, id: Value, body: Value| f(ctx, id, body).boxed()));
        self
    }

    /// Enables `DELETE {base}/:id`
    #[must_use]
    pub fn delete<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(RequestContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CallbackResult<u64>> + Send + 'static,
    {
        self.callbacks.delete = Some(Arc::new(move |ctx: RequestContext, id: Value| f(ctx, id).boxed()));
        self
    }

    pub fn settings(&self) -> &CrudSettings {
        &self.settings
    }

    pub fn callbacks(&self) -> &Callbacks {
        &self.callbacks
    }
}

/// The record route descriptors are built from.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub base_url: String,
    pub default_route_params: Option<Map<String, Value>>,
    pub schemas: Option<Schemas>,
    pub callbacks: Callbacks,
}

impl Configuration {
    /// Fails only when the base url is missing or empty.
    pub fn build(options: &CrudOptions) -> Result<Self, ConfigError> {
        let settings = &options.settings;
        let base_url = settings.base_url.as_deref().filter(|url| !url.is_empty()).ok_or(ConfigError::MissingBaseUrl)?;

        let schemas = settings.schemas.as_ref().map(|schemas| Schemas {
            create_body: schemas.create_body.clone(),
            update_body: schemas.update_body.clone(),
            id_param: schemas.id_param.clone(),
        });

        Ok(Self {
            base_url: base_url::normalize(base_url),
            default_route_params: settings.default_route_params.clone(),
            schemas,
            callbacks: options.callbacks.clone(),
        })
    }

    /// A fresh copy of the route template, owned by the caller.
    pub fn route_params(&self) -> Map<String, Value> {
        self.default_route_params.clone().unwrap_or_default()
    }

    pub(crate) fn schema<F>(&self, select: F) -> Option<&Value>
    where
        F: FnOnce(&Schemas) -> Option<&Value>,
    {
        self.schemas.as_ref().and_then(select)
    }
}
