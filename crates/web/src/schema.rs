//! Request validation against the JSON schemas a route is declared with.
//!
//! Schemas are compiled once when the route is added to the router. Path parameters
//! arrive as strings, so before validating one the server coerces it to the scalar type
//! its schema asks for (`"123"` becomes `123` under `{"type": "number"}`); the coerced
//! value is what the handler later sees.

use crate::error::RequestError;
use crate::PathParams;
use jsonschema::JSONSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

/// Declarative validation schemas for one route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
}

impl RouteSchema {
    /// Returns true when neither a body nor a params schema is declared
    pub fn is_empty(&self) -> bool {
        self.body.is_none() && self.params.is_none()
    }

    /// Sets the schema of a single path parameter
    pub fn set_param(&mut self, name: impl Into<String>, schema: Value) {
        self.params.get_or_insert_with(Map::new).insert(name.into(), schema);
    }
}

/// The compiled form of a [`RouteSchema`].
pub(crate) struct Validator {
    body: Option<JSONSchema>,
    params: Vec<ParamValidator>,
}

struct ParamValidator {
    name: String,
    target: Option<String>,
    schema: JSONSchema,
}

impl Validator {
    /// Compiles every schema of the route; the error names the schema location that failed.
    pub(crate) fn compile(route_schema: &RouteSchema) -> Result<Self, (String, String)> {
        let body = route_schema
            .body
            .as_ref()
            .map(|schema| JSONSchema::compile(schema).map_err(|e| ("body".to_owned(), e.to_string())))
            .transpose()?;

        let mut params = Vec::new();
        for (name, schema) in route_schema.params.iter().flatten() {
            let compiled = JSONSchema::compile(schema).map_err(|e| (format!("params/{name}"), e.to_string()))?;
            let target = schema.get("type").and_then(Value::as_str).map(ToOwned::to_owned);
            params.push(ParamValidator { name: name.clone(), target, schema: compiled });
        }

        Ok(Self { body, params })
    }

    /// Coerces and validates the path parameters in place.
    pub(crate) fn validate_params(&self, path_params: &mut PathParams) -> Result<(), RequestError> {
        for param in &self.params {
            let Some(raw) = path_params.get(&param.name) else {
                continue;
            };
            let value = coerce(raw, param.target.as_deref());
            check(&param.schema, &value, &format!("params/{}", param.name))?;
            path_params.replace(&param.name, value);
        }
        Ok(())
    }

    /// Validates the decoded body, a missing body is validated as `null`.
    pub(crate) fn validate_body(&self, body: Option<&Value>) -> Result<(), RequestError> {
        match &self.body {
            Some(schema) => check(schema, body.unwrap_or(&Value::Null), "body"),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self.params.iter().map(|param| param.name.as_str()).collect::<Vec<_>>();
        f.debug_struct("Validator").field("body", &self.body.is_some()).field("params", &params).finish()
    }
}

fn check(schema: &JSONSchema, instance: &Value, location: &str) -> Result<(), RequestError> {
    let reason = match schema.validate(instance) {
        Ok(()) => return Ok(()),
        Err(mut errors) => errors.next().map(|e| e.to_string()).unwrap_or_default(),
    };
    warn!(location, reason = %reason, "request rejected by schema");
    Err(RequestError::validation(location, reason))
}

/// Converts a raw path segment to the scalar type named by the parameter schema,
/// leaving it untouched when it does not parse.
fn coerce(raw: &Value, target: Option<&str>) -> Value {
    let Some(text) = raw.as_str() else {
        return raw.clone();
    };
    let coerced = match target {
        Some("integer") => text.parse::<i64>().ok().map(Value::from),
        Some("number") => text
            .parse::<i64>()
            .ok()
            .map(Value::from)
            .or_else(|| text.parse::<f64>().ok().and_then(|n| serde_json::Number::from_f64(n).map(Value::Number))),
        Some("boolean") => text.parse::<bool>().ok().map(Value::Bool),
        Some("null") if text.is_empty() => Some(Value::Null),
        _ => None,
    };
    coerced.unwrap_or_else(|| raw.clone())
}
