//! JSON Schemas for book payloads.
//!
//! Both schemas are compiled once when the module is built. Validation walks
//! every error instead of stopping at the first, so a client sees all of the
//! problems with a payload in one response.

use anyhow::Context;
use jsonschema::{error::ValidationErrorKind, ValidationError, Validator};
use serde_json::{json, Value};

/// Longest isbn accepted on create and in a path, in characters.
pub const MAX_ISBN_LEN: usize = 64;

/// Fields stored as `INTEGER`. JSON Schema treats `10.0` as an integer, serde does not.
const INTEGER_FIELDS: [&str; 2] = ["pages", "year"];

/// Path parameter check matching the create schema's isbn bounds, so every
/// book that can be created can also be addressed.
pub fn is_valid_isbn(isbn: &str) -> bool {
    (1..=MAX_ISBN_LEN).contains(&isbn.chars().count())
}

/// Full payload accepted by `POST /books`.
pub fn create_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "Book",
        "type": "object",
        "properties": {
            "isbn": { "type": "string", "minLength": 1, "maxLength": MAX_ISBN_LEN },
            "amazon_url": { "type": "string" },
            "author": { "type": "string" },
            "language": { "type": "string" },
            "pages": { "type": "integer", "minimum": 1, "maximum": i32::MAX },
            "publisher": { "type": "string" },
            "title": { "type": "string" },
            "year": { "type": "integer", "minimum": i32::MIN, "maximum": i32::MAX }
        },
        "required": [
            "isbn", "amazon_url", "author", "language",
            "pages", "publisher", "title", "year"
        ]
    })
}

/// Payload accepted by `PUT /books/{isbn}`; the isbn itself may not be sent.
pub fn update_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "BookUpdate",
        "type": "object",
        "properties": {
            "isbn": false,
            "amazon_url": { "type": "string" },
            "author": { "type": "string" },
            "language": { "type": "string" },
            "pages": { "type": "integer", "minimum": 1, "maximum": i32::MAX },
            "publisher": { "type": "string" },
            "title": { "type": "string" },
            "year": { "type": "integer", "minimum": i32::MIN, "maximum": i32::MAX }
        },
        "required": ["author", "language", "pages", "title", "year"]
    })
}

/// Compiled validators for the create and update payloads.
pub struct BookSchemas {
    create: Validator,
    update: Validator,
}

impl BookSchemas {
    pub fn compile() -> anyhow::Result<Self> {
        let create = jsonschema::validator_for(&create_schema())
            .map_err(|e| anyhow::anyhow!("{e}"))
            .context("invalid create schema")?;
        let update = jsonschema::validator_for(&update_schema())
            .map_err(|e| anyhow::anyhow!("{e}"))
            .context("invalid update schema")?;
        Ok(Self { create, update })
    }

    /// Every violation of the create schema, as `{ "field", "error" }` objects.
    pub fn check_create(&self, payload: &Value) -> Vec<Value> {
        violations(&self.create, payload)
    }

    /// Every violation of the update schema, as `{ "field", "error" }` objects.
    pub fn check_update(&self, payload: &Value) -> Vec<Value> {
        violations(&self.update, payload)
    }
}

fn violations(validator: &Validator, payload: &Value) -> Vec<Value> {
    let mut found: Vec<Value> = validator
        .iter_errors(payload)
        .map(|e| json!({ "field": field_of(&e), "error": e.to_string() }))
        .collect();
    found.extend(float_integers(payload));
    found
}

/// Integer fields written with a fractional part (`10.0`). Values like `10.5`
/// already fail the schema's `integer` type and are not repeated here.
fn float_integers(payload: &Value) -> impl Iterator<Item = Value> + '_ {
    INTEGER_FIELDS.into_iter().filter_map(move |field| {
        let value = payload.get(field)?;
        if value.is_f64() && value.as_f64()?.fract() == 0.0 {
            Some(json!({
                "field": field,
                "error": format!("{value} must be written as an integer"),
            }))
        } else {
            None
        }
    })
}

/// Name the offending field. Missing properties are reported against the
/// parent object, so the field comes from the error kind instead of the path.
fn field_of(error: &ValidationError<'_>) -> String {
    if let ValidationErrorKind::Required { property } = &error.kind {
        if let Some(name) = property.as_str() {
            return name.to_string();
        }
    }

    let path = error.instance_path.to_string();
    match path.trim_start_matches('/') {
        "" => "body".to_string(),
        field => field.to_string(),
    }
}
