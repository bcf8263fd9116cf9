//! Resource builders
//!
//! One generic [`Factory`] parameterised by the target model and an optional
//! pre-processing step replaces a family of per-resource builders. Inputs are
//! keyword-structured JSON; serde deserialisation into the typed model is the
//! shape check. Failures come back as [`BuildError`] and are recorded in the
//! diagnostics sink with the factory's location.

mod builders;
pub mod prepare;

pub use builders::*;

use crate::diagnostics::{Diagnostics, Location};
use crate::error::BuildError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;

/// Pre-processing applied to the input fields before construction
pub type Prepare = fn(Value) -> Result<Value, BuildError>;

/// Builder for one target type
pub struct Factory<T> {
    target: &'static str,
    location: Location,
    prepare: Option<Prepare>,
    required: &'static [&'static str],
    _target: PhantomData<fn() -> T>,
}

impl<T> Factory<T> {
    pub const fn new(target: &'static str, module: &'static str) -> Self {
        Self {
            target,
            location: Location::new(module, "build"),
            prepare: None,
            required: &[],
            _target: PhantomData,
        }
    }

    /// Apply `prepare` to the input before construction
    pub const fn with_prepare(mut self, prepare: Prepare) -> Self {
        self.prepare = Some(prepare);
        self
    }

    /// Fields that must be present and non-empty after preparation
    pub const fn requires(mut self, fields: &'static [&'static str]) -> Self {
        self.required = fields;
        self
    }

    pub fn target(&self) -> &'static str {
        self.target
    }
}

impl<T> Factory<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Build the target, recording any failure
    pub fn build(&self, fields: Value, diagnostics: &mut Diagnostics) -> Result<T, BuildError> {
        let result = self.try_build(fields);
        if let Err(ref err) = result {
            diagnostics.exception(
                format!("Failed to build {}", self.target),
                self.location,
                err,
            );
        }
        result
    }

    /// Build the target without touching diagnostics
    pub fn try_build(&self, fields: Value) -> Result<T, BuildError> {
        if !fields.is_object() {
            return Err(BuildError::Invalid {
                target: self.target,
                reason: format!("expected an object of fields, got {}", kind(&fields)),
            });
        }
        let fields = match self.prepare {
            Some(prepare) => prepare(fields)?,
            None => fields,
        };
        for field in self.required {
            if is_blank(fields.get(*field)) {
                return Err(BuildError::MissingField {
                    target: self.target,
                    field: field.to_string(),
                });
            }
        }
        let item: T = serde_json::from_value(fields.clone()).map_err(|source| BuildError::Shape {
            target: self.target,
            source,
        })?;
        let output = serde_json::to_value(&item).map_err(|e| BuildError::Unexpected {
            target: self.target,
            reason: e.to_string(),
        })?;
        let unknown = unknown_fields(&fields, &output);
        if !unknown.is_empty() {
            return Err(BuildError::Invalid {
                target: self.target,
                reason: format!("unknown field(s) {}", unknown.join(", ")),
            });
        }
        Ok(item)
    }
}

/// Null, empty strings and empty containers count as missing
fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
        Some(_) => false,
    }
}

/// Top-level input keys carrying data that the model dropped
fn unknown_fields(input: &Value, output: &Value) -> Vec<String> {
    let (Some(input), Some(output)) = (input.as_object(), output.as_object()) else {
        return Vec::new();
    };
    input
        .iter()
        .filter(|(key, value)| !is_blank(Some(value)) && !output.contains_key(key.as_str()))
        .map(|(key, _)| key.clone())
        .collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
