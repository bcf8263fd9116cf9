//! Field remapping applied before construction
//!
//! Each function takes the serialized form of a study graph object and
//! returns the field set of the FHIR target.

use crate::error::BuildError;
use serde_json::{Map, Value};

fn object(target: &'static str, fields: Value) -> Result<Map<String, Value>, BuildError> {
    match fields {
        Value::Object(map) => Ok(map),
        other => Err(BuildError::Invalid {
            target,
            reason: format!("expected an object, got {}", other),
        }),
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<Value> {
    map.remove(key).filter(|v| !is_empty_value(v))
}

/// Study graph code: `codeSystem → system`, `codeSystemVersion → version`,
/// `decode → display`
pub fn usdm_code_fields(fields: Value) -> Result<Value, BuildError> {
    let mut code = object("Coding", fields)?;
    let mut result = Map::new();
    for (from, to) in [
        ("codeSystem", "system"),
        ("codeSystemVersion", "version"),
        ("code", "code"),
        ("decode", "display"),
    ] {
        if let Some(value) = take_string(&mut code, from) {
            result.insert(to.to_string(), value);
        }
    }
    Ok(Value::Object(result))
}

/// Study graph address: empty fields dropped, `lines → line`,
/// `country → country.decode`
pub fn address_fields(fields: Value) -> Result<Value, BuildError> {
    let address = object("Address", fields)?;
    let mut result = Map::new();
    for (key, value) in address {
        if key == "id" || key == "instanceType" || is_empty_value(&value) {
            continue;
        }
        match key.as_str() {
            "lines" => {
                let lines: Vec<Value> = value
                    .as_array()
                    .into_iter()
                    .flatten()
                    .filter(|line| !is_empty_value(line))
                    .cloned()
                    .collect();
                if !lines.is_empty() {
                    result.insert("line".to_string(), Value::Array(lines));
                }
            }
            "country" => {
                if let Some(decode) = value.get("decode").filter(|d| !is_empty_value(d)) {
                    result.insert("country".to_string(), decode.clone());
                }
            }
            _ => {
                result.insert(key, value);
            }
        }
    }
    Ok(Value::Object(result))
}

/// Study graph organization: name is the label when set, the legal address
/// becomes the first contact's address
pub fn organization_fields(fields: Value) -> Result<Value, BuildError> {
    let mut organization = object("Organization", fields)?;
    let mut result = Map::new();
    result.insert("resourceType".to_string(), Value::from("Organization"));
    if let Some(id) = take_string(&mut organization, "id") {
        result.insert("id".to_string(), id);
    }
    let name = take_string(&mut organization, "label")
        .or_else(|| take_string(&mut organization, "name"));
    if let Some(name) = name {
        result.insert("name".to_string(), name);
    }
    if let Some(address) = organization.remove("legalAddress").filter(|a| !a.is_null()) {
        let parsed: usdm_model::Address = serde_json::from_value(address.clone())
            .map_err(|source| BuildError::Shape {
                target: "Address",
                source,
            })?;
        let address = address_fields(address)?;
        if !parsed.is_empty() && !is_empty_value(&address) {
            result.insert(
                "contact".to_string(),
                Value::Array(vec![serde_json::json!({ "address": address })]),
            );
        }
    }
    Ok(Value::Object(result))
}

/// Extensions always carry a nested extension list
pub fn extension_fields(fields: Value) -> Result<Value, BuildError> {
    let mut extension = object("Extension", fields)?;
    if extension.get("extension").map_or(true, Value::is_null) {
        extension.insert("extension".to_string(), Value::Array(Vec::new()));
    }
    Ok(Value::Object(extension))
}
