//! JSON Schema check for the schema library document.
//!
//! The document is checked against `schemas/csv-schema-library.json`
//! (Draft 7, embedded at compile time) before it is normalized, so a
//! malformed feed is reported with every violation at once.

use once_cell::sync::Lazy;
use serde_json::Value;

static LIBRARY_SHAPE: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/csv-schema-library.json"))
        .expect("Invalid embedded schema")
});

/// Validate a JSON value against a JSON Schema.
///
/// # Returns
/// * `Ok(())` when valid
/// * `Err(Vec<String>)` with one message per violation
///
/// # Example
/// ```
/// use serde_json::json;
/// use ifcload::library::validate;
///
/// let schema = json!({
///     "type": "object",
///     "required": ["name"],
///     "properties": { "name": { "type": "string" } }
/// });
///
/// assert!(validate(&schema, &json!({ "name": "Rooms" })).is_ok());
/// assert!(validate(&schema, &json!({ "lod": 300 })).is_err());
/// ```
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check a schema library document against the embedded shape.
pub fn validate_library_shape(document: &Value) -> Result<(), Vec<String>> {
    validate(&LIBRARY_SHAPE, document)
}

/// Quick check against the embedded shape.
pub fn is_valid_library_shape(document: &Value) -> bool {
    jsonschema::draft7::is_valid(&LIBRARY_SHAPE, document)
}
