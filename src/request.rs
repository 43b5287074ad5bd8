//! # Request Schema Validation
//!
//! Cheap top-level shape check run before the document parser. A request body
//! looks like:
//!
//! ```text
//! {
//!   "tb365Data": { "projectName", "version", "canvasState": { "elements": [], "canvasSize": {...} } },
//!   "data":      { ... business data ... },      (optional)
//!   "options":   { ... ConvertOptions ... }       (optional)
//! }
//! ```
//!
//! Element-level validation is expensive, so it never runs against a body that
//! fails here. Any violation is a hard failure.

use serde_json::Value;

use crate::error::Tb365Error;

/// Collect every top-level violation in a request body.
///
/// An empty list means the parser may assume `tb365Data.canvasState.elements`
/// is an array and `canvasSize` holds two positive numbers.
pub fn violations(body: &Value) -> Vec<String> {
    let mut errors = Vec::new();

    let Some(body) = body.as_object() else {
        errors.push("request body must be a JSON object".to_string());
        return errors;
    };

    match body.get("tb365Data") {
        None | Some(Value::Null) => errors.push("tb365Data is required".to_string()),
        Some(Value::Object(doc)) => {
            if doc.get("projectName").is_none_or(Value::is_null) {
                errors.push("tb365Data.projectName is required".to_string());
            }
            if doc.get("version").is_none_or(Value::is_null) {
                errors.push("tb365Data.version is required".to_string());
            }
            match doc.get("canvasState") {
                Some(Value::Object(state)) => check_canvas_state(state, &mut errors),
                None | Some(Value::Null) => {
                    errors.push("tb365Data.canvasState is required".to_string())
                }
                Some(_) => errors.push("tb365Data.canvasState must be an object".to_string()),
            }
        }
        Some(_) => errors.push("tb365Data must be an object".to_string()),
    }

    match body.get("data") {
        None | Some(Value::Null) | Some(Value::Object(_)) => {}
        Some(_) => errors.push("data must be an object".to_string()),
    }
    match body.get("options") {
        None | Some(Value::Null) | Some(Value::Object(_)) => {}
        Some(_) => errors.push("options must be an object".to_string()),
    }

    errors
}

fn check_canvas_state(state: &serde_json::Map<String, Value>, errors: &mut Vec<String>) {
    if !state.get("elements").is_some_and(Value::is_array) {
        errors.push("tb365Data.canvasState.elements must be an array".to_string());
    }

    let Some(size) = state.get("canvasSize").and_then(Value::as_object) else {
        errors.push("tb365Data.canvasState.canvasSize is required".to_string());
        return;
    };
    for dim in ["width", "height"] {
        match size.get(dim).and_then(Value::as_f64) {
            Some(v) if v > 0.0 => {}
            Some(_) => errors.push(format!(
                "tb365Data.canvasState.canvasSize.{} must be a positive number",
                dim
            )),
            None => errors.push(format!(
                "tb365Data.canvasState.canvasSize.{} is required",
                dim
            )),
        }
    }
}

/// Validate a request body, failing with every violation found.
pub fn validate(body: &Value) -> Result<(), Tb365Error> {
    let errors = violations(body);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Tb365Error::Request(errors))
    }
}
