//! Classification record validation
//!
//! Turns the untyped record produced by the extractor into a trusted
//! [`ClassificationResult`]. This is the only path from classifier output to
//! a result, so an unvalidated label can never reach a caller.

use serde_json::Value;
use snapsort_common::{ClassName, ClassificationResult};
use thiserror::Error;

pub const CLASS_NAME_KEY: &str = "className";

/// Validation failures, in check order
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("response is not a JSON object (found {found})")]
    NotAnObject { found: &'static str },

    #[error("response has no 'className' key")]
    MissingClassName,

    #[error("invalid className {value}; allowed values: {allowed}", allowed = ClassName::allowed_labels())]
    InvalidClassName { value: String },
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Check that `value` is `{"className": <label>}` with a label from the taxonomy
///
/// Extra keys are ignored.
pub fn validate_classification(value: &Value) -> Result<ClassificationResult, ValidationError> {
    let object = value.as_object().ok_or(ValidationError::NotAnObject {
        found: json_kind(value),
    })?;

    let raw = object
        .get(CLASS_NAME_KEY)
        .ok_or(ValidationError::MissingClassName)?;

    let class_name = raw
        .as_str()
        .and_then(|label| label.parse::<ClassName>().ok())
        .ok_or_else(|| ValidationError::InvalidClassName {
            value: raw.to_string(),
        })?;

    Ok(ClassificationResult::new(class_name))
}
