pub mod client;
pub mod snapshot;

pub use client::*;
pub use snapshot::*;

use serde_json::Value;

use crate::error::{ImportError, Result};
use crate::model::RecordKind;

/// Anything that can hand over the raw records of one dataset
pub trait Source {
    fn fetch(&self, kind: RecordKind) -> Result<Vec<Value>>;
}

/// Decode a payload that must be a JSON array of records
pub(crate) fn decode_array(text: &str, origin: &str) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_str(text).map_err(|e| ImportError::Shape {
        origin: origin.to_string(),
        detail: e.to_string(),
    })?;

    match value {
        Value::Array(items) => Ok(items),
        other => Err(ImportError::Shape {
            origin: origin.to_string(),
            detail: format!("got {}", json_type(&other)),
        }),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_array() {
        let items = decode_array(r#"[{"oblast": "BLG"}, {"oblast": "BGS"}]"#, "regions").unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_object_payload_is_a_shape_error() {
        let err = decode_array(r#"{"oblast": "BLG"}"#, "regions").unwrap_err();
        assert!(matches!(err, ImportError::Shape { .. }));
        assert!(err.to_string().contains("an object"));
    }

    #[test]
    fn test_invalid_json_is_a_shape_error() {
        assert!(matches!(
            decode_array("<html>", "regions"),
            Err(ImportError::Shape { .. })
        ));
    }
}
