use serde_json::Value;

use crate::model::RecordKind;

/// Structural check of a normalized record against its table schema.
///
/// Required columns must be present strings. Optional columns may be
/// missing or null, otherwise they must be strings too. Nothing is
/// coerced and references to other tables are not checked here.
pub fn is_valid(record: &Value, kind: RecordKind) -> bool {
    let Some(obj) = record.as_object() else {
        return false;
    };

    kind.schema().columns.iter().all(|col| match obj.get(col.name) {
        Some(Value::String(_)) => true,
        None | Some(Value::Null) => !col.required,
        Some(_) => false,
    })
}
