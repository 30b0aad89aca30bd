use serde_json::{json, Value};

use crate::model::RecordKind;
use crate::schema::{code_prefix, MUNICIPALITY_CODE_LEN, REGION_CODE_LEN};

/// Map a raw source record onto the column names of its table.
///
/// Returns `None` when the record lacks the source fields the mapping
/// needs. The result is not validated yet.
pub fn normalize(kind: RecordKind, raw: &Value) -> Option<Value> {
    match kind {
        RecordKind::Region => Some(json!({
            "code": field(raw, "oblast"),
            "name": field(raw, "name"),
        })),
        RecordKind::Municipality => {
            let code = non_empty_str(raw, "obshtina")?;
            if !truthy(raw.get("name")) {
                return None;
            }
            Some(json!({
                "code": code,
                "name": field(raw, "name"),
                "region_code": code_prefix(code, REGION_CODE_LEN),
            }))
        }
        RecordKind::TownHall => {
            let code = non_empty_str(raw, "kmetstvo")?;
            if !truthy(raw.get("name")) {
                return None;
            }
            Some(json!({
                "code": code,
                "name": field(raw, "name"),
                "municipality_code": code_prefix(code, MUNICIPALITY_CODE_LEN),
            }))
        }
        RecordKind::TerritorialUnit => {
            if !["ekatte", "name", "kmetstvo"]
                .iter()
                .all(|key| truthy(raw.get(*key)))
            {
                return None;
            }
            Some(json!({
                "ekatte": field(raw, "ekatte"),
                "name": field(raw, "name"),
                "type": unit_type(raw.get("kind")),
                "town_hall_code": field(raw, "kmetstvo"),
            }))
        }
    }
}

fn field(raw: &Value, key: &str) -> Value {
    raw.get(key).cloned().unwrap_or(Value::Null)
}

fn non_empty_str<'a>(raw: &'a Value, key: &str) -> Option<&'a str> {
    raw.get(key).and_then(|v| v.as_str()).filter(|s| !s.is_empty())
}

/// Loose presence check: missing, null, false, zero and "" count as absent
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map_or(true, |f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// Settlement type arrives as a string or a number; store it as text
fn unit_type(value: Option<&Value>) -> Value {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Value::String(s.clone()),
        Some(Value::Number(n)) => Value::String(n.to_string()),
        _ => Value::Null,
    }
}
