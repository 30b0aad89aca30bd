//! Turning raw source payloads into typed records

pub mod normalize;
pub mod validate;

pub use normalize::normalize;
pub use validate::is_valid;

use serde_json::Value;

use crate::model::Record;

/// Records that survived normalization and validation
#[derive(Debug)]
pub struct Parsed<R> {
    pub records: Vec<R>,
    /// Raw records dropped before or during validation
    pub rejected: usize,
}

/// Normalize, validate and convert a raw payload.
///
/// Validation is a filter, not a fault: a record that fails any step
/// is counted in `rejected` and skipped.
pub fn parse_records<R: Record>(raw: &[Value]) -> Parsed<R> {
    let mut records = Vec::with_capacity(raw.len());

    for item in raw {
        let Some(normalized) = normalize(R::KIND, item) else {
            continue;
        };
        if !is_valid(&normalized, R::KIND) {
            continue;
        }
        if let Ok(record) = serde_json::from_value::<R>(normalized) {
            records.push(record);
        }
    }

    Parsed {
        rejected: raw.len() - records.len(),
        records,
    }
}
