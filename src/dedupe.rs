use std::collections::HashSet;
use std::hash::Hash;

use crate::model::Record;

/// Stable filter keeping the first record seen for each key
pub fn dedupe_by<T, K, F>(records: Vec<T>, mut key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(key(record)))
        .collect()
}

/// Deduplicate records on their natural key
pub fn dedupe<R: Record>(records: Vec<R>) -> Vec<R> {
    dedupe_by(records, |r| r.key().to_owned())
}
