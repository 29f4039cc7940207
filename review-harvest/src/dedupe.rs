//! Deduplication of harvested records by reviewer name.

use std::collections::HashSet;

use crate::models::ReviewRecord;

/// Keeps the first record for each reviewer name, preserving order.
#[must_use]
pub fn dedupe(records: Vec<ReviewRecord>) -> Vec<ReviewRecord> {
    let mut seen: HashSet<String> = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert(record.name.clone()))
        .collect()
}
