//! Assertions over harvested records.

use std::collections::HashSet;

use crate::models::{ReviewRecord, SENTINEL_NAME};

/// Asserts that no two records share a reviewer name.
///
/// # Panics
///
/// Panics with the first duplicated name.
pub fn assert_unique_names(records: &[ReviewRecord]) {
    let mut seen = HashSet::new();
    for record in records {
        assert!(
            seen.insert(record.name.as_str()),
            "duplicate reviewer name: {:?}",
            record.name
        );
    }
}

/// Asserts that no record is a placeholder row.
///
/// # Panics
///
/// Panics if a record has an empty or sentinel name.
pub fn assert_no_placeholders(records: &[ReviewRecord]) {
    for record in records {
        assert!(!record.name.is_empty(), "record with empty name: {record:?}");
        assert_ne!(record.name, SENTINEL_NAME, "sentinel row leaked: {record:?}");
    }
}

/// Asserts the reviewer names, in order.
///
/// # Panics
///
/// Panics if the names differ.
pub fn assert_names(records: &[ReviewRecord], expected: &[&str]) {
    let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, expected, "reviewer names differ");
}
