//! Storage Tests
//!
//! Tests verify:
//! - Put then get
//! - Last write wins per (key, timestamp)
//! - Unknown keys and the wildcard query
//! - Timestamp ordering

use metricskv::storage::{Sample, Storage, WILDCARD};

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_storage_is_empty() {
    let storage = Storage::new();
    assert!(storage.is_empty());
    assert_eq!(storage.len(), 0);
    assert_eq!(storage.sample_count(), 0);
}

#[test]
fn test_put_and_get() {
    let mut storage = Storage::new();
    storage.put("cpu", 0.5, 10);

    let result = storage.get("cpu");
    assert_eq!(result.len(), 1);
    assert_eq!(result["cpu"], vec![Sample::new(10, 0.5)]);
}

#[test]
fn test_get_unknown_key_returns_empty_series() {
    let storage = Storage::new();

    let result = storage.get("nope");
    assert_eq!(result.len(), 1);
    assert!(result["nope"].is_empty());
}

#[test]
fn test_put_same_timestamp_overwrites() {
    let mut storage = Storage::new();
    storage.put("cpu", 1.0, 5);
    storage.put("cpu", 2.0, 5);

    assert_eq!(storage.get("cpu")["cpu"], vec![Sample::new(5, 2.0)]);
    assert_eq!(storage.sample_count(), 1);
}

#[test]
fn test_samples_sorted_by_timestamp() {
    let mut storage = Storage::new();
    storage.put("mem", 3.0, 30);
    storage.put("mem", 1.0, 10);
    storage.put("mem", 2.0, 20);
    storage.put("mem", 0.0, -5);

    let timestamps: Vec<i64> = storage.get("mem")["mem"].iter().map(|s| s.timestamp).collect();
    assert_eq!(timestamps, vec![-5, 10, 20, 30]);
}

// =============================================================================
// Wildcard Tests
// =============================================================================

#[test]
fn test_wildcard_returns_every_key() {
    let mut storage = Storage::new();
    storage.put("b", 2.0, 2);
    storage.put("a", 1.0, 1);
    storage.put("b", 1.5, 1);

    let result = storage.get(WILDCARD);
    assert_eq!(result.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    assert_eq!(result["a"], vec![Sample::new(1, 1.0)]);
    assert_eq!(result["b"], vec![Sample::new(1, 1.5), Sample::new(2, 2.0)]);
}

#[test]
fn test_wildcard_on_empty_storage() {
    let storage = Storage::new();
    assert!(storage.get(WILDCARD).is_empty());
}

#[test]
fn test_keys_are_independent() {
    let mut storage = Storage::new();
    storage.put("a", 1.0, 1);
    storage.put("b", 9.0, 1);

    assert_eq!(storage.get("a")["a"], vec![Sample::new(1, 1.0)]);
    assert_eq!(storage.get("b")["b"], vec![Sample::new(1, 9.0)]);
    assert_eq!(storage.len(), 2);
}
