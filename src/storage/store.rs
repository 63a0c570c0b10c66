//! Storage implementation
//!
//! BTreeMap-of-BTreeMaps keyed by metric, then timestamp.

use std::collections::BTreeMap;

use super::{QueryResult, Sample, WILDCARD};

/// In-memory metric store
#[derive(Debug, Default)]
pub struct Storage {
    series: BTreeMap<String, BTreeMap<i64, f64>>,
}

impl Storage {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a sample, replacing any value already stored at the same timestamp
    pub fn put(&mut self, key: &str, value: f64, timestamp: i64) {
        self.series
            .entry(key.to_string())
            .or_default()
            .insert(timestamp, value);
    }

    /// Query samples for `key`, or for every metric when `key` is `*`.
    ///
    /// An unknown key yields `{key: []}` rather than an empty map.
    pub fn get(&self, key: &str) -> QueryResult {
        if key == WILDCARD {
            return self
                .series
                .iter()
                .map(|(name, points)| (name.clone(), collect_samples(points)))
                .collect();
        }

        let samples = self
            .series
            .get(key)
            .map(collect_samples)
            .unwrap_or_default();

        let mut result = QueryResult::new();
        result.insert(key.to_string(), samples);
        result
    }

    /// Number of metrics stored
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Total number of samples across all metrics
    pub fn sample_count(&self) -> usize {
        self.series.values().map(BTreeMap::len).sum()
    }
}

fn collect_samples(points: &BTreeMap<i64, f64>) -> Vec<Sample> {
    points
        .iter()
        .map(|(&timestamp, &value)| Sample::new(timestamp, value))
        .collect()
}
