//! Storage Module
//!
//! In-memory time-series storage for metric samples.
//!
//! ## Responsibilities
//! - Keep one value per (key, timestamp), last write wins
//! - Answer queries for one key or for every key (`*`)
//! - Return samples ordered by timestamp
//!
//! ## Data Structure Choice
//! Nested BTreeMaps: keys ordered for deterministic wildcard replies,
//! timestamps ordered so reads never sort. The store does no locking of its
//! own; the server shares it as [`SharedStorage`].

mod store;

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

pub use store::Storage;

/// Key that selects every metric in a query. Never stored.
pub const WILDCARD: &str = "*";

/// A single (timestamp, value) point of a metric
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Unix timestamp in seconds
    pub timestamp: i64,

    /// Measured value
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Result of a query: metric key to its samples, ascending by timestamp
pub type QueryResult = BTreeMap<String, Vec<Sample>>;

/// Storage handle shared by every connection of a server
pub type SharedStorage = Arc<Mutex<Storage>>;

/// Wrap a storage instance for sharing across connections
pub fn shared(storage: Storage) -> SharedStorage {
    Arc::new(Mutex::new(storage))
}
