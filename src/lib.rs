//! # metricskv
//!
//! A small networked time-series metrics store with:
//! - In-memory storage, one value per (metric, timestamp), last write wins
//! - A line-oriented text protocol over TCP
//! - A thread-per-connection server with batch-atomic execution
//! - A blocking request/response client
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Client                                │
//! │              put / get  →  request lines                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ TCP
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 Server / Connection                          │
//! │        (buffer until '\n', one thread per client)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │    Codec    │          │  Executor   │
//!   │ (text <-> ) │          │ (per batch) │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │   Storage   │
//!                           │   (Mutex)   │
//!                           └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use metricskv::network::Client;
//!
//! # fn main() -> metricskv::Result<()> {
//! let mut client = Client::connect("127.0.0.1:8888", None)?;
//! client.put("cpu.load", 0.5, 1_700_000_000)?;
//! let series = client.get("*")?;
//! println!("{:?}", series);
//! client.close()?;
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod storage;
pub mod protocol;
pub mod executor;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{MetricsError, Result};
pub use config::Config;
pub use executor::Executor;
pub use network::{Client, Server};
pub use storage::{Sample, Storage};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of metricskv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
