//! Command definitions
//!
//! Represents commands from clients and what executing them produces.

use crate::storage::QueryResult;

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Put,
    Get,
}

impl CommandType {
    /// Method token used on the wire
    pub fn method(&self) -> &'static str {
        match self {
            CommandType::Put => "put",
            CommandType::Get => "get",
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Store a sample
    Put {
        key: String,
        value: f64,
        timestamp: i64,
    },

    /// Query one metric, or all of them with `*`
    Get { key: String },
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Put { .. } => CommandType::Put,
            Command::Get { .. } => CommandType::Get,
        }
    }

    /// The metric key the command addresses
    pub fn key(&self) -> &str {
        match self {
            Command::Put { key, .. } | Command::Get { key } => key,
        }
    }
}

/// Outcome of executing one command
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// A put succeeded; contributes no reply rows
    Stored,

    /// Samples returned by a get
    Samples(QueryResult),
}
