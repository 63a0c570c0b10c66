//! Reply definitions
//!
//! Client-side view of a reply read off the wire.

use crate::error::{MetricsError, Result};

/// Reply status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Error,
}

impl Status {
    /// Status token used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::Error => "error",
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "ok" => Some(Status::Ok),
            "error" => Some(Status::Error),
            _ => None,
        }
    }
}

/// A complete reply: status plus everything after the status line
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// Status code
    pub status: Status,

    /// Rows for `ok`, the message for `error`; surrounding whitespace removed
    pub body: String,
}

impl Reply {
    /// Create an OK reply
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: Status::Ok,
            body: body.into(),
        }
    }

    /// Create an ERROR reply
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            body: message.into(),
        }
    }

    /// Body of an OK reply, or the server's message as a protocol error
    pub fn into_body(self) -> Result<String> {
        match self.status {
            Status::Ok => Ok(self.body),
            Status::Error => Err(MetricsError::Protocol(self.body)),
        }
    }
}
