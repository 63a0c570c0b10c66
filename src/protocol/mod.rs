//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (UTF-8 text, newline-delimited)
//!
//! ### Request Format
//! One command per line. Several lines sent together form a batch and are
//! answered with a single reply.
//! ```text
//! put <key> <value> <timestamp>\n
//! get <key>\n
//! ```
//!
//! ### Reply Format
//! ```text
//! ok\n
//! <key> <value> <timestamp>\n      (zero or more rows)
//! \n
//!
//! error\n
//! <message>\n
//! \n
//! ```
//!
//! ### Value Format
//! Values use the `{:?}` rendering of `f64`: the shortest text that parses back
//! to the same number, always with a `.` or exponent (`1.0`, `0.25`, `1e300`).

mod command;
mod response;
mod codec;

pub use command::{Command, CommandResult, CommandType};
pub use response::{Reply, Status};
pub use codec::{
    decode_reply, decode_request, decode_samples, encode_command, encode_error, encode_reply,
    format_value, REPLY_TERMINATOR, REQUEST_TERMINATOR,
};
