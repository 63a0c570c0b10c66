//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! Server side: [`decode_request`] turns a buffered batch into commands and
//! [`encode_reply`] / [`encode_error`] produce the reply text.
//! Client side: [`encode_command`] writes one request line, [`decode_reply`]
//! splits a reply into status and body and [`decode_samples`] parses the rows.

use std::fmt::Write as _;

use super::{Command, CommandResult, CommandType, Reply, Status};
use crate::error::{MetricsError, Result};
use crate::storage::{QueryResult, Sample};

/// A request batch is complete once the buffered text ends with this
pub const REQUEST_TERMINATOR: u8 = b'\n';

/// Every reply ends with an empty line
pub const REPLY_TERMINATOR: &[u8] = b"\n\n";

/// Render a value the same way on both ends of the connection.
///
/// `{:?}` on `f64` is the shortest round-trip representation and always keeps
/// a decimal point or exponent, so `1.0` never degrades to `1`.
pub fn format_value(value: f64) -> String {
    format!("{:?}", value)
}

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Encode a single command as a request line
pub fn encode_command(command: &Command) -> String {
    let method = command.command_type().method();
    match command {
        Command::Put {
            value, timestamp, ..
        } => format!(
            "{} {} {} {}\n",
            method,
            command.key(),
            format_value(*value),
            timestamp
        ),
        Command::Get { .. } => format!("{} {}\n", method, command.key()),
    }
}

/// Decode a request batch into commands, in line order.
///
/// Blank lines are skipped. The first malformed line fails the whole batch.
pub fn decode_request(text: &str) -> Result<Vec<Command>> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(decode_line)
        .collect()
}

/// Decode one trimmed, non-empty request line
fn decode_line(line: &str) -> Result<Command> {
    let wrong = || MetricsError::Parse(line.to_string());

    let (method, params) = line.split_once(' ').ok_or_else(wrong)?;

    if method == CommandType::Put.method() {
        let mut tokens = params.split_whitespace();
        let (key, value, timestamp) = match (tokens.next(), tokens.next(), tokens.next(), tokens.next()) {
            (Some(key), Some(value), Some(timestamp), None) => (key, value, timestamp),
            _ => return Err(wrong()),
        };

        Ok(Command::Put {
            key: key.to_string(),
            value: value.parse::<f64>().map_err(|_| wrong())?,
            timestamp: timestamp.parse::<i64>().map_err(|_| wrong())?,
        })
    } else if method == CommandType::Get.method() {
        // A key with embedded whitespace could never be echoed back as a row
        let key = params.trim();
        if key.is_empty() || key.contains(char::is_whitespace) {
            return Err(wrong());
        }

        Ok(Command::Get {
            key: key.to_string(),
        })
    } else {
        Err(wrong())
    }
}

// =============================================================================
// Reply Encoding/Decoding
// =============================================================================

/// Encode the results of one batch as a single `ok` reply.
///
/// Get results contribute one row per sample, in the order given; put results
/// contribute nothing.
pub fn encode_reply(results: &[CommandResult]) -> String {
    let mut reply = String::from("ok\n");

    for result in results {
        let CommandResult::Samples(series) = result else {
            continue;
        };
        for (key, samples) in series {
            for sample in samples {
                // Writing into a String cannot fail
                let _ = writeln!(
                    reply,
                    "{} {} {}",
                    key,
                    format_value(sample.value),
                    sample.timestamp
                );
            }
        }
    }

    reply.push('\n');
    reply
}

/// Encode an `error` reply carrying `message`
pub fn encode_error(message: &str) -> String {
    format!("{}\n{}\n\n", Status::Error.as_str(), message)
}

/// Split a complete reply into its status line and body
pub fn decode_reply(text: &str) -> Result<Reply> {
    let (status_line, body) = text.split_once('\n').ok_or_else(|| {
        MetricsError::MalformedReply(format!("missing status line in {:?}", text))
    })?;

    let status = Status::parse(status_line.trim()).ok_or_else(|| {
        MetricsError::MalformedReply(format!("unknown status {:?}", status_line))
    })?;

    let body = body.trim();
    Ok(match status {
        Status::Ok => Reply::ok(body),
        Status::Error => Reply::error(body),
    })
}

/// Parse the rows of an `ok` body into per-key samples.
///
/// Samples keep the order they were received in.
pub fn decode_samples(body: &str) -> Result<QueryResult> {
    let mut result = QueryResult::new();

    for row in body.lines().map(str::trim).filter(|row| !row.is_empty()) {
        let malformed = || MetricsError::MalformedReply(format!("bad row {:?}", row));

        let mut tokens = row.split_whitespace();
        let (key, value, timestamp) = match (tokens.next(), tokens.next(), tokens.next(), tokens.next()) {
            (Some(key), Some(value), Some(timestamp), None) => (key, value, timestamp),
            _ => return Err(malformed()),
        };

        let value = value.parse::<f64>().map_err(|_| malformed())?;
        let timestamp = timestamp.parse::<i64>().map_err(|_| malformed())?;

        result
            .entry(key.to_string())
            .or_default()
            .push(Sample::new(timestamp, value));
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_value_keeps_fraction() {
        assert_eq!(format_value(1.0), "1.0");
        assert_eq!(format_value(0.1), "0.1");
        assert_eq!(format_value(-2.5), "-2.5");
    }

    #[test]
    fn test_format_value_round_trips() {
        for value in [0.1 + 0.2, 1e300, -1e-300, f64::MAX, 123456789.123456789] {
            assert_eq!(format_value(value).parse::<f64>().unwrap(), value);
        }
    }

    #[test]
    fn test_decode_line_requires_separator() {
        assert!(matches!(decode_line("get"), Err(MetricsError::Parse(_))));
    }
}
