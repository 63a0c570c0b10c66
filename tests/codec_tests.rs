//! Codec Tests
//!
//! Tests for request decoding and reply encoding.

use metricskv::protocol::{
    decode_reply, decode_request, decode_samples, encode_command, encode_error, encode_reply,
    Command, CommandResult, CommandType, Reply, Status,
};
use metricskv::storage::{QueryResult, Sample};
use metricskv::MetricsError;

fn put(key: &str, value: f64, timestamp: i64) -> Command {
    Command::Put {
        key: key.to_string(),
        value,
        timestamp,
    }
}

fn get(key: &str) -> Command {
    Command::Get {
        key: key.to_string(),
    }
}

// =============================================================================
// Request Decoding Tests
// =============================================================================

#[test]
fn test_decode_put_and_get_batch() {
    let commands = decode_request("put a 1.0 1\nget a\n").unwrap();
    assert_eq!(commands, vec![put("a", 1.0, 1), get("a")]);
}

#[test]
fn test_decode_wildcard_get() {
    assert_eq!(decode_request("get *\n").unwrap(), vec![get("*")]);
}

#[test]
fn test_decode_skips_blank_lines() {
    let commands = decode_request("\nput a 2 3\n\n\nget a\n").unwrap();
    assert_eq!(commands, vec![put("a", 2.0, 3), get("a")]);
}

#[test]
fn test_decode_tolerates_crlf_and_extra_spaces() {
    let commands = decode_request("put a   1.5   7\r\nget a\r\n").unwrap();
    assert_eq!(commands, vec![put("a", 1.5, 7), get("a")]);
}

#[test]
fn test_decode_empty_request() {
    assert!(decode_request("\n").unwrap().is_empty());
}

#[test]
fn test_decode_missing_timestamp_fails() {
    assert!(matches!(decode_request("put a 1.0\n"), Err(MetricsError::Parse(_))));
}

#[test]
fn test_decode_extra_token_fails() {
    assert!(matches!(decode_request("put a 1.0 1 2\n"), Err(MetricsError::Parse(_))));
}

#[test]
fn test_decode_unknown_method_fails() {
    assert!(matches!(decode_request("frobnicate a\n"), Err(MetricsError::Parse(_))));
}

#[test]
fn test_decode_method_without_arguments_fails() {
    assert!(matches!(decode_request("bogus\n"), Err(MetricsError::Parse(_))));
    assert!(matches!(decode_request("get\n"), Err(MetricsError::Parse(_))));
}

#[test]
fn test_decode_bad_numbers_fail() {
    assert!(matches!(decode_request("put a x 1\n"), Err(MetricsError::Parse(_))));
    assert!(matches!(decode_request("put a 1.0 1.5\n"), Err(MetricsError::Parse(_))));
}

#[test]
fn test_decode_get_with_two_keys_fails() {
    assert!(matches!(decode_request("get a b\n"), Err(MetricsError::Parse(_))));
}

#[test]
fn test_decode_one_bad_line_fails_whole_batch() {
    let err = decode_request("put a 1 1\nnope\nget a\n").unwrap_err();
    assert_eq!(err.to_string(), "wrong command");
}

// =============================================================================
// Reply Encoding Tests
// =============================================================================

#[test]
fn test_encode_empty_reply() {
    assert_eq!(encode_reply(&[]), "ok\n\n");
}

#[test]
fn test_encode_put_results_have_no_rows() {
    let results = vec![CommandResult::Stored, CommandResult::Stored];
    assert_eq!(encode_reply(&results), "ok\n\n");
}

#[test]
fn test_encode_get_rows_in_order() {
    let mut series = QueryResult::new();
    series.insert("a".to_string(), vec![Sample::new(1, 1.0), Sample::new(2, 2.5)]);
    series.insert("b".to_string(), vec![Sample::new(3, 0.1)]);

    let reply = encode_reply(&[CommandResult::Stored, CommandResult::Samples(series)]);
    assert_eq!(reply, "ok\na 1.0 1\na 2.5 2\nb 0.1 3\n\n");
}

#[test]
fn test_encode_unknown_key_has_no_rows() {
    let mut series = QueryResult::new();
    series.insert("nope".to_string(), Vec::new());

    assert_eq!(encode_reply(&[CommandResult::Samples(series)]), "ok\n\n");
}

#[test]
fn test_encode_error() {
    assert_eq!(encode_error("wrong command"), "error\nwrong command\n\n");
}

// =============================================================================
// Client-side Tests
// =============================================================================

#[test]
fn test_encode_command_lines() {
    assert_eq!(encode_command(&put("x", 1.0, 1)), "put x 1.0 1\n");
    assert_eq!(encode_command(&get("*")), "get *\n");
}

#[test]
fn test_encoded_command_decodes_back() {
    let command = put("load", 0.1 + 0.2, 1_700_000_000);
    let decoded = decode_request(&encode_command(&command)).unwrap();
    assert_eq!(decoded, vec![command]);
}

#[test]
fn test_decode_ok_reply() {
    let reply = decode_reply("ok\na 1.0 1\n\n").unwrap();
    assert_eq!(reply.status, Status::Ok);
    assert_eq!(reply.body, "a 1.0 1");
}

#[test]
fn test_decode_error_reply_into_protocol_error() {
    let reply = decode_reply("error\nwrong command\n\n").unwrap();
    assert_eq!(reply.status, Status::Error);
    match reply.into_body() {
        Err(MetricsError::Protocol(message)) => assert_eq!(message, "wrong command"),
        other => panic!("Expected protocol error, got {:?}", other),
    }
}

#[test]
fn test_decode_reply_builds_ok_and_error() {
    assert_eq!(decode_reply("ok\n\n").unwrap(), Reply::ok(""));
    assert_eq!(decode_reply("error\nboom\n\n").unwrap(), Reply::error("boom"));
}

#[test]
fn test_command_type_and_key() {
    assert_eq!(put("cpu", 1.0, 1).command_type(), CommandType::Put);
    assert_eq!(get("*").command_type(), CommandType::Get);
    assert_eq!(put("cpu", 1.0, 1).key(), "cpu");
    assert_eq!(get("*").key(), "*");
}

#[test]
fn test_decode_reply_unknown_status() {
    assert!(matches!(decode_reply("maybe\n\n"), Err(MetricsError::MalformedReply(_))));
}

#[test]
fn test_decode_samples_keeps_received_order() {
    let result = decode_samples("a 2.0 2\nb 1.0 1\na 1.0 1").unwrap();
    assert_eq!(result["a"], vec![Sample::new(2, 2.0), Sample::new(1, 1.0)]);
    assert_eq!(result["b"], vec![Sample::new(1, 1.0)]);
}

#[test]
fn test_decode_samples_bad_row() {
    assert!(matches!(decode_samples("a 1.0"), Err(MetricsError::MalformedReply(_))));
}
