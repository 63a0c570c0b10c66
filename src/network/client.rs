//! Blocking Client
//!
//! Synchronous request/response client for the metrics server.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::BytesMut;

use crate::error::{MetricsError, Result};
use crate::protocol::{decode_reply, decode_samples, encode_command, Command, REPLY_TERMINATOR};
use crate::storage::{QueryResult, WILDCARD};

/// Size of a single socket read
const READ_CHUNK: usize = 1024;

/// A connection to a metrics server.
///
/// One request is in flight at a time. After a [`MetricsError::Socket`] the
/// framing state is unknown and the client must not be reused.
#[derive(Debug)]
pub struct Client {
    stream: TcpStream,
    buffer: BytesMut,
}

impl Client {
    /// Connect to `addr`, waiting at most `timeout` when one is given.
    ///
    /// The timeout also bounds every later read and write.
    pub fn connect<A: ToSocketAddrs>(addr: A, timeout: Option<Duration>) -> Result<Self> {
        let stream = match timeout {
            None => TcpStream::connect(addr).map_err(|e| MetricsError::socket("connect", e))?,
            Some(timeout) => connect_timeout(addr, timeout)?,
        };

        stream
            .set_read_timeout(timeout)
            .and_then(|_| stream.set_write_timeout(timeout))
            .and_then(|_| stream.set_nodelay(true))
            .map_err(|e| MetricsError::socket("configure", e))?;

        Ok(Self {
            stream,
            buffer: BytesMut::with_capacity(READ_CHUNK),
        })
    }

    /// Store a sample
    ///
    /// Keys that are empty, contain whitespace or are `*` are refused with
    /// [`MetricsError::InvalidKey`] before anything is sent.
    pub fn put(&mut self, key: &str, value: f64, timestamp: i64) -> Result<()> {
        check_key(key)?;
        if key == WILDCARD {
            return Err(MetricsError::InvalidKey(key.to_string()));
        }

        let command = Command::Put {
            key: key.to_string(),
            value,
            timestamp,
        };
        self.request(&command)?;
        Ok(())
    }

    /// Store a sample stamped with the current Unix time
    pub fn put_now(&mut self, key: &str, value: f64) -> Result<()> {
        self.put(key, value, unix_now())
    }

    /// Fetch samples for `key`, or every metric with `*`.
    ///
    /// Unknown keys come back as an empty map. Samples keep the order the
    /// server sent them in.
    pub fn get(&mut self, key: &str) -> Result<QueryResult> {
        check_key(key)?;

        let command = Command::Get {
            key: key.to_string(),
        };
        let body = self.request(&command)?;
        if body.is_empty() {
            return Ok(QueryResult::new());
        }
        decode_samples(&body)
    }

    /// Close the connection
    pub fn close(self) -> Result<()> {
        self.stream
            .shutdown(Shutdown::Both)
            .map_err(|e| MetricsError::socket("close", e))
    }

    /// Send one command and return the body of its `ok` reply
    fn request(&mut self, command: &Command) -> Result<String> {
        let line = encode_command(command);
        tracing::trace!("Sending {:?}", line);

        self.stream
            .write_all(line.as_bytes())
            .and_then(|_| self.stream.flush())
            .map_err(|e| MetricsError::socket("send", e))?;

        let text = self.read_reply()?;
        decode_reply(&text)?.into_body()
    }

    /// Read until the buffer ends with the reply terminator
    fn read_reply(&mut self) -> Result<String> {
        self.buffer.clear();

        let mut chunk = [0u8; READ_CHUNK];
        while !self.buffer.ends_with(REPLY_TERMINATOR) {
            let read = match self.stream.read(&mut chunk) {
                Ok(0) => {
                    return Err(MetricsError::socket(
                        "receive",
                        io::Error::new(io::ErrorKind::UnexpectedEof, "server closed the connection"),
                    ))
                }
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(MetricsError::socket("receive", e)),
            };
            self.buffer.extend_from_slice(&chunk[..read]);
        }

        let reply = self.buffer.split();
        String::from_utf8(reply.to_vec())
            .map_err(|e| MetricsError::MalformedReply(format!("reply is not UTF-8: {}", e)))
    }
}

/// A key must be exactly one token, or it would spill into extra request lines
fn check_key(key: &str) -> Result<()> {
    if key.is_empty() || key.contains(char::is_whitespace) {
        return Err(MetricsError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Try every resolved address in turn, like `TcpStream::connect` does
fn connect_timeout<A: ToSocketAddrs>(addr: A, timeout: Duration) -> Result<TcpStream> {
    let addrs = addr
        .to_socket_addrs()
        .map_err(|e| MetricsError::socket("resolve", e))?;

    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }

    Err(MetricsError::socket(
        "connect",
        last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "address resolved to nothing")
        }),
    ))
}

/// Current Unix time in whole seconds
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
