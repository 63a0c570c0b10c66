//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{self, BufWriter, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use bytes::BytesMut;

use crate::error::{MetricsError, Result};
use crate::executor::Executor;
use crate::protocol::{decode_request, encode_error, encode_reply, REQUEST_TERMINATOR};
use crate::storage::SharedStorage;

/// Size of a single socket read
const READ_CHUNK: usize = 1024;

/// What the accumulated bytes amount to so far
#[derive(Debug, PartialEq)]
enum Framing<'a> {
    /// Not yet a full batch (split UTF-8 character or no trailing newline)
    Incomplete,

    /// A full batch of request text
    Complete(&'a str),

    /// Newline-terminated but not UTF-8
    Invalid,
}

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader
    reader: TcpStream,

    /// TCP stream writer (buffered so each reply goes out in one write)
    writer: BufWriter<TcpStream>,

    /// Bytes received since the last complete batch
    buffer: BytesMut,

    /// Storage shared with every other connection
    storage: SharedStorage,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, storage: SharedStorage) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: read_stream,
            writer: BufWriter::new(stream),
            buffer: BytesMut::with_capacity(READ_CHUNK),
            storage,
            peer_addr,
        })
    }

    /// Configure connection timeouts (0 disables a timeout)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let to_duration = |ms: u64| (ms > 0).then(|| Duration::from_millis(ms));

        self.reader.set_read_timeout(to_duration(read_ms))?;
        self.writer.get_ref().set_write_timeout(to_duration(write_ms))?;

        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Returns `Ok` when the client disconnects, `Err` on any other transport
    /// failure. Bad requests are answered and never end the connection.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        let mut chunk = [0u8; READ_CHUNK];
        loop {
            let read = match self.reader.read(&mut chunk) {
                Ok(0) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Ok(n) => n,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                // WouldBlock on unix, TimedOut on windows
                Err(ref e)
                    if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) =>
                {
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(e) if is_disconnect(&e) => {
                    tracing::debug!("Connection to {} closed: {}", self.peer_addr, e);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    return Err(MetricsError::socket("receive", e));
                }
            };
            self.buffer.extend_from_slice(&chunk[..read]);

            let reply = match frame(&self.buffer) {
                Framing::Incomplete => continue,
                Framing::Complete(text) => {
                    tracing::trace!("Received batch from {}: {:?}", self.peer_addr, text);
                    self.process(text)
                }
                Framing::Invalid => {
                    tracing::warn!("Discarding non UTF-8 request from {}", self.peer_addr);
                    encode_error(&MetricsError::Parse(String::new()).to_string())
                }
            };
            self.buffer.clear();

            if let Err(e) = self.send(&reply) {
                if is_disconnect(&e) {
                    tracing::debug!(
                        "Client {} disconnected before reply could be sent: {}",
                        self.peer_addr,
                        e
                    );
                    return Ok(());
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(MetricsError::socket("send", e));
            }
        }
    }

    /// Decode, execute and encode one batch, turning request faults into an
    /// error reply.
    fn process(&self, text: &str) -> String {
        match execute_batch(&self.storage, text) {
            Ok(reply) => reply,
            Err(e) if e.is_request_fault() => {
                tracing::warn!("Rejected request from {}: {:?}", self.peer_addr, e);
                encode_error(&e.to_string())
            }
            Err(e) => {
                tracing::error!("Failed to process request from {}: {}", self.peer_addr, e);
                encode_error(&e.to_string())
            }
        }
    }

    fn send(&mut self, reply: &str) -> io::Result<()> {
        self.writer.write_all(reply.as_bytes())?;
        self.writer.flush()
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

/// Run a whole batch under one storage lock so it is never interleaved with
/// another connection's batch.
fn execute_batch(storage: &SharedStorage, text: &str) -> Result<String> {
    let commands = decode_request(text)?;
    for command in &commands {
        tracing::trace!(
            method = command.command_type().method(),
            key = command.key(),
            "Decoded command"
        );
    }

    let mut guard = storage.lock();
    let results = Executor::new(&mut guard).run_batch(commands)?;
    drop(guard);

    Ok(encode_reply(&results))
}

/// Classify the accumulated bytes
///
/// Validation only runs once the buffer ends with a newline. A character split
/// across reads can never end in `\n`, so such a buffer just keeps waiting.
fn frame(buffer: &[u8]) -> Framing<'_> {
    if buffer.last() != Some(&REQUEST_TERMINATOR) {
        return Framing::Incomplete;
    }

    match std::str::from_utf8(buffer) {
        Ok(text) => Framing::Complete(text),
        Err(_) => Framing::Invalid,
    }
}

fn is_disconnect(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof
    )
}
