//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor loop
//! - One handler thread per connection
//! - Batches executed under the shared storage lock
//! - Blocking client, one request in flight

mod server;
mod connection;
mod client;

pub use server::{Server, ShutdownHandle};
pub use connection::Connection;
pub use client::{unix_now, Client};
