//! TCP Server
//!
//! Accepts connections and runs one handler thread per connection.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::Connection;
use crate::config::Config;
use crate::error::{MetricsError, Result};
use crate::storage::SharedStorage;

/// Cloneable handle that stops a running [`Server`]
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Ask the accept loop to stop. Open connections finish on their own.
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// TCP server for the metrics store
pub struct Server {
    config: Config,
    storage: SharedStorage,
    listener: TcpListener,
    shutdown: ShutdownHandle,
    active: Arc<AtomicUsize>,
}

impl Server {
    /// Bind the listen address from `config`.
    ///
    /// `storage` is shared by every connection this server accepts.
    pub fn bind(config: Config, storage: SharedStorage) -> Result<Self> {
        let addrs: Vec<SocketAddr> = config
            .listen_addr
            .to_socket_addrs()
            .map_err(|e| {
                MetricsError::Config(format!("invalid listen address {}: {}", config.listen_addr, e))
            })?
            .collect();
        if addrs.is_empty() {
            return Err(MetricsError::Config(format!(
                "listen address {} resolved to nothing",
                config.listen_addr
            )));
        }

        // Address in use, permission denied and friends stay I/O errors
        let listener = TcpListener::bind(&addrs[..])?;
        // Non-blocking so the loop can notice shutdown between connections
        listener.set_nonblocking(true)?;

        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            config,
            storage,
            listener,
            shutdown: ShutdownHandle::default(),
            active: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Handle for stopping [`Server::run`] from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Number of connections currently being served
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Accept connections until shutdown is requested (blocking)
    pub fn run(&self) -> Result<()> {
        let poll = Duration::from_millis(self.config.accept_poll_ms.max(1));
        let mut next_id: u64 = 0;

        while !self.shutdown.is_shutdown() {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    next_id += 1;
                    if let Err(e) = self.dispatch(stream, next_id) {
                        tracing::warn!("Failed to start handler for {}: {}", addr, e);
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => thread::sleep(poll),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::error!("Connection failed: {}", e);
                    thread::sleep(poll);
                }
            }
        }

        tracing::info!("Server stopped accepting connections");
        Ok(())
    }

    /// Spawn a handler thread for an accepted stream
    fn dispatch(&self, stream: TcpStream, id: u64) -> Result<()> {
        // Some platforms hand out sockets inheriting the listener's mode
        stream.set_nonblocking(false)?;

        let guard = ActiveGuard::enter(&self.active);
        if guard.count > self.config.max_connections {
            tracing::warn!(
                "Rejecting connection {}: limit of {} reached",
                id,
                self.config.max_connections
            );
            return Ok(());
        }

        let mut connection = Connection::new(stream, Arc::clone(&self.storage))?;
        connection.set_timeouts(self.config.read_timeout_ms, self.config.write_timeout_ms)?;

        thread::Builder::new()
            .name(format!("metrics-conn-{}", id))
            .spawn(move || {
                let _guard = guard;
                if let Err(e) = connection.handle() {
                    tracing::warn!("Connection {} terminated: {}", connection.peer_addr(), e);
                }
            })?;

        Ok(())
    }
}

/// Counts a connection as active for as long as it is alive
struct ActiveGuard {
    active: Arc<AtomicUsize>,
    count: usize,
}

impl ActiveGuard {
    fn enter(active: &Arc<AtomicUsize>) -> Self {
        let count = active.fetch_add(1, Ordering::SeqCst) + 1;
        Self {
            active: Arc::clone(active),
            count,
        }
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}
