//! Server configuration.
//!
//! ```
//! use wire_http::config::{ServerConfig, ShutdownMode};
//!
//! let config = ServerConfig::builder()
//!     .address(([127, 0, 0, 1], 0))
//!     .max_connections(64)
//!     .shutdown(ShutdownMode::Abort)
//!     .build();
//!
//! assert_eq!(config.max_connections(), Some(64));
//! ```

use std::net::SocketAddr;

use crate::codec::{DEFAULT_MAX_BODY_BYTES, DEFAULT_MAX_HEAD_BYTES};

pub const DEFAULT_PORT: u16 = 42069;
pub const DEFAULT_READ_BUFFER_CAPACITY: usize = 8 * 1024;

/// What [`Server::close`](crate::server::Server::close) does with connections
/// that are still being served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShutdownMode {
    /// Stop accepting and wait for in-flight connections to finish.
    #[default]
    Graceful,
    /// Stop accepting and drop in-flight connections.
    Abort,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    address: SocketAddr,
    max_head_bytes: usize,
    max_body_bytes: u64,
    read_buffer_capacity: usize,
    max_connections: Option<usize>,
    shutdown: ShutdownMode,
}

impl ServerConfig {
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::new()
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn max_head_bytes(&self) -> usize {
        self.max_head_bytes
    }

    pub fn max_body_bytes(&self) -> u64 {
        self.max_body_bytes
    }

    pub fn read_buffer_capacity(&self) -> usize {
        self.read_buffer_capacity
    }

    /// `None` means unlimited.
    pub fn max_connections(&self) -> Option<usize> {
        self.max_connections
    }

    pub fn shutdown(&self) -> ShutdownMode {
        self.shutdown
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            max_head_bytes: DEFAULT_MAX_HEAD_BYTES,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            read_buffer_capacity: DEFAULT_READ_BUFFER_CAPACITY,
            max_connections: None,
            shutdown: ShutdownMode::Graceful,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    fn new() -> Self {
        Self::default()
    }

    pub fn address<A: Into<SocketAddr>>(mut self, address: A) -> Self {
        self.config.address = address.into();
        self
    }

    /// Binds every interface on `port`.
    pub fn port(mut self, port: u16) -> Self {
        self.config.address.set_port(port);
        self
    }

    pub fn max_head_bytes(mut self, max_head_bytes: usize) -> Self {
        self.config.max_head_bytes = max_head_bytes;
        self
    }

    pub fn max_body_bytes(mut self, max_body_bytes: u64) -> Self {
        self.config.max_body_bytes = max_body_bytes;
        self
    }

    pub fn read_buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.read_buffer_capacity = capacity;
        self
    }

    /// Caps the connections served at once, `0` leaves them unlimited.
    pub fn max_connections(mut self, max_connections: usize) -> Self {
        self.config.max_connections = (max_connections > 0).then_some(max_connections);
        self
    }

    pub fn shutdown(mut self, shutdown: ShutdownMode) -> Self {
        self.config.shutdown = shutdown;
        self
    }

    pub fn build(self) -> ServerConfig {
        self.config
    }
}
