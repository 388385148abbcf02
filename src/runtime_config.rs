//! # Runtime Configuration Module
//!
//! Fixed listen address and connection timeouts for the HTTP harness.
//!
//! ## Overview
//!
//! The production service always listens on `0.0.0.0:8000` and applies:
//!
//! | Timeout | Value | Bounds |
//! |---------|-------|--------|
//! | read    | 15s   | time a client may take to send request headers |
//! | write   | 15s   | time a handler may take to produce a response (408 when exceeded) |
//! | idle    | 60s   | time a keep-alive connection may sit with nothing in flight |
//!
//! These values protect the server against slow clients holding connections
//! open. They are not configurable from the command line; tests use the
//! builder methods to shorten them.
//!
//! ## Usage
//!
//! ```rust
//! use action_api::runtime_config::ServerConfig;
//! use std::time::Duration;
//!
//! let config = ServerConfig::default();
//! assert_eq!(config.addr.port(), 8000);
//!
//! let test_config = ServerConfig::default()
//!     .with_addr("127.0.0.1:0".parse().unwrap())
//!     .with_idle_timeout(Duration::from_millis(200));
//! assert_eq!(test_config.idle_timeout, Duration::from_millis(200));
//! ```

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

/// Address the service binds in production.
pub const DEFAULT_ADDR: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 8000));

pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Listener and per-connection settings for [`crate::server::HttpServer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind
    pub addr: SocketAddr,
    /// Maximum time to receive a complete set of request headers
    pub read_timeout: Duration,
    /// Maximum time a handler may run before the client gets a 408
    pub write_timeout: Duration,
    /// Keep-alive connections with no request in flight are closed after this
    pub idle_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR,
            read_timeout: DEFAULT_READ_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

impl ServerConfig {
    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_production_values() {
        let config = ServerConfig::default();
        assert_eq!(config.addr.to_string(), "0.0.0.0:8000");
        assert_eq!(config.read_timeout, Duration::from_secs(15));
        assert_eq!(config.write_timeout, Duration::from_secs(15));
        assert_eq!(config.idle_timeout, Duration::from_secs(60));
    }

    #[test]
    fn builders_override_single_fields() {
        let config = ServerConfig::default().with_write_timeout(Duration::from_secs(1));
        assert_eq!(config.write_timeout, Duration::from_secs(1));
        assert_eq!(config.read_timeout, DEFAULT_READ_TIMEOUT);
    }
}
