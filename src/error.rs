use std::fmt;
use std::io;
use std::net::SocketAddr;

/// Errors raised while bringing the HTTP harness up.
///
/// Once the accept loop is running, failures are logged rather than returned.
#[derive(Debug)]
pub enum ServerError {
    /// The listening socket could not be bound.
    Bind {
        /// Address that was requested
        addr: SocketAddr,
        source: io::Error,
    },
    /// The bound socket could not report its local address.
    LocalAddr(io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Bind { addr, source } => {
                write!(f, "failed to bind {addr}: {source}")
            }
            ServerError::LocalAddr(source) => {
                write!(f, "failed to read local address of listener: {source}")
            }
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::Bind { source, .. } => Some(source),
            ServerError::LocalAddr(source) => Some(source),
        }
    }
}

/// Errors from parsing a Go-style duration string such as `1m30s`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DurationParseError {
    /// The input was empty (or only a sign).
    Empty,
    /// A number was not followed by a unit, e.g. `15`.
    MissingUnit { input: String },
    /// The unit suffix is not one of `ns`, `us`, `µs`, `ms`, `s`, `m`, `h`.
    UnknownUnit { input: String, unit: String },
    /// A component was not a valid decimal number.
    InvalidNumber { input: String },
    /// Negative durations have no meaning for a grace period.
    Negative { input: String },
    /// The value does not fit into a `Duration`.
    Overflow { input: String },
}

impl fmt::Display for DurationParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationParseError::Empty => write!(f, "invalid duration: empty string"),
            DurationParseError::MissingUnit { input } => {
                write!(f, "missing unit in duration '{input}' (e.g. 15s or 1m)")
            }
            DurationParseError::UnknownUnit { input, unit } => {
                write!(f, "unknown unit '{unit}' in duration '{input}'")
            }
            DurationParseError::InvalidNumber { input } => {
                write!(f, "invalid number in duration '{input}'")
            }
            DurationParseError::Negative { input } => {
                write!(f, "negative duration '{input}' is not allowed")
            }
            DurationParseError::Overflow { input } => {
                write!(f, "duration '{input}' is too large")
            }
        }
    }
}

impl std::error::Error for DurationParseError {}
