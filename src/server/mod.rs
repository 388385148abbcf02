//! # Server Harness
//!
//! Owns the listening socket and the lifecycle of every connection.
//!
//! ```text
//! Starting ──bind──▶ Serving ──SIGINT──▶ Draining ──drained / deadline──▶ Stopped
//! ```
//!
//! - [`HttpServer::start`] binds the listener and spawns the accept loop on its
//!   own task, returning a [`ServerHandle`] in the `Serving` state.
//! - Each accepted connection is served on a dedicated task with the read and
//!   idle timeouts from [`crate::runtime_config::ServerConfig`].
//! - [`ServerHandle::shutdown`] stops accepting, asks every connection to
//!   finish its in-flight request and close, and waits at most the grace
//!   period. Connections still open at the deadline are dropped.
//! - [`InterruptSignal`] waits for SIGINT only. Other termination signals keep
//!   their default disposition and end the process without draining.

mod connection;
mod http_server;
mod signal;

pub use http_server::{DrainOutcome, HttpServer, ServerHandle, ServerState};
pub use signal::InterruptSignal;
