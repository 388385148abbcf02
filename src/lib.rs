//! # action-api
//!
//! A small HTTP service that issues and acknowledges device **action
//! requests** such as "reboot this device".
//!
//! ## Overview
//!
//! The service is a request/response shim. It fabricates a stub action record
//! with a fresh identifier, logs it and returns it as JSON. Nothing is stored,
//! dispatched or tracked beyond the single HTTP exchange.
//!
//! ## Architecture
//!
//! - **[`ids`]** - Action identifiers (UUID v4) and per-request correlation ids (ULID)
//! - **[`model`]** - The [`ActionRequest`] / [`Operation`] records
//! - **[`handlers`]** - `GET` and `DELETE` handlers for `/action/{id}`
//! - **[`middleware`]** - Access logging with remote address, method and URL
//! - **[`router`]** - Route table, write timeout and middleware wiring
//! - **[`server`]** - Listener, per-connection timeouts and graceful drain
//! - **[`cli`]** - The `--graceful-timeout` flag and Go-style duration parsing
//! - **[`runtime_config`]** - Fixed listen address and connection timeouts
//! - **[`telemetry`]** - Structured logging setup
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Conn as Connection task<br/>(hyper http1)
//!     participant Log as log_request
//!     participant Router as axum Router
//!     participant Handler
//!
//!     Client->>Conn: DELETE /action/42
//!     Conn->>Conn: attach peer address
//!     Conn->>Log: request
//!     Log->>Log: "inbound request" (remote, method, url)
//!     Log->>Router: next.run(request)
//!     alt No route / wrong method
//!         Router-->>Client: 404 / 405
//!     end
//!     Router->>Handler: acknowledge_removal
//!     Handler->>Handler: log dump + "action can be removed"
//!     Handler-->>Client: 200 (empty body)
//! ```
//!
//! ### Shutdown Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Main
//!     participant Harness as ServerHandle
//!     participant Accept as Accept loop
//!     participant Conns as Connection tasks
//!
//!     Main->>Main: wait for SIGINT
//!     Main->>Harness: shutdown(grace)
//!     Harness->>Accept: cancel
//!     Harness->>Conns: graceful_shutdown()
//!     alt all closed before grace
//!         Conns-->>Harness: Drained
//!     else grace elapsed
//!         Harness->>Conns: abort
//!     end
//!     Main->>Main: log "shutting down", exit(0)
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use action_api::{router::build_router, runtime_config::ServerConfig, server::HttpServer};
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::default();
//! let handle = HttpServer::new(build_router(&config), config).start().await?;
//! // ... wait for a signal ...
//! let _ = handle.shutdown(Duration::from_secs(15)).await;
//! # Ok(())
//! # }
//! ```
//!
//! ## HTTP API
//!
//! ```bash
//! curl http://localhost:8000/action/1
//! # {"id":"6f1c...","action":{"name":"rebootDevice","serial":"testSerial"}}
//!
//! curl -X DELETE http://localhost:8000/action/1
//! # 200, empty body
//! ```

pub mod cli;
pub mod error;
pub mod handlers;
pub mod ids;
pub mod middleware;
pub mod model;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod telemetry;

pub use error::{DurationParseError, ServerError};
pub use ids::{ActionId, RequestId};
pub use model::{ActionRequest, Operation};
