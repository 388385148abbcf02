//! # CLI Module
//!
//! Command-line surface of the `action-api` binary.
//!
//! ## Options
//!
//! The service takes exactly one option:
//!
//! - `--graceful-timeout <DURATION>` - how long the server waits for in-flight
//!   connections to finish after an interrupt (default: `15s`)
//!
//! Durations use Go syntax (`15s`, `1m`, `1m30s`, `250ms`, `1.5h`). The
//! single-dash spelling `-graceful-timeout` is accepted too, so existing
//! launch scripts keep working.
//!
//! ## Examples
//!
//! ```bash
//! # Default 15s drain
//! action-api
//!
//! # Allow a full minute for slow clients
//! action-api --graceful-timeout 1m
//! action-api -graceful-timeout=1m
//! ```
//!
//! ## Usage from Code
//!
//! ```rust
//! use action_api::cli::Cli;
//! use clap::Parser;
//!
//! let cli = Cli::try_parse_from(["action-api", "--graceful-timeout", "30s"]).unwrap();
//! assert_eq!(cli.graceful_timeout.as_secs(), 30);
//! ```

mod commands;
mod duration;

#[cfg(test)]
mod tests;

pub use commands::{normalize_args, Cli, DEFAULT_GRACEFUL_TIMEOUT};
pub use duration::parse_go_duration;
