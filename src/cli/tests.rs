//! Unit tests for argument parsing

use crate::cli::{normalize_args, Cli, DEFAULT_GRACEFUL_TIMEOUT};
use clap::Parser;
use std::time::Duration;

#[test]
fn test_default_graceful_timeout() {
    let cli = Cli::try_parse_from(["action-api"]).unwrap();
    assert_eq!(cli.graceful_timeout, DEFAULT_GRACEFUL_TIMEOUT);
}

#[test]
fn test_double_dash_flag() {
    let cli = Cli::try_parse_from(["action-api", "--graceful-timeout", "1m"]).unwrap();
    assert_eq!(cli.graceful_timeout, Duration::from_secs(60));
}

#[test]
fn test_go_style_single_dash_flag() {
    let args = normalize_args(["action-api", "-graceful-timeout", "500ms"]);
    let cli = Cli::try_parse_from(args).unwrap();
    assert_eq!(cli.graceful_timeout, Duration::from_millis(500));

    let args = normalize_args(["action-api", "-graceful-timeout=2s"]);
    let cli = Cli::try_parse_from(args).unwrap();
    assert_eq!(cli.graceful_timeout, Duration::from_secs(2));
}

#[test]
fn test_normalize_leaves_other_args_alone() {
    let args = normalize_args(["action-api", "-graceful-timeoutx", "--graceful-timeout=3s", "-h"]);
    assert_eq!(args[1], "-graceful-timeoutx");
    assert_eq!(args[2], "--graceful-timeout=3s");
    assert_eq!(args[3], "-h");
}

#[test]
fn test_invalid_duration_is_usage_error() {
    let err = Cli::try_parse_from(["action-api", "--graceful-timeout", "soon"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
}

#[test]
fn test_unknown_flag_rejected() {
    assert!(Cli::try_parse_from(["action-api", "--port", "9000"]).is_err());
}
