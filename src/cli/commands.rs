use super::duration::parse_go_duration;
use clap::Parser;
use std::ffi::OsString;
use std::time::Duration;

/// Default drain period after an interrupt.
pub const DEFAULT_GRACEFUL_TIMEOUT: Duration = Duration::from_secs(15);

const GRACEFUL_TIMEOUT_FLAG: &str = "graceful-timeout";

#[derive(Parser, Debug, Clone)]
#[command(name = "action-api")]
#[command(version, about = "Issue and acknowledge device action requests over HTTP", long_about = None)]
pub struct Cli {
    /// The duration for which the server gracefully waits for existing
    /// connections to finish, e.g. 15s or 1m
    #[arg(
        long = GRACEFUL_TIMEOUT_FLAG,
        value_name = "DURATION",
        default_value = "15s",
        value_parser = parse_go_duration
    )]
    pub graceful_timeout: Duration,
}

impl Cli {
    /// Parse the process arguments, accepting Go-style single-dash long flags.
    pub fn parse_normalized() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }
}

/// Rewrite `-graceful-timeout[=v]` into `--graceful-timeout[=v]`.
///
/// Only the known long flag is rewritten; everything else passes through so
/// clap still reports unknown options.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            let Some(text) = arg.to_str() else {
                return arg;
            };
            match text.strip_prefix('-') {
                Some(rest)
                    if !rest.starts_with('-')
                        && (rest == GRACEFUL_TIMEOUT_FLAG
                            || rest
                                .strip_prefix(GRACEFUL_TIMEOUT_FLAG)
                                .is_some_and(|tail| tail.starts_with('='))) =>
                {
                    OsString::from(format!("--{rest}"))
                }
                _ => arg,
            }
        })
        .collect()
}
