use action_api::cli::Cli;
use action_api::router::build_router;
use action_api::runtime_config::ServerConfig;
use action_api::server::{HttpServer, InterruptSignal};
use action_api::telemetry::{init_logging, LogConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_normalized();
    let log_guard = init_logging(&LogConfig::from_env())?;

    let interrupt = InterruptSignal::install()?;

    let config = ServerConfig::default();
    let router = build_router(&config);
    // A failed start is logged only; the process still waits for SIGINT.
    let handle = match HttpServer::new(router, config).start().await {
        Ok(handle) => Some(handle),
        Err(err) => {
            error!(error = %err, "server failed to start");
            None
        }
    };

    interrupt.recv().await;

    if let Some(handle) = handle {
        // Hitting the deadline is not an error for the exit path.
        let _drain = handle.shutdown(cli.graceful_timeout).await;
    }
    info!("shutting down");

    drop(log_guard);
    std::process::exit(0);
}
