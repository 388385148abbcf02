use super::connection::{serve_connection, ConnectionContext};
use crate::error::ServerError;
use crate::runtime_config::ServerConfig;
use axum::Router;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

/// Pause after an accept error that is not tied to a single client.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Lifecycle of the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Starting,
    Serving,
    Draining,
    Stopped,
}

/// How a drain finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum DrainOutcome {
    /// Every connection closed within the grace period.
    Drained,
    /// The grace period elapsed; remaining connections were dropped.
    DeadlineElapsed,
}

/// HTTP server wrapping an axum [`Router`]
///
/// Connections are served with hyper's HTTP/1.1 implementation directly so
/// the harness controls peer addresses, per-connection timeouts and the drain.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    pub fn new(router: Router, config: ServerConfig) -> Self {
        Self { router, config }
    }

    /// Bind the configured address and start accepting connections.
    ///
    /// The accept loop runs on its own task; this returns as soon as the
    /// socket is bound so the caller can go on to wait for a shutdown signal.
    ///
    /// # Errors
    ///
    /// [`ServerError::Bind`] if the address cannot be bound, and
    /// [`ServerError::LocalAddr`] if the bound socket cannot be inspected.
    pub async fn start(self) -> Result<ServerHandle, ServerError> {
        let (state, _) = watch::channel(ServerState::Starting);

        let listener = TcpListener::bind(self.config.addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: self.config.addr,
                source,
            })?;
        let addr = listener.local_addr().map_err(ServerError::LocalAddr)?;

        let ctx = ConnectionContext {
            router: self.router,
            read_timeout: self.config.read_timeout,
            idle_timeout: self.config.idle_timeout,
            shutdown: CancellationToken::new(),
            abort: CancellationToken::new(),
        };
        let connections = TaskTracker::new();
        let accept_task = tokio::spawn(accept_loop(listener, ctx.clone(), connections.clone()));

        state.send_replace(ServerState::Serving);
        info!(
            %addr,
            read_timeout = ?self.config.read_timeout,
            write_timeout = ?self.config.write_timeout,
            idle_timeout = ?self.config.idle_timeout,
            "listening"
        );

        Ok(ServerHandle {
            addr,
            shutdown: ctx.shutdown,
            abort: ctx.abort,
            connections,
            accept_task,
            state,
        })
    }
}

/// Handle to a running HTTP server
///
/// Dropping the handle leaves the server running; call [`ServerHandle::shutdown`]
/// for a bounded drain or [`ServerHandle::abort`] to stop at once.
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown: CancellationToken,
    abort: CancellationToken,
    connections: TaskTracker,
    accept_task: JoinHandle<()>,
    state: watch::Sender<ServerState>,
}

impl ServerHandle {
    /// Address the listener is bound to (useful when binding port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn state(&self) -> ServerState {
        *self.state.borrow()
    }

    /// Receiver that observes every lifecycle transition.
    pub fn subscribe(&self) -> watch::Receiver<ServerState> {
        self.state.subscribe()
    }

    /// Number of connections currently being served.
    pub fn open_connections(&self) -> usize {
        self.connections.len()
    }

    /// Stop accepting and drain open connections for at most `grace`.
    ///
    /// Returns immediately when nothing is in flight. Connections that are
    /// still open when `grace` elapses are dropped and
    /// [`DrainOutcome::DeadlineElapsed`] is returned.
    pub async fn shutdown(self, grace: Duration) -> DrainOutcome {
        self.state.send_replace(ServerState::Draining);
        info!(grace = ?grace, open = self.connections.len(), "draining connections");

        self.shutdown.cancel();
        self.connections.close();

        let accept_task = self.accept_task;
        let connections = self.connections.clone();
        let drain = async move {
            if let Err(err) = accept_task.await {
                warn!(error = %err, "accept loop did not stop cleanly");
            }
            connections.wait().await;
        };

        let outcome = match tokio::time::timeout(grace, drain).await {
            Ok(()) => DrainOutcome::Drained,
            Err(_) => {
                self.abort.cancel();
                DrainOutcome::DeadlineElapsed
            }
        };
        debug!(?outcome, "drain finished");
        self.state.send_replace(ServerState::Stopped);
        outcome
    }

    /// Stop accepting and drop every connection without waiting.
    pub fn abort(&self) {
        self.shutdown.cancel();
        self.abort.cancel();
        self.connections.close();
        self.accept_task.abort();
        self.state.send_replace(ServerState::Stopped);
    }
}

async fn accept_loop(listener: TcpListener, ctx: ConnectionContext, connections: TaskTracker) {
    loop {
        let accepted = tokio::select! {
            _ = ctx.shutdown.cancelled() => break,
            accepted = listener.accept() => accepted,
        };

        match accepted {
            Ok((stream, remote)) => {
                if let Err(err) = stream.set_nodelay(true) {
                    debug!(%remote, error = %err, "failed to set TCP_NODELAY");
                }
                connections.spawn(serve_connection(stream, remote, ctx.clone()));
            }
            Err(err) if is_connection_error(&err) => {
                debug!(error = %err, "client went away during accept");
            }
            Err(err) => {
                error!(error = %err, "accept failed");
                tokio::select! {
                    _ = ctx.shutdown.cancelled() => break,
                    _ = tokio::time::sleep(ACCEPT_ERROR_BACKOFF) => {}
                }
            }
        }
    }
    debug!("accept loop stopped");
}

fn is_connection_error(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config() -> ServerConfig {
        ServerConfig::default().with_addr(SocketAddr::from(([127, 0, 0, 1], 0)))
    }

    #[tokio::test]
    async fn start_reports_bound_address_and_serving_state() {
        let handle = HttpServer::new(Router::new(), local_config())
            .start()
            .await
            .unwrap();
        assert_ne!(handle.local_addr().port(), 0);
        assert_eq!(handle.state(), ServerState::Serving);
        assert_eq!(handle.open_connections(), 0);

        let mut states = handle.subscribe();
        let outcome = handle.shutdown(Duration::from_secs(1)).await;
        assert_eq!(outcome, DrainOutcome::Drained);
        assert_eq!(*states.borrow_and_update(), ServerState::Stopped);
    }

    #[tokio::test]
    async fn bind_conflict_is_reported() {
        let first = HttpServer::new(Router::new(), local_config())
            .start()
            .await
            .unwrap();
        let taken = local_config().with_addr(first.local_addr());

        let err = HttpServer::new(Router::new(), taken)
            .start()
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ServerError::Bind { addr, .. } if addr == first.local_addr()));
        first.abort();
    }

    #[test]
    fn classifies_per_client_accept_errors() {
        assert!(is_connection_error(&io::Error::from(io::ErrorKind::ConnectionReset)));
        assert!(!is_connection_error(&io::Error::from(io::ErrorKind::Other)));
    }
}
