use axum::extract::ConnectInfo;
use axum::Router;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::Request;
use hyper_util::rt::TokioIo;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio::sync::Notify;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tower::Service;
use tracing::debug;

/// Everything a connection task needs from the harness.
#[derive(Clone)]
pub(crate) struct ConnectionContext {
    pub router: Router,
    pub read_timeout: Duration,
    pub idle_timeout: Duration,
    /// Cancelled when draining starts: finish the in-flight request, then close.
    pub shutdown: CancellationToken,
    /// Cancelled when the drain deadline passes: drop the connection now.
    pub abort: CancellationToken,
}

/// Serve HTTP/1.1 on one accepted socket until the client leaves, the
/// connection goes idle, or the harness shuts down.
///
/// Both timeouts are enforced here rather than by hyper. hyper's header read
/// timer also runs while a keep-alive connection waits for its next request,
/// which would cut idle connections off at the read timeout.
pub(crate) async fn serve_connection(stream: TcpStream, remote: SocketAddr, ctx: ConnectionContext) {
    let activity = Arc::new(Activity::new());

    let service = {
        let router = ctx.router.clone();
        let activity = Arc::clone(&activity);
        hyper::service::service_fn(move |mut request: Request<Incoming>| {
            request.extensions_mut().insert(ConnectInfo(remote));
            let in_flight = InFlight::begin(&activity);
            // hyper's Service takes &self, tower's takes &mut self
            let mut router = router.clone();
            async move {
                let response = router.call(request).await;
                drop(in_flight);
                response
            }
        })
    };

    let io = TokioIo::new(TrackedStream {
        inner: stream,
        activity: Arc::clone(&activity),
    });
    let mut builder = http1::Builder::new();
    builder.header_read_timeout(None).keep_alive(true);
    let conn = builder.serve_connection(io, service);
    tokio::pin!(conn);

    let mut closing = false;
    loop {
        tokio::select! {
            result = conn.as_mut() => {
                if let Err(err) = result {
                    debug!(%remote, error = %err, "connection ended with error");
                }
                break;
            }
            _ = ctx.abort.cancelled() => {
                debug!(%remote, "dropping connection at drain deadline");
                break;
            }
            _ = activity.header_overdue(ctx.read_timeout) => {
                debug!(%remote, "request headers not received in time");
                break;
            }
            _ = ctx.shutdown.cancelled(), if !closing => {
                closing = true;
                conn.as_mut().graceful_shutdown();
            }
            _ = activity.idle_for(ctx.idle_timeout), if !closing => {
                debug!(%remote, "closing idle connection");
                closing = true;
                conn.as_mut().graceful_shutdown();
            }
        }
    }
}

/// Socket wrapper that reports the first bytes of each new request.
struct TrackedStream {
    inner: TcpStream,
    activity: Arc<Activity>,
}

impl AsyncRead for TrackedStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        let poll = Pin::new(&mut this.inner).poll_read(cx, buf);
        if matches!(poll, Poll::Ready(Ok(()))) && buf.filled().len() > before {
            this.activity.bytes_received();
        }
        poll
    }
}

impl AsyncWrite for TrackedStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().inner).poll_write(cx, buf)
    }

    fn poll_write_vectored(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().inner).poll_write_vectored(cx, bufs)
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}

/// Request bookkeeping for the read and idle timeouts.
struct Activity {
    state: Mutex<ActivityState>,
    first_byte: Notify,
}

struct ActivityState {
    in_flight: usize,
    last_seen: Instant,
    /// Set when bytes of a not-yet-dispatched request arrive.
    header_started: Option<Instant>,
}

impl Activity {
    fn new() -> Self {
        Self {
            state: Mutex::new(ActivityState {
                in_flight: 0,
                last_seen: Instant::now(),
                header_started: None,
            }),
            first_byte: Notify::new(),
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut ActivityState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Bytes arrived on the socket.
    ///
    /// Outside a request they belong to the next request's headers, which
    /// starts the read clock.
    fn bytes_received(&self) {
        let started = self.with_state(|s| {
            if s.in_flight == 0 && s.header_started.is_none() {
                s.header_started = Some(Instant::now());
                true
            } else {
                false
            }
        });
        if started {
            self.first_byte.notify_waiters();
        }
    }

    /// Resolves once a request has spent `timeout` delivering its headers.
    async fn header_overdue(&self, timeout: Duration) {
        loop {
            let notified = self.first_byte.notified();
            match self.with_state(|s| s.header_started) {
                Some(started) => {
                    tokio::time::sleep_until(started + timeout).await;
                    if self.with_state(|s| s.header_started == Some(started)) {
                        return;
                    }
                }
                None => notified.await,
            }
        }
    }

    /// Resolves once no request has been in flight, or partly received, for
    /// `timeout`.
    async fn idle_for(&self, timeout: Duration) {
        loop {
            let deadline = self.with_state(|s| {
                if s.in_flight == 0 && s.header_started.is_none() {
                    s.last_seen + timeout
                } else {
                    Instant::now() + timeout
                }
            });
            if Instant::now() >= deadline
                && self.with_state(|s| s.in_flight == 0 && s.header_started.is_none())
            {
                return;
            }
            tokio::time::sleep_until(deadline).await;
        }
    }
}

/// Marks one request as in flight until dropped.
struct InFlight(Arc<Activity>);

impl InFlight {
    fn begin(activity: &Arc<Activity>) -> Self {
        activity.with_state(|s| {
            s.in_flight += 1;
            s.header_started = None;
        });
        Self(Arc::clone(activity))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.with_state(|s| {
            s.in_flight = s.in_flight.saturating_sub(1);
            s.last_seen = Instant::now();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn idle_resolves_after_timeout_without_requests() {
        let activity = Activity::new();
        let started = Instant::now();
        activity.idle_for(Duration::from_secs(60)).await;
        assert!(started.elapsed() >= Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn idle_waits_while_request_in_flight() {
        let activity = Arc::new(Activity::new());
        let guard = InFlight::begin(&activity);

        let waiter = {
            let activity = Arc::clone(&activity);
            tokio::spawn(async move { activity.idle_for(Duration::from_secs(5)).await })
        };

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        let released = Instant::now();
        waiter.await.unwrap();
        assert!(released.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn finished_request_restarts_idle_clock() {
        let activity = Arc::new(Activity::new());
        tokio::time::sleep(Duration::from_secs(4)).await;
        drop(InFlight::begin(&activity));

        let started = Instant::now();
        activity.idle_for(Duration::from_secs(5)).await;
        assert!(started.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn partial_headers_hit_read_deadline() {
        let activity = Arc::new(Activity::new());
        let waiter = {
            let activity = Arc::clone(&activity);
            tokio::spawn(async move { activity.header_overdue(Duration::from_secs(15)).await })
        };

        // Nothing received yet: an idle socket never trips the read deadline.
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(!waiter.is_finished());

        activity.bytes_received();
        let started = Instant::now();
        waiter.await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn dispatched_request_clears_read_deadline() {
        let activity = Arc::new(Activity::new());
        activity.bytes_received();
        let guard = InFlight::begin(&activity);

        let overdue = tokio::time::timeout(
            Duration::from_secs(60),
            activity.header_overdue(Duration::from_secs(15)),
        )
        .await;
        assert!(overdue.is_err());

        // Body bytes of the in-flight request do not start a new clock.
        activity.bytes_received();
        assert!(activity.with_state(|s| s.header_started.is_none()));
        drop(guard);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_clock_ignores_read_timeout() {
        let activity = Arc::new(Activity::new());
        drop(InFlight::begin(&activity));

        // A keep-alive connection waiting for its next request is governed by
        // the idle timeout only, even when the read timeout is shorter.
        let started = Instant::now();
        tokio::select! {
            _ = activity.header_overdue(Duration::from_secs(15)) => panic!("read deadline fired on idle connection"),
            _ = activity.idle_for(Duration::from_secs(60)) => {}
        }
        assert!(started.elapsed() >= Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn partial_headers_hold_off_idle_close() {
        let activity = Arc::new(Activity::new());
        activity.bytes_received();

        let idle = tokio::time::timeout(
            Duration::from_secs(30),
            activity.idle_for(Duration::from_secs(5)),
        )
        .await;
        assert!(idle.is_err());
    }
}
