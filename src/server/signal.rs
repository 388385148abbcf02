use std::io;
use tokio::sync::oneshot;
use tracing::{info, warn};

/// Pending SIGINT (Ctrl+C) notification.
///
/// Only the interrupt signal is registered. SIGTERM, SIGQUIT and SIGKILL keep
/// their default disposition and terminate the process without a drain.
/// Install it before the server starts so an early interrupt is not lost.
pub struct InterruptSignal {
    received: oneshot::Receiver<()>,
}

impl InterruptSignal {
    /// Register the SIGINT handler.
    ///
    /// A dedicated thread blocks on the signal and notifies the async side
    /// through a oneshot channel.
    #[cfg(unix)]
    pub fn install() -> io::Result<Self> {
        use signal_hook::consts::SIGINT;
        use signal_hook::iterator::Signals;

        let mut signals = Signals::new([SIGINT])?;
        let (tx, received) = oneshot::channel();
        std::thread::Builder::new()
            .name("sigint-listener".to_string())
            .spawn(move || {
                if signals.forever().next().is_some() && tx.send(()).is_err() {
                    warn!("interrupt received after the listener was dropped");
                }
            })?;
        Ok(Self { received })
    }

    #[cfg(not(unix))]
    pub fn install() -> io::Result<Self> {
        let (tx, received) = oneshot::channel();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    if tx.send(()).is_err() {
                        warn!("interrupt received after the listener was dropped");
                    }
                }
                Err(err) => warn!(error = %err, "failed to listen for Ctrl+C"),
            }
        });
        Ok(Self { received })
    }

    /// Build a signal from an arbitrary trigger, for driving shutdown in tests.
    pub fn from_receiver(received: oneshot::Receiver<()>) -> Self {
        Self { received }
    }

    /// Wait until the interrupt arrives.
    pub async fn recv(self) {
        match self.received.await {
            Ok(()) => info!("interrupt received"),
            Err(_) => warn!("interrupt listener stopped before a signal arrived"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn recv_completes_when_triggered() {
        let (tx, rx) = oneshot::channel();
        let signal = InterruptSignal::from_receiver(rx);
        tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), signal.recv())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn recv_returns_if_trigger_is_dropped() {
        let (tx, rx) = oneshot::channel::<()>();
        drop(tx);
        tokio::time::timeout(Duration::from_secs(1), InterruptSignal::from_receiver(rx).recv())
            .await
            .unwrap();
    }
}
