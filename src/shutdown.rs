//! Process shutdown: OS signal handling and a cloneable shutdown signal.
//!
//! [`Shutdown`] is triggered once by the server entry point; every open
//! event stream waits on a [`ShutdownSignal`] as its cancellation signal,
//! so live subscriptions are torn down when the server stops.

use tokio::sync::watch;

/// Owning side: triggers shutdown for every [`ShutdownSignal`].
#[derive(Debug)]
pub struct Shutdown {
    sender: watch::Sender<bool>,
}

/// Cloneable receiving side of a [`Shutdown`].
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    receiver: watch::Receiver<bool>,
}

impl Shutdown {
    /// Creates a shutdown trigger and its first signal.
    #[must_use]
    pub fn channel() -> (Self, ShutdownSignal) {
        let (sender, receiver) = watch::channel(false);
        (Self { sender }, ShutdownSignal { receiver })
    }

    /// Fires the signal. Idempotent.
    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }
}

impl ShutdownSignal {
    /// Resolves once shutdown has been triggered or the trigger is dropped.
    pub async fn wait(mut self) {
        let _ = self.receiver.wait_for(|stopping| *stopping).await;
    }

    /// Returns `true` if shutdown has already been triggered.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        *self.receiver.borrow()
    }
}

/// Waits for a termination signal (Ctrl-C, and `SIGTERM` on Unix).
///
/// # Errors
///
/// Returns an error if signal registration fails.
#[cfg(unix)]
pub async fn wait_for_os_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res?,
        _ = sigterm.recv() => {},
    }
    Ok(())
}

/// Waits for a termination signal (Ctrl-C).
///
/// # Errors
///
/// Returns an error if signal registration fails.
#[cfg(not(unix))]
pub async fn wait_for_os_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn trigger_releases_all_waiters() {
        let (shutdown, signal) = Shutdown::channel();
        let other = signal.clone();
        assert!(!signal.is_triggered());

        shutdown.trigger();
        assert!(other.is_triggered());
        let waited = tokio::time::timeout(Duration::from_secs(1), async {
            signal.wait().await;
            other.wait().await;
        })
        .await;
        assert!(waited.is_ok());
    }

    #[tokio::test]
    async fn dropping_trigger_releases_waiters() {
        let (shutdown, signal) = Shutdown::channel();
        drop(shutdown);
        let waited = tokio::time::timeout(Duration::from_secs(1), signal.wait()).await;
        assert!(waited.is_ok());
    }
}
