//! # Shutdown Signal
//!
//! Cooperative cancellation shared by every long-running wait in the
//! workspace (source polling, readiness waits, slot buffers, signature
//! collection).
//!
//! A `ShutdownController` owns the sender side; any number of cheap
//! `Shutdown` handles observe it. Cancellation is sticky: once triggered,
//! every current and future `cancelled()` call resolves immediately.

use tokio::sync::watch;
use tracing::debug;

/// Owner of the shutdown signal.
#[derive(Debug)]
pub struct ShutdownController {
    sender: watch::Sender<bool>,
}

impl ShutdownController {
    /// Create a new, not-yet-triggered controller.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self { sender }
    }

    /// Obtain a handle observing this controller.
    #[must_use]
    pub fn handle(&self) -> Shutdown {
        Shutdown {
            receiver: self.sender.subscribe(),
        }
    }

    /// Trigger shutdown for every handle.
    pub fn shutdown(&self) {
        debug!("Shutdown requested");
        self.sender.send_replace(true);
    }

    /// Whether shutdown has been triggered.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        *self.sender.borrow()
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer side of the shutdown signal.
#[derive(Debug, Clone)]
pub struct Shutdown {
    receiver: watch::Receiver<bool>,
}

impl Shutdown {
    /// A handle that is never cancelled (its controller is dropped).
    ///
    /// A dropped controller is treated as "keep running".
    #[must_use]
    pub fn never() -> Self {
        ShutdownController::new().handle()
    }

    /// Whether shutdown has been triggered.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolve once shutdown is triggered.
    ///
    /// Never resolves if the controller is dropped without triggering.
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        if receiver.wait_for(|stop| *stop).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_cancelled_resolves_after_shutdown() {
        let controller = ShutdownController::new();
        let handle = controller.handle();
        assert!(!handle.is_cancelled());

        controller.shutdown();

        timeout(Duration::from_millis(100), handle.cancelled())
            .await
            .expect("cancelled should resolve");
        assert!(handle.is_cancelled());
    }

    #[tokio::test]
    async fn test_late_handle_sees_shutdown() {
        let controller = ShutdownController::new();
        controller.shutdown();

        let late = controller.handle();
        assert!(late.is_cancelled());
        late.cancelled().await;
    }

    #[tokio::test]
    async fn test_never_does_not_resolve() {
        let handle = Shutdown::never();
        let result = timeout(Duration::from_millis(20), handle.cancelled()).await;
        assert!(result.is_err());
        assert!(!handle.is_cancelled());
    }
}
