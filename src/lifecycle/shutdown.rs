//! Shutdown coordination.

use tokio::sync::watch;

/// Coordinator for graceful shutdown.
///
/// Background loops hold a [`ShutdownSignal`] and select on it. A signal
/// obtained after the trigger still fires.
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// A signal that resolves once [`trigger`](Self::trigger) is called.
    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Trigger the shutdown signal. Repeated calls are harmless.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Number of outstanding signals (loops still running).
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of [`Shutdown`].
#[derive(Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Wait for the trigger. Also returns if the coordinator is dropped.
    pub async fn recv(&mut self) {
        let _ = self.rx.wait_for(|triggered| *triggered).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_trigger_wakes_waiters() {
        let shutdown = Shutdown::new();
        let mut signal = shutdown.subscribe();
        let waiter = tokio::spawn(async move { signal.recv().await });

        shutdown.trigger();
        timeout(Duration::from_secs(1), waiter).await.unwrap().unwrap();
        assert!(shutdown.is_triggered());
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_trigger() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        shutdown.trigger();

        let mut signal = shutdown.subscribe();
        timeout(Duration::from_secs(1), signal.recv()).await.unwrap();
        assert_eq!(shutdown.receiver_count(), 1);
    }
}
