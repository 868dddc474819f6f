//! Shutdown coordination.

use tokio::sync::broadcast;

/// Broadcasts a single shutdown notification to every long-running task
/// (HTTP server, rate limit sweeper).
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Notify all subscribers. Triggering twice is harmless.
    pub fn trigger(&self) {
        let receivers = self.tx.send(()).unwrap_or(0);
        tracing::debug!(receivers, "Shutdown triggered");
    }

    /// Tasks still subscribed.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
