//! Change notification between a store and its subscribers.

use tokio::sync::broadcast;
use tracing::debug;

const FEED_CAPACITY: usize = 64;

/// Emitted after a batch has been committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Records in the batch. Zero when the subscriber lagged and the
    /// original events were dropped.
    pub inserted: usize,
}

/// Fan-out of [`ChangeEvent`]s to any number of subscribers.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        let (tx, _) = broadcast::channel(FEED_CAPACITY);
        Self { tx }
    }
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notify current subscribers. Having none is not an error.
    pub fn publish(&self, event: ChangeEvent) {
        let delivered = self.tx.send(event).unwrap_or(0);
        debug!(inserted = event.inserted, delivered, "change published");
    }

    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// A registered change listener. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<ChangeEvent>,
}

impl Subscription {
    /// Wait for the next change. Returns `None` once the store is gone.
    ///
    /// Lagging behind the feed still reports a change, since whatever was
    /// missed can only be recovered by a full refetch anyway.
    pub async fn changed(&mut self) -> Option<ChangeEvent> {
        match self.rx.recv().await {
            Ok(event) => Some(event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!(skipped, "subscriber lagged");
                Some(ChangeEvent { inserted: 0 })
            }
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        debug!("change subscription released");
    }
}
