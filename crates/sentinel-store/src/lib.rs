//! Storage layer: the `RecordStore` contract, change notification, and
//! backends (in-memory, DuckDB).

mod error;
pub use error::StoreError;

mod feed;
pub use feed::{ChangeEvent, ChangeFeed, Subscription};

mod memory;
pub use memory::MemoryStore;

#[cfg(feature = "duckdb")]
mod duck;
#[cfg(feature = "duckdb")]
pub use duck::DuckStore;

use async_trait::async_trait;
use sentinel_core::{FeedbackRecord, NewFeedback};

/// Persistence and change notification for feedback records.
///
/// Records are only ever inserted; there are no updates or deletes.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every record, newest first.
    async fn select_all(&self) -> Result<Vec<FeedbackRecord>, StoreError>;

    /// Insert a batch atomically, assigning ids. Either every item is stored
    /// or none is. Subscribers are notified once per successful batch.
    async fn insert(&self, items: Vec<NewFeedback>) -> Result<Vec<FeedbackRecord>, StoreError>;

    /// Register for change notifications. Dropping the returned
    /// [`Subscription`] unsubscribes.
    fn subscribe(&self) -> Subscription;

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.select_all().await?.len())
    }
}
