//! Process-local record store.

use async_trait::async_trait;
use sentinel_core::{FeedbackRecord, NewFeedback};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::{ChangeEvent, ChangeFeed, RecordStore, StoreError, Subscription};

/// Records held in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<FeedbackRecord>>,
    feed: ChangeFeed,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn select_all(&self) -> Result<Vec<FeedbackRecord>, StoreError> {
        let mut out = self.records.read().await.clone();
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(out)
    }

    async fn insert(&self, items: Vec<NewFeedback>) -> Result<Vec<FeedbackRecord>, StoreError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let inserted: Vec<FeedbackRecord> = items
            .into_iter()
            .map(|item| item.into_record(Uuid::new_v4().to_string()))
            .collect();

        self.records.write().await.extend(inserted.iter().cloned());
        info!(count = inserted.len(), "inserted feedback");
        self.feed.publish(ChangeEvent {
            inserted: inserted.len(),
        });
        Ok(inserted)
    }

    fn subscribe(&self) -> Subscription {
        self.feed.subscribe()
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use sentinel_core::Source;

    fn item(text: &str, minutes_ago: i64) -> NewFeedback {
        NewFeedback {
            source: Source::Chat,
            author: "tester".into(),
            text: text.into(),
            timestamp: Utc::now() - Duration::minutes(minutes_ago),
            sentiment: None,
            sentiment_score: None,
            urgency: None,
            keywords: vec![],
            rating: None,
            suggested_response: None,
        }
    }

    #[tokio::test]
    async fn select_is_newest_first() {
        let store = MemoryStore::new();
        store
            .insert(vec![item("old", 60), item("new", 1), item("mid", 30)])
            .await
            .unwrap();
        let texts: Vec<String> = store
            .select_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.text)
            .collect();
        assert_eq!(texts, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn insert_assigns_unique_ids() {
        let store = MemoryStore::new();
        let out = store.insert(vec![item("a", 0), item("b", 0)]).await.unwrap();
        assert_eq!(out.len(), 2);
        assert_ne!(out[0].id, out[1].id);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn insert_notifies_once_per_batch() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe();
        store.insert(vec![item("a", 0), item("b", 0)]).await.unwrap();
        assert_eq!(sub.changed().await, Some(ChangeEvent { inserted: 2 }));
    }

    #[tokio::test]
    async fn empty_batch_is_a_no_op() {
        let store = MemoryStore::new();
        let _sub = store.subscribe();
        assert!(store.insert(vec![]).await.unwrap().is_empty());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn dropped_subscription_is_released() {
        let store = MemoryStore::new();
        let sub = store.subscribe();
        assert_eq!(store.feed().subscriber_count(), 1);
        drop(sub);
        assert_eq!(store.feed().subscriber_count(), 0);
    }
}
