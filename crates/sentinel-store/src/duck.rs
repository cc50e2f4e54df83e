//! DuckDB-backed record store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use duckdb::{Connection, params};
use sentinel_core::{FeedbackRecord, NewFeedback, records_from_batch};
use tracing::info;
use uuid::Uuid;

use crate::{ChangeEvent, ChangeFeed, RecordStore, StoreError, Subscription};

const CREATE_FEEDBACK: &str = "CREATE TABLE IF NOT EXISTS feedback (
    id VARCHAR PRIMARY KEY,
    source VARCHAR NOT NULL,
    author VARCHAR NOT NULL,
    text VARCHAR NOT NULL,
    timestamp_ms BIGINT NOT NULL,
    sentiment VARCHAR,
    sentiment_score DOUBLE,
    urgency VARCHAR,
    keywords VARCHAR,
    rating INTEGER,
    suggested_response VARCHAR
)";

const SELECT_FEEDBACK: &str = "SELECT
    id, source, author, text,
    timestamp_ms::BIGINT AS timestamp_ms,
    sentiment,
    sentiment_score::DOUBLE AS sentiment_score,
    urgency,
    keywords,
    rating::INTEGER AS rating,
    suggested_response
FROM feedback
ORDER BY timestamp_ms DESC";

const INSERT_FEEDBACK: &str = "INSERT INTO feedback VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

/// Feedback stored in a single DuckDB table.
///
/// Keywords are kept as a JSON array in a VARCHAR column. Change
/// notifications cover writes made through this handle only.
pub struct DuckStore {
    conn: Mutex<Connection>,
    feed: ChangeFeed,
}

impl DuckStore {
    /// Open an in-memory DuckDB database.
    pub fn open() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Open or create a persistent DuckDB database at the given path.
    pub fn open_persistent(path: &Path) -> Result<Self, StoreError> {
        Self::init(Connection::open(path)?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(CREATE_FEEDBACK)?;
        Ok(Self {
            conn: Mutex::new(conn),
            feed: ChangeFeed::new(),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Other(format!("mutex poisoned: {e}")))
    }

    /// Execute arbitrary SQL and return Arrow RecordBatches.
    pub fn query_arrow(&self, sql: &str) -> Result<Vec<RecordBatch>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let batches: Vec<RecordBatch> = stmt.query_arrow([])?.collect();
        Ok(batches)
    }

    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    /// Write every record in one transaction; any failure rolls back the lot.
    fn write_batch(&self, records: &[FeedbackRecord]) -> Result<(), StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(INSERT_FEEDBACK)?;
            for r in records {
                let keywords = serde_json::to_string(&r.keywords)?;
                stmt.execute(params![
                    r.id,
                    r.source.as_str(),
                    r.author,
                    r.text,
                    r.timestamp.timestamp_millis(),
                    r.sentiment.map(|s| s.as_str()),
                    r.sentiment_score,
                    r.urgency.map(|u| u.as_str()),
                    keywords,
                    r.rating.map(i32::from),
                    r.suggested_response,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for DuckStore {
    async fn select_all(&self) -> Result<Vec<FeedbackRecord>, StoreError> {
        let mut out = Vec::new();
        for batch in self.query_arrow(SELECT_FEEDBACK)? {
            out.extend(records_from_batch(&batch)?);
        }
        Ok(out)
    }

    async fn insert(&self, items: Vec<NewFeedback>) -> Result<Vec<FeedbackRecord>, StoreError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let records: Vec<FeedbackRecord> = items
            .into_iter()
            .map(|item| item.into_record(Uuid::new_v4().to_string()))
            .collect();

        self.write_batch(&records)?;

        info!(count = records.len(), "inserted feedback");
        self.feed.publish(ChangeEvent {
            inserted: records.len(),
        });
        Ok(records)
    }

    fn subscribe(&self) -> Subscription {
        self.feed.subscribe()
    }

    async fn count(&self) -> Result<usize, StoreError> {
        let batches = self.query_arrow("SELECT count(*)::BIGINT AS cnt FROM feedback")?;
        let batch = batches.first().ok_or(StoreError::NoResults)?;
        let col = batch
            .column(0)
            .as_any()
            .downcast_ref::<arrow::array::Int64Array>()
            .ok_or_else(|| StoreError::Other("count column not i64".into()))?;
        Ok(col.value(0) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use sentinel_core::{Classification, Sentiment, Source, Urgency};

    fn classified(text: &str, minutes_ago: i64) -> NewFeedback {
        let classification = Classification {
            sentiment: Sentiment::Negative,
            sentiment_score: 0.2,
            urgency: Urgency::Medium,
            keywords: vec!["billing".into(), "issue".into(), "billing".into()],
            suggested_response: "We're sorry".into(),
        };
        let ts = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap() - Duration::minutes(minutes_ago);
        NewFeedback::classified(Source::Email, "sarah@example.com", text, ts, classification)
            .with_rating(Some(2))
    }

    #[test]
    fn open_in_memory() {
        let store = DuckStore::open().unwrap();
        let batches = store.query_arrow("SELECT 1 AS x").unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].num_rows(), 1);
    }

    #[tokio::test]
    async fn empty_table_selects_nothing() {
        let store = DuckStore::open().unwrap();
        assert!(store.select_all().await.unwrap().is_empty());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn insert_then_select_round_trips_classification() {
        let store = DuckStore::open().unwrap();
        let inserted = store
            .insert(vec![classified("Billing issue", 5)])
            .await
            .unwrap();
        let fetched = store.select_all().await.unwrap();
        assert_eq!(fetched, inserted);

        let r = &fetched[0];
        assert_eq!(r.sentiment, Some(Sentiment::Negative));
        assert_eq!(r.urgency, Some(Urgency::Medium));
        assert_eq!(r.keywords, vec!["billing", "issue", "billing"]);
        assert_eq!(r.suggested_response.as_deref(), Some("We're sorry"));
        assert_eq!(r.rating, Some(2));
    }

    #[tokio::test]
    async fn select_orders_by_timestamp_desc() {
        let store = DuckStore::open().unwrap();
        store
            .insert(vec![
                classified("oldest", 90),
                classified("newest", 0),
                classified("middle", 45),
            ])
            .await
            .unwrap();
        let texts: Vec<String> = store
            .select_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.text)
            .collect();
        assert_eq!(texts, vec!["newest", "middle", "oldest"]);
    }

    #[tokio::test]
    async fn sparse_rows_decode() {
        let store = DuckStore::open().unwrap();
        let item = NewFeedback {
            source: Source::Forum,
            author: "anon".into(),
            text: "no labels".into(),
            timestamp: Utc::now(),
            sentiment: None,
            sentiment_score: None,
            urgency: None,
            keywords: vec![],
            rating: None,
            suggested_response: None,
        };
        store.insert(vec![item]).await.unwrap();
        let r = &store.select_all().await.unwrap()[0];
        assert!(r.sentiment.is_none());
        assert!(r.urgency.is_none());
        assert!(r.keywords.is_empty());
    }

    #[tokio::test]
    async fn failed_batch_leaves_nothing_behind() {
        let store = DuckStore::open().unwrap();
        store.insert(vec![classified("first", 0)]).await.unwrap();

        // Second row repeats the first row's id and violates the primary key.
        let fresh = classified("fresh", 1).into_record("dup");
        let clash = classified("clash", 2).into_record("dup");
        assert!(store.write_batch(&[fresh, clash]).is_err());

        let records = store.select_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "first");
    }

    #[tokio::test]
    async fn insert_notifies_subscribers() {
        let store = DuckStore::open().unwrap();
        let mut sub = store.subscribe();
        store
            .insert(vec![classified("a", 0), classified("b", 1)])
            .await
            .unwrap();
        assert_eq!(sub.changed().await, Some(ChangeEvent { inserted: 2 }));
    }

    #[tokio::test]
    async fn persistent_reopen_keeps_records() {
        let tmp = tempfile::TempDir::new().unwrap();
        let db_path = tmp.path().join("feedback.duckdb");

        let store = DuckStore::open_persistent(&db_path).unwrap();
        assert!(db_path.exists());
        store.insert(vec![classified("kept", 0)]).await.unwrap();
        drop(store);

        let store = DuckStore::open_persistent(&db_path).unwrap();
        let records = store.select_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "kept");
    }
}
