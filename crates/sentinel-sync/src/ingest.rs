//! Pull raw items from a search source, classify them, store them as one batch.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sentinel_ai::RuleClassifier;
use sentinel_core::{FeedbackRecord, NewFeedback, Source};
use sentinel_store::RecordStore;
use serde::Deserialize;
use tracing::{info, warn};

use crate::{IngestError, SearchError};

/// One item as returned by the external search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawItem {
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author_id: String,
}

/// A free-text searchable feed of raw feedback.
#[async_trait]
pub trait FeedbackSource: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<RawItem>, SearchError>;
}

/// Display handle for a source-provided author id.
pub fn author_handle(author_id: &str) -> String {
    format!("@user_{author_id}")
}

/// Runs ingestion against one source and one store.
pub struct Ingestor<F, S: ?Sized> {
    source: F,
    store: Arc<S>,
    classifier: RuleClassifier,
}

impl<F, S> Ingestor<F, S>
where
    F: FeedbackSource,
    S: RecordStore + ?Sized,
{
    pub fn new(source: F, store: Arc<S>) -> Self {
        Self {
            source,
            store,
            classifier: RuleClassifier::default(),
        }
    }

    pub fn with_classifier(mut self, classifier: RuleClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Classify one raw item.
    pub fn normalize(&self, item: RawItem) -> NewFeedback {
        let classification = self.classifier.classify(&item.text);
        NewFeedback::classified(
            Source::Social,
            author_handle(&item.author_id),
            item.text,
            item.created_at,
            classification,
        )
    }

    /// Search, classify and store. Returns the stored records.
    ///
    /// A failed search aborts before any write. Zero results perform no
    /// write at all.
    pub async fn ingest(&self, query: &str) -> Result<Vec<FeedbackRecord>, IngestError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(IngestError::EmptyQuery);
        }

        let items = self.source.search(query).await.inspect_err(|e| {
            warn!(query, error = %e, "search failed, nothing ingested");
        })?;

        let batch: Vec<NewFeedback> = items.into_iter().map(|i| self.normalize(i)).collect();
        if batch.is_empty() {
            info!(query, "search returned no items");
            return Ok(Vec::new());
        }

        let stored = self.store.insert(batch).await?;
        info!(query, count = stored.len(), "ingested feedback");
        Ok(stored)
    }
}
