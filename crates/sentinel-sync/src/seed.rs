//! Demo data for an empty store.

use chrono::{DateTime, Duration, Utc};
use sentinel_ai::classify;
use sentinel_core::sample::SAMPLE_FEEDBACK;
use sentinel_core::{FeedbackRecord, NewFeedback};
use sentinel_store::RecordStore;
use tracing::info;

use crate::IngestError;

/// Insert the canned samples, timestamped relative to `now`.
///
/// Refuses to run when the store already holds records. Sample texts go
/// through the classifier like any ingested item.
pub async fn seed_samples<S>(store: &S, now: DateTime<Utc>) -> Result<Vec<FeedbackRecord>, IngestError>
where
    S: RecordStore + ?Sized,
{
    let existing = store.count().await?;
    if existing > 0 {
        return Err(IngestError::AlreadySeeded(existing));
    }

    let batch: Vec<NewFeedback> = SAMPLE_FEEDBACK
        .iter()
        .map(|s| {
            NewFeedback::classified(
                s.source,
                s.author,
                s.text,
                now - Duration::minutes(s.minutes_ago),
                classify(s.text),
            )
            .with_rating(s.rating)
        })
        .collect();

    let stored = store.insert(batch).await?;
    info!(count = stored.len(), "seeded sample feedback");
    Ok(stored)
}
