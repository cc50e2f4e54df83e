//! Dashboard counters over the full record set.

use serde::{Deserialize, Serialize};

use crate::feedback::{FeedbackRecord, Sentiment, Urgency};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub urgent_count: usize,
    pub total_count: usize,
    /// Percentage of positive records, rounded; 0 for an empty set.
    pub positive_rate: u32,
    pub positive_count: usize,
}

impl DashboardStats {
    pub fn compute(records: &[FeedbackRecord]) -> Self {
        let urgent_count = records
            .iter()
            .filter(|r| r.urgency == Some(Urgency::High))
            .count();
        let positive_count = records
            .iter()
            .filter(|r| r.sentiment == Some(Sentiment::Positive))
            .count();
        let total_count = records.len();
        let positive_rate = if total_count > 0 {
            (positive_count as f64 / total_count as f64 * 100.0).round() as u32
        } else {
            0
        };

        Self {
            urgent_count,
            total_count,
            positive_rate,
            positive_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::{NewFeedback, Source};
    use chrono::Utc;

    fn record(sentiment: Sentiment, urgency: Option<Urgency>) -> FeedbackRecord {
        NewFeedback {
            source: Source::Email,
            author: "a".into(),
            text: "t".into(),
            timestamp: Utc::now(),
            sentiment: Some(sentiment),
            sentiment_score: Some(sentiment.score()),
            urgency,
            keywords: vec![],
            rating: None,
            suggested_response: None,
        }
        .into_record("id")
    }

    #[test]
    fn counts_urgent_and_positive() {
        let records = vec![
            record(Sentiment::Negative, Some(Urgency::High)),
            record(Sentiment::Positive, Some(Urgency::Low)),
            record(Sentiment::Positive, None),
            record(Sentiment::Neutral, Some(Urgency::Medium)),
        ];
        let stats = DashboardStats::compute(&records);
        assert_eq!(stats.urgent_count, 1);
        assert_eq!(stats.total_count, 4);
        assert_eq!(stats.positive_count, 2);
        assert_eq!(stats.positive_rate, 50);
    }

    #[test]
    fn empty_set_has_zero_rate() {
        assert_eq!(DashboardStats::compute(&[]), DashboardStats::default());
    }

    #[test]
    fn rate_is_rounded() {
        let records = vec![
            record(Sentiment::Positive, None),
            record(Sentiment::Neutral, None),
            record(Sentiment::Neutral, None),
        ];
        assert_eq!(DashboardStats::compute(&records).positive_rate, 33);
    }
}
