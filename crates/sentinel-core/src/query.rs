//! Filtering and triage ordering for the feedback view.
//!
//! [`view`] applies a [`FilterSpec`] to the full record set and returns the
//! visible subset ordered by urgency (HIGH first). The sort is stable, so
//! records of equal urgency keep their input order, which is newest-first
//! as delivered by the record store.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::feedback::{FeedbackRecord, Sentiment, Source, Urgency};

/// Either every value (`all`) or a single value to match exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selection<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Selection<T> {
    /// `true` for `All`; otherwise the field must be present and equal.
    pub fn matches(&self, value: Option<&T>) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => value == Some(wanted),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl<T: FromStr> FromStr for Selection<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

/// View-local filter state. Has no identity and is recomputed on every change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub search: String,
    pub urgency: Selection<Urgency>,
    pub source: Selection<Source>,
    pub sentiment: Selection<Sentiment>,
}

impl FilterSpec {
    /// `true` when at least one predicate would exclude records.
    pub fn is_active(&self) -> bool {
        !self.search.is_empty()
            || !self.urgency.is_all()
            || !self.source.is_all()
            || !self.sentiment.is_all()
    }

    /// Reset every predicate to its inactive value.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether a record passes every active predicate.
    pub fn matches(&self, record: &FeedbackRecord) -> bool {
        self.matches_search(record)
            && self.urgency.matches(record.urgency.as_ref())
            && self.source.matches(Some(&record.source))
            && self.sentiment.matches(record.sentiment.as_ref())
    }

    fn matches_search(&self, record: &FeedbackRecord) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        record.text.to_lowercase().contains(&needle)
            || record.author.to_lowercase().contains(&needle)
            || record
                .keywords
                .iter()
                .any(|k| k.to_lowercase().contains(&needle))
    }
}

/// Visible subset of `records` under `filter`, in triage order.
pub fn view(records: &[FeedbackRecord], filter: &FilterSpec) -> Vec<FeedbackRecord> {
    let mut visible: Vec<FeedbackRecord> = records
        .iter()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect();
    // `sort_by_key` is stable: equal ranks keep their input order.
    visible.sort_by_key(|r| r.effective_urgency().rank());
    visible
}
