//! Feedback records and their classification labels.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown source: {0}")]
    Source(String),
    #[error("unknown sentiment: {0}")]
    Sentiment(String),
    #[error("unknown urgency: {0}")]
    Urgency(String),
}

/// Channel a feedback item arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    #[serde(alias = "twitter")]
    Social,
    #[serde(alias = "reviews")]
    Review,
    Forum,
    Email,
    Chat,
}

impl Source {
    pub const ALL: [Source; 5] = [
        Source::Social,
        Source::Review,
        Source::Forum,
        Source::Email,
        Source::Chat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Social => "social",
            Self::Review => "review",
            Self::Forum => "forum",
            Self::Email => "email",
            Self::Chat => "chat",
        }
    }
}

impl FromStr for Source {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "social" | "twitter" => Ok(Self::Social),
            "review" | "reviews" => Ok(Self::Review),
            "forum" => Ok(Self::Forum),
            "email" => Ok(Self::Email),
            "chat" => Ok(Self::Chat),
            _ => Err(ParseError::Source(s.to_string())),
        }
    }
}

/// Categorical sentiment assigned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }

    /// Score in `[0, 1]` for this sentiment band. Higher is more positive.
    pub fn score(&self) -> f64 {
        match self {
            Self::Positive => 0.8,
            Self::Neutral => 0.5,
            Self::Negative => 0.2,
        }
    }
}

impl FromStr for Sentiment {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "neutral" => Ok(Self::Neutral),
            "negative" => Ok(Self::Negative),
            _ => Err(ParseError::Sentiment(s.to_string())),
        }
    }
}

/// Triage priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Urgency {
    High,
    Medium,
    Low,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }

    /// Sort rank: HIGH=0, MEDIUM=1, LOW=2.
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

impl FromStr for Urgency {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HIGH" => Ok(Self::High),
            "MEDIUM" => Ok(Self::Medium),
            "LOW" => Ok(Self::Low),
            _ => Err(ParseError::Urgency(s.to_string())),
        }
    }
}

macro_rules! display_as_str {
    ($($t:ty),*) => {
        $(impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(Source, Sentiment, Urgency);

/// Output of the classifier for one piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub sentiment: Sentiment,
    pub sentiment_score: f64,
    pub urgency: Urgency,
    pub keywords: Vec<String>,
    pub suggested_response: String,
}

/// A feedback item that has not been stored yet (no id).
///
/// Produced by ingestion or seeding and handed to the record store, which
/// assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFeedback {
    pub source: Source,
    pub author: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub sentiment: Option<Sentiment>,
    pub sentiment_score: Option<f64>,
    pub urgency: Option<Urgency>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub rating: Option<u8>,
    pub suggested_response: Option<String>,
}

impl NewFeedback {
    /// Build a fully classified item. All classification fields are set together.
    pub fn classified(
        source: Source,
        author: impl Into<String>,
        text: impl Into<String>,
        timestamp: DateTime<Utc>,
        classification: Classification,
    ) -> Self {
        Self {
            source,
            author: author.into(),
            text: text.into(),
            timestamp,
            sentiment: Some(classification.sentiment),
            sentiment_score: Some(classification.sentiment_score),
            urgency: Some(classification.urgency),
            keywords: classification.keywords,
            rating: None,
            suggested_response: Some(classification.suggested_response),
        }
    }

    pub fn with_rating(mut self, rating: Option<u8>) -> Self {
        self.rating = rating.filter(|r| (1..=5).contains(r));
        self
    }

    /// Attach the store-assigned id.
    pub fn into_record(self, id: impl Into<String>) -> FeedbackRecord {
        FeedbackRecord {
            id: id.into(),
            source: self.source,
            author: self.author,
            text: self.text,
            timestamp: self.timestamp,
            sentiment: self.sentiment,
            sentiment_score: self.sentiment_score,
            urgency: self.urgency,
            keywords: self.keywords,
            rating: self.rating,
            suggested_response: self.suggested_response,
        }
    }
}

/// A stored feedback item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: String,
    pub source: Source,
    pub author: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub sentiment: Option<Sentiment>,
    pub sentiment_score: Option<f64>,
    pub urgency: Option<Urgency>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub rating: Option<u8>,
    pub suggested_response: Option<String>,
}

impl FeedbackRecord {
    /// Urgency used for ranking; absent counts as LOW.
    pub fn effective_urgency(&self) -> Urgency {
        self.urgency.unwrap_or(Urgency::Low)
    }
}
