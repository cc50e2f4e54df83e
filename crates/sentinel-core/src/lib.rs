pub mod feedback;
pub mod query;
pub mod sample;
pub mod schema;
pub mod stats;
pub mod trends;

pub use feedback::{
    Classification, FeedbackRecord, NewFeedback, ParseError, Sentiment, Source, Urgency,
};
pub use query::{FilterSpec, Selection, view};
pub use schema::{SchemaError, feedback_schema, records_from_batch};
pub use stats::DashboardStats;
pub use trends::{RISK_KEYWORDS, TrendEntry, trends};
