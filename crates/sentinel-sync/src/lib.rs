//! Getting feedback in and alerts out: ingestion from a search source,
//! sample seeding, and (with `http`) the search API client and notification
//! senders.

mod error;
pub use error::{ErrorKind, IngestError, NotifyError, SearchError};

pub mod ingest;
pub use ingest::{FeedbackSource, Ingestor, RawItem, author_handle};

pub mod seed;
pub use seed::seed_samples;

#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "http")]
pub use http::{SearchClient, SearchConfig};

#[cfg(feature = "http")]
pub mod notify;
#[cfg(feature = "http")]
pub use notify::{EmailConfig, EmailNotifier, Notifier, SlackNotifier, first_urgent};
