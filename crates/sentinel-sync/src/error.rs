use sentinel_store::StoreError;
use thiserror::Error;

/// Coarse failure class reported to the caller. None of them is retried
/// automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required credential or setting is missing.
    Configuration,
    /// The external service or the store reported a failure.
    Upstream,
    /// Caller input failed a precondition.
    Validation,
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("{0} not configured")]
    MissingCredential(&'static str),
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("search API returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SearchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential(_) => ErrorKind::Configuration,
            _ => ErrorKind::Upstream,
        }
    }
}

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("search query must not be empty")]
    EmptyQuery,
    #[error("store already holds {0} records; refusing to seed")]
    AlreadySeeded(usize),
    #[error("search failed: {0}")]
    Search(#[from] SearchError),
    #[error("store failed: {0}")]
    Store(#[from] StoreError),
}

impl IngestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyQuery | Self::AlreadySeeded(_) => ErrorKind::Validation,
            Self::Search(e) => e.kind(),
            Self::Store(_) => ErrorKind::Upstream,
        }
    }
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("{0} not configured")]
    MissingCredential(&'static str),
    #[error("invalid recipient address: {0:?}")]
    InvalidRecipient(String),
    #[error("no HIGH urgency feedback to alert on")]
    NothingUrgent,
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{service} returned {status}: {body}")]
    Server {
        service: &'static str,
        status: u16,
        body: String,
    },
}

impl NotifyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential(_) => ErrorKind::Configuration,
            Self::InvalidRecipient(_) | Self::NothingUrgent => ErrorKind::Validation,
            _ => ErrorKind::Upstream,
        }
    }
}
