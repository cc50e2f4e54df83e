use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no results for query")]
    NoResults,

    #[cfg(feature = "duckdb")]
    #[error("duckdb error: {0}")]
    DuckDb(#[from] ::duckdb::Error),

    #[error("schema error: {0}")]
    Schema(#[from] sentinel_core::SchemaError),

    #[cfg(feature = "duckdb")]
    #[error("keywords encoding error: {0}")]
    Keywords(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}
