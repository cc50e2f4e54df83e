//! Arrow schema for the `feedback` table and decoding of query results.
//!
//! Stores return rows as Arrow `RecordBatch`es; [`records_from_batch`] turns
//! them back into [`FeedbackRecord`]s. Keywords may arrive either as a
//! `List<Utf8>` column or as a JSON-encoded `Utf8` column.

use std::sync::Arc;

use arrow::array::{
    Array, Float64Array, Int32Array, Int64Array, LargeListArray, LargeStringArray, ListArray,
    StringArray,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::feedback::{FeedbackRecord, ParseError, Sentiment, Source, Urgency};

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("missing '{0}' column")]
    MissingColumn(&'static str),
    #[error("null {column} at row {row}")]
    NullValue { column: &'static str, row: usize },
    #[error("unexpected type for '{column}': {data_type}")]
    UnexpectedType {
        column: &'static str,
        data_type: DataType,
    },
    #[error("timestamp out of range at row {0}")]
    Timestamp(usize),
    #[error(transparent)]
    Label(#[from] ParseError),
    #[error("keywords JSON error: {0}")]
    Keywords(#[from] serde_json::Error),
}

/// Schema of the `feedback` table as exported by the store.
pub fn feedback_schema() -> Schema {
    Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("source", DataType::Utf8, false),
        Field::new("author", DataType::Utf8, false),
        Field::new("text", DataType::Utf8, false),
        Field::new("timestamp_ms", DataType::Int64, false),
        Field::new("sentiment", DataType::Utf8, true),
        Field::new("sentiment_score", DataType::Float64, true),
        Field::new("urgency", DataType::Utf8, true),
        Field::new(
            "keywords",
            DataType::List(Arc::new(Field::new("item", DataType::Utf8, true))),
            true,
        ),
        Field::new("rating", DataType::Int32, true),
        Field::new("suggested_response", DataType::Utf8, true),
    ])
}

/// Decode every row of a feedback batch.
pub fn records_from_batch(batch: &RecordBatch) -> Result<Vec<FeedbackRecord>, SchemaError> {
    let id = column(batch, "id")?;
    let source = column(batch, "source")?;
    let author = column(batch, "author")?;
    let text = column(batch, "text")?;
    let timestamp = column(batch, "timestamp_ms")?;
    let sentiment = batch.column_by_name("sentiment");
    let score = batch.column_by_name("sentiment_score");
    let urgency = batch.column_by_name("urgency");
    let keywords = batch.column_by_name("keywords");
    let rating = batch.column_by_name("rating");
    let response = batch.column_by_name("suggested_response");

    let timestamps = timestamp
        .as_any()
        .downcast_ref::<Int64Array>()
        .ok_or_else(|| SchemaError::UnexpectedType {
            column: "timestamp_ms",
            data_type: timestamp.data_type().clone(),
        })?;

    let mut out = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        let required = |col: &dyn Array, name: &'static str| {
            get_string(col, row).ok_or(SchemaError::NullValue { column: name, row })
        };

        if timestamps.is_null(row) {
            return Err(SchemaError::NullValue {
                column: "timestamp_ms",
                row,
            });
        }
        let timestamp: DateTime<Utc> = DateTime::from_timestamp_millis(timestamps.value(row))
            .ok_or(SchemaError::Timestamp(row))?;

        let sentiment: Option<Sentiment> = sentiment
            .and_then(|c| get_string(c.as_ref(), row))
            .map(|s| s.parse())
            .transpose()?;
        let urgency: Option<Urgency> = urgency
            .and_then(|c| get_string(c.as_ref(), row))
            .map(|s| s.parse())
            .transpose()?;
        let keywords = match keywords {
            Some(col) => get_keywords(col.as_ref(), row)?,
            None => Vec::new(),
        };

        out.push(FeedbackRecord {
            id: required(id.as_ref(), "id")?,
            source: required(source.as_ref(), "source")?.parse::<Source>()?,
            author: required(author.as_ref(), "author")?,
            text: required(text.as_ref(), "text")?,
            timestamp,
            sentiment,
            sentiment_score: score.and_then(|c| get_f64(c.as_ref(), row)),
            urgency,
            keywords,
            rating: rating
                .and_then(|c| get_i32(c.as_ref(), row))
                .and_then(|r| u8::try_from(r).ok()),
            suggested_response: response.and_then(|c| get_string(c.as_ref(), row)),
        });
    }

    Ok(out)
}

fn column<'a>(
    batch: &'a RecordBatch,
    name: &'static str,
) -> Result<&'a Arc<dyn Array>, SchemaError> {
    batch
        .column_by_name(name)
        .ok_or(SchemaError::MissingColumn(name))
}

// ── Arrow extraction helpers ──

/// Extract a string value (handles Utf8 and LargeUtf8).
fn get_string(col: &dyn Array, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    col.as_any()
        .downcast_ref::<StringArray>()
        .map(|arr| arr.value(row).to_string())
        .or_else(|| {
            col.as_any()
                .downcast_ref::<LargeStringArray>()
                .map(|arr| arr.value(row).to_string())
        })
}

fn get_f64(col: &dyn Array, row: usize) -> Option<f64> {
    if col.is_null(row) {
        return None;
    }
    col.as_any()
        .downcast_ref::<Float64Array>()
        .map(|a| a.value(row))
}

fn get_i32(col: &dyn Array, row: usize) -> Option<i32> {
    if col.is_null(row) {
        return None;
    }
    col.as_any()
        .downcast_ref::<Int32Array>()
        .map(|a| a.value(row))
}

/// Keywords from a List/LargeList column, or a JSON array stored as text.
fn get_keywords(col: &dyn Array, row: usize) -> Result<Vec<String>, SchemaError> {
    if col.is_null(row) {
        return Ok(Vec::new());
    }
    if let Some(list) = col.as_any().downcast_ref::<ListArray>() {
        return Ok(strings_from_array(list.value(row).as_ref()));
    }
    if let Some(list) = col.as_any().downcast_ref::<LargeListArray>() {
        return Ok(strings_from_array(list.value(row).as_ref()));
    }
    match get_string(col, row) {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Err(SchemaError::UnexpectedType {
            column: "keywords",
            data_type: col.data_type().clone(),
        }),
    }
}

fn strings_from_array(arr: &dyn Array) -> Vec<String> {
    (0..arr.len()).filter_map(|i| get_string(arr, i)).collect()
}
