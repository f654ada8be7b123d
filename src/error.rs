use std::fmt;

use gcp_bigquery_client::error::BQError;
use thiserror::Error;

/// Errors that can occur when talking to the warehouse service
#[derive(Debug, Error)]
pub enum BqClientError {
    /// Credential file missing/invalid or the project was rejected at connect time
    #[error("authentication error: {0}")]
    Auth(#[source] BQError),

    /// Configuration error (missing env vars, invalid paths, etc.)
    #[error("configuration error: {0}")]
    Config(String),

    /// Failure returned by the remote service for a single-object operation
    #[error("remote service error: {0}")]
    Remote(#[from] BQError),

    /// Failure while submitting a query or reading a result page.
    /// Rows read from earlier pages are discarded.
    #[error("query error: {0}")]
    Query(#[source] BQError),

    /// Schema type tag outside the recognized set. The whole create-table
    /// call is rejected rather than silently dropping the column.
    #[error("unrecognized schema type tag {tag:?} for column {column:?}")]
    UnknownFieldTag { column: String, tag: String },

    /// One or more rows in a batched insert failed service-side validation.
    /// Valid rows in the same batch are still committed; the full per-row
    /// failure list is carried here.
    #[error("{} row(s) failed to insert", failures.len())]
    RowInsert { failures: Vec<RowInsertFailure> },
}

/// Type alias for Results using BqClientError
pub type Result<T> = std::result::Result<T, BqClientError>;

/// A single failed row within a batched streaming insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowInsertFailure {
    /// Zero-based index of the row within the submitted batch
    pub index: usize,
    /// Dedup insert ID the row carried, if any
    pub insert_id: Option<String>,
    /// Error messages reported by the service for this row
    pub messages: Vec<String>,
}

impl fmt::Display for RowInsertFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}", self.index)?;
        if let Some(id) = &self.insert_id {
            write!(f, " (insert id {id})")?;
        }
        write!(f, ": {}", self.messages.join("; "))
    }
}

impl BqClientError {
    /// True when the underlying remote failure is a "not found" response,
    /// e.g. deleting or querying a table that does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            BqClientError::Auth(err) | BqClientError::Remote(err) | BqClientError::Query(err) => {
                matches!(err, BQError::ResponseError { error } if error.error.code == 404)
            }
            _ => false,
        }
    }
}
