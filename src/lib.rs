//! Thin typed access layer over Google BigQuery.
//!
//! The crate wraps the BigQuery REST API behind a small client that
//! creates datasets and tables, streams rows in (single, batched, or
//! batched with dedup insert IDs), runs SQL queries and drains their
//! results, and deletes tables. Every operation delegates to the remote
//! service; the value here is adapting generic rows and schemas into the
//! request shapes the API requires and classifying what comes back.
//!
//! Module organization:
//! - `client`: the [`WarehouseClient`] and all remote operations
//! - `config`: connection settings, explicit or from the environment
//! - `schema`: column type tags and their BigQuery field mapping
//! - `row`: generic row values and dedup insert IDs
//! - `error`: error taxonomy and per-row insert failures

pub mod client;
pub mod config;
pub mod error;
pub mod row;
pub mod schema;

pub use client::WarehouseClient;
pub use config::ClientConfig;
pub use error::{BqClientError, Result, RowInsertFailure};
pub use row::{IdentifiedRow, Row, Value};
pub use schema::FieldTag;
