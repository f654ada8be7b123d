//! Warehouse client: dataset/table DDL, streaming inserts and queries.
//!
//! Every method issues one round trip to the BigQuery REST API (queries
//! may page through several) and returns the remote outcome as-is. No
//! retries, timeouts or backoff happen at this layer; callers cancel a
//! call by dropping its future.

use gcp_bigquery_client::model::dataset::Dataset;
use gcp_bigquery_client::model::get_query_results_parameters::GetQueryResultsParameters;
use gcp_bigquery_client::model::query_request::QueryRequest;
use gcp_bigquery_client::model::table::Table;
use gcp_bigquery_client::model::table_data_insert_all_request::TableDataInsertAllRequest;
use gcp_bigquery_client::model::table_field_schema::TableFieldSchema;
use gcp_bigquery_client::model::table_row::TableRow;
use gcp_bigquery_client::model::table_schema::TableSchema;
use tracing::{debug, error, info};

use crate::config::ClientConfig;
use crate::error::{BqClientError, Result, RowInsertFailure};
use crate::row::{IdentifiedRow, Row, Value};
use crate::schema::FieldTag;

/// Authenticated handle to a BigQuery project.
///
/// The client holds no mutable state after construction; methods take
/// `&self` and may be called from multiple tasks concurrently.
pub struct WarehouseClient {
    bq: gcp_bigquery_client::Client,
    config: ClientConfig,
}

impl WarehouseClient {
    /// Authenticate with the service-account key file named in `config`.
    ///
    /// A failed connect is fatal: the client is never returned and the
    /// caller must not proceed.
    pub async fn connect(config: ClientConfig) -> Result<WarehouseClient> {
        let bq = gcp_bigquery_client::Client::from_service_account_key_file(
            config.credentials_file.as_str(),
        )
        .await
        .map_err(BqClientError::Auth)?;

        Ok(WarehouseClient { bq, config })
    }

    /// Connect using [`ClientConfig::from_env`]
    pub async fn connect_from_env() -> Result<WarehouseClient> {
        WarehouseClient::connect(ClientConfig::from_env()?).await
    }

    /// The configuration this client was built from
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Create a dataset in the configured location.
    ///
    /// Fails if the dataset already exists or the caller lacks
    /// permission.
    pub async fn create_dataset(&self, dataset: &str) -> Result<()> {
        info!(project = %self.config.project_id, dataset, "creating dataset");

        self.bq
            .dataset()
            .create(
                Dataset::new(&self.config.project_id, dataset)
                    .location(self.config.location.as_str()),
            )
            .await?;

        Ok(())
    }

    /// Create a table from a column-name → type-tag mapping.
    ///
    /// Recognized tags are listed on [`FieldTag`]; any other tag rejects
    /// the whole call with [`BqClientError::UnknownFieldTag`] before
    /// anything is sent to the service. Fails remotely if the dataset
    /// does not exist or the table already does.
    pub async fn create_table<'a, S>(&self, dataset: &str, table: &str, schema: S) -> Result<()>
    where
        S: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let fields = build_schema_fields(schema)?;

        info!(dataset, table, columns = fields.len(), "creating table");

        self.bq
            .table()
            .create(Table::new(
                &self.config.project_id,
                dataset,
                table,
                TableSchema::new(fields),
            ))
            .await?;

        Ok(())
    }

    /// Delete a table. Fails with a not-found error if it does not exist.
    pub async fn delete_table(&self, dataset: &str, table: &str) -> Result<()> {
        info!(dataset, table, "deleting table");

        self.bq
            .table()
            .delete(&self.config.project_id, dataset, table)
            .await?;

        Ok(())
    }

    /// Stream a single row into a table, without a dedup insert ID.
    ///
    /// The service may commit the row twice if it internally retries a
    /// transient failure; use [`Self::insert_rows_with_id`] when that
    /// matters.
    pub async fn insert_row(&self, dataset: &str, table: &str, row: Row) -> Result<()> {
        let mut request = insert_request();
        request.add_row(None, row)?;
        self.put(dataset, table, request, &[]).await
    }

    /// Stream a batch of rows in one request, without dedup insert IDs.
    ///
    /// Insertion is row-independent, not all-or-nothing: rows that pass
    /// service-side validation are committed even when others in the
    /// same batch fail. Failures come back as
    /// [`BqClientError::RowInsert`] carrying every failed row.
    pub async fn insert_rows(&self, dataset: &str, table: &str, rows: Vec<Row>) -> Result<()> {
        let mut request = insert_request();
        for row in rows {
            request.add_row(None, row)?;
        }
        self.put(dataset, table, request, &[]).await
    }

    /// Stream a batch of rows, each carrying a dedup insert ID.
    ///
    /// Same semantics as [`Self::insert_rows`], but a retried batch with
    /// the same IDs does not create duplicate rows server-side. An empty
    /// ID means "no ID" for that row.
    pub async fn insert_rows_with_id(
        &self,
        dataset: &str,
        table: &str,
        rows: Vec<IdentifiedRow>,
    ) -> Result<()> {
        let mut request = insert_request();
        let mut insert_ids = Vec::with_capacity(rows.len());
        for row in rows {
            let insert_id = (!row.insert_id.is_empty()).then(|| row.insert_id.clone());
            request.add_row(insert_id, row.row)?;
            insert_ids.push(row.insert_id);
        }
        self.put(dataset, table, request, &insert_ids).await
    }

    /// Submit the assembled insert request and shape per-row failures.
    async fn put(
        &self,
        dataset: &str,
        table: &str,
        request: TableDataInsertAllRequest,
        insert_ids: &[String],
    ) -> Result<()> {
        let response = self
            .bq
            .tabledata()
            .insert_all(&self.config.project_id, dataset, table, request)
            .await?;

        let insert_errors = response.insert_errors.unwrap_or_default();
        if insert_errors.is_empty() {
            return Ok(());
        }

        let mut failures = Vec::with_capacity(insert_errors.len());
        for insert_error in insert_errors {
            let index = insert_error.index.unwrap_or_default() as usize;
            let messages: Vec<String> = insert_error
                .errors
                .unwrap_or_default()
                .into_iter()
                .map(|proto| {
                    let reason = proto.reason.unwrap_or_else(|| "unknown".to_string());
                    let message = proto.message.unwrap_or_default();
                    format!("{reason}: {message}")
                })
                .collect();
            let insert_id = insert_ids.get(index).filter(|id| !id.is_empty()).cloned();

            error!(dataset, table, row = index, errors = ?messages, "row insert failed");

            failures.push(RowInsertFailure {
                index,
                insert_id,
                messages,
            });
        }

        Err(BqClientError::RowInsert { failures })
    }

    /// Run a SQL query and drain the full result set into memory.
    ///
    /// Rows come back as ordered value sequences in the column order the
    /// query engine returns; NULL cells surface as [`Value::Null`] and
    /// scalars in the REST wire encoding (numbers as strings).
    /// `result_size_hint` only pre-sizes the result buffer; it neither
    /// limits nor paginates the query. The whole result set is always
    /// materialized, which callers of large queries should account for.
    /// On a paging error the rows already read are discarded.
    pub async fn query(&self, sql: &str, result_size_hint: usize) -> Result<Vec<Vec<Value>>> {
        let response = self
            .bq
            .job()
            .query(&self.config.project_id, QueryRequest::new(sql.to_string()))
            .await
            .map_err(BqClientError::Query)?;

        let mut results = Vec::with_capacity(result_size_hint);
        collect_rows(response.rows, &mut results);

        let job_id = response.job_reference.and_then(|job| job.job_id);
        let mut page_token = response.page_token;

        while let Some(token) = page_token {
            // Without a job reference there is no cursor left to page.
            let Some(job_id) = job_id.as_deref() else {
                break;
            };

            debug!(job_id, rows = results.len(), "fetching next result page");

            let page = self
                .bq
                .job()
                .get_query_results(
                    &self.config.project_id,
                    job_id,
                    GetQueryResultsParameters {
                        page_token: Some(token),
                        ..Default::default()
                    },
                )
                .await
                .map_err(BqClientError::Query)?;

            collect_rows(page.rows, &mut results);
            page_token = page.page_token;
        }

        Ok(results)
    }
}

/// Base streaming-insert request. Insertion is row-independent: valid
/// rows commit even when others in the batch fail validation, and the
/// failures come back per row in the response.
fn insert_request() -> TableDataInsertAllRequest {
    let mut request = TableDataInsertAllRequest::new();
    request.skip_invalid_rows();
    request
}

/// Resolve a column-name → type-tag mapping into BigQuery field
/// schemas. The first unrecognized tag rejects the whole schema.
fn build_schema_fields<'a, S>(schema: S) -> Result<Vec<TableFieldSchema>>
where
    S: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut fields = Vec::new();
    for (column, tag) in schema {
        let tag = FieldTag::parse(tag).ok_or_else(|| BqClientError::UnknownFieldTag {
            column: column.to_string(),
            tag: tag.to_string(),
        })?;
        fields.push(tag.field_schema(column));
    }
    Ok(fields)
}

/// Flatten a page of wire-format rows into ordered value sequences
fn collect_rows(rows: Option<Vec<TableRow>>, out: &mut Vec<Vec<Value>>) {
    for row in rows.unwrap_or_default() {
        let cells = row.columns.unwrap_or_default();
        out.push(
            cells
                .into_iter()
                .map(|cell| cell.value.unwrap_or(Value::Null))
                .collect(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wire_rows(value: serde_json::Value) -> Vec<TableRow> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_schema_with_known_tags_builds_every_column() {
        let fields =
            build_schema_fields([("stuff", "STRING"), ("age", "INTEGER"), ("tags", "STRINGS")])
                .unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].name, "stuff");
        assert_eq!(fields[2].mode.as_deref(), Some("REPEATED"));
    }

    #[test]
    fn test_schema_with_unknown_tag_rejects_whole_call() {
        let err = build_schema_fields([("stuff", "STRING"), ("age", "INT")]).unwrap_err();
        match err {
            BqClientError::UnknownFieldTag { column, tag } => {
                assert_eq!(column, "age");
                assert_eq!(tag, "INT");
            }
            other => panic!("expected UnknownFieldTag, got: {other}"),
        }
    }

    #[test]
    fn test_collect_rows_preserves_order_and_nulls() {
        let rows = wire_rows(json!([
            {"f": [{"v": "Blah0"}, {"v": "0"}]},
            {"f": [{"v": "Blah1"}, {"v": null}]},
        ]));

        let mut out = Vec::new();
        collect_rows(Some(rows), &mut out);

        assert_eq!(
            out,
            vec![
                vec![json!("Blah0"), json!("0")],
                vec![json!("Blah1"), Value::Null],
            ]
        );
    }

    #[test]
    fn test_collect_rows_empty_page() {
        let mut out = Vec::new();
        collect_rows(None, &mut out);
        collect_rows(Some(Vec::new()), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_collect_rows_keeps_nested_record_values() {
        let rows = wire_rows(json!([
            {"f": [{"v": {"f": [{"v": "nested"}]}}]},
        ]));

        let mut out = Vec::new();
        collect_rows(Some(rows), &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0][0]["f"][0]["v"], "nested");
    }
}
