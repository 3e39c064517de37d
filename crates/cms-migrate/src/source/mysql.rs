//! MySQL source connector built on sqlx.

use super::{RecordSource, RetryPolicy};
use crate::config::SourceConfig;
use crate::error::Result;
use crate::record::{RecordBatch, SourceRecord, SqlValue};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{Column, Row, TypeInfo};
use std::time::Duration;
use tracing::info;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connector for the legacy MySQL store.
///
/// Holds a single exclusively-owned connection, reused sequentially, and
/// drains every result set into owned rows before the next query runs.
pub struct MysqlSource {
    pool: MySqlPool,
    retry: RetryPolicy,
}

impl MysqlSource {
    /// Connect to the configured source. The connection character set is
    /// fixed to UTF-8.
    pub async fn new(config: &SourceConfig) -> Result<Self> {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.database)
            .username(&config.user)
            .password(&config.password)
            .charset("utf8mb4");

        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(CONNECT_TIMEOUT)
            .connect_with(options)
            .await?;

        sqlx::query("SELECT 1").fetch_one(&pool).await?;

        info!(
            "connected to legacy source: {}:{}/{}",
            config.host, config.port, config.database
        );

        Ok(Self {
            pool,
            retry: RetryPolicy::with_delay(config.retry_delay()),
        })
    }

    /// Run a query through the retry policy, returning fully drained rows.
    async fn query_rows(&self, sql: &str) -> Result<Vec<MySqlRow>> {
        self.retry
            .run(|| {
                let pool = self.pool.clone();
                let sql = sql.to_string();
                async move { Ok(sqlx::query(&sql).fetch_all(&pool).await?) }
            })
            .await
    }
}

#[async_trait]
impl RecordSource for MysqlSource {
    async fn fetch_page(&self, table: &str, offset: u64, limit: u64) -> Result<RecordBatch> {
        // Table names come from the entity catalog, never from user input.
        let sql = format!(
            "SELECT * FROM {table} ORDER BY id ASC LIMIT {limit} OFFSET {offset}"
        );
        let rows = self.query_rows(&sql).await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(record) = record_from_row(row)? {
                records.push(record);
            }
        }
        Ok(RecordBatch::new(records))
    }

    async fn count(&self, table: &str) -> Result<Option<u64>> {
        let sql = format!("SELECT COUNT(id) FROM {table}");
        let rows = self.query_rows(&sql).await?;
        let total: i64 = match rows.first() {
            Some(row) => row.try_get(0)?,
            None => return Ok(None),
        };
        Ok(Some(total.max(0) as u64))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Convert one wire row into a [`SourceRecord`], preserving column order.
///
/// Rows without an integral `id` column cannot be correlated and are
/// dropped; the legacy schema guarantees one on every migrated table.
fn record_from_row(row: &MySqlRow) -> Result<Option<SourceRecord>> {
    let mut fields = Vec::with_capacity(row.columns().len());

    for (idx, col) in row.columns().iter().enumerate() {
        let value = match col.type_info().name() {
            "BOOLEAN" => row
                .try_get::<Option<bool>, _>(idx)?
                .map_or(SqlValue::Null, SqlValue::Bool),
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "TINYINT UNSIGNED"
            | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
            | "BIGINT UNSIGNED" => row
                .try_get::<Option<i64>, _>(idx)?
                .map_or(SqlValue::Null, SqlValue::Int),
            "FLOAT" => row
                .try_get::<Option<f32>, _>(idx)?
                .map_or(SqlValue::Null, |v| SqlValue::Float(f64::from(v))),
            "DOUBLE" => row
                .try_get::<Option<f64>, _>(idx)?
                .map_or(SqlValue::Null, SqlValue::Float),
            "DATETIME" | "TIMESTAMP" => row
                .try_get::<Option<NaiveDateTime>, _>(idx)?
                .map_or(SqlValue::Null, |v| {
                    SqlValue::Text(v.format("%Y-%m-%d %H:%M:%S").to_string())
                }),
            "DATE" => row
                .try_get::<Option<NaiveDate>, _>(idx)?
                .map_or(SqlValue::Null, |v| {
                    SqlValue::Text(v.format("%Y-%m-%d").to_string())
                }),
            "TIME" => row
                .try_get::<Option<NaiveTime>, _>(idx)?
                .map_or(SqlValue::Null, |v| {
                    SqlValue::Text(v.format("%H:%M:%S").to_string())
                }),
            _ => row
                .try_get::<Option<String>, _>(idx)?
                .map_or(SqlValue::Null, SqlValue::Text),
        };
        fields.push((col.name().to_string(), value));
    }

    Ok(SourceRecord::new(fields))
}
