//! Legacy source connectors: paginated and aggregate reads with bounded
//! retries.

mod mysql;
mod noop;

pub use mysql::MysqlSource;
pub use noop::NullSource;

use crate::config::SourceConfig;
use crate::error::{MigrateError, Result};
use crate::record::RecordBatch;
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

/// Paginated access to one legacy table.
///
/// Pages are ordered by ascending legacy identifier so interrupted runs can
/// resume from an offset. Implementations fully drain each result set before
/// the next query is issued.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch one page of rows: `offset..offset + limit` in legacy-id order.
    async fn fetch_page(&self, table: &str, offset: u64, limit: u64) -> Result<RecordBatch>;

    /// Total row count for a table, if the source can report one.
    async fn count(&self, table: &str) -> Result<Option<u64>>;

    /// Release the connection. The connector must not be used afterwards.
    async fn close(&self);

    /// Whether this connector is the inert no-op variant.
    fn is_inert(&self) -> bool {
        false
    }
}

/// Open a connector for the configured source.
///
/// Absent connection parameters yield the inert [`NullSource`] so a
/// migration can run destination-only.
pub async fn connect(config: &SourceConfig) -> Result<Box<dyn RecordSource>> {
    if !config.is_configured() {
        info!("no source database configured, using inert connector");
        return Ok(Box::new(NullSource));
    }

    let source = MysqlSource::new(config).await?;
    Ok(Box::new(source))
}

/// Retry-with-fixed-backoff for source queries.
///
/// Connection and query failures share this path: up to `max_retries`
/// re-attempts with a fixed delay, then a terminal
/// [`MigrateError::ConnectionExhausted`]. The caller must halt the run on
/// exhaustion rather than continue with partial data.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_secs(15),
        }
    }
}

impl RetryPolicy {
    /// Policy with the default retry count and a custom delay.
    #[must_use]
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    /// Run `op`, retrying on failure until it succeeds or retries are
    /// exhausted.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut failures = 0u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    failures += 1;
                    if failures > self.max_retries {
                        return Err(MigrateError::ConnectionExhausted { attempts: failures });
                    }
                    warn!(
                        "source query failed (attempt {}/{}): {}; retrying",
                        failures,
                        self.max_retries + 1,
                        err
                    );
                    tokio::time::sleep(self.delay).await;
                }
            }
        }
    }
}
