//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Legacy source database configuration.
    #[serde(default)]
    pub source: SourceConfig,

    /// Migration run behavior.
    #[serde(default)]
    pub migration: RunConfig,
}

/// Legacy source database configuration.
///
/// An empty `host` means no source is configured: the connector becomes a
/// no-op and the migration runs against an inert source (destination-only
/// testing).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Database host. Empty disables the source connection.
    #[serde(default)]
    pub host: String,

    /// Database port (default: 3306).
    #[serde(default = "default_mysql_port")]
    pub port: u16,

    /// Database name.
    #[serde(default)]
    pub database: String,

    /// Username.
    #[serde(default)]
    pub user: String,

    /// Password.
    #[serde(default)]
    pub password: String,

    /// Fixed delay between query retries, in milliseconds (default: 15000).
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl SourceConfig {
    /// Whether connection parameters are present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.host.is_empty()
    }

    /// Retry backoff as a `Duration`.
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Migration run behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Simulate only: report intended actions without touching the
    /// destination (default: true).
    #[serde(default = "default_true")]
    pub dry_run: bool,

    /// Mirror log lines to the console (default: false).
    #[serde(default)]
    pub logs: bool,

    /// Source offset to start from (default: 0).
    #[serde(default)]
    pub offset: u64,

    /// Rows per page (default: 200). Must be greater than zero.
    #[serde(default = "default_batch")]
    pub batch: u64,

    /// Hard cap on the number of pages processed in this invocation.
    /// Unset means run to source exhaustion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_limit: Option<u32>,

    /// Path to the log file, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    /// Pause between batches, in milliseconds (default: 1000). Bounds
    /// destination load.
    #[serde(default = "default_batch_pause_ms")]
    pub batch_pause_ms: u64,
}

impl RunConfig {
    /// Inter-batch pause as a `Duration`.
    #[must_use]
    pub fn batch_pause(&self) -> Duration {
        Duration::from_millis(self.batch_pause_ms)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dry_run: true,
            logs: false,
            offset: 0,
            batch: default_batch(),
            batch_limit: None,
            log_file: None,
            batch_pause_ms: default_batch_pause_ms(),
        }
    }
}

// Default value functions for serde
fn default_mysql_port() -> u16 {
    3306
}

fn default_retry_delay_ms() -> u64 {
    15_000
}

fn default_batch() -> u64 {
    200
}

fn default_batch_pause_ms() -> u64 {
    1_000
}

fn default_true() -> bool {
    true
}
