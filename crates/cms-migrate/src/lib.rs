//! # cms-migrate
//!
//! Batch migration engine for moving legacy relational content (articles,
//! categories, users) into a CMS content store.
//!
//! The engine migrates in repeatable fixed-size batches rather than one-shot
//! transfers, with support for:
//!
//! - **Offset pagination** over the legacy source, resumable by offset
//! - **Bounded retries** on transient source failures
//! - **Insert/update/skip resolution** via legacy-identifier correlation
//! - **Dry-run simulation** reporting the same counters a live run would
//! - **Chunked, confirmed cleanup** of migration artifacts
//!
//! ## Example
//!
//! ```rust,no_run
//! use cms_migrate::{
//!     Config, Entity, MemoryStore, MigrationRunner, Reporter, source,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> cms_migrate::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let connector = source::connect(&config.source).await?;
//!     let store = Arc::new(MemoryStore::new());
//!     let reporter = Reporter::console_only(true);
//!
//!     let runner = MigrationRunner::new(
//!         config.migration,
//!         Entity::Article,
//!         connector,
//!         store,
//!         reporter,
//!     );
//!     let summary = runner.run().await?;
//!     println!("migrated {} articles", summary.counters.added);
//!     Ok(())
//! }
//! ```

pub mod cleanup;
pub mod config;
pub mod cursor;
pub mod destination;
pub mod entity;
pub mod error;
pub mod matcher;
pub mod record;
pub mod report;
pub mod runner;
pub mod source;

// Re-exports for convenient access
pub use cleanup::{CleanupRunner, CleanupSummary, CleanupTarget, ConfirmFn};
pub use config::{Config, RunConfig, SourceConfig};
pub use cursor::BatchCursor;
pub use destination::{ContentStore, CorrelationLink, Document, MemoryStore, MetaScope, StoredEntity};
pub use entity::Entity;
pub use error::{MigrateError, Result};
pub use matcher::{LookupKey, MatchOutcome, RecordMatcher};
pub use record::{RecordBatch, SourceRecord, SqlValue};
pub use report::{Reporter, Severity};
pub use runner::{MigrationRunner, RunCounters, RunSummary};
pub use source::{MysqlSource, NullSource, RecordSource, RetryPolicy};
