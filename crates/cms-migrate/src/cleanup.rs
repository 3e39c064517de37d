//! Chunked, confirmed deletion of migration artifacts.

use crate::destination::{ContentStore, MetaScope};
use crate::entity::Entity;
use crate::error::Result;
use crate::report::Reporter;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Rows deleted per chunk.
const DEFAULT_CHUNK_SIZE: u64 = 200;

/// One artifact key scheduled for deletion.
#[derive(Debug, Clone)]
pub struct CleanupTarget {
    /// Entity family name for prompts and logs.
    pub label: String,
    pub meta_key: String,
    pub scope: MetaScope,
}

/// The full set of correlation-link keys the migration leaves behind.
#[must_use]
pub fn default_targets() -> Vec<CleanupTarget> {
    Entity::ALL
        .iter()
        .flat_map(|entity| {
            [entity.id_meta_key(), entity.payload_meta_key()]
                .into_iter()
                .map(|key| CleanupTarget {
                    label: entity.label().to_string(),
                    meta_key: key.to_string(),
                    scope: entity.scope(),
                })
        })
        .collect()
}

/// Operator confirmation seam: called once per target with the prompt, and
/// cleanup never deletes unless it answers true. The non-interactive default
/// is [`deny_all`]: the absence of confirmation is a refusal.
pub type ConfirmFn<'a> = &'a mut dyn FnMut(&str) -> bool;

/// Refuses every prompt.
pub fn deny_all(_prompt: &str) -> bool {
    false
}

/// Result of one cleanup run.
#[derive(Debug, Clone, Serialize)]
pub struct CleanupSummary {
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub duration_seconds: f64,
    pub targets_confirmed: usize,
    pub targets_skipped: usize,
    pub rows_deleted: u64,
}

/// Deletes migration artifacts in bounded chunks, one confirmed target at a
/// time, with the same pause/reset cadence as the migration runner.
pub struct CleanupRunner {
    store: Arc<dyn ContentStore>,
    reporter: Reporter,
    dry_run: bool,
    chunk_size: u64,
    pause: Duration,
}

impl CleanupRunner {
    pub fn new(store: Arc<dyn ContentStore>, reporter: Reporter, dry_run: bool) -> Self {
        Self {
            store,
            reporter,
            dry_run,
            chunk_size: DEFAULT_CHUNK_SIZE,
            pause: Duration::from_secs(1),
        }
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    #[must_use]
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Run cleanup over the given targets.
    pub async fn run(
        &self,
        targets: &[CleanupTarget],
        mut confirm: ConfirmFn<'_>,
    ) -> Result<CleanupSummary> {
        let started_at = Utc::now();
        let start = Instant::now();

        if self.dry_run {
            self.reporter
                .warning("You have called cleanup command in dry run mode.");
        }

        let mut confirmed = 0usize;
        let mut skipped = 0usize;
        let mut rows_deleted = 0u64;

        for target in targets {
            self.reporter
                .plain(&format!("{} data cleanup", target.label));

            let prompt = format!(
                "Are you sure you want to delete {} {} meta? [y/n]",
                target.meta_key,
                target.scope.as_str()
            );
            if !confirm(&prompt) {
                self.reporter
                    .warning(&format!("{} meta delete ignored", target.meta_key));
                skipped += 1;
                continue;
            }
            confirmed += 1;

            if self.dry_run {
                // Zero chunks in dry-run; the true count is unknown until a
                // live pass.
                self.reporter.plain(&format!(
                    "Meta key {} data will be deleted (count unknown in dry run)",
                    target.meta_key
                ));
                continue;
            }

            rows_deleted += self.delete_target(target).await?;
        }

        let duration = start.elapsed().as_secs_f64();
        self.reporter.plain("");
        self.reporter.success(&format!(
            "Total time taken by this cleanup script: {duration:.1}s"
        ));

        info!(
            "cleanup finished: {} targets confirmed, {} skipped, {} rows deleted",
            confirmed, skipped, rows_deleted
        );

        Ok(CleanupSummary {
            dry_run: self.dry_run,
            started_at,
            duration_seconds: duration,
            targets_confirmed: confirmed,
            targets_skipped: skipped,
            rows_deleted,
        })
    }

    /// Chunked delete loop for one key: continues while a chunk affects
    /// rows, which guarantees termination once nothing matches.
    async fn delete_target(&self, target: &CleanupTarget) -> Result<u64> {
        let mut total = 0u64;
        loop {
            let affected = self
                .store
                .delete_meta(target.scope, &target.meta_key, self.chunk_size)
                .await?;
            total += affected;
            if affected == 0 {
                break;
            }
            tokio::time::sleep(self.pause).await;
            self.store.reset_transient_state().await;
        }

        self.reporter.plain(&format!(
            "Total {} records deleted for {} meta",
            total, target.meta_key
        ));
        Ok(total)
    }
}
