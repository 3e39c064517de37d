//! Migration runner: drives one full entity migration.

use crate::config::RunConfig;
use crate::cursor::BatchCursor;
use crate::destination::{ContentStore, CorrelationLink};
use crate::entity::Entity;
use crate::error::Result;
use crate::matcher::{MatchOutcome, RecordMatcher};
use crate::record::SourceRecord;
use crate::report::Reporter;
use crate::source::RecordSource;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Per-run action counts. Owned by exactly one runner invocation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunCounters {
    pub found: u64,
    pub added: u64,
    pub updated: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl RunCounters {
    /// `found == added + updated + skipped + failed`. Holds for every run
    /// without intra-run duplicate principals; duplicates are deliberately
    /// excluded from the action counts on their second occurrence.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.found == self.added + self.updated + self.skipped + self.failed
    }
}

/// Result of one migration run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Unique run identifier.
    pub run_id: String,

    /// Entity type migrated.
    pub entity: String,

    /// Whether this was a simulation.
    pub dry_run: bool,

    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_seconds: f64,

    /// Pages fetched from the source.
    pub pages_fetched: u32,

    /// Offset to resume from if this invocation was limited or interrupted.
    pub next_offset: u64,

    #[serde(flatten)]
    pub counters: RunCounters,
}

impl RunSummary {
    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Orchestrates one entity migration: pagination, matching, loading,
/// counters, and the end-of-run summary.
///
/// Execution is batch-sequential: records are processed one at a time in
/// ascending legacy-id order, so an interrupted run resumes cleanly from the
/// last logged offset. The only suspension points are the inter-batch pause
/// and the source connector's retry backoff.
pub struct MigrationRunner {
    run: RunConfig,
    entity: Entity,
    source: Box<dyn RecordSource>,
    store: Arc<dyn ContentStore>,
    reporter: Reporter,
    counters: RunCounters,
}

impl MigrationRunner {
    pub fn new(
        run: RunConfig,
        entity: Entity,
        source: Box<dyn RecordSource>,
        store: Arc<dyn ContentStore>,
        reporter: Reporter,
    ) -> Self {
        Self {
            run,
            entity,
            source,
            store,
            reporter,
            counters: RunCounters::default(),
        }
    }

    /// Run the migration to completion (or to the configured batch limit).
    ///
    /// Record-level failures are counted and never abort the run. An
    /// exhausted source connection is fatal, but the partial summary is
    /// still emitted before the error propagates, with the offset to resume
    /// from.
    pub async fn run(mut self) -> Result<RunSummary> {
        let started_at = Utc::now();
        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();

        // Rejecting a zero batch here guarantees no destination mutation
        // ever happens under an invalid configuration.
        let mut cursor = BatchCursor::new(self.run.offset, self.run.batch, self.run.batch_limit)?;

        info!(
            "starting {} migration run {} (dry_run={}, offset={}, batch={})",
            self.entity.label(),
            run_id,
            self.run.dry_run,
            self.run.offset,
            self.run.batch
        );

        let outcome = self.drive(&mut cursor).await;

        let completed_at = Utc::now();
        let duration = start.elapsed().as_secs_f64();
        self.log_summary(duration);

        if let Err(err) = &outcome {
            self.reporter.error(&err.to_string());
            self.reporter.error(&format!(
                "Migration halted. Resume with --offset={}",
                cursor.offset()
            ));
        }

        self.source.close().await;

        let summary = RunSummary {
            run_id,
            entity: self.entity.label().to_string(),
            dry_run: self.run.dry_run,
            started_at,
            completed_at,
            duration_seconds: duration,
            pages_fetched: cursor.pages_fetched(),
            next_offset: cursor.offset(),
            counters: self.counters,
        };

        info!(
            "{} migration {}: found={} added={} updated={} skipped={} failed={} in {:.1}s",
            summary.entity,
            if outcome.is_ok() { "finished" } else { "halted" },
            summary.counters.found,
            summary.counters.added,
            summary.counters.updated,
            summary.counters.skipped,
            summary.counters.failed,
            duration
        );

        outcome?;
        Ok(summary)
    }

    /// The fetch/process loop.
    async fn drive(&mut self, cursor: &mut BatchCursor) -> Result<()> {
        if let Some(total) = self.source.count(self.entity.table()).await? {
            self.reporter
                .plain(&format!("Source reports {} {}", total, self.entity.plural()));
        }
        self.reporter.plain(&format!(
            "Starting migration of {}...",
            self.entity.plural()
        ));

        let mut matcher = RecordMatcher::new(self.run.dry_run);

        loop {
            let page = self
                .source
                .fetch_page(self.entity.table(), cursor.offset(), cursor.batch_size())
                .await?;
            let page_len = page.len();

            for record in &page.rows {
                self.counters.found += 1;
                self.process_record(&mut matcher, record).await;
            }

            if !cursor.advance(page_len) {
                return Ok(());
            }

            // Bound destination load, then drop store-side caches so a long
            // run stays memory-bounded.
            tokio::time::sleep(self.run.batch_pause()).await;
            self.store.reset_transient_state().await;
        }
    }

    /// Process one record. Failures are counted here, never propagated.
    async fn process_record(&mut self, matcher: &mut RecordMatcher, record: &SourceRecord) {
        if let Err(err) = self.try_process(matcher, record).await {
            self.counters.failed += 1;
            // The destination's message verbatim.
            self.reporter.warning(&err.to_string());
        }
    }

    async fn try_process(
        &mut self,
        matcher: &mut RecordMatcher,
        record: &SourceRecord,
    ) -> Result<()> {
        let entity = self.entity;
        let key = entity.lookup_key(record)?;
        let source_modified = entity.source_modified(record);

        let resolution = matcher
            .resolve(
                self.store.as_ref(),
                entity.scope(),
                &key,
                entity.id_meta_key(),
                source_modified.as_deref(),
            )
            .await?;

        // Second-seen duplicate principals update no counters, though the
        // resolved write still happens.
        let count = !(entity.dedupe_counters() && resolution.duplicate);
        let legacy_id = record.legacy_id();

        // Transform before branching so dry-run classifies (and fails)
        // exactly like a live run.
        let document = entity.transform(record)?;

        match resolution.outcome {
            MatchOutcome::ExistsSame => {
                if count {
                    self.counters.skipped += 1;
                }
                self.reporter.warning(&format!(
                    "{} {} already exists, skipping",
                    entity.label(),
                    legacy_id
                ));
            }
            MatchOutcome::ExistsDifferent { id } => {
                if self.run.dry_run {
                    if count {
                        self.counters.updated += 1;
                    }
                    self.reporter.plain(&format!(
                        "Dry-run: {} {} will be updated",
                        entity.label(),
                        legacy_id
                    ));
                } else {
                    let link = self.correlation(record);
                    self.store
                        .update(entity.scope(), id, document.with_correlation(&link))
                        .await?;
                    if count {
                        self.counters.updated += 1;
                    }
                    self.reporter.success(&format!(
                        "Successfully updated {} {}",
                        entity.label(),
                        id
                    ));
                }
            }
            MatchOutcome::NotFound => {
                if self.run.dry_run {
                    if count {
                        self.counters.added += 1;
                    }
                    self.reporter.plain(&format!(
                        "Dry-run: {} {} will be migrated",
                        entity.label(),
                        legacy_id
                    ));
                } else {
                    let link = self.correlation(record);
                    let new_id = self
                        .store
                        .insert(entity.scope(), document.with_correlation(&link))
                        .await?;
                    if count {
                        self.counters.added += 1;
                    }
                    self.reporter.success(&format!(
                        "Successfully migrated {} {} as {}",
                        entity.label(),
                        legacy_id,
                        new_id
                    ));
                }
            }
        }

        Ok(())
    }

    /// The correlation link persisted with every insert/update.
    fn correlation(&self, record: &SourceRecord) -> CorrelationLink {
        CorrelationLink {
            id_key: self.entity.id_meta_key().to_string(),
            payload_key: self.entity.payload_meta_key().to_string(),
            legacy_id: record.legacy_id(),
            payload: record.payload(),
        }
    }

    fn log_summary(&self, duration: f64) {
        let mode = if self.run.dry_run {
            "Dry-Run Result"
        } else {
            "Migration Result"
        };
        let plural = self.entity.plural();
        let c = &self.counters;

        self.reporter.plain("");
        self.reporter
            .plain(&format!("{mode}: There are total {} number of {plural}", c.found));
        self.reporter.plain(&format!(
            "{mode}: Total {} number of {plural} which were added",
            c.added
        ));
        self.reporter.plain(&format!(
            "{mode}: Total {} number of {plural} which were updated",
            c.updated
        ));
        self.reporter.plain(&format!(
            "{mode}: Total {} number of {plural} which were skipped",
            c.skipped
        ));
        self.reporter.plain(&format!(
            "{mode}: Total {} number of {plural} which were failed",
            c.failed
        ));
        self.reporter.plain(&format!(
            "Total time taken by this migration script: {duration:.1}s"
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_counters() {
        let counters = RunCounters {
            found: 10,
            added: 4,
            updated: 2,
            skipped: 3,
            failed: 1,
        };
        assert!(counters.is_balanced());
    }

    #[test]
    fn duplicate_exclusion_unbalances_counters() {
        // One duplicate principal: found counts it, nothing else does.
        let counters = RunCounters {
            found: 3,
            added: 2,
            ..RunCounters::default()
        };
        assert!(!counters.is_balanced());
    }

    #[test]
    fn summary_serializes_flat_counters() {
        let summary = RunSummary {
            run_id: "r".into(),
            entity: "article".into(),
            dry_run: true,
            started_at: Utc::now(),
            completed_at: Utc::now(),
            duration_seconds: 0.5,
            pages_fetched: 1,
            next_offset: 200,
            counters: RunCounters::default(),
        };
        let json = summary.to_json().unwrap();
        assert!(json.contains("\"found\""));
        assert!(json.contains("\"next_offset\""));
    }
}
