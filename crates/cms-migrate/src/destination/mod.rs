//! Destination content-store seam.
//!
//! The store itself (a CMS, a headless content API) is an external
//! collaborator; the engine only depends on this trait. [`memory`] provides
//! the in-tree reference implementation used by tests and the CLI binding.

pub mod memory;

pub use memory::MemoryStore;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Which artifact family a destination entity or meta entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaScope {
    Post,
    Term,
    User,
}

impl MetaScope {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MetaScope::Post => "post",
            MetaScope::Term => "term",
            MetaScope::User => "user",
        }
    }
}

/// What the engine needs to know about an entity already at the destination.
#[derive(Debug, Clone)]
pub struct StoredEntity {
    /// Destination-store identifier.
    pub id: i64,

    /// The stored modification timestamp, verbatim as persisted. Compared
    /// byte-for-byte against the source value to detect changes.
    pub modified: Option<String>,
}

/// The persisted association between a legacy identifier and a destination
/// entity, plus the snapshot of the original record.
///
/// Stored as two meta entries on the destination entity: one holding the
/// legacy identifier, one holding the full legacy payload.
#[derive(Debug, Clone)]
pub struct CorrelationLink {
    pub id_key: String,
    pub payload_key: String,
    pub legacy_id: i64,
    pub payload: Value,
}

impl CorrelationLink {
    /// The two meta entries this link persists as.
    #[must_use]
    pub fn meta_entries(&self) -> Vec<(String, Value)> {
        vec![
            (self.id_key.clone(), Value::from(self.legacy_id)),
            (self.payload_key.clone(), self.payload.clone()),
        ]
    }
}

/// A destination-bound entity body produced by an entity transform.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Entity body fields (title, content, role, ...).
    pub fields: Map<String, Value>,

    /// Modification timestamp to persist verbatim.
    pub modified: Option<String>,

    /// Natural key the store should index for lookup (email, name).
    pub natural_key: Option<String>,

    /// Meta entries, correlation link included.
    pub meta: Vec<(String, Value)>,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn with_modified(mut self, modified: Option<String>) -> Self {
        self.modified = modified;
        self
    }

    #[must_use]
    pub fn with_natural_key(mut self, key: impl Into<String>) -> Self {
        self.natural_key = Some(key.into());
        self
    }

    /// Attach a correlation link as meta entries.
    #[must_use]
    pub fn with_correlation(mut self, link: &CorrelationLink) -> Self {
        self.meta.extend(link.meta_entries());
        self
    }
}

/// Destination store operations the engine depends on.
///
/// Write failures surface as [`crate::MigrateError::Write`] and are counted,
/// never fatal. `reset_transient_state` is the explicit capability the
/// engine invokes between batches to keep store-side caches bounded.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Find an entity by its persisted legacy identifier meta.
    async fn find_by_legacy_id(
        &self,
        scope: MetaScope,
        id_key: &str,
        legacy_id: i64,
    ) -> Result<Option<StoredEntity>>;

    /// Find an entity by its indexed natural key (email, name).
    async fn find_by_natural_key(&self, scope: MetaScope, key: &str)
        -> Result<Option<StoredEntity>>;

    /// Insert a new entity, returning its destination identifier.
    async fn insert(&self, scope: MetaScope, doc: Document) -> Result<i64>;

    /// Update an existing entity, replacing body fields and refreshing any
    /// meta entries the document carries.
    async fn update(&self, scope: MetaScope, id: i64, doc: Document) -> Result<()>;

    /// Delete up to `limit` meta entries with the given key. Returns the
    /// number of entries affected; zero means nothing matched.
    async fn delete_meta(&self, scope: MetaScope, meta_key: &str, limit: u64) -> Result<u64>;

    /// Drop accumulated transient state (query logs, object caches) so a
    /// long multi-batch run stays memory-bounded.
    async fn reset_transient_state(&self);
}
