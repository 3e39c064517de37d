//! Entity catalog: the three migrated record types and their transforms.
//!
//! One tagged variant replaces per-entity control flow: the runner stays
//! generic and dispatches here for table names, correlation meta keys,
//! lookup strategy, and the source-row-to-document mapping.

mod article;
mod category;
mod user;

pub use user::validate_email;

use crate::destination::{Document, MetaScope};
use crate::error::Result;
use crate::matcher::LookupKey;
use crate::record::SourceRecord;

/// A migratable entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Article,
    Category,
    User,
}

impl Entity {
    pub const ALL: [Entity; 3] = [Entity::Article, Entity::Category, Entity::User];

    /// Source table holding this entity's rows.
    #[must_use]
    pub fn table(self) -> &'static str {
        match self {
            Entity::Article => "articles",
            Entity::Category => "categories",
            Entity::User => "users",
        }
    }

    /// Singular label for log lines.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Entity::Article => "article",
            Entity::Category => "category",
            Entity::User => "user",
        }
    }

    /// Plural label for summaries.
    #[must_use]
    pub fn plural(self) -> &'static str {
        match self {
            Entity::Article => "articles",
            Entity::Category => "categories",
            Entity::User => "users",
        }
    }

    /// Destination artifact family.
    #[must_use]
    pub fn scope(self) -> MetaScope {
        match self {
            Entity::Article => MetaScope::Post,
            Entity::Category => MetaScope::Term,
            Entity::User => MetaScope::User,
        }
    }

    /// Meta key holding the legacy identifier.
    #[must_use]
    pub fn id_meta_key(self) -> &'static str {
        match self {
            Entity::Article => "_old_article_id",
            Entity::Category => "_old_category_id",
            Entity::User => "_old_user_id",
        }
    }

    /// Meta key holding the legacy payload snapshot.
    #[must_use]
    pub fn payload_meta_key(self) -> &'static str {
        match self {
            Entity::Article => "_legacy_article_data",
            Entity::Category => "_legacy_category_data",
            Entity::User => "_legacy_user_data",
        }
    }

    /// Whether intra-run duplicate lookup keys are excluded from counters
    /// on their second occurrence.
    #[must_use]
    pub fn dedupe_counters(self) -> bool {
        matches!(self, Entity::User)
    }

    /// The lookup key correlating a source row with the destination.
    /// Fails per record when the identifying field is malformed.
    pub fn lookup_key(self, record: &SourceRecord) -> Result<LookupKey> {
        match self {
            Entity::Article => Ok(LookupKey::LegacyId(record.legacy_id())),
            Entity::Category => category::lookup_key(record),
            Entity::User => user::lookup_key(record),
        }
    }

    /// The source row's modification timestamp, kept verbatim for the
    /// byte-for-byte change check. Only content records carry one.
    #[must_use]
    pub fn source_modified(self, record: &SourceRecord) -> Option<String> {
        match self {
            Entity::Article => record.text("updated").map(str::to_string),
            Entity::Category | Entity::User => None,
        }
    }

    /// Map a source row to its destination document.
    pub fn transform(self, record: &SourceRecord) -> Result<Document> {
        match self {
            Entity::Article => article::transform(record),
            Entity::Category => category::transform(record),
            Entity::User => user::transform(record),
        }
    }
}
