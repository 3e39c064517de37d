//! Category row mapping.

use crate::destination::Document;
use crate::error::{MigrateError, Result};
use crate::matcher::LookupKey;
use crate::record::SourceRecord;

/// Categories correlate by name: the destination taxonomy has no legacy-id
/// index of its own.
pub fn lookup_key(record: &SourceRecord) -> Result<LookupKey> {
    let name = record.text("name").ok_or_else(|| {
        MigrateError::Validation(format!(
            "category {} has no name and cannot be migrated",
            record.legacy_id()
        ))
    })?;
    Ok(LookupKey::NaturalKey(name.to_string()))
}

pub fn transform(record: &SourceRecord) -> Result<Document> {
    let name = record.text("name").ok_or_else(|| {
        MigrateError::Validation(format!(
            "category {} has no name and cannot be migrated",
            record.legacy_id()
        ))
    })?;

    Ok(Document::new()
        .with_field("name", name)
        .with_natural_key(name))
}
