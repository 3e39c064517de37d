//! Article row mapping.

use crate::destination::Document;
use crate::error::Result;
use crate::record::SourceRecord;

/// Map a legacy article row to a destination post document.
///
/// The `updated` timestamp is persisted verbatim: it is the value later runs
/// compare byte-for-byte to decide update-vs-skip.
pub fn transform(record: &SourceRecord) -> Result<Document> {
    let status = match record.text("status") {
        Some("Draft") => "draft",
        Some("Trash") => "trash",
        _ => "publish",
    };

    let mut doc = Document::new()
        .with_field("title", record.text("title").unwrap_or_default())
        .with_field("content", record.text("html").unwrap_or_default())
        .with_field("created", record.text("added").unwrap_or_default())
        .with_field("kind", record.text("type").unwrap_or("post"))
        .with_field("status", status)
        .with_modified(record.text("updated").map(str::to_string));

    // Legacy relations travel with the document; resolving them to
    // destination identifiers is the store binding's concern.
    if let Some(category) = record.get("category").and_then(|v| v.as_int()) {
        doc = doc.with_field("legacy_category_id", category);
    }
    if let Some(author) = record.get("author").and_then(|v| v.as_int()) {
        doc = doc.with_field("legacy_author_id", author);
    }

    Ok(doc)
}
