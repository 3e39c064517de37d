//! Inert source connector used when no legacy database is configured.

use super::RecordSource;
use crate::error::Result;
use crate::record::RecordBatch;
use async_trait::async_trait;

/// A connector with nothing behind it.
///
/// Every page is empty and counts are unknown, so a migration driven by this
/// source terminates immediately after its first fetch. Lets destination-side
/// wiring be exercised without legacy credentials.
pub struct NullSource;

#[async_trait]
impl RecordSource for NullSource {
    async fn fetch_page(&self, _table: &str, _offset: u64, _limit: u64) -> Result<RecordBatch> {
        Ok(RecordBatch::default())
    }

    async fn count(&self, _table: &str) -> Result<Option<u64>> {
        Ok(None)
    }

    async fn close(&self) {}

    fn is_inert(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_source_is_always_exhausted() {
        let source = NullSource;
        assert!(source.fetch_page("articles", 0, 200).await.unwrap().is_empty());
        assert_eq!(source.count("articles").await.unwrap(), None);
        assert!(source.is_inert());
    }
}
