//! Offset/page progression for the pagination loop.

use crate::error::{MigrateError, Result};

/// Tracks where the pagination loop is and decides when it stops.
///
/// Without a batch limit the loop ends at the first short page (natural
/// end of data). With a limit it ends strictly after that many pages, so a
/// long migration can be split across invocations and resumed by offset.
#[derive(Debug, Clone)]
pub struct BatchCursor {
    offset: u64,
    batch_size: u64,
    pages_fetched: u32,
    batch_limit: Option<u32>,
}

impl BatchCursor {
    /// Create a cursor. A zero batch size would loop forever and is
    /// rejected up front.
    pub fn new(offset: u64, batch_size: u64, batch_limit: Option<u32>) -> Result<Self> {
        if batch_size == 0 {
            return Err(MigrateError::Config(
                "batch size must be greater than zero".into(),
            ));
        }
        Ok(Self {
            offset,
            batch_size,
            pages_fetched: 0,
            batch_limit,
        })
    }

    /// Offset of the next page to fetch.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    #[must_use]
    pub fn batch_size(&self) -> u64 {
        self.batch_size
    }

    /// Pages fetched so far in this invocation.
    #[must_use]
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Record a processed page and report whether the loop continues.
    ///
    /// Advances the offset by one batch and bumps the page counter, then
    /// applies the continuation predicate: the page must be non-empty, and
    /// either (no limit) the page was full, or (limit) the page budget is
    /// not yet spent.
    pub fn advance(&mut self, page_len: usize) -> bool {
        self.offset += self.batch_size;
        self.pages_fetched += 1;

        if page_len == 0 {
            return false;
        }

        match self.batch_limit {
            None => page_len as u64 == self.batch_size,
            Some(limit) => self.pages_fetched < limit,
        }
    }
}
