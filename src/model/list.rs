//! The ordered page list that defines the combined document.
//!
//! A [`PageList`] is a value: every operation returns a new list and leaves the
//! receiver untouched. Records are shared between list values through `Arc`, so
//! producing a new list only copies pointers.
//!
//! Each effective change bumps [`PageList::version`], which lets observers (and
//! the session's compare-and-swap edits) detect that the list moved on.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{CollateError, Result};
use crate::model::{PageId, PageRecord, SourceId};

/// Ordered, versioned sequence of page records.
#[derive(Debug, Clone, Default)]
pub struct PageList {
    records: Vec<Arc<PageRecord>>,
    version: u64,
}

impl PageList {
    /// Create an empty list at version 0.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Monotonic change counter.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn get(&self, index: usize) -> Option<&Arc<PageRecord>> {
        self.records.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<PageRecord>> {
        self.records.iter()
    }

    /// Current index of the record with `id`.
    pub fn position_of(&self, id: PageId) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }

    pub fn ids(&self) -> Vec<PageId> {
        self.records.iter().map(|r| r.id()).collect()
    }

    /// Number of listed pages contributed by each source file.
    pub fn page_count_by_source(&self) -> HashMap<SourceId, usize> {
        let mut counts = HashMap::new();
        for record in &self.records {
            *counts.entry(record.source().id()).or_insert(0) += 1;
        }
        counts
    }

    /// Add records to the end, keeping the existing order.
    ///
    /// Records whose id is already listed are ignored so ids stay unique.
    pub fn append<I>(&self, records: I) -> Self
    where
        I: IntoIterator<Item = PageRecord>,
    {
        let mut next = self.records.clone();
        let before = next.len();

        for record in records {
            if next.iter().any(|r| r.id() == record.id()) {
                continue;
            }
            next.push(Arc::new(record));
        }

        if next.len() == before {
            return self.clone();
        }

        Self {
            records: next,
            version: self.version + 1,
        }
    }

    /// Remove the record with `id`. Returns an unchanged list (same version)
    /// when no such record exists.
    pub fn remove(&self, id: PageId) -> Self {
        let Some(index) = self.position_of(id) else {
            return self.clone();
        };

        let mut next = self.records.clone();
        next.remove(index);

        Self {
            records: next,
            version: self.version + 1,
        }
    }

    /// Move the record at `old_index` to `new_index`, shifting the records in
    /// between by one.
    ///
    /// # Errors
    ///
    /// Returns [`CollateError::InvalidPosition`] if either index is out of
    /// bounds.
    pub fn move_page(&self, old_index: usize, new_index: usize) -> Result<Self> {
        let len = self.records.len();
        for index in [old_index, new_index] {
            if index >= len {
                return Err(CollateError::InvalidPosition { index, len });
            }
        }

        if old_index == new_index {
            return Ok(self.clone());
        }

        let mut next = self.records.clone();
        let record = next.remove(old_index);
        next.insert(new_index, record);

        Ok(Self {
            records: next,
            version: self.version + 1,
        })
    }
}
