use std::fmt::Display;

use crate::collection::{CollectionState, DocId};
use crate::errors::{DocliteError, DocliteResult, ErrorKind};

/// Capping policy of a collection.
///
/// A capped collection is a strict FIFO ring: after every insert the oldest
/// surviving documents are evicted until the document count is at most
/// `max_count` and the summed [byte size](crate::collection::Document::byte_size)
/// is at most `max_bytes`. Either bound may be omitted, but not both.
///
/// ```rust
/// use doclite::collection::max_count;
///
/// let options = max_count(5).max_bytes(5000);
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CappedOptions {
    pub(crate) max_count: Option<u64>,
    pub(crate) max_bytes: Option<u64>,
}

/// Creates a capping policy bounded by document count.
pub fn max_count(max_count: u64) -> CappedOptions {
    CappedOptions {
        max_count: Some(max_count),
        max_bytes: None,
    }
}

/// Creates a capping policy bounded by total byte size.
pub fn max_bytes(max_bytes: u64) -> CappedOptions {
    CappedOptions {
        max_count: None,
        max_bytes: Some(max_bytes),
    }
}

impl CappedOptions {
    pub fn new() -> Self {
        CappedOptions::default()
    }

    pub fn max_count(mut self, max_count: u64) -> Self {
        self.max_count = Some(max_count);
        self
    }

    pub fn max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }

    pub fn get_max_count(&self) -> Option<u64> {
        self.max_count
    }

    pub fn get_max_bytes(&self) -> Option<u64> {
        self.max_bytes
    }

    /// Checks that at least one bound is set and that no bound is zero.
    pub fn validate(&self) -> DocliteResult<()> {
        if self.max_count.is_none() && self.max_bytes.is_none() {
            log::error!("Capped collection requires max_count or max_bytes");
            return Err(DocliteError::new(
                "Capped collection requires max_count or max_bytes",
                ErrorKind::InvalidOperation,
            ));
        }

        if self.max_count == Some(0) || self.max_bytes == Some(0) {
            log::error!("Capped collection bounds must be positive, found {}", self);
            return Err(DocliteError::new(
                &format!("Capped collection bounds must be positive, found {}", self),
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(())
    }

    /// Rejects a document that could never be retained under `max_bytes`.
    pub(crate) fn check_fits(&self, collection_name: &str, byte_size: u64) -> DocliteResult<()> {
        match self.max_bytes {
            Some(max_bytes) if byte_size > max_bytes => {
                log::error!(
                    "Document of {} bytes exceeds capped collection {} limit of {} bytes",
                    byte_size,
                    collection_name,
                    max_bytes
                );
                Err(DocliteError::new(
                    &format!(
                        "Document of {} bytes exceeds capped collection {} limit of {} bytes",
                        byte_size, collection_name, max_bytes
                    ),
                    ErrorKind::CapacityExceeded,
                ))
            }
            _ => Ok(()),
        }
    }

    fn is_exceeded(&self, count: u64, total_bytes: u64) -> bool {
        self.max_count.is_some_and(|max| count > max)
            || self.max_bytes.is_some_and(|max| total_bytes > max)
    }
}

impl Display for CappedOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let render = |bound: Option<u64>| bound.map_or("none".to_string(), |b| b.to_string());
        write!(
            f,
            "{{max_count: {}, max_bytes: {}}}",
            render(self.max_count),
            render(self.max_bytes)
        )
    }
}

/// Evicts the oldest documents of `state` until both bounds hold again and
/// returns the evicted ids, oldest first.
pub(crate) fn evict_overflow(
    state: &mut CollectionState,
    options: &CappedOptions,
    collection_name: &str,
) -> Vec<DocId> {
    let mut evicted = Vec::new();
    while options.is_exceeded(state.len() as u64, state.total_bytes()) {
        match state.pop_oldest() {
            Some(document) => {
                if let Some(id) = document.get_id() {
                    log::debug!("Evicted document {} from capped collection {}", id, collection_name);
                    evicted.push(id);
                }
            }
            None => break,
        }
    }
    evicted
}
