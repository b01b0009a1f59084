use std::sync::Arc;

use crate::collection::{Document, Projection};
use crate::errors::DocliteResult;
use crate::filter::Filter;

/// A lazy, restartable cursor over the result of a `find` call.
///
/// The cursor holds a snapshot of the collection taken when the query was
/// issued. Filtering and projection run as the cursor is advanced, and
/// every produced item is cached so [DocumentCursor::reset] replays the same
/// results. Writes made to the collection after the call are not observed;
/// issue the query again to see them.
pub struct DocumentCursor {
    underlying: Option<std::vec::IntoIter<Arc<Document>>>,
    filter: Filter,
    projection: Option<Projection>,
    cache: Vec<DocliteResult<Document>>,
    current_index: usize,
}

impl DocumentCursor {
    pub(crate) fn new(
        snapshot: Vec<Arc<Document>>,
        filter: Filter,
        projection: Option<Projection>,
    ) -> Self {
        DocumentCursor {
            underlying: Some(snapshot.into_iter()),
            filter,
            projection,
            cache: Vec::new(),
            current_index: 0,
        }
    }

    /// Resets the cursor so that it can be iterated from the beginning.
    pub fn reset(&mut self) {
        self.current_index = 0;
    }

    pub fn size(&mut self) -> usize {
        // already exhausted, the cache holds everything
        if self.underlying.is_none() {
            self.reset();
            return self.cache.len();
        }
        for _ in self.by_ref() {}
        self.reset();
        self.cache.len()
    }

    pub fn first(&mut self) -> Option<DocliteResult<Document>> {
        self.reset();
        self.next()
    }

    /// Drains the cursor into a vector, failing on the first error.
    pub fn to_vec(&mut self) -> DocliteResult<Vec<Document>> {
        self.reset();
        let documents: DocliteResult<Vec<Document>> = self.by_ref().collect();
        self.reset();
        documents
    }

    fn pull(&mut self) -> Option<DocliteResult<Document>> {
        let iter = self.underlying.as_mut()?;
        for document in iter.by_ref() {
            match self.filter.apply(&document) {
                Ok(true) => {
                    return Some(match &self.projection {
                        Some(projection) => projection.apply(&document),
                        None => Ok(document.as_ref().clone()),
                    });
                }
                Ok(false) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
        self.underlying = None;
        None
    }
}

impl Iterator for DocumentCursor {
    type Item = DocliteResult<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_index < self.cache.len() {
            let result = self.cache[self.current_index].clone();
            self.current_index += 1;
            return Some(result);
        }

        let item = self.pull()?;
        self.cache.push(item.clone());
        self.current_index += 1;
        Some(item)
    }
}
