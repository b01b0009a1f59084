use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use itertools::Itertools;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::collection::{
    evict_overflow, CappedOptions, DocId, Document, DocumentCursor, Projection, WriteResult,
};
use crate::common::{Value, DOC_ID};
use crate::errors::{DocliteError, DocliteResult, ErrorKind};
use crate::filter::{validate_field_name, Filter};
use crate::update::UpdateSpec;

/// Documents of one collection, kept in insertion order.
///
/// Every document is keyed by a monotonically increasing sequence number, so
/// the oldest survivor is always the first entry of the map.
pub(crate) struct CollectionState {
    documents: BTreeMap<u64, Arc<Document>>,
    positions: HashMap<DocId, u64>,
    next_sequence: u64,
    total_bytes: u64,
    capped: Option<CappedOptions>,
}

impl CollectionState {
    pub(crate) fn new(capped: Option<CappedOptions>) -> Self {
        CollectionState {
            documents: BTreeMap::new(),
            positions: HashMap::new(),
            next_sequence: 0,
            total_bytes: 0,
            capped,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.documents.len()
    }

    pub(crate) fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    pub(crate) fn contains_id(&self, id: &DocId) -> bool {
        self.positions.contains_key(id)
    }

    pub(crate) fn get(&self, id: &DocId) -> Option<&Arc<Document>> {
        self.positions
            .get(id)
            .and_then(|sequence| self.documents.get(sequence))
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&u64, &Arc<Document>)> {
        self.documents.iter()
    }

    pub(crate) fn snapshot(&self) -> Vec<Arc<Document>> {
        self.documents.values().cloned().collect()
    }

    /// Appends a document that already carries a unique id.
    pub(crate) fn append(&mut self, document: Document) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        if let Some(id) = document.get_id() {
            self.positions.insert(id, sequence);
        }
        self.total_bytes += document.byte_size() as u64;
        self.documents.insert(sequence, Arc::new(document));
        sequence
    }

    /// Replaces the document stored at `sequence`, keeping its position.
    pub(crate) fn replace(&mut self, sequence: u64, document: Document) {
        let size = document.byte_size() as u64;
        if let Some(previous) = self.documents.insert(sequence, Arc::new(document)) {
            self.total_bytes -= previous.byte_size() as u64;
        }
        self.total_bytes += size;
    }

    pub(crate) fn remove(&mut self, sequence: u64) -> Option<Arc<Document>> {
        let document = self.documents.remove(&sequence)?;
        self.forget(&document);
        Some(document)
    }

    pub(crate) fn pop_oldest(&mut self) -> Option<Arc<Document>> {
        let (_, document) = self.documents.pop_first()?;
        self.forget(&document);
        Some(document)
    }

    fn forget(&mut self, document: &Document) {
        if let Some(id) = document.get_id() {
            self.positions.remove(&id);
        }
        self.total_bytes -= document.byte_size() as u64;
    }
}

/// A named collection of documents.
///
/// `Collection` is a cheap, clonable handle; every clone refers to the same
/// documents. Reads take a shared lock on the collection, writes take an
/// exclusive lock for their whole scan-and-mutate pass, so each operation is
/// atomic with respect to other writers.
///
/// Handles are obtained from [Store::collection](crate::Store::collection)
/// or [Store::create_collection](crate::Store::create_collection). Once the
/// collection is dropped from its store, every operation on a remaining
/// handle fails with [ErrorKind::NotFound].
///
/// # Examples
///
/// ```rust
/// use doclite::doc;
/// use doclite::filter::field;
/// use doclite::Store;
///
/// let store = Store::new();
/// let items = store.collection("items").unwrap();
/// items.insert(doc! { "category": "Phone", "model": "iPhone 6", "price": 600 }).unwrap();
/// items.insert(doc! { "category": "Phone", "model": "Xiaomi T11", "price": 400 }).unwrap();
///
/// let filter = field("category").eq("Phone").and(field("price").between(500, 700));
/// let found = items.find(filter).unwrap().to_vec().unwrap();
/// assert_eq!(found.len(), 1);
/// ```
#[derive(Clone)]
pub struct Collection {
    inner: Arc<CollectionInner>,
}

impl std::fmt::Debug for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Collection({})", self.name)
    }
}

impl Collection {
    pub(crate) fn new(name: &str, capped: Option<CappedOptions>) -> Self {
        Collection {
            inner: Arc::new(CollectionInner {
                name: name.to_string(),
                state: RwLock::new(CollectionState::new(capped)),
                dropped: AtomicBool::new(false),
            }),
        }
    }
}

impl Deref for Collection {
    type Target = Arc<CollectionInner>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

pub struct CollectionInner {
    name: String,
    state: RwLock<CollectionState>,
    dropped: AtomicBool,
}

impl CollectionInner {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_capped(&self) -> bool {
        self.state.read().capped.is_some()
    }

    pub fn capped_options(&self) -> Option<CappedOptions> {
        self.state.read().capped
    }

    pub fn is_dropped(&self) -> bool {
        self.dropped.load(Ordering::Acquire)
    }

    /// Flags the collection as dropped. Taking the write lock first waits
    /// out any operation in flight, and every later one sees the flag once it
    /// holds the lock.
    pub(crate) fn mark_dropped(&self) {
        let _state = self.state.write();
        self.dropped.store(true, Ordering::Release);
    }

    /// Number of documents currently stored.
    pub fn size(&self) -> DocliteResult<usize> {
        Ok(self.read_state()?.len())
    }

    /// Sum of the byte sizes of the stored documents.
    pub fn total_bytes(&self) -> DocliteResult<u64> {
        Ok(self.read_state()?.total_bytes())
    }

    /// Inserts a document and returns its id.
    ///
    /// An id is generated when the document has none. On a capped collection
    /// the oldest documents are evicted afterwards until the bounds hold.
    ///
    /// # Errors
    ///
    /// * [ErrorKind::DuplicateId] if a document with the same id exists
    /// * [ErrorKind::CapacityExceeded] if the document alone exceeds `max_bytes`
    pub fn insert(&self, document: Document) -> DocliteResult<DocId> {
        let document = prepare_for_insert(document)?;

        let mut state = self.write_state()?;
        self.check_insertable(&state, &document)?;
        let id = self.append_and_evict(&mut state, document);
        log::trace!("Inserted document {} into collection {}", id, self.name);
        Ok(id)
    }

    /// Inserts a batch of documents, all or none.
    ///
    /// The batch is rejected as a whole if any document collides with a
    /// stored id or with another document of the batch.
    pub fn insert_many(&self, documents: Vec<Document>) -> DocliteResult<WriteResult> {
        let documents = documents
            .into_iter()
            .map(prepare_for_insert)
            .collect::<DocliteResult<Vec<Document>>>()?;

        let mut state = self.write_state()?;
        let mut batch_ids = HashSet::with_capacity(documents.len());
        for document in &documents {
            self.check_insertable(&state, document)?;
            if let Some(id) = document.get_id() {
                if !batch_ids.insert(id) {
                    return Err(duplicate_id(&self.name, &id));
                }
            }
        }

        let ids = documents
            .into_iter()
            .map(|document| self.append_and_evict(&mut state, document))
            .collect::<Vec<DocId>>();
        log::trace!("Inserted {} documents into collection {}", ids.len(), self.name);
        Ok(WriteResult::new(ids))
    }

    /// Replaces the first document matching `key_filter`, or inserts
    /// `document` if none matches.
    ///
    /// The replaced document keeps its id and its position. Calling this
    /// repeatedly with the same uniquely selecting filter leaves exactly one
    /// document under that key.
    ///
    /// # Errors
    ///
    /// * [ErrorKind::InvalidOperation] on a capped collection, or when
    ///   `document` carries an id different from the matched document's
    /// * [ErrorKind::DuplicateId] when inserting a document whose id exists
    pub fn upsert_by_key(&self, key_filter: Filter, document: Document) -> DocliteResult<DocId> {
        let mut state = self.write_state()?;
        self.ensure_mutable(&state, "upsert_by_key")?;

        let mut matched = None;
        for (sequence, existing) in state.iter() {
            if key_filter.apply(existing)? {
                matched = Some((*sequence, existing.get_id()));
                break;
            }
        }

        match matched {
            Some((sequence, Some(existing_id))) => {
                let mut replacement = document;
                match replacement.get_id() {
                    Some(id) if id != existing_id => {
                        log::error!(
                            "Cannot change id of document {} to {} in collection {}",
                            existing_id,
                            id,
                            self.name
                        );
                        return Err(DocliteError::new(
                            &format!(
                                "Cannot change id of document {} to {} in collection {}",
                                existing_id, id, self.name
                            ),
                            ErrorKind::InvalidOperation,
                        ));
                    }
                    Some(_) => {}
                    None => replacement.put_field(DOC_ID.to_string(), Value::Id(existing_id)),
                }
                replacement.move_id_first();
                state.replace(sequence, replacement);
                log::trace!("Replaced document {} in collection {}", existing_id, self.name);
                Ok(existing_id)
            }
            _ => {
                let document = prepare_for_insert(document)?;
                self.check_insertable(&state, &document)?;
                let id = self.append_and_evict(&mut state, document);
                log::trace!("Upserted new document {} into collection {}", id, self.name);
                Ok(id)
            }
        }
    }

    /// Finds documents matching `filter`, in storage order.
    pub fn find(&self, filter: Filter) -> DocliteResult<DocumentCursor> {
        self.find_with_options(filter, None)
    }

    /// Finds documents matching `filter` and projects each of them.
    pub fn find_with_projection(
        &self,
        filter: Filter,
        projection: Projection,
    ) -> DocliteResult<DocumentCursor> {
        projection.validate()?;
        self.find_with_options(filter, Some(projection))
    }

    fn find_with_options(
        &self,
        filter: Filter,
        projection: Option<Projection>,
    ) -> DocliteResult<DocumentCursor> {
        let snapshot = self.read_state()?.snapshot();
        log::trace!(
            "Find {} over {} documents of collection {}",
            filter,
            snapshot.len(),
            self.name
        );
        Ok(DocumentCursor::new(snapshot, filter, projection))
    }

    /// Takes a consistent copy of the stored documents.
    pub(crate) fn snapshot(&self) -> DocliteResult<Vec<Arc<Document>>> {
        Ok(self.read_state()?.snapshot())
    }

    pub fn get_by_id(&self, id: &DocId) -> DocliteResult<Option<Document>> {
        Ok(self.read_state()?.get(id).map(|document| document.as_ref().clone()))
    }

    /// Counts documents matching `filter`.
    pub fn count(&self, filter: Filter) -> DocliteResult<usize> {
        let state = self.read_state()?;
        let mut count = 0;
        for (_, document) in state.iter() {
            if filter.apply(document)? {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Returns the distinct values of `field` across all documents where it
    /// is present, in first-seen order.
    ///
    /// Array values contribute their elements, so the distinct values of an
    /// `items_id` field are ids rather than arrays of ids.
    pub fn distinct(&self, field: &str) -> DocliteResult<Vec<Value>> {
        validate_field_name(field)?;

        let state = self.read_state()?;
        let values = state
            .iter()
            .filter_map(|(_, document)| document.get(field))
            .flat_map(|value| match value {
                Value::Array(items) => items.clone(),
                other => vec![other.clone()],
            })
            .unique()
            .collect();
        Ok(values)
    }

    /// Applies `update` to every document matching `filter`.
    ///
    /// The match set is fixed before any document changes. If the update
    /// fails on any matched document, no document is modified. The result
    /// lists the documents whose content actually changed.
    pub fn update_many(&self, filter: Filter, update: UpdateSpec) -> DocliteResult<WriteResult> {
        update.validate()?;

        let mut state = self.write_state()?;
        self.ensure_mutable(&state, "update_many")?;

        let mut matched = Vec::new();
        for (sequence, document) in state.iter() {
            if filter.apply(document)? {
                matched.push((*sequence, document.clone()));
            }
        }

        let mut changed = Vec::with_capacity(matched.len());
        for (sequence, document) in matched {
            let mut updated = document.as_ref().clone();
            if update.apply(&mut updated).map_err(|e| {
                DocliteError::new_with_cause(
                    &format!("Update {} failed on collection {}", update, self.name),
                    e.kind().clone(),
                    e,
                )
            })? {
                changed.push((sequence, updated));
            }
        }

        let ids = changed
            .into_iter()
            .filter_map(|(sequence, document)| {
                let id = document.get_id();
                state.replace(sequence, document);
                id
            })
            .collect::<Vec<DocId>>();
        log::trace!("Updated {} documents in collection {}", ids.len(), self.name);
        Ok(WriteResult::new(ids))
    }

    /// Removes every document matching `filter`.
    pub fn delete_many(&self, filter: Filter) -> DocliteResult<WriteResult> {
        let mut state = self.write_state()?;
        self.ensure_mutable(&state, "delete_many")?;

        let mut matched = Vec::new();
        for (sequence, document) in state.iter() {
            if filter.apply(document)? {
                matched.push(*sequence);
            }
        }

        let ids = matched
            .into_iter()
            .filter_map(|sequence| state.remove(sequence))
            .filter_map(|document| document.get_id())
            .collect::<Vec<DocId>>();
        log::trace!("Deleted {} documents from collection {}", ids.len(), self.name);
        Ok(WriteResult::new(ids))
    }

    fn read_state(&self) -> DocliteResult<RwLockReadGuard<'_, CollectionState>> {
        let state = self.state.read();
        self.ensure_open()?;
        Ok(state)
    }

    fn write_state(&self) -> DocliteResult<RwLockWriteGuard<'_, CollectionState>> {
        let state = self.state.write();
        self.ensure_open()?;
        Ok(state)
    }

    fn ensure_open(&self) -> DocliteResult<()> {
        if self.is_dropped() {
            log::error!("Collection {} has been dropped", self.name);
            return Err(DocliteError::new(
                &format!("Collection {} has been dropped", self.name),
                ErrorKind::NotFound,
            ));
        }
        Ok(())
    }

    fn ensure_mutable(&self, state: &CollectionState, operation: &str) -> DocliteResult<()> {
        if state.capped.is_some() {
            log::error!("{} is not supported on capped collection {}", operation, self.name);
            return Err(DocliteError::new(
                &format!("{} is not supported on capped collection {}", operation, self.name),
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(())
    }

    fn check_insertable(&self, state: &CollectionState, document: &Document) -> DocliteResult<()> {
        if let Some(id) = document.get_id() {
            if state.contains_id(&id) {
                return Err(duplicate_id(&self.name, &id));
            }
        }
        if let Some(capped) = &state.capped {
            capped.check_fits(&self.name, document.byte_size() as u64)?;
        }
        Ok(())
    }

    fn append_and_evict(&self, state: &mut CollectionState, document: Document) -> DocId {
        let id = document.get_id().unwrap_or_default();
        state.append(document);
        if let Some(capped) = state.capped {
            let evicted = evict_overflow(state, &capped, &self.name);
            if !evicted.is_empty() {
                log::trace!(
                    "Evicted {} documents from capped collection {}",
                    evicted.len(),
                    self.name
                );
            }
        }
        id
    }
}

/// Assigns an id when missing and puts `_id` first.
fn prepare_for_insert(mut document: Document) -> DocliteResult<Document> {
    document.id()?;
    document.move_id_first();
    Ok(document)
}

fn duplicate_id(collection_name: &str, id: &DocId) -> DocliteError {
    log::error!("Document with id {} already exists in collection {}", id, collection_name);
    DocliteError::new(
        &format!("Document with id {} already exists in collection {}", id, collection_name),
        ErrorKind::DuplicateId,
    )
}
