use std::ops::Deref;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::aggregate::{execute, CollectionResolver, Stage};
use crate::collection::{
    CappedOptions, Collection, DocId, Document, DocumentCursor, Projection, WriteResult,
};
use crate::common::Value;
use crate::errors::{DocliteError, DocliteResult, ErrorKind};
use crate::filter::Filter;
use crate::store_builder::StoreBuilder;
use crate::store_config::StoreConfig;
use crate::update::UpdateSpec;

/// An in-process document store: a registry of named collections.
///
/// A `Store` is an explicitly owned handle. Clones share the same
/// collections, so one store can be passed to several threads. Every
/// operation takes the collection name; [Store::collection] returns a
/// [Collection] handle exposing the same operations without it.
///
/// `insert`, `insert_many` and `upsert_by_key` create an unknown collection
/// on first reference unless disabled with
/// [StoreBuilder::auto_create_collections]. Every other operation on an
/// unknown collection fails with [ErrorKind::NotFound].
///
/// # Examples
///
/// ```rust
/// use doclite::doc;
/// use doclite::filter::field;
/// use doclite::update::UpdateSpec;
/// use doclite::Store;
///
/// let store = Store::new();
/// store.insert("items", doc! { "category": "Phone", "price": 600 }).unwrap();
/// store.insert("items", doc! { "category": "TV", "price": 1200 }).unwrap();
///
/// let updated = store
///     .update_many("items", field("category").eq("Phone"), UpdateSpec::new().inc("price", 50))
///     .unwrap();
/// assert_eq!(updated.len(), 1);
/// assert_eq!(store.count("items", field("price").gte(650)).unwrap(), 2);
/// ```
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Opens a store with the default configuration.
    pub fn new() -> Self {
        Store::with_config(StoreConfig::new())
    }

    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    pub(crate) fn with_config(config: StoreConfig) -> Self {
        Store {
            inner: Arc::new(StoreInner {
                config,
                collections: DashMap::new(),
            }),
        }
    }
}

impl Deref for Store {
    type Target = Arc<StoreInner>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

pub struct StoreInner {
    config: StoreConfig,
    collections: DashMap<String, Collection>,
}

impl StoreInner {
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Creates a collection, capped when `capped` is given.
    ///
    /// # Errors
    ///
    /// * [ErrorKind::AlreadyExists] if the name is taken
    /// * [ErrorKind::InvalidOperation] if the name is empty or the capping
    ///   policy has no bound or a zero bound
    pub fn create_collection(
        &self,
        name: &str,
        capped: Option<CappedOptions>,
    ) -> DocliteResult<Collection> {
        validate_collection_name(name)?;
        if let Some(options) = &capped {
            options.validate()?;
        }

        match self.collections.entry(name.to_string()) {
            Entry::Occupied(_) => {
                log::error!("A collection with name {} already exists", name);
                Err(DocliteError::new(
                    &format!("A collection with name {} already exists", name),
                    ErrorKind::AlreadyExists,
                ))
            }
            Entry::Vacant(entry) => {
                let collection = Collection::new(name, capped);
                entry.insert(collection.clone());
                match capped {
                    Some(options) => log::debug!("Created capped collection {} {}", name, options),
                    None => log::debug!("Created collection {}", name),
                }
                Ok(collection)
            }
        }
    }

    /// Returns the collection named `name`, creating it when automatic
    /// creation is enabled.
    pub fn collection(&self, name: &str) -> DocliteResult<Collection> {
        if self.config.auto_create_collections() {
            self.get_or_create(name)
        } else {
            self.existing(name)
        }
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    /// Names of all collections, sorted.
    pub fn list_collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .collections
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Drops a collection and its documents. Returns whether it existed.
    ///
    /// Handles to the dropped collection fail with [ErrorKind::NotFound]
    /// afterwards, even if a collection with the same name is created again.
    pub fn drop_collection(&self, name: &str) -> bool {
        match self.collections.remove(name) {
            Some((_, collection)) => {
                collection.mark_dropped();
                log::debug!("Dropped collection {}", name);
                true
            }
            None => false,
        }
    }

    pub fn insert(&self, collection: &str, document: Document) -> DocliteResult<DocId> {
        self.collection(collection)?.insert(document)
    }

    pub fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> DocliteResult<WriteResult> {
        self.collection(collection)?.insert_many(documents)
    }

    pub fn upsert_by_key(
        &self,
        collection: &str,
        key_filter: Filter,
        document: Document,
    ) -> DocliteResult<DocId> {
        self.collection(collection)?.upsert_by_key(key_filter, document)
    }

    pub fn find(&self, collection: &str, filter: Filter) -> DocliteResult<DocumentCursor> {
        self.existing(collection)?.find(filter)
    }

    pub fn find_with_projection(
        &self,
        collection: &str,
        filter: Filter,
        projection: Projection,
    ) -> DocliteResult<DocumentCursor> {
        self.existing(collection)?
            .find_with_projection(filter, projection)
    }

    pub fn get_by_id(&self, collection: &str, id: &DocId) -> DocliteResult<Option<Document>> {
        self.existing(collection)?.get_by_id(id)
    }

    pub fn count(&self, collection: &str, filter: Filter) -> DocliteResult<usize> {
        self.existing(collection)?.count(filter)
    }

    pub fn distinct(&self, collection: &str, field: &str) -> DocliteResult<Vec<Value>> {
        self.existing(collection)?.distinct(field)
    }

    pub fn update_many(
        &self,
        collection: &str,
        filter: Filter,
        update: UpdateSpec,
    ) -> DocliteResult<WriteResult> {
        self.existing(collection)?.update_many(filter, update)
    }

    pub fn delete_many(&self, collection: &str, filter: Filter) -> DocliteResult<WriteResult> {
        self.existing(collection)?.delete_many(filter)
    }

    /// Runs an aggregation pipeline over `collection`.
    ///
    /// The source is a snapshot of the collection taken when the call starts.
    /// `lookup` stages read a snapshot of their foreign collection when they
    /// run.
    ///
    /// # Errors
    ///
    /// * [ErrorKind::NotFound] if `collection` or a lookup's foreign
    ///   collection does not exist
    /// * [ErrorKind::InvalidStage] if a stage is malformed or the pipeline is
    ///   longer than the configured maximum
    /// * any error raised by a stage, in which case no output is returned
    pub fn aggregate(&self, collection: &str, pipeline: Vec<Stage>) -> DocliteResult<Vec<Document>> {
        let max_stages = self.config.max_pipeline_stages();
        if pipeline.len() > max_stages {
            log::error!(
                "Pipeline has {} stages, the maximum is {}",
                pipeline.len(),
                max_stages
            );
            return Err(DocliteError::new(
                &format!(
                    "Pipeline has {} stages, the maximum is {}",
                    pipeline.len(),
                    max_stages
                ),
                ErrorKind::InvalidStage,
            ));
        }

        let source = self.existing(collection)?.snapshot()?;
        log::trace!(
            "Aggregating {} documents of collection {} through {} stages",
            source.len(),
            collection,
            pipeline.len()
        );
        execute(source, &pipeline, self)
    }

    fn existing(&self, name: &str) -> DocliteResult<Collection> {
        match self.collections.get(name) {
            Some(entry) => Ok(entry.value().clone()),
            None => {
                log::error!("Collection {} not found", name);
                Err(DocliteError::new(
                    &format!("Collection {} not found", name),
                    ErrorKind::NotFound,
                ))
            }
        }
    }

    fn get_or_create(&self, name: &str) -> DocliteResult<Collection> {
        validate_collection_name(name)?;
        let collection = self
            .collections
            .entry(name.to_string())
            .or_insert_with(|| {
                log::debug!("Created collection {} on first reference", name);
                Collection::new(name, None)
            })
            .value()
            .clone();
        Ok(collection)
    }
}

impl CollectionResolver for StoreInner {
    fn resolve(&self, name: &str) -> DocliteResult<Collection> {
        self.existing(name)
    }
}

fn validate_collection_name(name: &str) -> DocliteResult<()> {
    if name.trim().is_empty() {
        log::error!("Collection name cannot be empty");
        return Err(DocliteError::new(
            "Collection name cannot be empty",
            ErrorKind::InvalidOperation,
        ));
    }
    Ok(())
}
