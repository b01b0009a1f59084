use crate::collection::DocId;

/// The result of a write operation (insert, update, delete).
///
/// `WriteResult` lists the ids of the documents the operation actually
/// changed. An update that matched a document but left its content untouched
/// does not report it.
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
///
/// let result = store
///     .update_many("items", field("category").eq("Phone"), UpdateSpec::new().inc("price", 50))
///     .unwrap();
/// assert_eq!(result.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteResult {
    ids: Vec<DocId>,
}

impl WriteResult {
    pub fn new(ids: Vec<DocId>) -> Self {
        Self { ids }
    }

    /// Gets the ids affected by the write operation, in storage order.
    pub fn affected_ids(&self) -> &Vec<DocId> {
        &self.ids
    }

    /// Number of affected documents.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl IntoIterator for WriteResult {
    type Item = DocId;
    type IntoIter = std::vec::IntoIter<DocId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.into_iter()
    }
}
