use crate::collection::{DocId, Document};
use crate::common::{Value, DOC_ID, FIELD_SEPARATOR};
use crate::errors::{DocliteError, DocliteResult, ErrorKind};
use std::fmt::Display;
use std::ops::Deref;
use std::sync::Arc;

use super::{AllFilter, AndFilter, EqualsFilter, NotFilter, OrFilter};

/// Trait for implementing filters.
///
/// A `FilterProvider` decides whether a single document matches. Evaluation is
/// independent of document order and of every other document in the
/// collection.
pub trait FilterProvider: Send + Sync + Display {
    /// Applies the filter to a document and returns whether it matches.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::InvalidFilter] if the filter itself is malformed.
    fn apply(&self, entry: &Document) -> DocliteResult<bool>;
}

/// A query filter for selecting documents from a collection.
///
/// `Filter` wraps a [FilterProvider] behind an `Arc`, so filters are cheap to
/// clone and can be shared between threads and pipeline stages.
///
/// # Filter Composition
///
/// - `and(other)` - both filters must match
/// - `or(other)` - at least one filter must match
/// - `not()` - negates the filter
#[derive(Clone)]
pub struct Filter {
    inner: Arc<dyn FilterProvider>,
}

impl Filter {
    /// Creates a new filter from a filter provider implementation.
    pub fn new<T: FilterProvider + 'static>(inner: T) -> Self {
        Filter { inner: Arc::new(inner) }
    }

    /// Combines this filter with another using logical AND.
    pub fn and(&self, filter: Filter) -> Self {
        Filter::new(AndFilter::new(vec![self.clone(), filter]))
    }

    /// Combines this filter with another using logical OR.
    pub fn or(&self, filter: Filter) -> Self {
        Filter::new(OrFilter::new(vec![self.clone(), filter]))
    }

    /// Negates this filter using logical NOT.
    pub fn not(&self) -> Self {
        Filter::new(NotFilter::new(self.clone()))
    }
}

impl Display for Filter {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl Deref for Filter {
    type Target = Arc<dyn FilterProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Creates a filter that matches all documents.
pub fn all() -> Filter {
    Filter::new(AllFilter {})
}

/// Creates a filter that matches the document with the given id.
pub fn by_id(id: DocId) -> Filter {
    Filter::new(EqualsFilter::new(DOC_ID.to_string(), Value::Id(id)))
}

/// Matches documents satisfying every filter in `filters`.
///
/// This is the implicit AND applied across the predicates of a query.
pub fn and(filters: Vec<Filter>) -> Filter {
    Filter::new(AndFilter::new(filters))
}

/// Matches documents satisfying at least one filter in `filters`.
pub fn or(filters: Vec<Filter>) -> Filter {
    Filter::new(OrFilter::new(filters))
}

/// Matches documents not matching `filter`.
pub fn not(filter: Filter) -> Filter {
    Filter::new(NotFilter::new(filter))
}

/// Rejects empty field names and dotted paths with an empty segment.
pub(crate) fn validate_field_name(field_name: &str) -> DocliteResult<()> {
    if field_name.is_empty() || field_name.split(FIELD_SEPARATOR).any(|s| s.is_empty()) {
        log::error!("Invalid field name '{}' in filter", field_name);
        return Err(DocliteError::new(
            &format!("Invalid field name '{}' in filter", field_name),
            ErrorKind::InvalidFilter,
        ));
    }
    Ok(())
}

/// Applies `predicate` to the resolved value and, when that value is an
/// array, to each of its elements.
#[inline]
pub(crate) fn matches_value_or_element<F>(value: &Value, predicate: F) -> bool
where
    F: Fn(&Value) -> bool,
{
    if predicate(value) {
        return true;
    }
    match value {
        Value::Array(items) => items.iter().any(predicate),
        _ => false,
    }
}
