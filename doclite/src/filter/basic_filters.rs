use std::fmt::Display;

use crate::{collection::Document, common::Value, errors::DocliteResult};

use super::{matches_value_or_element, validate_field_name, FilterProvider};

/// A filter that matches all documents.
pub(crate) struct AllFilter;

impl FilterProvider for AllFilter {
    fn apply(&self, _entry: &Document) -> DocliteResult<bool> {
        Ok(true)
    }
}

impl Display for AllFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AllFilter")
    }
}

/// Matches documents where a field equals a value.
///
/// Equality follows the document model: structural, with integers equal to
/// floats of the same value. When the field holds an array, the filter also
/// matches if any element equals the value, which is how a document holding an
/// `items_id` array is selected by one of its ids. An absent field never
/// matches.
pub(crate) struct EqualsFilter {
    field_name: String,
    field_value: Value,
}

impl EqualsFilter {
    #[inline]
    pub(crate) fn new(field_name: String, field_value: Value) -> Self {
        EqualsFilter {
            field_name,
            field_value,
        }
    }
}

impl Display for EqualsFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} == {})", self.field_name, self.field_value)
    }
}

impl FilterProvider for EqualsFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> DocliteResult<bool> {
        validate_field_name(&self.field_name)?;
        match entry.get(&self.field_name) {
            Some(value) => Ok(matches_value_or_element(value, |v| v == &self.field_value)),
            None => Ok(false),
        }
    }
}

/// Matches documents by presence or absence of a field.
///
/// A field holding `null` is present.
pub(crate) struct ExistsFilter {
    field_name: String,
    exists: bool,
}

impl ExistsFilter {
    #[inline]
    pub(crate) fn new(field_name: String, exists: bool) -> Self {
        ExistsFilter { field_name, exists }
    }
}

impl Display for ExistsFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.exists {
            write!(f, "({} exists)", self.field_name)
        } else {
            write!(f, "({} not exists)", self.field_name)
        }
    }
}

impl FilterProvider for ExistsFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> DocliteResult<bool> {
        validate_field_name(&self.field_name)?;
        Ok(entry.contains_field(&self.field_name) == self.exists)
    }
}
