use std::fmt::Display;

use crate::collection::Document;
use crate::errors::{DocliteError, DocliteResult, ErrorKind};

use super::{Filter, FilterProvider};

fn ensure_not_empty(filters: &[Filter], operator: &str) -> DocliteResult<()> {
    if filters.is_empty() {
        log::error!("Logical {} filter requires at least one sub filter", operator);
        return Err(DocliteError::new(
            &format!("Logical {} filter requires at least one sub filter", operator),
            ErrorKind::InvalidFilter,
        ));
    }
    Ok(())
}

/// Matches documents satisfying every sub filter, short-circuiting on the first miss.
pub(crate) struct AndFilter {
    filters: Vec<Filter>,
}

impl AndFilter {
    #[inline]
    pub(crate) fn new(filters: Vec<Filter>) -> Self {
        AndFilter { filters }
    }
}

impl Display for AndFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let filters: Vec<String> = self.filters.iter().map(|it| it.to_string()).collect();
        write!(f, "({})", filters.join(" && "))
    }
}

impl FilterProvider for AndFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> DocliteResult<bool> {
        ensure_not_empty(&self.filters, "and")?;
        for filter in &self.filters {
            if !filter.apply(entry)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Matches documents satisfying at least one sub filter.
pub(crate) struct OrFilter {
    filters: Vec<Filter>,
}

impl OrFilter {
    #[inline]
    pub(crate) fn new(filters: Vec<Filter>) -> Self {
        OrFilter { filters }
    }
}

impl Display for OrFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let filters: Vec<String> = self.filters.iter().map(|it| it.to_string()).collect();
        write!(f, "({})", filters.join(" || "))
    }
}

impl FilterProvider for OrFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> DocliteResult<bool> {
        ensure_not_empty(&self.filters, "or")?;
        for filter in &self.filters {
            if filter.apply(entry)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Inverts the wrapped filter.
pub(crate) struct NotFilter {
    filter: Filter,
}

impl NotFilter {
    #[inline]
    pub(crate) fn new(filter: Filter) -> Self {
        NotFilter { filter }
    }
}

impl Display for NotFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(not {})", self.filter)
    }
}

impl FilterProvider for NotFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> DocliteResult<bool> {
        Ok(!self.filter.apply(entry)?)
    }
}
