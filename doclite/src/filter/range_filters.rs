use std::cmp::Ordering;
use std::fmt::Display;

use crate::collection::Document;
use crate::common::Value;
use crate::errors::{DocliteError, DocliteResult, ErrorKind};

use super::{matches_value_or_element, validate_field_name, FilterProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonMode {
    Greater,
    GreaterEqual,
    Lesser,
    LesserEqual,
}

impl ComparisonMode {
    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            ComparisonMode::Greater => ordering == Ordering::Greater,
            ComparisonMode::GreaterEqual => ordering != Ordering::Less,
            ComparisonMode::Lesser => ordering == Ordering::Less,
            ComparisonMode::LesserEqual => ordering != Ordering::Greater,
        }
    }

    fn operator(&self) -> &'static str {
        match self {
            ComparisonMode::Greater => ">",
            ComparisonMode::GreaterEqual => ">=",
            ComparisonMode::Lesser => "<",
            ComparisonMode::LesserEqual => "<=",
        }
    }
}

/// Compares a field against a bound.
///
/// Only comparable pairs can match: numbers with numbers, timestamps with
/// timestamps and strings with strings. Absent fields and values of any other
/// type never match. When the field holds an array, any comparable element
/// inside the bound is enough.
pub(crate) struct ComparisonFilter {
    field_name: String,
    field_value: Value,
    comparison_mode: ComparisonMode,
}

impl ComparisonFilter {
    #[inline]
    pub(crate) fn new(field_name: String, field_value: Value, comparison_mode: ComparisonMode) -> Self {
        ComparisonFilter {
            field_name,
            field_value,
            comparison_mode,
        }
    }
}

impl Display for ComparisonFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({} {} {})",
            self.field_name,
            self.comparison_mode.operator(),
            self.field_value
        )
    }
}

impl FilterProvider for ComparisonFilter {
    fn apply(&self, entry: &Document) -> DocliteResult<bool> {
        validate_field_name(&self.field_name)?;
        if !self.field_value.is_comparable() {
            log::error!(
                "Cannot compare field {} against non comparable value {}",
                self.field_name,
                self.field_value
            );
            return Err(DocliteError::new(
                &format!(
                    "Cannot compare field {} against non comparable value of type {}",
                    self.field_name,
                    self.field_value.type_name()
                ),
                ErrorKind::InvalidFilter,
            ));
        }

        match entry.get(&self.field_name) {
            Some(value) => Ok(matches_value_or_element(value, |v| {
                v.compare_to(&self.field_value)
                    .map(|ordering| self.comparison_mode.accepts(ordering))
                    .unwrap_or(false)
            })),
            None => Ok(false),
        }
    }
}

/// Matches documents whose field equals one of a set of values.
///
/// When the field holds an array, any element in the set is enough. Absent
/// fields never match.
pub(crate) struct InFilter {
    field_name: String,
    field_values: Vec<Value>,
}

impl InFilter {
    #[inline]
    pub(crate) fn new(field_name: String, field_values: Vec<Value>) -> Self {
        InFilter {
            field_name,
            field_values,
        }
    }
}

impl Display for InFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut values = String::new();
        for value in &self.field_values {
            values.push_str(&format!("{}, ", value));
        }
        write!(f, "({} in [{}])", self.field_name, values.trim_end_matches(", "))
    }
}

impl FilterProvider for InFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> DocliteResult<bool> {
        validate_field_name(&self.field_name)?;
        match entry.get(&self.field_name) {
            Some(value) => Ok(matches_value_or_element(value, |v| {
                self.field_values.contains(v)
            })),
            None => Ok(false),
        }
    }
}
