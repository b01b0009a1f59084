use crate::common::Value;

use super::{AndFilter, ComparisonFilter, ComparisonMode, EqualsFilter, ExistsFilter, Filter, InFilter};

/// Creates a fluent filter builder for the specified field name.
///
/// The field name may be a dotted path such as `customer.name`, which is
/// resolved through nested documents.
///
/// ```rust
/// use doclite::filter::field;
///
/// let filter = field("category").eq("Phone").and(field("price").gte(500));
/// assert_eq!(filter.to_string(), "((category == \"Phone\") && (price >= 500))");
/// ```
pub fn field(field_name: &str) -> FluentFilter {
    FluentFilter {
        field_name: field_name.to_string(),
    }
}

/// A fluent builder for constructing filters on a specific field.
///
/// Each method consumes the builder and returns a [Filter] that can be passed
/// to a collection query, used in a pipeline `match` stage or combined with
/// other filters.
pub struct FluentFilter {
    field_name: String,
}

impl FluentFilter {
    /// Matches documents where the field equals `value`, or holds an array
    /// containing it.
    #[inline]
    pub fn eq<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(EqualsFilter::new(self.field_name, value.into()))
    }

    #[inline]
    pub fn gt<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(ComparisonFilter::new(
            self.field_name,
            value.into(),
            ComparisonMode::Greater,
        ))
    }

    #[inline]
    pub fn gte<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(ComparisonFilter::new(
            self.field_name,
            value.into(),
            ComparisonMode::GreaterEqual,
        ))
    }

    #[inline]
    pub fn lt<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(ComparisonFilter::new(
            self.field_name,
            value.into(),
            ComparisonMode::Lesser,
        ))
    }

    #[inline]
    pub fn lte<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(ComparisonFilter::new(
            self.field_name,
            value.into(),
            ComparisonMode::LesserEqual,
        ))
    }

    /// Matches documents where the field lies in the closed range
    /// `[lower, upper]`.
    pub fn between<T: Into<Value>, U: Into<Value>>(self, lower: T, upper: U) -> Filter {
        let lower_bound = ComparisonFilter::new(
            self.field_name.clone(),
            lower.into(),
            ComparisonMode::GreaterEqual,
        );
        let upper_bound = ComparisonFilter::new(
            self.field_name,
            upper.into(),
            ComparisonMode::LesserEqual,
        );
        Filter::new(AndFilter::new(vec![
            Filter::new(lower_bound),
            Filter::new(upper_bound),
        ]))
    }

    /// Matches documents where the field equals any of `values`.
    ///
    /// An empty candidate list matches nothing.
    #[inline]
    pub fn in_array<T: Into<Value>>(self, values: Vec<T>) -> Filter {
        let values = values.into_iter().map(|v| v.into()).collect();
        Filter::new(InFilter::new(self.field_name, values))
    }

    /// Matches documents where the field is present (`true`) or absent (`false`).
    #[inline]
    pub fn exists(self, exists: bool) -> Filter {
        Filter::new(ExistsFilter::new(self.field_name, exists))
    }
}
