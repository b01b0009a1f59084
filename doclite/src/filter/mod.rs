//! Query filters for selecting documents from collections.
//!
//! Filters are predicates over a single document. They are used by
//! collection queries, updates and deletes, and by the `match` stage of an
//! aggregation pipeline.
//!
//! # Creating Filters
//!
//! - `field("price").gte(500)` - comparison operators
//! - `field("category").eq("Phone")` - equality, also matching array elements
//! - `field("producer").in_array(vec!["Apple", "Samsung"])` - membership
//! - `all()` - match all documents
//! - `by_id(id)` - match by document id
//! - `field("a").eq(1).and(field("b").lt(2))` - logical composition
//!
//! # Examples
//!
//! ```rust
//! use doclite::doc;
//! use doclite::filter::{and, field};
//!
//! let phone = doc! { "category": "Phone", "price": 600 };
//! let filter = and(vec![
//!     field("category").eq("Phone"),
//!     field("price").between(500, 700),
//! ]);
//! assert!(filter.apply(&phone).unwrap());
//! ```
//!
//! # Matching Rules
//!
//! - Field names are dotted paths resolved through nested documents.
//! - An absent field never satisfies a comparison, equality or membership test.
//! - When the resolved value is an array, a test also succeeds if any element
//!   satisfies it.
//! - Range comparisons are defined between numbers, between timestamps and
//!   between strings. Any other pairing does not match.

mod filter;
mod fluent;

mod basic_filters;
mod logical_filters;
mod range_filters;

pub(crate) use basic_filters::*;
pub(crate) use logical_filters::*;
pub use filter::*;
pub use fluent::*;
pub use range_filters::*;
