//! Collections and documents.
//!
//! A [Document] is an insertion-ordered map from field name to
//! [Value](crate::common::Value). Nested fields are addressed with dotted
//! paths:
//!
//! ```rust
//! use doclite::collection::Document;
//!
//! let mut doc = Document::new();
//! doc.put("name", "Alice").unwrap();
//! doc.put("address.city", "Kyiv").unwrap();
//! assert!(doc.contains_field("address.city"));
//! ```
//!
//! A [Collection] is a named, insertion-ordered sequence of documents. It
//! supports insert, upsert, find, count, distinct, update and delete. A
//! collection created with [CappedOptions] keeps only its newest documents,
//! evicting the oldest ones first once a count or byte bound is exceeded.
//!
//! # Document IDs
//!
//! Each stored document has a unique `_id` field holding a [DocId]. The id is
//! generated with a Snowflake scheme when the document is inserted without
//! one, and it never changes afterwards.

mod capped;
#[allow(clippy::module_inception)]
mod collection;
mod cursor;
mod doc_id;
mod document;
mod projection;
pub(crate) mod snowflake;
mod write_result;

pub use capped::*;
pub use collection::*;
pub use cursor::*;
pub use doc_id::DocId;
pub use document::*;
pub use projection::*;
pub use write_result::*;
