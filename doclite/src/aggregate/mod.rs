//! Aggregation pipelines.
//!
//! A pipeline is a linear chain of [Stage]s run over the documents of one
//! collection. Each stage consumes the output of the previous one:
//!
//! - `match` keeps the documents satisfying a [Filter](crate::filter::Filter)
//! - `project` reshapes documents with a [Projection](crate::collection::Projection)
//! - `lookup` attaches documents of another collection ([Lookup])
//! - `size` attaches the length of an array field
//!
//! ```rust
//! use doclite::aggregate::Stage;
//! use doclite::doc;
//! use doclite::filter::field;
//! use doclite::Store;
//!
//! let store = Store::new();
//! store.insert("orders", doc! { "order_number": 201513, "items_id": ["a", "b"] }).unwrap();
//!
//! let result = store
//!     .aggregate(
//!         "orders",
//!         vec![
//!             Stage::matching(field("order_number").eq(201513)),
//!             Stage::size("items_id", "number_of_items"),
//!         ],
//!     )
//!     .unwrap();
//! assert_eq!(result[0].get("number_of_items").and_then(|v| v.as_i64()), Some(&2));
//! ```

mod lookup;
mod pipeline;

pub use lookup::*;
pub use pipeline::*;
