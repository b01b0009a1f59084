//! # doclite
//!
//! An in-process document store. Documents are ordered maps of field names to
//! dynamically typed values, grouped into named collections held by a
//! [Store].
//!
//! - [filter] builds predicates with `field("price").gte(500)` style
//!   combinators, combined with [filter::and], [filter::or] and [filter::not]
//! - [update] describes `set`, `inc`, `push` and `pull` operators applied by
//!   `update_many`
//! - [aggregate] runs `match`, `project`, `lookup` and `size` pipelines
//! - capped collections ([collection::CappedOptions]) keep only their newest
//!   documents
//!
//! ```rust
//! use doclite::doc;
//! use doclite::filter::field;
//! use doclite::Store;
//!
//! let store = Store::new();
//! store.insert("items", doc! { "category": "Phone", "model": "iPhone 6", "price": 600 }).unwrap();
//! store.insert("items", doc! { "category": "TV", "model": "Samsung QLED", "price": 1200 }).unwrap();
//!
//! let mut cursor = store.find("items", field("price").between(500, 700)).unwrap();
//! assert_eq!(cursor.size(), 1);
//! ```
//!
//! Everything lives in memory; nothing is persisted and there are no indexes.
use crate::collection::snowflake::SnowflakeIdGenerator;
use std::sync::LazyLock;

pub mod aggregate;
pub mod collection;
pub mod common;
pub mod errors;
pub mod filter;
pub mod store;
pub mod store_builder;
pub mod store_config;
pub mod update;

pub use store::Store;
pub use store_builder::StoreBuilder;
pub use store_config::StoreConfig;

pub(crate) static ID_GENERATOR: LazyLock<SnowflakeIdGenerator> =
    LazyLock::new(SnowflakeIdGenerator::new);
