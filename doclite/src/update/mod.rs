//! Update operators applied by `update_many`.
//!
//! An [UpdateSpec] is an ordered list of `set`, `inc`, `push` and `pull`
//! operators. Field names are dotted paths; `set`, `inc` and `push` create
//! missing fields and parent documents, `pull` on a missing field does
//! nothing. The document id can never be changed by an update.

mod update_spec;

pub use update_spec::*;
