use std::fmt::Display;
use std::sync::Arc;

use crate::collection::Document;
use crate::common::{Value, DOC_ID};
use crate::errors::DocliteResult;
use crate::filter::matches_value_or_element;

/// Equi-join configuration of a `lookup` stage.
///
/// For every host document, the documents of collection `from` whose
/// `foreign_field` equals the host's `local_field` (or any element of it,
/// when it is an array) are attached as an array under `target_field`. The
/// foreign field defaults to `_id`, so an array of ids joins directly against
/// the documents they reference.
///
/// ```rust
/// use doclite::aggregate::Lookup;
///
/// let lookup = Lookup::new("items", "items_id", "items");
/// assert_eq!(lookup.foreign_field, "_id");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub from: String,
    pub local_field: String,
    pub foreign_field: String,
    pub target_field: String,
}

impl Lookup {
    pub fn new(from: &str, local_field: &str, target_field: &str) -> Self {
        Lookup {
            from: from.to_string(),
            local_field: local_field.to_string(),
            foreign_field: DOC_ID.to_string(),
            target_field: target_field.to_string(),
        }
    }

    /// Joins on `foreign_field` instead of `_id`.
    pub fn foreign_field(mut self, foreign_field: &str) -> Self {
        self.foreign_field = foreign_field.to_string();
        self
    }
}

impl Display for Lookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "lookup({}.{} == {} as {})",
            self.from, self.foreign_field, self.local_field, self.target_field
        )
    }
}

/// Attaches the matching foreign documents to `host`.
///
/// Matches keep the foreign storage order and every foreign document is
/// attached at most once. Ids that resolve to nothing are skipped, and a host
/// without matches gets an empty array.
pub(crate) fn join(
    mut host: Document,
    foreign: &[Arc<Document>],
    lookup: &Lookup,
) -> DocliteResult<Document> {
    let local_values: Vec<Value> = match host.get(&lookup.local_field) {
        Some(Value::Array(items)) => items.clone(),
        Some(value) => vec![value.clone()],
        None => Vec::new(),
    };

    let mut target = Vec::new();
    if !local_values.is_empty() {
        for foreign_doc in foreign {
            let matched = foreign_doc
                .get(&lookup.foreign_field)
                .map(|foreign_value| {
                    matches_value_or_element(foreign_value, |v| local_values.contains(v))
                })
                .unwrap_or(false);
            if matched {
                target.push(Value::Document(foreign_doc.as_ref().clone()));
            }
        }
    }

    host.put(lookup.target_field.as_str(), Value::Array(target))?;
    Ok(host)
}
