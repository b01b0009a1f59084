use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::collection::doc_id::DocId;
use crate::common::{Value, DOC_ID, FIELD_SEPARATOR};
use crate::errors::{DocliteError, DocliteResult, ErrorKind};
use std::borrow::Cow;
use std::collections::hash_map::DefaultHasher;
use std::fmt::{Debug, Display};
use std::hash::{Hash, Hasher};

pub type FieldVec = SmallVec<[String; 8]>;

/// A schemaless document: an insertion-ordered mapping from field name to [Value].
///
/// Field names are unique and non-empty. Nested documents are addressed with
/// dotted paths, so `document.get("customer.name")` reads the `name` field of
/// the embedded `customer` document.
///
/// The reserved field `_id` always holds a [Value::Id]. It is assigned on
/// insertion when the caller does not provide one.
///
/// Two documents are equal when they hold the same set of fields with equal
/// values, regardless of the order the fields were inserted in.
#[derive(Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Document {
    data: IndexMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Document {
            data: IndexMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of top-level fields.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Associates `value` with `key`.
    ///
    /// A key containing the field separator is treated as a path: missing
    /// intermediate documents are created on the way down, and an existing
    /// intermediate that is not a document is a [ErrorKind::TypeMismatch].
    ///
    /// # Errors
    ///
    /// * the key, or any segment of a dotted key, is empty
    /// * `_id` is given a value other than [Value::Id]
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let mut doc = Document::new();
    /// doc.put("customer.name", "Andrii")?;
    /// assert_eq!(doc.get("customer.name"), Some(&Value::from("Andrii")));
    /// ```
    pub fn put<'a, T: Into<Value>>(&mut self, key: impl Into<Cow<'a, str>>, value: T) -> DocliteResult<()> {
        let key = key.into();
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(DocliteError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        let value = value.into();
        if key == DOC_ID && !value.is_id() {
            log::error!("Document _id must be a document id, found {}", value.type_name());
            return Err(DocliteError::new(
                &format!("Document _id must be a document id, found {}", value.type_name()),
                ErrorKind::InvalidId,
            ));
        }

        if key.contains(FIELD_SEPARATOR) {
            let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
            self.deep_put(&splits, value)
        } else {
            self.data.insert(key.into_owned(), value);
            Ok(())
        }
    }

    /// Resolves `key` to a value.
    ///
    /// An exact top-level match wins. Otherwise a dotted key descends through
    /// nested documents; a missing field or a non-document intermediate yields
    /// `None`, which is distinct from a present [Value::Null].
    pub fn get(&self, key: &str) -> Option<&Value> {
        if let Some(value) = self.data.get(key) {
            return Some(value);
        }

        if !key.contains(FIELD_SEPARATOR) {
            return None;
        }

        let mut splits = key.split(FIELD_SEPARATOR);
        let first = splits.next()?;
        let mut current = self.data.get(first)?;
        for segment in splits {
            current = current.as_document()?.data.get(segment)?;
        }
        Some(current)
    }

    /// Checks whether `key` resolves to a present value (which may be null).
    pub fn contains_field(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Checks whether a top-level field named exactly `key` exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Removes the value at `key`, returning it if present.
    ///
    /// Dotted keys descend through nested documents. The remaining fields keep
    /// their relative order.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        if let Some(value) = self.data.shift_remove(key) {
            return Some(value);
        }

        if !key.contains(FIELD_SEPARATOR) {
            return None;
        }

        let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
        self.deep_remove(&splits)
    }

    /// Returns the document id, if one has been assigned.
    pub fn get_id(&self) -> Option<DocId> {
        self.data.get(DOC_ID).and_then(|v| v.as_id()).copied()
    }

    /// Returns the document id, generating and storing a new one if absent.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::InvalidId] if `_id` holds something other than an id.
    pub fn id(&mut self) -> DocliteResult<DocId> {
        match self.data.get(DOC_ID) {
            Some(Value::Id(id)) => Ok(*id),
            Some(other) => {
                log::error!("Document _id must be a document id, found {}", other.type_name());
                Err(DocliteError::new(
                    &format!("Document _id must be a document id, found {}", other.type_name()),
                    ErrorKind::InvalidId,
                ))
            }
            None => {
                let id = DocId::new();
                self.data.insert(DOC_ID.to_string(), Value::Id(id));
                Ok(id)
            }
        }
    }

    pub fn has_id(&self) -> bool {
        self.data.contains_key(DOC_ID)
    }

    /// Moves `_id` in front of every other field.
    pub(crate) fn move_id_first(&mut self) {
        if let Some(id) = self.data.shift_remove(DOC_ID) {
            let mut data = IndexMap::with_capacity(self.data.len() + 1);
            data.insert(DOC_ID.to_string(), id);
            data.extend(self.data.drain(..));
            self.data = data;
        }
    }

    /// Inserts a top-level field as is, without path splitting or id checks.
    pub(crate) fn put_field(&mut self, key: String, value: Value) {
        self.data.insert(key, value);
    }

    pub(crate) fn field_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.data.get_mut(key)
    }

    /// Retrieves all leaf field paths except `_id`.
    ///
    /// Fields of nested documents are reported with dotted paths, in insertion order.
    pub fn fields(&self) -> FieldVec {
        self.get_fields_internal("")
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.data.iter()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.data.keys()
    }

    /// Estimated serialized size in bytes.
    pub fn byte_size(&self) -> usize {
        5 + self
            .data
            .iter()
            .map(|(key, value)| key.len() + 2 + value.byte_size())
            .sum::<usize>()
    }

    pub(crate) fn to_pretty_json(&self, indent: usize) -> String {
        if self.data.is_empty() {
            return "{}".to_string();
        }

        let mut json_string = String::with_capacity(self.data.len() * 30 + indent * 2);
        json_string.push_str("{\n");
        let indent_str = " ".repeat(indent + 2);
        for (key, value) in self.data.iter() {
            json_string.push_str(&format!(
                "{}\"{}\": {},\n",
                indent_str,
                key,
                value.to_pretty_json(indent + 2)
            ));
        }

        json_string.pop();
        json_string.pop();
        json_string.push_str(&format!("\n{}}}", " ".repeat(indent)));
        json_string
    }

    pub(crate) fn to_debug_string(&self, indent: usize) -> String {
        if self.data.is_empty() {
            return "{}".to_string();
        }

        let mut debug_string = String::new();
        debug_string.push_str("{\n");
        let indent_str = " ".repeat(indent + 2);
        for (key, value) in self.data.iter() {
            debug_string.push_str(&format!(
                "{}\"{}\": {},\n",
                indent_str,
                key,
                value.to_debug_string(indent + 2)
            ));
        }

        debug_string.pop();
        debug_string.pop();
        debug_string.push_str(&format!("\n{}}}", " ".repeat(indent)));
        debug_string
    }

    fn get_fields_internal(&self, prefix: &str) -> FieldVec {
        let mut fields = FieldVec::new();

        for (key, value) in self.data.iter() {
            if prefix.is_empty() && key == DOC_ID {
                continue;
            }

            let field = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{}{}{}", prefix, FIELD_SEPARATOR, key)
            };

            match value {
                Value::Document(doc) if !doc.is_empty() => {
                    fields.append(&mut doc.get_fields_internal(&field));
                }
                _ => fields.push(field),
            }
        }
        fields
    }

    fn deep_put(&mut self, splits: &[&str], value: Value) -> DocliteResult<()> {
        let key = match splits.first() {
            Some(key) if !key.is_empty() => *key,
            _ => {
                log::error!("Document does not support empty key");
                return Err(DocliteError::new(
                    "Document does not support empty key",
                    ErrorKind::InvalidOperation,
                ));
            }
        };

        if splits.len() == 1 {
            self.data.insert(key.to_string(), value);
            return Ok(());
        }

        let remaining = &splits[1..];
        match self.data.get_mut(key) {
            Some(Value::Document(nested)) => nested.deep_put(remaining, value),
            Some(other) => {
                log::error!(
                    "Cannot descend into field {} of type {}",
                    key,
                    other.type_name()
                );
                Err(DocliteError::new(
                    &format!("Cannot descend into field {} of type {}", key, other.type_name()),
                    ErrorKind::TypeMismatch,
                ))
            }
            None => {
                let mut nested = Document::new();
                nested.deep_put(remaining, value)?;
                self.data.insert(key.to_string(), Value::Document(nested));
                Ok(())
            }
        }
    }

    fn deep_remove(&mut self, splits: &[&str]) -> Option<Value> {
        let (key, remaining) = splits.split_first()?;
        if remaining.is_empty() {
            return self.data.shift_remove(*key);
        }

        match self.data.get_mut(*key) {
            Some(Value::Document(nested)) => nested.deep_remove(remaining),
            _ => None,
        }
    }
}

impl Hash for Document {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // field order does not take part in equality, so combine entry hashes commutatively
        let combined = self.data.iter().fold(0u64, |acc, (key, value)| {
            let mut hasher = DefaultHasher::new();
            key.hash(&mut hasher);
            value.hash(&mut hasher);
            acc.wrapping_add(hasher.finish())
        });
        self.data.len().hash(state);
        combined.hash(state);
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_debug_string(0))
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_pretty_json(0))
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a [Document] with JSON-like syntax.
///
/// Keys may be bare identifiers or string literals; values may be literals,
/// parenthesised expressions, nested `{ ... }` documents or `[ ... ]` arrays.
///
/// ```rust
/// use doclite::doc;
///
/// let base = 100;
/// let order = doc! {
///     "order_number": 201513,
///     "total_sum": (base * 12),
///     "customer": {
///         "name": "Andrii",
///         "surname": "Rodinov"
///     },
///     "tags": ["phones", "express"]
/// };
/// assert_eq!(order.size(), 4);
/// ```
#[macro_export]
macro_rules! doc {
    ({}) => {
        $crate::collection::Document::new()
    };

    () => {
        $crate::collection::Document::new()
    };

    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::doc!($($key : $value),*)
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::doc_value;

            let mut doc = $crate::collection::Document::new();
            $(
                doc.put($crate::collection::normalize(stringify!($key)), $crate::doc_value!($value))
                .expect(&format!("Failed to put value {} in document", stringify!($value)));
            )*
            doc
        }
    };
}

/// Helper macro to convert values for the doc! macro.
#[macro_export]
macro_rules! doc_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        {
            $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
        }
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}
