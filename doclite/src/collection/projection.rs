use std::fmt::Display;

use crate::collection::Document;
use crate::common::{Value, DOC_ID, FIELD_SEPARATOR};
use crate::errors::{DocliteError, DocliteResult, ErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProjectionMode {
    Include,
    Exclude,
}

/// A field inclusion or exclusion spec, shared by `find` and the `project`
/// pipeline stage.
///
/// In inclusion mode only the listed paths survive, plus `_id` unless it is
/// explicitly excluded. In exclusion mode the listed paths are removed and
/// everything else is kept. A dotted path descends through nested documents
/// and, element by element, through arrays of documents, so including
/// `items.model` keeps only `model` inside every element of `items`.
///
/// Mixing inclusion and exclusion on paths other than `_id` is rejected with
/// [ErrorKind::InvalidStage] when the projection is applied.
///
/// ```rust
/// use doclite::collection::Projection;
/// use doclite::doc;
///
/// let order = doc! {
///     "customer": { "name": "Andrii" },
///     "payment": { "card_owner": "Andrii Rodionov", "cardId": 12345678 },
///     "total_sum": 1200
/// };
/// let projection = Projection::including(&["customer", "payment.cardId"]).without_id();
/// let projected = projection.apply(&order).unwrap();
/// assert_eq!(
///     projected,
///     doc! { "customer": { "name": "Andrii" }, "payment": { "cardId": 12345678 } }
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    entries: Vec<(String, bool)>,
    include_id: Option<bool>,
}

impl Projection {
    /// Creates an empty projection, which keeps documents unchanged.
    pub fn new() -> Self {
        Projection::default()
    }

    /// Creates an inclusion projection over `paths`.
    pub fn including(paths: &[&str]) -> Self {
        paths
            .iter()
            .fold(Projection::new(), |projection, path| projection.include(path))
    }

    /// Creates an exclusion projection over `paths`.
    pub fn excluding(paths: &[&str]) -> Self {
        paths
            .iter()
            .fold(Projection::new(), |projection, path| projection.exclude(path))
    }

    pub fn include(self, path: &str) -> Self {
        self.with_entry(path, true)
    }

    pub fn exclude(self, path: &str) -> Self {
        self.with_entry(path, false)
    }

    /// Drops `_id` from projected documents.
    pub fn without_id(self) -> Self {
        self.with_entry(DOC_ID, false)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.include_id.is_none()
    }

    fn with_entry(mut self, path: &str, include: bool) -> Self {
        if path == DOC_ID {
            self.include_id = Some(include);
        } else {
            self.entries.retain(|(p, _)| p != path);
            self.entries.push((path.to_string(), include));
        }
        self
    }

    /// Checks the projection and returns the mode it runs in.
    fn mode(&self) -> DocliteResult<ProjectionMode> {
        for (path, _) in &self.entries {
            if path.is_empty() || path.split(FIELD_SEPARATOR).any(|s| s.is_empty()) {
                log::error!("Invalid projection path '{}'", path);
                return Err(DocliteError::new(
                    &format!("Invalid projection path '{}'", path),
                    ErrorKind::InvalidStage,
                ));
            }
        }

        let includes = self.entries.iter().filter(|(_, include)| *include).count();
        if includes > 0 && includes < self.entries.len() {
            log::error!("Projection {} mixes inclusion and exclusion", self);
            return Err(DocliteError::new(
                &format!("Projection {} mixes inclusion and exclusion", self),
                ErrorKind::InvalidStage,
            ));
        }

        if includes > 0 || (self.entries.is_empty() && self.include_id == Some(true)) {
            Ok(ProjectionMode::Include)
        } else {
            Ok(ProjectionMode::Exclude)
        }
    }

    /// Validates the projection without applying it.
    pub fn validate(&self) -> DocliteResult<()> {
        self.mode().map(|_| ())
    }

    /// Applies the projection to `document`, returning a new document.
    ///
    /// Paths that do not resolve are ignored.
    pub fn apply(&self, document: &Document) -> DocliteResult<Document> {
        if self.is_empty() {
            return Ok(document.clone());
        }

        match self.mode()? {
            ProjectionMode::Include => {
                let paths: Vec<Vec<&str>> = self
                    .entries
                    .iter()
                    .map(|(path, _)| path.split(FIELD_SEPARATOR).collect())
                    .collect();
                let paths: Vec<&[&str]> = paths.iter().map(|p| p.as_slice()).collect();

                let mut projected = Document::new();
                if self.include_id != Some(false) {
                    if let Some(id) = document.get_id() {
                        projected.put_field(DOC_ID.to_string(), Value::Id(id));
                    }
                }
                include_paths(document, &paths, &mut projected);
                Ok(projected)
            }
            ProjectionMode::Exclude => {
                let mut projected = document.clone();
                if self.include_id == Some(false) {
                    projected.remove(DOC_ID);
                }
                for (path, _) in &self.entries {
                    let splits: Vec<&str> = path.split(FIELD_SEPARATOR).collect();
                    exclude_path(&mut projected, &splits);
                }
                Ok(projected)
            }
        }
    }
}

impl Display for Projection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut entries: Vec<String> = self
            .entries
            .iter()
            .map(|(path, include)| format!("{}: {}", path, if *include { 1 } else { 0 }))
            .collect();
        if let Some(include) = self.include_id {
            entries.push(format!("{}: {}", DOC_ID, if include { 1 } else { 0 }));
        }
        write!(f, "{{{}}}", entries.join(", "))
    }
}

// copies every field of `source` selected by `paths` into `target`, keeping
// the source field order
fn include_paths(source: &Document, paths: &[&[&str]], target: &mut Document) {
    for (key, value) in source.iter() {
        if key == DOC_ID {
            continue;
        }

        let matching: Vec<&[&str]> = paths
            .iter()
            .filter(|path| path.first() == Some(&key.as_str()))
            .copied()
            .collect();
        if matching.is_empty() {
            continue;
        }

        if matching.iter().any(|path| path.len() == 1) {
            target.put_field(key.clone(), value.clone());
            continue;
        }

        let nested_paths: Vec<&[&str]> = matching.iter().map(|path| &path[1..]).collect();
        match value {
            Value::Document(nested) => {
                let mut projected = Document::new();
                include_paths(nested, &nested_paths, &mut projected);
                target.put_field(key.clone(), Value::Document(projected));
            }
            Value::Array(items) => {
                let projected: Vec<Value> = items
                    .iter()
                    .filter_map(|item| item.as_document())
                    .map(|nested| {
                        let mut projected = Document::new();
                        include_paths(nested, &nested_paths, &mut projected);
                        Value::Document(projected)
                    })
                    .collect();
                target.put_field(key.clone(), Value::Array(projected));
            }
            _ => {}
        }
    }
}

fn exclude_path(document: &mut Document, path: &[&str]) {
    let Some((first, rest)) = path.split_first() else {
        return;
    };

    if rest.is_empty() {
        document.remove(first);
        return;
    }

    match document.field_mut(first) {
        Some(Value::Document(nested)) => exclude_path(nested, rest),
        Some(Value::Array(items)) => {
            for item in items.iter_mut() {
                if let Some(nested) = item.as_document_mut() {
                    exclude_path(nested, rest);
                }
            }
        }
        _ => {}
    }
}
