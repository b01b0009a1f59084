use std::fmt::Display;
use std::sync::Arc;

use crate::aggregate::{join, Lookup};
use crate::collection::{Collection, Document, Projection};
use crate::common::{Value, FIELD_SEPARATOR};
use crate::errors::{DocliteError, DocliteResult, ErrorKind};
use crate::filter::Filter;

/// Resolves the foreign collection of a `lookup` stage.
pub trait CollectionResolver {
    /// # Errors
    ///
    /// Returns [ErrorKind::NotFound] if no collection is named `name`.
    fn resolve(&self, name: &str) -> DocliteResult<Collection>;
}

/// One stage of an aggregation pipeline.
#[derive(Clone)]
pub enum Stage {
    /// Keeps the documents matching the filter.
    Match(Filter),
    /// Reshapes every document.
    Project(Projection),
    /// Attaches matching documents of another collection.
    Lookup(Lookup),
    /// Attaches the length of an array field as an integer field.
    Size { field: String, target_field: String },
}

impl Stage {
    pub fn matching(filter: Filter) -> Self {
        Stage::Match(filter)
    }

    pub fn project(projection: Projection) -> Self {
        Stage::Project(projection)
    }

    pub fn lookup(lookup: Lookup) -> Self {
        Stage::Lookup(lookup)
    }

    /// Computes the size of array `field` into `target_field`.
    pub fn size(field: &str, target_field: &str) -> Self {
        Stage::Size {
            field: field.to_string(),
            target_field: target_field.to_string(),
        }
    }

    fn validate(&self) -> DocliteResult<()> {
        match self {
            Stage::Match(_) => Ok(()),
            Stage::Project(projection) => projection.validate(),
            Stage::Lookup(lookup) => {
                check_stage_field(self, &lookup.from)?;
                check_stage_field(self, &lookup.local_field)?;
                check_stage_field(self, &lookup.foreign_field)?;
                check_stage_field(self, &lookup.target_field)
            }
            Stage::Size {
                field,
                target_field,
            } => {
                check_stage_field(self, field)?;
                check_stage_field(self, target_field)
            }
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Match(filter) => write!(f, "match{}", filter),
            Stage::Project(projection) => write!(f, "project{}", projection),
            Stage::Lookup(lookup) => write!(f, "{}", lookup),
            Stage::Size {
                field,
                target_field,
            } => write!(f, "size({} as {})", field, target_field),
        }
    }
}

fn check_stage_field(stage: &Stage, field: &str) -> DocliteResult<()> {
    if field.is_empty() || field.split(FIELD_SEPARATOR).any(|s| s.is_empty()) {
        log::error!("Invalid field name '{}' in stage {}", field, stage);
        return Err(DocliteError::new(
            &format!("Invalid field name '{}' in stage {}", field, stage),
            ErrorKind::InvalidStage,
        ));
    }
    Ok(())
}

/// Runs `stages` in order over `source`.
///
/// The whole output is materialized before it is returned; if any stage
/// fails the error is returned and no partial output is surfaced.
pub(crate) fn execute(
    source: Vec<Arc<Document>>,
    stages: &[Stage],
    resolver: &dyn CollectionResolver,
) -> DocliteResult<Vec<Document>> {
    stages.iter().try_for_each(|stage| stage.validate())?;

    let mut documents: Vec<Document> = source.iter().map(|doc| doc.as_ref().clone()).collect();
    for stage in stages {
        log::trace!("Running stage {} over {} documents", stage, documents.len());
        documents = run_stage(stage, documents, resolver)?;
    }
    Ok(documents)
}

fn run_stage(
    stage: &Stage,
    documents: Vec<Document>,
    resolver: &dyn CollectionResolver,
) -> DocliteResult<Vec<Document>> {
    match stage {
        Stage::Match(filter) => {
            let mut matched = Vec::with_capacity(documents.len());
            for document in documents {
                if filter.apply(&document)? {
                    matched.push(document);
                }
            }
            Ok(matched)
        }
        Stage::Project(projection) => documents
            .iter()
            .map(|document| projection.apply(document))
            .collect(),
        Stage::Lookup(lookup) => {
            let foreign = resolver.resolve(&lookup.from)?.snapshot()?;
            documents
                .into_iter()
                .map(|document| join(document, &foreign, lookup))
                .collect()
        }
        Stage::Size {
            field,
            target_field,
        } => documents
            .into_iter()
            .map(|document| attach_size(document, field, target_field))
            .collect(),
    }
}

fn attach_size(mut document: Document, field: &str, target_field: &str) -> DocliteResult<Document> {
    let size = match document.get(field) {
        None => 0,
        Some(Value::Array(items)) => items.len(),
        Some(other) => {
            log::error!(
                "Cannot compute size of field {} holding non array value of type {}",
                field,
                other.type_name()
            );
            return Err(DocliteError::new(
                &format!(
                    "Cannot compute size of field {} holding non array value of type {}",
                    field,
                    other.type_name()
                ),
                ErrorKind::TypeMismatch,
            ));
        }
    };

    let size = i64::try_from(size).map_err(|_| {
        DocliteError::new(
            &format!("Size of field {} does not fit in an integer", field),
            ErrorKind::InternalError,
        )
    })?;
    document.put(target_field, size)?;
    Ok(document)
}
