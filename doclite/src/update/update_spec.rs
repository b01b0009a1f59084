use std::fmt::Display;

use crate::collection::Document;
use crate::common::{Value, DOC_ID, FIELD_SEPARATOR};
use crate::errors::{DocliteError, DocliteResult, ErrorKind};

/// A single mutating operator.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOperator {
    /// Overwrites the field, creating it (and missing parent documents) if absent.
    Set { field: String, value: Value },
    /// Adds a number to the field, treating an absent field as `0`.
    Inc { field: String, delta: Value },
    /// Appends to an array field, creating the array if absent.
    Push { field: String, value: Value },
    /// Removes every element structurally equal to the value.
    Pull { field: String, value: Value },
}

impl UpdateOperator {
    pub fn field(&self) -> &str {
        match self {
            UpdateOperator::Set { field, .. }
            | UpdateOperator::Inc { field, .. }
            | UpdateOperator::Push { field, .. }
            | UpdateOperator::Pull { field, .. } => field,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            UpdateOperator::Set { .. } => "set",
            UpdateOperator::Inc { .. } => "inc",
            UpdateOperator::Push { .. } => "push",
            UpdateOperator::Pull { .. } => "pull",
        }
    }

    fn validate(&self) -> DocliteResult<()> {
        let field = self.field();
        if field.is_empty() || field.split(FIELD_SEPARATOR).any(|s| s.is_empty()) {
            log::error!("Invalid field name '{}' in {} operator", field, self.name());
            return Err(DocliteError::new(
                &format!("Invalid field name '{}' in {} operator", field, self.name()),
                ErrorKind::InvalidOperation,
            ));
        }

        if field.split(FIELD_SEPARATOR).next() == Some(DOC_ID) {
            log::error!("Document id cannot be modified by {} operator", self.name());
            return Err(DocliteError::new(
                &format!("Document id cannot be modified by {} operator", self.name()),
                ErrorKind::InvalidOperation,
            ));
        }

        if let UpdateOperator::Inc { field, delta } = self {
            if !delta.is_number() {
                log::error!("Cannot increment field {} by non numeric value {}", field, delta);
                return Err(DocliteError::new(
                    &format!(
                        "Cannot increment field {} by non numeric value of type {}",
                        field,
                        delta.type_name()
                    ),
                    ErrorKind::InvalidOperation,
                ));
            }
        }
        Ok(())
    }

    fn apply(&self, document: &mut Document) -> DocliteResult<()> {
        match self {
            UpdateOperator::Set { field, value } => document.put(field.as_str(), value.clone()),
            UpdateOperator::Inc { field, delta } => {
                let current = document.get(field).cloned().unwrap_or(Value::I64(0));
                let sum = add(field, &current, delta)?;
                document.put(field.as_str(), sum)
            }
            UpdateOperator::Push { field, value } => {
                let mut items = match document.get(field) {
                    None => Vec::new(),
                    Some(Value::Array(items)) => items.clone(),
                    Some(other) => return Err(not_an_array(field, "push", other)),
                };
                items.push(value.clone());
                document.put(field.as_str(), Value::Array(items))
            }
            UpdateOperator::Pull { field, value } => match document.get(field) {
                None => Ok(()),
                Some(Value::Array(items)) => {
                    let remaining: Vec<Value> =
                        items.iter().filter(|item| *item != value).cloned().collect();
                    if remaining.len() == items.len() {
                        return Ok(());
                    }
                    document.put(field.as_str(), Value::Array(remaining))
                }
                Some(other) => Err(not_an_array(field, "pull", other)),
            },
        }
    }
}

impl Display for UpdateOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateOperator::Set { field, value } => write!(f, "set({} = {})", field, value),
            UpdateOperator::Inc { field, delta } => write!(f, "inc({} += {})", field, delta),
            UpdateOperator::Push { field, value } => write!(f, "push({} <- {})", field, value),
            UpdateOperator::Pull { field, value } => write!(f, "pull({} -> {})", field, value),
        }
    }
}

fn add(field: &str, current: &Value, delta: &Value) -> DocliteResult<Value> {
    match (current, delta) {
        (Value::I64(a), Value::I64(b)) => a.checked_add(*b).map(Value::I64).ok_or_else(|| {
            log::error!("Increment of field {} by {} overflows", field, b);
            DocliteError::new(
                &format!("Increment of field {} by {} overflows", field, b),
                ErrorKind::TypeMismatch,
            )
        }),
        _ => match (current.as_number(), delta.as_number()) {
            (Some(a), Some(b)) => Ok(Value::F64(a + b)),
            _ => {
                log::error!(
                    "Cannot increment field {} holding non numeric value {}",
                    field,
                    current
                );
                Err(DocliteError::new(
                    &format!(
                        "Cannot increment field {} holding non numeric value of type {}",
                        field,
                        current.type_name()
                    ),
                    ErrorKind::TypeMismatch,
                ))
            }
        },
    }
}

fn not_an_array(field: &str, operator: &str, value: &Value) -> DocliteError {
    log::error!(
        "Cannot {} on field {} holding non array value of type {}",
        operator,
        field,
        value.type_name()
    );
    DocliteError::new(
        &format!(
            "Cannot {} on field {} holding non array value of type {}",
            operator,
            field,
            value.type_name()
        ),
        ErrorKind::TypeMismatch,
    )
}

/// An ordered list of update operators.
///
/// Operators are applied in the order they were added. For one document they
/// either all succeed or none is applied.
///
/// ```rust
/// use doclite::doc;
/// use doclite::update::UpdateSpec;
///
/// let update = UpdateSpec::new()
///     .set("warranty", "2 years")
///     .inc("price", 50);
///
/// let mut phone = doc! { "category": "Phone", "price": 600 };
/// assert!(update.apply(&mut phone).unwrap());
/// assert_eq!(phone, doc! { "category": "Phone", "price": 650, "warranty": "2 years" });
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSpec {
    operators: Vec<UpdateOperator>,
}

impl UpdateSpec {
    pub fn new() -> Self {
        UpdateSpec::default()
    }

    pub fn set<T: Into<Value>>(mut self, field: &str, value: T) -> Self {
        self.operators.push(UpdateOperator::Set {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn inc<T: Into<Value>>(mut self, field: &str, delta: T) -> Self {
        self.operators.push(UpdateOperator::Inc {
            field: field.to_string(),
            delta: delta.into(),
        });
        self
    }

    pub fn push<T: Into<Value>>(mut self, field: &str, value: T) -> Self {
        self.operators.push(UpdateOperator::Push {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn pull<T: Into<Value>>(mut self, field: &str, value: T) -> Self {
        self.operators.push(UpdateOperator::Pull {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn operators(&self) -> &[UpdateOperator] {
        &self.operators
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Checks the spec without touching any document.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::InvalidOperation] if the spec is empty, names an
    /// empty field, targets `_id` or increments by a non numeric value.
    pub fn validate(&self) -> DocliteResult<()> {
        if self.operators.is_empty() {
            log::error!("Update spec has no operators");
            return Err(DocliteError::new(
                "Update spec has no operators",
                ErrorKind::InvalidOperation,
            ));
        }
        self.operators.iter().try_for_each(|operator| operator.validate())
    }

    /// Applies every operator to `document` in order and reports whether its
    /// content changed.
    ///
    /// On error `document` is left untouched.
    pub fn apply(&self, document: &mut Document) -> DocliteResult<bool> {
        self.validate()?;
        let mut updated = document.clone();
        for operator in &self.operators {
            operator.apply(&mut updated)?;
        }

        if updated == *document {
            return Ok(false);
        }
        *document = updated;
        Ok(true)
    }
}

impl Display for UpdateSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let operators: Vec<String> = self.operators.iter().map(|op| op.to_string()).collect();
        write!(f, "[{}]", operators.join(", "))
    }
}
