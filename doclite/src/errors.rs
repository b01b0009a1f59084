use backtrace::Backtrace;
use parking_lot::RwLock;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// Error kinds for doclite operations.
///
/// Each kind names one category of failure so callers can branch on it
/// without parsing messages.
///
/// # Examples
///
/// ```rust,ignore
/// use doclite::errors::{DocliteError, ErrorKind, DocliteResult};
///
/// fn example() -> DocliteResult<()> {
///     Err(DocliteError::new("Collection orders not found", ErrorKind::NotFound))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// A caller-supplied `_id` collides with an existing document
    DuplicateId,
    /// The operation references an unknown collection
    NotFound,
    /// An operator was applied to an incompatibly typed field
    TypeMismatch,
    /// A filter predicate is malformed
    InvalidFilter,
    /// A pipeline stage or projection is malformed
    InvalidStage,
    /// A capped collection rejected an insert outright
    CapacityExceeded,

    /// The provided id is not a valid document id
    InvalidId,
    /// The operation is not valid in the current context
    InvalidOperation,
    /// A collection with the same name already exists
    AlreadyExists,

    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::DuplicateId => write!(f, "Duplicate id"),
            ErrorKind::NotFound => write!(f, "Not found"),
            ErrorKind::TypeMismatch => write!(f, "Type mismatch"),
            ErrorKind::InvalidFilter => write!(f, "Invalid filter"),
            ErrorKind::InvalidStage => write!(f, "Invalid stage"),
            ErrorKind::CapacityExceeded => write!(f, "Capacity exceeded"),
            ErrorKind::InvalidId => write!(f, "Invalid ID"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::AlreadyExists => write!(f, "Already exists"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Error type returned by every fallible doclite operation.
///
/// Carries a message, an [ErrorKind], an optional cause and the backtrace
/// captured where the error was raised.
///
/// # Examples
///
/// ```rust,ignore
/// use doclite::errors::{DocliteError, ErrorKind};
///
/// let cause = DocliteError::new("price is not numeric", ErrorKind::TypeMismatch);
/// let err = DocliteError::new_with_cause("update_many failed", ErrorKind::TypeMismatch, cause);
/// ```
#[derive(Clone)]
pub struct DocliteError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<DocliteError>>,
    backtrace: Arc<RwLock<Backtrace>>,
}

impl DocliteError {
    /// Creates a new `DocliteError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        DocliteError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Arc::new(RwLock::new(Backtrace::new())),
        }
    }

    /// Creates a new `DocliteError` wrapping an underlying cause.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: DocliteError) -> Self {
        DocliteError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Arc::new(RwLock::new(Backtrace::new())),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&DocliteError> {
        self.cause.as_deref()
    }
}

impl Display for DocliteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for DocliteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{} ({})\nCaused by: {:?}", self.message, self.error_kind, cause),
            None => write!(f, "{} ({})\n{:?}", self.message, self.error_kind, self.backtrace.read()),
        }
    }
}

impl Error for DocliteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for doclite operations.
pub type DocliteResult<T> = Result<T, DocliteError>;

impl From<std::fmt::Error> for DocliteError {
    fn from(err: std::fmt::Error) -> Self {
        DocliteError::new(
            &format!("Formatting error: {}", err),
            ErrorKind::InternalError,
        )
    }
}

impl From<String> for DocliteError {
    fn from(msg: String) -> Self {
        DocliteError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for DocliteError {
    fn from(msg: &str) -> Self {
        DocliteError::new(msg, ErrorKind::InternalError)
    }
}
