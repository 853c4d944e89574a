use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;
use std::sync::Arc;

/// Error kinds for index synchronization.
///
/// Each kind describes one category of failure so callers can decide whether
/// a failure is local to one index declaration or concerns the store itself.
///
/// # Examples
///
/// ```rust
/// use index_sync::errors::{ErrorKind, IndexSyncError, IndexSyncResult};
///
/// fn example() -> IndexSyncResult<()> {
///     Err(IndexSyncError::new("Connection refused", ErrorKind::StoreUnavailable))
/// }
///
/// assert!(example().unwrap_err().is_store_error());
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// A compound index key expression is not well-formed structured data
    ParseError,
    /// The store could not be reached or refused the request
    StoreUnavailable,
    /// The store rejected an index that conflicts with an existing one
    IndexConflict,
    /// The operation is not valid in the current context
    InvalidOperation,
    /// Error publishing or handling mapping events
    EventError,
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::ParseError => write!(f, "Parse error"),
            ErrorKind::StoreUnavailable => write!(f, "Store unavailable"),
            ErrorKind::IndexConflict => write!(f, "Index conflict"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::EventError => write!(f, "Event error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Error type for index synchronization.
///
/// `IndexSyncError` carries a message, a kind and an optional cause. A backtrace
/// is captured at construction and printed by the `Debug` implementation.
///
/// # Examples
///
/// ```rust
/// use index_sync::errors::{ErrorKind, IndexSyncError};
///
/// let cause = IndexSyncError::new("socket closed", ErrorKind::StoreUnavailable);
/// let err = IndexSyncError::new_with_cause(
///     "Failed to ensure index on users",
///     ErrorKind::StoreUnavailable,
///     cause,
/// );
/// assert!(err.cause().is_some());
/// ```
#[derive(Clone)]
pub struct IndexSyncError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<IndexSyncError>>,
    backtrace: Arc<Backtrace>,
}

impl IndexSyncError {
    /// Creates a new `IndexSyncError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        IndexSyncError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    /// Creates a new `IndexSyncError` that wraps the error which caused it.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: IndexSyncError) -> Self {
        IndexSyncError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&IndexSyncError> {
        self.cause.as_deref()
    }

    /// Returns true when the error came from the store rather than from a
    /// declaration.
    pub fn is_store_error(&self) -> bool {
        matches!(
            self.error_kind,
            ErrorKind::StoreUnavailable | ErrorKind::IndexConflict
        )
    }
}

impl Display for IndexSyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for IndexSyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace),
        }
    }
}

impl Error for IndexSyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for index synchronization.
pub type IndexSyncResult<T> = Result<T, IndexSyncError>;

impl From<serde_json::Error> for IndexSyncError {
    fn from(err: serde_json::Error) -> Self {
        IndexSyncError::new(
            &format!("Malformed index key expression: {}", err),
            ErrorKind::ParseError,
        )
    }
}

impl From<String> for IndexSyncError {
    fn from(msg: String) -> Self {
        IndexSyncError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for IndexSyncError {
    fn from(msg: &str) -> Self {
        IndexSyncError::new(msg, ErrorKind::InternalError)
    }
}
