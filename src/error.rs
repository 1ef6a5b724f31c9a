use std::{error::Error as StdError, fmt, io};

/// The structural violations named at the page or cache layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbExceptionKind {
    PageFull,
    SlotEmpty,
    TupleMismatch,
    SchemaMismatch,
    AllDirty,
}

impl fmt::Display for DbExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            DbExceptionKind::PageFull => "page_full",
            DbExceptionKind::SlotEmpty => "slot_empty",
            DbExceptionKind::TupleMismatch => "tuple_mismatch",
            DbExceptionKind::SchemaMismatch => "schema_mismatch",
            DbExceptionKind::AllDirty => "all_dirty",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug)]
pub enum DbError {
    /// Lock wait exceeded its timeout; the only user-visible concurrency
    /// failure.
    TransactionAborted { details: String },

    /// Structural violation at the page or cache layer.
    DbException {
        kind: DbExceptionKind,
        details: String,
    },

    /// Unexpected short read, out-of-range histogram input, aggregator
    /// schema mismatch.
    IllegalArgument { details: String },

    /// Disk-level failure during page read/write or log write.
    Io { details: String },

    /// String aggregator configured with an op other than COUNT; histogram
    /// operator not in the set.
    UnsupportedOperation { details: String },
}

impl DbError {
    pub fn transaction_aborted(details: impl Into<String>) -> DbError {
        DbError::TransactionAborted {
            details: details.into(),
        }
    }

    pub fn db_exception(kind: DbExceptionKind, details: impl Into<String>) -> DbError {
        DbError::DbException {
            kind,
            details: details.into(),
        }
    }

    pub fn illegal_argument(details: impl Into<String>) -> DbError {
        DbError::IllegalArgument {
            details: details.into(),
        }
    }

    pub fn unsupported_operation(details: impl Into<String>) -> DbError {
        DbError::UnsupportedOperation {
            details: details.into(),
        }
    }

    pub fn kind(&self) -> Option<DbExceptionKind> {
        match self {
            DbError::DbException { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DbError::TransactionAborted { details } => {
                write!(f, "transaction aborted: {}", details)
            }
            DbError::DbException { kind, details } => {
                write!(f, "db exception ({}): {}", kind, details)
            }
            DbError::IllegalArgument { details } => write!(f, "illegal argument: {}", details),
            DbError::Io { details } => write!(f, "io error: {}", details),
            DbError::UnsupportedOperation { details } => {
                write!(f, "unsupported operation: {}", details)
            }
        }
    }
}

impl StdError for DbError {}

impl From<io::Error> for DbError {
    fn from(e: io::Error) -> Self {
        DbError::Io {
            details: e.to_string(),
        }
    }
}

pub type DbResult<T> = Result<T, DbError>;
