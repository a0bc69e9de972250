#![forbid(unsafe_code)]

use pf_core::forest::ForestViolation;
use rusqlite::ErrorCode;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("sqlite: {0}")]
    Sql(rusqlite::Error),

    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("project not found")]
    NodeNotFound,

    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),

    /// The connection cannot run conditional bulk updates. Raised while opening, never retried.
    #[error("store capability: {0}")]
    StoreCapabilityError(&'static str),

    /// Busy or locked database. The whole operation may be retried from scratch.
    #[error("transaction aborted: {0}")]
    TransactionAborted(rusqlite::Error),

    #[error("duplicate record")]
    DuplicateRecord,

    #[error("corrupt forest: {0}")]
    CorruptForest(ForestViolation),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "IO",
            Self::Sql(_) => "SQL",
            Self::InvalidInput(message) if message.starts_with("RESET_REQUIRED") => {
                "RESET_REQUIRED"
            }
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::NodeNotFound => "NODE_NOT_FOUND",
            Self::InvalidOperation(_) => "INVALID_OPERATION",
            Self::StoreCapabilityError(_) => "STORE_CAPABILITY",
            Self::TransactionAborted(_) => "TRANSACTION_ABORTED",
            Self::DuplicateRecord => "DUPLICATE_RECORD",
            Self::CorruptForest(_) => "CORRUPT_FOREST",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransactionAborted(_))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        if is_transaction_conflict(&value) {
            return Self::TransactionAborted(value);
        }
        Self::Sql(value)
    }
}

impl From<ForestViolation> for StoreError {
    fn from(value: ForestViolation) -> Self {
        Self::CorruptForest(value)
    }
}

fn is_transaction_conflict(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(code, _) => matches!(
            code.code,
            ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
        ),
        _ => false,
    }
}
