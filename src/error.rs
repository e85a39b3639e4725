// Error taxonomy for the registry workflow and the ledger boundary

use thiserror::Error;

use crate::model::Category;

/// Errors raised by the ledger world state
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record {0} not found on the ledger")]
    NotFound(String),
    #[error("version conflict on {id}: expected {expected}, ledger holds {actual}")]
    VersionConflict {
        id: String,
        expected: VersionDisplay,
        actual: VersionDisplay,
    },
    #[error("ledger document {id} is unreadable: {reason}")]
    Corrupt { id: String, reason: String },
    #[error("ledger I/O failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("ledger serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised while validating and computing a workflow transition
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("validation failed for `{field}`: {message}")]
    Validation { field: String, message: String },
    #[error("identifier mismatch: path has {path}, payload has {payload}")]
    IdentifierMismatch { path: String, payload: String },
    #[error("record {0} not found")]
    NotFound(String),
    #[error("record {0} already exists")]
    AlreadyExists(String),
    #[error("pending {category} index {index} is out of range (pending list holds {len})")]
    IndexOutOfRange {
        category: Category,
        index: String,
        len: usize,
    },
    #[error("no pending {category} entry with id {entry_id}")]
    EntryNotFound { category: Category, entry_id: String },
    #[error("version conflict on {id}: expected {expected}, found {actual}")]
    VersionConflict {
        id: String,
        expected: VersionDisplay,
        actual: VersionDisplay,
    },
    #[error("{caller} is not permitted to {operation}")]
    PermissionDenied { caller: String, operation: String },
    #[error("job queue is closed")]
    QueueClosed,
    #[error(transparent)]
    Store(StoreError),
}

impl WorkflowError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        WorkflowError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Conflicts are the only failures a caller can clear by re-reading and retrying
    pub fn is_retryable(&self) -> bool {
        matches!(self, WorkflowError::VersionConflict { .. })
    }
}

impl From<StoreError> for WorkflowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => WorkflowError::NotFound(id),
            StoreError::VersionConflict {
                id,
                expected,
                actual,
            } => WorkflowError::VersionConflict {
                id,
                expected,
                actual,
            },
            other => WorkflowError::Store(other),
        }
    }
}

/// Renders an optional version, where `None` means "no record"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionDisplay(pub Option<u64>);

impl std::fmt::Display for VersionDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(version) => write!(f, "version {version}"),
            None => write!(f, "no record"),
        }
    }
}

impl From<Option<u64>> for VersionDisplay {
    fn from(version: Option<u64>) -> Self {
        VersionDisplay(version)
    }
}
