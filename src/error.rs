//! Module defining the errors which are exposed to the users of the crate

use std::path::PathBuf;

use crate::domain::QueueId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid CSV
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("source file not found: {}", .path.display())]
    SourceNotFound { path: PathBuf },

    /// The source exists but holds no usable data rows
    #[error("no data found in source file: {}", .path.display())]
    EmptyDataset { path: PathBuf },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Enqueueing a job failed. Aborts the run; `dispatched` jobs were already handed to the queues.
    #[error("failed to enqueue job on queue {queue} after {dispatched} successful dispatches: {source}")]
    Enqueue {
        queue: QueueId,
        dispatched: usize,
        #[source]
        source: QueueError,
    },

    /// A row that could not be turned into a reading, e.g., an unparseable date
    #[error("validation error — line: {line}: {message}")]
    Validation { line: u64, message: String },

    /// A valid reading the repository refused to store
    #[error("repository error — line: {line}: {source}")]
    Repository {
        line: u64,
        #[source]
        source: RepositoryError,
    },
}

impl Error {
    /// Record-level errors are recoverable: they are reported and the batch goes on.
    pub fn is_record_level(&self) -> bool {
        matches!(self, Error::Validation { .. } | Error::Repository { .. })
    }
}

/// Errors surfaced by a queue when a job cannot be accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("queue {0} is unavailable")]
    Unavailable(QueueId),

    #[error("queue {0} is closed")]
    Closed(QueueId),
}

/// Errors surfaced by a reading repository.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("reading rejected: {0}")]
    Rejected(String),

    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

pub(crate) fn validation_error(line: u64, message: impl Into<String>) -> Error {
    Error::Validation {
        line,
        message: message.into(),
    }
}

pub(crate) fn repository_error(line: u64, source: RepositoryError) -> Error {
    Error::Repository { line, source }
}

pub(crate) fn invalid_argument(message: impl Into<String>) -> Error {
    Error::InvalidArgument(message.into())
}
