//! Shared error types for the services crate.

use thiserror::Error;

use assess_core::model::AssessmentId;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `AssessmentLoader`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("assessment {0} is unavailable")]
    NotFound(AssessmentId),
    #[error(transparent)]
    Store(StorageError),
}

/// Errors emitted while answering inside a session.
///
/// `InvalidSelection` means the caller offered a control the question does
/// not have; it is a bug in the caller, not a user-facing failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("invalid selection {option:?} for question {index}")]
    InvalidSelection { index: usize, option: String },
    #[error("session no longer accepts answers")]
    Closed,
}

/// Errors emitted by `SubmissionCoordinator`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubmitError {
    #[error("sign in to submit your answers")]
    Unauthenticated,
    #[error("a submission for this session is already in progress")]
    InProgress,
    #[error("session already submitted")]
    AlreadySubmitted,
    #[error(transparent)]
    Store(#[from] StorageError),
}

/// Errors emitted while bootstrapping services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
