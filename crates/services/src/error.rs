//! Shared error types for the services crate.

use thiserror::Error;

use progress_core::ModelError;
use progress_core::model::{LearnerId, SubconceptId};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors raised while reading the progress API configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressApiConfigError {
    #[error("progress API base URL is empty")]
    MissingBaseUrl,
    #[error("invalid progress API base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error("progress API base URL must be http(s), got {0}")]
    UnsupportedScheme(String),
}

/// Errors emitted by a `ProgressSource`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressSourceError {
    #[error("no progress available for learner {0}")]
    UnknownLearner(LearnerId),
    #[error("progress request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Decode(#[from] ModelError),
    #[error("cannot read progress document: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error("subconcept {subconcept} is not part of learner {learner}'s course")]
    UnknownSubconcept {
        learner: LearnerId,
        subconcept: SubconceptId,
    },
    #[error(transparent)]
    Source(#[from] ProgressSourceError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
