use thiserror::Error;

/// Errors raised while decoding or building progress models.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelError {
    #[error("{kind} must not be empty")]
    EmptyId { kind: &'static str },
    #[error("malformed progress document: {0}")]
    Json(#[from] serde_json::Error),
}
