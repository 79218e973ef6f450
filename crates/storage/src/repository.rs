use async_trait::async_trait;
use chrono::{DateTime, Utc};
use progress_core::model::{LearnerId, SubconceptId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted "last viewed subconcept" marker for one learner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastViewedRecord {
    pub learner_id: LearnerId,
    pub subconcept_id: SubconceptId,
    pub viewed_at: DateTime<Utc>,
}

impl LastViewedRecord {
    #[must_use]
    pub fn new(learner_id: LearnerId, subconcept_id: SubconceptId, viewed_at: DateTime<Utc>) -> Self {
        Self {
            learner_id,
            subconcept_id,
            viewed_at,
        }
    }
}

/// Repository contract for the per-learner resume marker.
#[async_trait]
pub trait LastViewedRepository: Send + Sync {
    /// Fetch the marker for a learner, if one was recorded.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_last_viewed(
        &self,
        learner_id: &LearnerId,
    ) -> Result<Option<LastViewedRecord>, StorageError>;

    /// Record or replace the marker for a learner.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the marker cannot be stored.
    async fn set_last_viewed(&self, record: &LastViewedRecord) -> Result<(), StorageError>;

    /// Forget the marker for a learner.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if there was no marker, or other storage errors.
    async fn clear_last_viewed(&self, learner_id: &LearnerId) -> Result<(), StorageError>;

    /// Most recently updated markers first, at most `limit`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn list_recent(&self, limit: u32) -> Result<Vec<LastViewedRecord>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    markers: Arc<Mutex<HashMap<LearnerId, LastViewedRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LastViewedRepository for InMemoryRepository {
    async fn get_last_viewed(
        &self,
        learner_id: &LearnerId,
    ) -> Result<Option<LastViewedRecord>, StorageError> {
        let guard = self
            .markers
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(learner_id).cloned())
    }

    async fn set_last_viewed(&self, record: &LastViewedRecord) -> Result<(), StorageError> {
        let mut guard = self
            .markers
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(record.learner_id.clone(), record.clone());
        Ok(())
    }

    async fn clear_last_viewed(&self, learner_id: &LearnerId) -> Result<(), StorageError> {
        let mut guard = self
            .markers
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .remove(learner_id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<LastViewedRecord>, StorageError> {
        let guard = self
            .markers
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut records: Vec<LastViewedRecord> = guard.values().cloned().collect();
        records.sort_by(|a, b| {
            b.viewed_at
                .cmp(&a.viewed_at)
                .then_with(|| a.learner_id.cmp(&b.learner_id))
        });
        records.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(records)
    }
}

/// Repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub last_viewed: Arc<dyn LastViewedRepository>,
}
