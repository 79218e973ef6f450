use async_trait::async_trait;
use progress_core::model::LearnerId;

use super::{SqliteRepository, mapping::map_last_viewed_row};
use crate::repository::{LastViewedRecord, LastViewedRepository, StorageError};

#[async_trait]
impl LastViewedRepository for SqliteRepository {
    async fn get_last_viewed(
        &self,
        learner_id: &LearnerId,
    ) -> Result<Option<LastViewedRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT learner_id, subconcept_id, viewed_at
            FROM last_viewed
            WHERE learner_id = ?1
            ",
        )
        .bind(learner_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        row.as_ref().map(map_last_viewed_row).transpose()
    }

    async fn set_last_viewed(&self, record: &LastViewedRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO last_viewed (learner_id, subconcept_id, viewed_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(learner_id) DO UPDATE SET
                subconcept_id = excluded.subconcept_id,
                viewed_at = excluded.viewed_at
            ",
        )
        .bind(record.learner_id.as_str())
        .bind(record.subconcept_id.as_str())
        .bind(record.viewed_at)
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        tracing::debug!(
            learner = %record.learner_id,
            subconcept = %record.subconcept_id,
            "stored last viewed marker"
        );
        Ok(())
    }

    async fn clear_last_viewed(&self, learner_id: &LearnerId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM last_viewed WHERE learner_id = ?1")
            .bind(learner_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<LastViewedRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT learner_id, subconcept_id, viewed_at
            FROM last_viewed
            ORDER BY viewed_at DESC, learner_id ASC
            LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        rows.iter().map(map_last_viewed_row).collect()
    }
}
