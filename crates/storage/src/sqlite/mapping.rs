use chrono::{DateTime, Utc};
use progress_core::model::{LearnerId, SubconceptId};
use sqlx::Row;

use crate::repository::{LastViewedRecord, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn non_empty(field: &'static str, value: String) -> Result<String, StorageError> {
    if value.trim().is_empty() {
        return Err(StorageError::Serialization(format!("empty {field}")));
    }
    Ok(value)
}

pub(crate) fn map_last_viewed_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<LastViewedRecord, StorageError> {
    let learner_id = non_empty("learner_id", row.try_get("learner_id").map_err(ser)?)?;
    let subconcept_id = non_empty("subconcept_id", row.try_get("subconcept_id").map_err(ser)?)?;
    let viewed_at: DateTime<Utc> = row.try_get("viewed_at").map_err(ser)?;

    Ok(LastViewedRecord::new(
        LearnerId::new(learner_id),
        SubconceptId::new(subconcept_id),
        viewed_at,
    ))
}
