use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::ActivityKind;

//
// ─── ATTEMPT DATE ──────────────────────────────────────────────────────────────
//

/// Timestamp of an attempt exactly as the backend sent it.
///
/// The raw value is kept so that re-serializing a processed tree reproduces
/// the input. Parsing happens on demand through [`AttemptDate::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttemptDate {
    /// Epoch milliseconds.
    Millis(i64),
    Text(String),
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

impl AttemptDate {
    /// Parses the raw value.
    ///
    /// Accepts RFC 3339, zone-less date-times (read as UTC), bare dates and
    /// epoch milliseconds. Anything else yields `None`.
    #[must_use]
    pub fn parse(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Millis(ms) => DateTime::<Utc>::from_timestamp_millis(*ms),
            Self::Text(raw) => parse_text(raw.trim()),
        }
    }
}

impl From<DateTime<Utc>> for AttemptDate {
    fn from(at: DateTime<Utc>) -> Self {
        Self::Text(at.to_rfc3339())
    }
}

fn parse_text(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

//
// ─── ATTEMPT ───────────────────────────────────────────────────────────────────
//

/// One recorded interaction with a subconcept's activity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempt_date: Option<AttemptDate>,
    #[serde(default, alias = "percentage", skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<ActivityKind>,
    /// Fields this crate does not interpret, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Attempt {
    #[must_use]
    pub fn new(attempt_date: impl Into<AttemptDate>, score: Option<f64>) -> Self {
        Self {
            attempt_date: Some(attempt_date.into()),
            score,
            ..Self::default()
        }
    }

    /// Parsed timestamp; `None` when absent or unparseable.
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.attempt_date.as_ref().and_then(AttemptDate::parse)
    }
}
