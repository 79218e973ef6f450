use std::cmp::Ordering;
use std::str::FromStr;

use progress_core::LearnerStats;
use progress_core::model::LearnerId;
use serde::Serialize;

use crate::error::ProgressServiceError;
use crate::progress_service::ProgressService;

/// One row of the mentor dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerSummary {
    pub learner_id: LearnerId,
    pub stats: LearnerStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankKey {
    #[default]
    AverageScore,
    Completion,
    TotalAttempts,
}

impl FromStr for RankKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "score" | "average" | "average_score" => Ok(Self::AverageScore),
            "completion" => Ok(Self::Completion),
            "attempts" | "total_attempts" => Ok(Self::TotalAttempts),
            other => Err(format!("unknown rank key: {other}")),
        }
    }
}

/// Descending by `key`; undefined (NaN) values go last, ties by learner id.
pub fn rank_learners(summaries: &mut [LearnerSummary], key: RankKey) {
    summaries.sort_by(|a, b| {
        let primary = match key {
            RankKey::AverageScore => desc_nan_last(a.stats.average_score, b.stats.average_score),
            RankKey::Completion => desc_nan_last(
                a.stats.completion_percentage,
                b.stats.completion_percentage,
            ),
            RankKey::TotalAttempts => b.stats.total_attempts.cmp(&a.stats.total_attempts),
        };
        primary.then_with(|| a.learner_id.cmp(&b.learner_id))
    });
}

fn desc_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}

impl ProgressService {
    /// Fetch and rank several learners for the mentor dashboard.
    ///
    /// # Errors
    ///
    /// Returns the first `ProgressServiceError` hit while fetching.
    pub async fn dashboard(
        &self,
        learners: &[LearnerId],
        key: RankKey,
    ) -> Result<Vec<LearnerSummary>, ProgressServiceError> {
        let mut rows = Vec::with_capacity(learners.len());
        for learner_id in learners {
            let report = self.load_report(learner_id).await?;
            rows.push(LearnerSummary {
                learner_id: report.learner_id,
                stats: report.stats,
            });
        }
        rank_learners(&mut rows, key);
        Ok(rows)
    }
}
