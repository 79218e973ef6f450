use std::sync::Arc;

use progress_core::model::{LearnerId, ProgressTree, SubconceptId};
use progress_core::{
    Clock, LearnerStats, ResumePoint, ResumeReason, StageProgress, calculate_learner_stats,
    process_learner_progress, resolve_with_reason, stage_progress,
};
use serde::Serialize;
use storage::repository::{LastViewedRecord, LastViewedRepository};

use crate::error::ProgressServiceError;
use crate::progress_source::ProgressSource;

/// Everything the course player and dashboard render for one learner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerReport {
    pub learner_id: LearnerId,
    pub stats: LearnerStats,
    pub stages: Vec<StageProgress>,
    pub resume: Option<ResumeDecision>,
    /// The tree with attempts trimmed to the most recent ones.
    pub progress: ProgressTree,
}

/// Resolved resume point plus the rule that picked it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDecision {
    #[serde(flatten)]
    pub point: ResumePoint,
    pub reason: ResumeReason,
}

/// Composes fetch → trim → aggregate → resolve for a learner.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    source: Arc<dyn ProgressSource>,
    last_viewed: Arc<dyn LastViewedRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        clock: Clock,
        source: Arc<dyn ProgressSource>,
        last_viewed: Arc<dyn LastViewedRepository>,
    ) -> Self {
        Self {
            clock,
            source,
            last_viewed,
        }
    }

    /// Fetch, trim and summarize a learner's progress.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError` if the tree cannot be fetched or the
    /// last viewed marker cannot be read.
    pub async fn load_report(
        &self,
        learner_id: &LearnerId,
    ) -> Result<LearnerReport, ProgressServiceError> {
        let raw = self.source.fetch(learner_id).await?;
        let progress = process_learner_progress(&raw);
        let stats = calculate_learner_stats(&progress);
        if !stats.is_well_defined() {
            tracing::warn!(learner = %learner_id, "progress tree has no stages or subconcepts");
        }
        let resume = self.resolve(learner_id, &progress).await?;

        Ok(LearnerReport {
            learner_id: learner_id.clone(),
            stats,
            stages: stage_progress(&progress),
            resume,
            progress,
        })
    }

    /// Where the learner should land next, or `None` for an empty course.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError` on fetch or storage failures.
    pub async fn resume_point(
        &self,
        learner_id: &LearnerId,
    ) -> Result<Option<ResumeDecision>, ProgressServiceError> {
        let tree = self.source.fetch(learner_id).await?;
        self.resolve(learner_id, &tree).await
    }

    /// Remember that the learner opened `subconcept_id`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::UnknownSubconcept` if the id is not in
    /// the learner's current tree, or fetch/storage errors.
    pub async fn record_view(
        &self,
        learner_id: &LearnerId,
        subconcept_id: &SubconceptId,
    ) -> Result<LastViewedRecord, ProgressServiceError> {
        let tree = self.source.fetch(learner_id).await?;
        if !tree.contains_subconcept(subconcept_id) {
            return Err(ProgressServiceError::UnknownSubconcept {
                learner: learner_id.clone(),
                subconcept: subconcept_id.clone(),
            });
        }

        let record = LastViewedRecord::new(
            learner_id.clone(),
            subconcept_id.clone(),
            self.clock.now(),
        );
        self.last_viewed.set_last_viewed(&record).await?;
        tracing::info!(learner = %learner_id, subconcept = %subconcept_id, "recorded view");
        Ok(record)
    }

    /// Drop the learner's marker so the next resume starts from the first
    /// incomplete subconcept.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` on storage failures, including
    /// `StorageError::NotFound` when there was nothing to forget.
    pub async fn forget_view(&self, learner_id: &LearnerId) -> Result<(), ProgressServiceError> {
        self.last_viewed.clear_last_viewed(learner_id).await?;
        Ok(())
    }

    async fn resolve(
        &self,
        learner_id: &LearnerId,
        tree: &ProgressTree,
    ) -> Result<Option<ResumeDecision>, ProgressServiceError> {
        let marker = self.last_viewed.get_last_viewed(learner_id).await?;
        let last_viewed = marker.as_ref().map(|m| m.subconcept_id.as_str());

        Ok(
            resolve_with_reason(&tree.stages, last_viewed).map(|(target, reason)| {
                ResumeDecision {
                    point: target.to_point(),
                    reason,
                }
            }),
        )
    }
}
