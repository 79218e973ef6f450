use serde::Serialize;

use crate::model::{ProgressTree, StageId};

/// Summary counters for one learner.
///
/// `average_score` is NaN for a tree without subconcepts and
/// `completion_percentage` is NaN (or infinite) when the stage total is zero.
/// Neither case is masked: use [`LearnerStats::is_well_defined`] before
/// rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerStats {
    pub total_attempts: usize,
    pub average_score: f64,
    pub completion_percentage: f64,
}

impl LearnerStats {
    #[must_use]
    pub fn is_well_defined(&self) -> bool {
        self.average_score.is_finite() && self.completion_percentage.is_finite()
    }
}

/// Reduces a progress tree to its summary counters.
///
/// Attempts are counted as given; trim upstream if only recent attempts
/// should count. Scores come from each subconcept's `best_score` alone, so
/// trimming never moves the average.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn calculate_learner_stats(tree: &ProgressTree) -> LearnerStats {
    let mut total_attempts = 0;
    let mut subconcept_count = 0usize;
    let mut score_sum = 0.0;

    for sub in tree.subconcepts() {
        total_attempts += sub.attempts.len();
        subconcept_count += 1;
        score_sum += sub.best_score.unwrap_or(0.0);
    }

    let completed = f64::from(tree.completed_stage_count());
    let total = f64::from(tree.total_stage_count());

    LearnerStats {
        total_attempts,
        average_score: score_sum / subconcept_count as f64,
        completion_percentage: completed / total * 100.0,
    }
}

/// Progress-bar numbers for one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageProgress {
    pub stage_id: StageId,
    pub completed_subconcepts: usize,
    pub total_subconcepts: usize,
    pub is_completed: bool,
}

impl StageProgress {
    /// Share of completed subconcepts in `0.0..=1.0`; an empty stage reads as `0.0`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f64 {
        if self.total_subconcepts == 0 {
            return 0.0;
        }
        self.completed_subconcepts as f64 / self.total_subconcepts as f64
    }
}

/// Per-stage breakdown in document order.
#[must_use]
pub fn stage_progress(tree: &ProgressTree) -> Vec<StageProgress> {
    tree.stages
        .iter()
        .map(|stage| {
            let (completed, total) = stage.subconcepts().fold((0, 0), |(done, all), sub| {
                (done + usize::from(sub.is_completed()), all + 1)
            });
            StageProgress {
                stage_id: stage.id().clone(),
                completed_subconcepts: completed,
                total_subconcepts: total,
                is_completed: stage.is_completed(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attempt, Stage, Subconcept, Unit};

    fn scored(score: f64) -> Attempt {
        Attempt {
            score: Some(score),
            ..Attempt::default()
        }
    }

    fn sample_tree() -> ProgressTree {
        ProgressTree::new(vec![
            Stage::new(
                "S1",
                vec![Unit::new(
                    "U1",
                    vec![
                        Subconcept::new("A")
                            .with_status("yes")
                            .with_attempts(vec![scored(40.0), scored(80.0)]),
                        Subconcept::new("B")
                            .with_status("YES")
                            .with_attempts(vec![scored(10.0)])
                            .with_best_score(60.0),
                    ],
                )],
            ),
            Stage::new(
                "S2",
                vec![Unit::new("U2", vec![Subconcept::new("C").with_status("no")])],
            ),
        ])
    }

    #[test]
    fn aggregates_attempts_scores_and_completion() {
        let stats = calculate_learner_stats(&sample_tree());
        assert_eq!(stats.total_attempts, 3);
        // A has attempts but no bestScore: (0 + 60 + 0) / 3
        assert!((stats.average_score - 20.0).abs() < 1e-9);
        assert!((stats.completion_percentage - 50.0).abs() < 1e-9);
        assert!(stats.is_well_defined());
    }

    #[test]
    fn trimming_away_the_top_attempt_keeps_the_average() {
        use crate::model::AttemptDate;
        use crate::time::fixed_now;
        use crate::trim::process_learner_progress;
        use chrono::Duration;

        let dated = |minutes: i64, score: f64| Attempt {
            attempt_date: Some(AttemptDate::from(fixed_now() + Duration::minutes(minutes))),
            score: Some(score),
            ..Attempt::default()
        };
        let mut attempts = vec![dated(0, 100.0)];
        attempts.extend((1..=5).map(|m| dated(m, 10.0)));
        let tree = ProgressTree::new(vec![Stage::new(
            "S1",
            vec![Unit::new(
                "U1",
                vec![
                    Subconcept::new("A").with_attempts(attempts.clone()),
                    Subconcept::new("B").with_attempts(attempts).with_best_score(100.0),
                ],
            )],
        )]);

        let raw = calculate_learner_stats(&tree);
        let trimmed = calculate_learner_stats(&process_learner_progress(&tree));
        assert_eq!(raw.average_score, 50.0);
        assert_eq!(trimmed.average_score, raw.average_score);
        assert_eq!(raw.total_attempts, 12);
        assert_eq!(trimmed.total_attempts, 10);
    }

    #[test]
    fn backend_stage_counters_drive_completion() {
        let mut tree = sample_tree();
        tree.total_stages = Some(4);
        tree.completed_stages = Some(3);
        let stats = calculate_learner_stats(&tree);
        assert!((stats.completion_percentage - 75.0).abs() < 1e-9);
    }

    #[test]
    fn empty_tree_is_not_masked() {
        let stats = calculate_learner_stats(&ProgressTree::default());
        assert_eq!(stats.total_attempts, 0);
        assert!(stats.average_score.is_nan());
        assert!(stats.completion_percentage.is_nan());
        assert!(!stats.is_well_defined());
    }

    #[test]
    fn stages_without_subconcepts_give_nan_average_only() {
        let tree = ProgressTree::new(vec![Stage::new("S1", Vec::new())]);
        let stats = calculate_learner_stats(&tree);
        assert!(stats.average_score.is_nan());
        assert_eq!(stats.completion_percentage, 0.0);
    }

    #[test]
    fn stage_breakdown_counts_subconcepts() {
        let progress = stage_progress(&sample_tree());
        assert_eq!(progress.len(), 2);
        assert_eq!(progress[0].completed_subconcepts, 2);
        assert_eq!(progress[0].total_subconcepts, 2);
        assert!(progress[0].is_completed);
        assert_eq!(progress[1].ratio(), 0.0);
        assert!(!progress[1].is_completed);
    }
}
