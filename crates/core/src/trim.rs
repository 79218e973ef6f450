use std::cmp::Reverse;

use crate::model::{ProgressTree, Stage, Subconcept, Unit};

/// How many attempts per subconcept survive trimming.
pub const MAX_RECENT_ATTEMPTS: usize = 5;

/// Keep only the most recent attempts of a subconcept.
///
/// At most [`MAX_RECENT_ATTEMPTS`] are kept, newest first. Attempts with
/// equal timestamps keep their original relative order, and attempts without
/// a parseable date rank as the oldest. Subconcepts at or under the limit
/// come back unchanged.
#[must_use]
pub fn trim_attempts(subconcept: &Subconcept) -> Subconcept {
    if subconcept.attempts.len() <= MAX_RECENT_ATTEMPTS {
        return subconcept.clone();
    }

    let mut attempts = subconcept.attempts.clone();
    // Stable sort: equal timestamps keep their source order.
    attempts.sort_by_cached_key(|attempt| Reverse(attempt.timestamp()));
    attempts.truncate(MAX_RECENT_ATTEMPTS);

    Subconcept {
        attempts,
        ..subconcept.clone()
    }
}

/// Applies [`trim_attempts`] to every subconcept of the tree.
///
/// Returns a new tree; the input is left untouched.
#[must_use]
pub fn process_learner_progress(tree: &ProgressTree) -> ProgressTree {
    ProgressTree {
        stages: tree.stages.iter().map(trim_stage).collect(),
        ..tree.clone()
    }
}

fn trim_stage(stage: &Stage) -> Stage {
    Stage {
        units: stage.units.iter().map(trim_unit).collect(),
        ..stage.clone()
    }
}

fn trim_unit(unit: &Unit) -> Unit {
    Unit {
        subconcepts: unit.subconcepts.iter().map(trim_attempts).collect(),
        ..unit.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attempt, AttemptDate};
    use crate::time::fixed_now;
    use chrono::Duration;
    use proptest::prelude::*;

    fn attempt_at(minutes: i64, score: f64) -> Attempt {
        Attempt::new(fixed_now() + Duration::minutes(minutes), Some(score))
    }

    fn scores(sub: &Subconcept) -> Vec<f64> {
        sub.attempts.iter().filter_map(|a| a.score).collect()
    }

    #[test]
    fn short_histories_are_untouched() {
        let sub = Subconcept::new("A")
            .with_attempts(vec![attempt_at(3, 1.0), attempt_at(1, 2.0), attempt_at(2, 3.0)]);
        assert_eq!(trim_attempts(&sub), sub);
    }

    #[test]
    fn keeps_five_newest_in_descending_order() {
        let attempts = (0..8).map(|m| attempt_at(m, m as f64)).collect();
        let sub = Subconcept::new("A").with_attempts(attempts).with_best_score(99.0);

        let trimmed = trim_attempts(&sub);
        assert_eq!(scores(&trimmed), vec![7.0, 6.0, 5.0, 4.0, 3.0]);
        assert_eq!(trimmed.best_score, Some(99.0));
        assert_eq!(trimmed.id(), sub.id());
        assert_eq!(sub.attempts.len(), 8);
    }

    #[test]
    fn equal_timestamps_keep_source_order() {
        let attempts = vec![
            attempt_at(0, 1.0),
            attempt_at(5, 2.0),
            attempt_at(5, 3.0),
            attempt_at(5, 4.0),
            attempt_at(1, 5.0),
            attempt_at(5, 6.0),
        ];
        let trimmed = trim_attempts(&Subconcept::new("A").with_attempts(attempts));
        assert_eq!(scores(&trimmed), vec![2.0, 3.0, 4.0, 6.0, 5.0]);
    }

    #[test]
    fn undated_attempts_rank_oldest() {
        let mut attempts: Vec<Attempt> = (0..5).map(|m| attempt_at(m, m as f64)).collect();
        attempts.insert(
            0,
            Attempt {
                attempt_date: Some(AttemptDate::Text("not a date".into())),
                score: Some(100.0),
                ..Attempt::default()
            },
        );
        let trimmed = trim_attempts(&Subconcept::new("A").with_attempts(attempts));
        assert!(!scores(&trimmed).contains(&100.0));
    }

    #[test]
    fn tree_processing_touches_only_attempts() {
        let busy = Subconcept::new("busy").with_attempts((0..7).map(|m| attempt_at(m, 1.0)).collect());
        let quiet = Subconcept::new("quiet").with_status("yes");
        let mut tree = ProgressTree::new(vec![Stage::new(
            "S1",
            vec![Unit::new("U1", vec![busy, quiet.clone()])],
        )]);
        tree.completed_stages = Some(0);

        let processed = process_learner_progress(&tree);
        let subs = &processed.stages[0].units[0].subconcepts;
        assert_eq!(subs[0].attempts.len(), MAX_RECENT_ATTEMPTS);
        assert_eq!(subs[1], quiet);
        assert_eq!(processed.completed_stages, Some(0));
        assert_eq!(tree.stages[0].units[0].subconcepts[0].attempts.len(), 7);
    }

    proptest! {
        #[test]
        fn trimmed_attempts_are_the_newest(offsets in prop::collection::vec(0i64..50, 0..20)) {
            let attempts: Vec<Attempt> = offsets
                .iter()
                .enumerate()
                .map(|(i, m)| attempt_at(*m, i as f64))
                .collect();
            let sub = Subconcept::new("A").with_attempts(attempts.clone());
            let trimmed = trim_attempts(&sub);

            if attempts.len() <= MAX_RECENT_ATTEMPTS {
                prop_assert_eq!(&trimmed.attempts, &attempts);
            } else {
                prop_assert_eq!(trimmed.attempts.len(), MAX_RECENT_ATTEMPTS);
                let kept: Vec<f64> = scores(&trimmed);
                let oldest_kept = trimmed.attempts.iter().filter_map(Attempt::timestamp).min();
                for dropped in attempts.iter().filter(|a| !kept.contains(&a.score.unwrap_or(-1.0))) {
                    prop_assert!(dropped.timestamp() <= oldest_kept);
                }
                for pair in trimmed.attempts.windows(2) {
                    prop_assert!(pair[0].timestamp() >= pair[1].timestamp());
                }
            }
        }
    }
}
