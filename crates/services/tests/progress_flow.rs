use std::sync::Arc;

use progress_core::model::{Attempt, LearnerId, ProgressTree, Stage, Subconcept, SubconceptId, Unit};
use progress_core::time::fixed_now;
use progress_core::{MAX_RECENT_ATTEMPTS, ResumeReason};
use services::{
    Clock, ProgressService, ProgressServiceError, RankKey, StaticProgressSource,
};
use storage::repository::{InMemoryRepository, LastViewedRepository, StorageError};

fn course(done: &[bool]) -> ProgressTree {
    let subconcepts = done
        .iter()
        .enumerate()
        .map(|(i, finished)| {
            let attempts = (0..8)
                .map(|m| Attempt::new(fixed_now() + chrono::Duration::minutes(m), Some(10.0 * i as f64)))
                .collect();
            let sub = Subconcept::new(format!("sc-{i}"))
                .with_attempts(attempts)
                .with_best_score(10.0 * i as f64);
            if *finished { sub.with_status("yes") } else { sub }
        })
        .collect();
    ProgressTree::new(vec![Stage::new("S1", vec![Unit::new("U1", subconcepts)])])
}

fn service(source: StaticProgressSource, repo: &InMemoryRepository) -> ProgressService {
    ProgressService::new(Clock::fixed(fixed_now()), Arc::new(source), Arc::new(repo.clone()))
}

#[tokio::test]
async fn report_trims_aggregates_and_resolves() {
    let repo = InMemoryRepository::new();
    let svc = service(StaticProgressSource::single(course(&[true, false, false])), &repo);
    let learner = LearnerId::new("learner-1");

    let report = svc.load_report(&learner).await.unwrap();
    assert_eq!(report.stats.total_attempts, 3 * MAX_RECENT_ATTEMPTS);
    assert!((report.stats.average_score - 10.0).abs() < 1e-9);
    assert_eq!(report.stats.completion_percentage, 0.0);
    assert_eq!(report.stages[0].completed_subconcepts, 1);

    let resume = report.resume.unwrap();
    assert_eq!(resume.point.subconcept_id, SubconceptId::new("sc-1"));
    assert_eq!(resume.reason, ResumeReason::FirstIncomplete);
}

#[tokio::test]
async fn recorded_view_drives_resume_until_forgotten() {
    let repo = InMemoryRepository::new();
    let svc = service(StaticProgressSource::single(course(&[true, false, true])), &repo);
    let learner = LearnerId::new("learner-1");

    let record = svc
        .record_view(&learner, &SubconceptId::new("sc-2"))
        .await
        .unwrap();
    assert_eq!(record.viewed_at, fixed_now());

    let resume = svc.resume_point(&learner).await.unwrap().unwrap();
    assert_eq!(resume.point.subconcept_id, SubconceptId::new("sc-2"));
    assert_eq!(resume.reason, ResumeReason::LastViewed);

    svc.forget_view(&learner).await.unwrap();
    let resume = svc.resume_point(&learner).await.unwrap().unwrap();
    assert_eq!(resume.point.subconcept_id, SubconceptId::new("sc-1"));

    let err = svc.forget_view(&learner).await.unwrap_err();
    assert!(matches!(err, ProgressServiceError::Storage(StorageError::NotFound)));
}

#[tokio::test]
async fn views_outside_the_course_are_rejected() {
    let repo = InMemoryRepository::new();
    let svc = service(StaticProgressSource::single(course(&[false])), &repo);
    let learner = LearnerId::new("learner-1");

    let err = svc
        .record_view(&learner, &SubconceptId::new("elsewhere"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProgressServiceError::UnknownSubconcept { .. }));
    assert!(repo.get_last_viewed(&learner).await.unwrap().is_none());
}

#[tokio::test]
async fn empty_course_has_no_resume_and_undefined_stats() {
    let repo = InMemoryRepository::new();
    let svc = service(StaticProgressSource::single(ProgressTree::default()), &repo);

    let report = svc.load_report(&LearnerId::new("new")).await.unwrap();
    assert!(report.resume.is_none());
    assert!(!report.stats.is_well_defined());
}

#[tokio::test]
async fn dashboard_ranks_learners() {
    let repo = InMemoryRepository::new();
    let source = StaticProgressSource::new()
        .with_tree(LearnerId::new("ann"), course(&[true, true]))
        .with_tree(LearnerId::new("bob"), course(&[true]))
        .with_tree(LearnerId::new("cat"), ProgressTree::default());
    let svc = service(source, &repo);

    let learners = [LearnerId::new("bob"), LearnerId::new("cat"), LearnerId::new("ann")];
    let rows = svc.dashboard(&learners, RankKey::AverageScore).await.unwrap();
    let order: Vec<&str> = rows.iter().map(|r| r.learner_id.as_str()).collect();
    // ann averages 5, bob 0, cat has no subconcepts (NaN)
    assert_eq!(order, vec!["ann", "bob", "cat"]);
}

#[tokio::test]
async fn dashboard_stops_at_unknown_learner() {
    let repo = InMemoryRepository::new();
    let svc = service(StaticProgressSource::new(), &repo);
    let err = svc
        .dashboard(&[LearnerId::new("ghost")], RankKey::Completion)
        .await
        .unwrap_err();
    assert!(matches!(err, ProgressServiceError::Source(_)));
}
