use serde::Serialize;
use tracing::debug;

use crate::kv::{KeyValueStore, LAST_VIEWED_KEY};
use crate::model::Stage;
use crate::traverse::{SubconceptRef, walk};

/// Where a learner should land when opening the course.
pub type ResumeTarget<'a> = SubconceptRef<'a>;

/// Which rule picked the resume target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeReason {
    LastViewed,
    FirstIncomplete,
    AllCompleted,
}

/// Picks the subconcept a learner should resume at.
///
/// Rules, first match wins, each scanning in document order:
/// 1. the subconcept whose id equals `last_viewed`;
/// 2. the first subconcept not marked completed;
/// 3. the very first subconcept.
///
/// Returns `None` when there is nothing to point at.
#[must_use]
pub fn get_initial_subconcept<'a>(
    stages: &'a [Stage],
    last_viewed: Option<&str>,
) -> Option<ResumeTarget<'a>> {
    resolve_with_reason(stages, last_viewed).map(|(target, _)| target)
}

/// Same as [`get_initial_subconcept`], reading the last viewed id from `store`.
#[must_use]
pub fn resolve_from_store<'a>(
    stages: &'a [Stage],
    store: &dyn KeyValueStore,
) -> Option<ResumeTarget<'a>> {
    let last_viewed = store.get(LAST_VIEWED_KEY);
    get_initial_subconcept(stages, last_viewed.as_deref())
}

/// Resolves the target and reports which rule selected it.
#[must_use]
pub fn resolve_with_reason<'a>(
    stages: &'a [Stage],
    last_viewed: Option<&str>,
) -> Option<(ResumeTarget<'a>, ResumeReason)> {
    if let Some(id) = last_viewed {
        if let Some(found) = walk(stages).find(|r| r.subconcept.id() == id) {
            debug!(subconcept = %id, "resuming at last viewed subconcept");
            return Some((found, ResumeReason::LastViewed));
        }
        debug!(subconcept = %id, "last viewed subconcept not in this tree");
    }

    if let Some(found) = walk(stages).find(|r| !r.subconcept.is_completed()) {
        return Some((found, ResumeReason::FirstIncomplete));
    }

    walk(stages)
        .next()
        .map(|first| (first, ResumeReason::AllCompleted))
}
