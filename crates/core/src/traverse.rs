//! Document-order walk over a stage forest.

use serde::Serialize;

use crate::model::{Stage, StageId, Subconcept, SubconceptId, Unit, UnitId};

/// A subconcept together with the unit and stage that contain it.
///
/// Borrowed from the forest it was found in, so it can never point into a
/// different tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubconceptRef<'a> {
    pub stage: &'a Stage,
    pub unit: &'a Unit,
    pub subconcept: &'a Subconcept,
}

impl SubconceptRef<'_> {
    /// Owned copy of the three identifiers.
    #[must_use]
    pub fn to_point(&self) -> ResumePoint {
        ResumePoint {
            stage_id: self.stage.id().clone(),
            unit_id: self.unit.id().clone(),
            subconcept_id: self.subconcept.id().clone(),
        }
    }
}

/// Identifier-only form of a located subconcept, for navigation and storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumePoint {
    pub stage_id: StageId,
    pub unit_id: UnitId,
    pub subconcept_id: SubconceptId,
}

/// Yields every `(stage, unit, subconcept)` triple in document order.
///
/// Lazy: callers taking the first match stop the walk there.
pub fn walk(stages: &[Stage]) -> impl Iterator<Item = SubconceptRef<'_>> {
    stages.iter().flat_map(|stage| {
        stage.units.iter().flat_map(move |unit| {
            unit.subconcepts.iter().map(move |subconcept| SubconceptRef {
                stage,
                unit,
                subconcept,
            })
        })
    })
}
