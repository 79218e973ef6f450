mod activity;
mod attempt;
mod ids;
mod tree;

pub use activity::ActivityKind;
pub use attempt::{Attempt, AttemptDate};
pub use ids::{LearnerId, StageId, SubconceptId, UnitId};
pub use tree::{COMPLETED_STATUS, ProgressTree, Stage, Subconcept, Unit, is_completed_status};
