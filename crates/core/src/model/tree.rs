use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::ModelError;
use crate::model::{ActivityKind, Attempt, LearnerId, StageId, SubconceptId, UnitId};

/// The only completion status that counts as done (compared case-insensitively).
pub const COMPLETED_STATUS: &str = "yes";

/// Returns true when a raw completion status means "completed".
///
/// Absent statuses count as not completed.
#[must_use]
pub fn is_completed_status(status: Option<&str>) -> bool {
    status.is_some_and(|s| s.to_lowercase() == COMPLETED_STATUS)
}

/// Missing and `null` child collections both decode as empty.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

//
// ─── SUBCONCEPT ────────────────────────────────────────────────────────────────
//

/// Smallest unit of learning content, with its own status and attempt history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subconcept {
    pub subconcept_id: SubconceptId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subconcept_desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subconcept_type: Option<ActivityKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subconcept_maxscore: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_status: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub attempts: Vec<Attempt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_score: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Subconcept {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            subconcept_id: SubconceptId::new(id),
            subconcept_desc: None,
            subconcept_type: None,
            subconcept_maxscore: None,
            completion_status: None,
            attempts: Vec::new(),
            best_score: None,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.completion_status = Some(status.into());
        self
    }

    #[must_use]
    pub fn with_attempts(mut self, attempts: Vec<Attempt>) -> Self {
        self.attempts = attempts;
        self
    }

    #[must_use]
    pub fn with_best_score(mut self, score: f64) -> Self {
        self.best_score = Some(score);
        self
    }

    #[must_use]
    pub fn id(&self) -> &SubconceptId {
        &self.subconcept_id
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        is_completed_status(self.completion_status.as_deref())
    }
}

//
// ─── UNIT ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub unit_id: UnitId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_status: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subconcepts: Vec<Subconcept>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Unit {
    #[must_use]
    pub fn new(id: impl Into<String>, subconcepts: Vec<Subconcept>) -> Self {
        Self {
            unit_id: UnitId::new(id),
            unit_name: None,
            completion_status: None,
            subconcepts,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &UnitId {
        &self.unit_id
    }
}

//
// ─── STAGE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub stage_id: StageId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_status: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub units: Vec<Unit>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Stage {
    #[must_use]
    pub fn new(id: impl Into<String>, units: Vec<Unit>) -> Self {
        Self {
            stage_id: StageId::new(id),
            stage_name: None,
            completion_status: None,
            units,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.completion_status = Some(status.into());
        self
    }

    #[must_use]
    pub fn id(&self) -> &StageId {
        &self.stage_id
    }

    pub fn subconcepts(&self) -> impl Iterator<Item = &Subconcept> {
        self.units.iter().flat_map(|u| u.subconcepts.iter())
    }

    /// A stage's own status wins. Without one, the stage is completed when it
    /// has content and every subconcept in it is completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        match self.completion_status.as_deref() {
            Some(status) => is_completed_status(Some(status)),
            None => {
                let mut subs = self.subconcepts().peekable();
                subs.peek().is_some() && subs.all(Subconcept::is_completed)
            }
        }
    }
}

//
// ─── PROGRESS TREE ─────────────────────────────────────────────────────────────
//

/// A learner's full progress document: stages → units → subconcepts → attempts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressTree {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<LearnerId>,
    /// Backend-reported counter; derived from `stages` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_stages: Option<u32>,
    /// Backend-reported counter; derived from `stages` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_stages: Option<u32>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub stages: Vec<Stage>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProgressTree {
    #[must_use]
    pub fn new(stages: Vec<Stage>) -> Self {
        Self {
            stages,
            ..Self::default()
        }
    }

    /// Decode a progress document.
    ///
    /// Both the full object form and a bare array of stages are accepted.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::Json` if the text is not a progress document.
    pub fn from_json(text: &str) -> Result<Self, ModelError> {
        let value: Value = serde_json::from_str(text)?;
        if value.is_array() {
            let stages: Vec<Stage> = serde_json::from_value(value)?;
            return Ok(Self::new(stages));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Stage count used as the completion denominator.
    #[must_use]
    pub fn total_stage_count(&self) -> u32 {
        self.total_stages
            .unwrap_or_else(|| u32::try_from(self.stages.len()).unwrap_or(u32::MAX))
    }

    /// Completed stage count used as the completion numerator.
    #[must_use]
    pub fn completed_stage_count(&self) -> u32 {
        self.completed_stages.unwrap_or_else(|| {
            let done = self.stages.iter().filter(|s| s.is_completed()).count();
            u32::try_from(done).unwrap_or(u32::MAX)
        })
    }

    pub fn subconcepts(&self) -> impl Iterator<Item = &Subconcept> {
        self.stages.iter().flat_map(|s| s.subconcepts())
    }

    #[must_use]
    pub fn contains_subconcept(&self, id: &SubconceptId) -> bool {
        self.subconcepts().any(|s| s.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_comparison_ignores_case() {
        assert!(is_completed_status(Some("YES")));
        assert!(is_completed_status(Some("Yes")));
        assert!(!is_completed_status(Some("no")));
        assert!(!is_completed_status(Some(" yes")));
        assert!(!is_completed_status(None));
    }

    #[test]
    fn missing_and_null_collections_decode_as_empty() {
        let json = r#"{"stages":[{"stageId":"S1"},{"stageId":"S2","units":null},
            {"stageId":"S3","units":[{"unitId":"U1","subconcepts":null}]}]}"#;
        let tree = ProgressTree::from_json(json).unwrap();
        assert_eq!(tree.stages.len(), 3);
        assert!(tree.stages[0].units.is_empty());
        assert!(tree.stages[1].units.is_empty());
        assert!(tree.stages[2].units[0].subconcepts.is_empty());
    }

    #[test]
    fn accepts_bare_stage_array() {
        let json = r#"[{"stageId":1,"units":[{"unitId":2,"subconcepts":[{"subconceptId":3}]}]}]"#;
        let tree = ProgressTree::from_json(json).unwrap();
        assert_eq!(tree.stages[0].units[0].subconcepts[0].id().as_str(), "3");
    }

    #[test]
    fn rejects_non_documents() {
        let err = ProgressTree::from_json("\"hello\"").unwrap_err();
        assert!(matches!(err, ModelError::Json(_)));
    }

    #[test]
    fn nested_decode_errors_name_the_bad_field() {
        let json = r#"{"stages":[{"stageId":"S1","units":[{"unitId":"U1",
            "subconcepts":[{"subconceptId":"A","attempts":"oops"}]}]}]}"#;
        let message = ProgressTree::from_json(json).unwrap_err().to_string();
        assert!(message.contains("invalid type"), "{message}");
        assert!(!message.contains("did not match any variant"), "{message}");

        let bare = r#"[{"stageId":"S1","units":[{"unitId":"U1","subconcepts":[{"subconceptId":"A","bestScore":"high"}]}]}]"#;
        let message = ProgressTree::from_json(bare).unwrap_err().to_string();
        assert!(message.contains("invalid type"), "{message}");
    }

    #[test]
    fn stage_completion_uses_own_status_first() {
        let stage = Stage::new("S", vec![Unit::new("U", vec![Subconcept::new("A")])])
            .with_status("Yes");
        assert!(stage.is_completed());
    }

    #[test]
    fn stage_completion_derived_from_subconcepts() {
        let done = Stage::new(
            "S1",
            vec![Unit::new(
                "U",
                vec![
                    Subconcept::new("A").with_status("yes"),
                    Subconcept::new("B").with_status("YES"),
                ],
            )],
        );
        let partial = Stage::new(
            "S2",
            vec![Unit::new(
                "U",
                vec![Subconcept::new("A").with_status("yes"), Subconcept::new("B")],
            )],
        );
        let empty = Stage::new("S3", vec![Unit::new("U", Vec::new())]);

        assert!(done.is_completed());
        assert!(!partial.is_completed());
        assert!(!empty.is_completed());
    }

    #[test]
    fn backend_counters_take_precedence() {
        let mut tree = ProgressTree::new(vec![Stage::new("S1", Vec::new()).with_status("yes")]);
        assert_eq!(tree.total_stage_count(), 1);
        assert_eq!(tree.completed_stage_count(), 1);

        tree.total_stages = Some(4);
        tree.completed_stages = Some(3);
        assert_eq!(tree.total_stage_count(), 4);
        assert_eq!(tree.completed_stage_count(), 3);
    }
}
