use tracing::warn;

use crate::iframe::{IframeScore, normalized_total, resolve_iframe_score};
use crate::model::ActivityKind;

/// Score earned by a single attempt at content of the given type.
///
/// Passive content (`video`, `youtube`, `image`, `pdf`) earns `max_score`.
/// Content that needs a human grader and unknown types earn `0`; unknown
/// types never fabricate a score. A missing `max_score` on passive content is
/// a configuration gap: it is logged and scored `0`.
#[must_use]
pub fn get_score(kind: &str, max_score: Option<f64>) -> f64 {
    let Some(kind) = ActivityKind::from_tag(kind) else {
        return 0.0;
    };

    if !kind.is_auto_scored() {
        return 0.0;
    }

    match max_score {
        Some(max) => max,
        None => {
            warn!(kind = %kind, "no max score configured for auto-scored content; scoring 0");
            0.0
        }
    }
}

/// Score and total to record for one attempt.
///
/// When the embedded frame reported a score it decides both values;
/// otherwise the type-based score is paired with the normalized total.
#[must_use]
pub fn attempt_score(
    kind: &str,
    subconcept_maxscore: Option<f64>,
    iframe_score: Option<f64>,
) -> IframeScore {
    if iframe_score.is_some() {
        return resolve_iframe_score(iframe_score, subconcept_maxscore);
    }
    IframeScore {
        score: get_score(kind, subconcept_maxscore),
        total: normalized_total(subconcept_maxscore),
    }
}
