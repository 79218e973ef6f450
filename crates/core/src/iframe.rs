use serde::Serialize;

/// Score pair safe to render as a fraction.
///
/// `total` is never zero or negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IframeScore {
    pub score: f64,
    pub total: f64,
}

impl IframeScore {
    /// Score as a percentage of the total. Not clamped.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        self.score / self.total * 100.0
    }
}

/// Denominator rule: the configured maximum when positive, otherwise 1.
#[must_use]
pub fn normalized_total(subconcept_maxscore: Option<f64>) -> f64 {
    match subconcept_maxscore {
        Some(max) if max > 0.0 => max,
        _ => 1.0,
    }
}

/// Reconciles a score reported by embedded content with the configured maximum.
///
/// A reported score is used as-is, including zero and negatives. An absent
/// score is read as full credit.
#[must_use]
pub fn resolve_iframe_score(iframe_score: Option<f64>, subconcept_maxscore: Option<f64>) -> IframeScore {
    let total = normalized_total(subconcept_maxscore);
    IframeScore {
        score: iframe_score.unwrap_or(total),
        total,
    }
}
