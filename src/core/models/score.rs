use serde::{Deserialize, Serialize};

use super::analysis::{DetailedAnalysis, ErrorCategory};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub is_correct: bool,
    pub score: f64,
}

impl ScoreResult {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn exact(is_correct: bool) -> Self {
        Self {
            is_correct,
            score: if is_correct { 1.0 } else { 0.0 },
        }
    }

    /// Partial credit `earned / total`, clamped to `[0, 1]`. Correct only at full credit.
    pub fn partial(earned: i64, total: i64) -> Self {
        debug_assert!(total > 0);
        let earned = earned.clamp(0, total);
        Self {
            is_correct: earned == total,
            score: earned as f64 / total as f64,
        }
    }
}

/// Result of the external evaluation service for open-ended question types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub score: f64,
    pub is_correct: bool,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub detailed_analysis: Option<DetailedAnalysis>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownRow {
    pub label: String,
    pub response: Option<String>,
    pub expected: Option<String>,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Segment {
    Plain {
        text: String,
    },
    Error {
        category: ErrorCategory,
        text: String,
        correction: Option<String>,
        explanation: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: ErrorCategory,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotated {
    pub segments: Vec<Segment>,
    pub html: String,
    pub counts: Vec<CategoryCount>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub id: i32,
    #[serde(flatten)]
    pub result: ScoreResult,
    pub breakdown: Vec<BreakdownRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Annotated>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_full_credit_is_correct() {
        assert_eq!(ScoreResult::partial(3, 3), ScoreResult { is_correct: true, score: 1.0 });
        let r = ScoreResult::partial(1, 3);
        assert!(!r.is_correct);
        assert!((r.score - 0.333).abs() < 0.001);
    }

    #[test]
    fn test_partial_clamps() {
        assert_eq!(ScoreResult::partial(-2, 4), ScoreResult { is_correct: false, score: 0.0 });
        assert_eq!(ScoreResult::partial(5, 4), ScoreResult { is_correct: true, score: 1.0 });
    }
}
