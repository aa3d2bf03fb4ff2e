//! Attempt, grading and feedback types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A learner's response as sent to the item bank for grading.
///
/// Serialized untagged: a JSON number for numeric items, an array of option
/// identifiers for multiple-choice items. Numeric input that does not parse
/// as a number is forwarded verbatim as a string so the grader can reject it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Number(f64),
    Options(BTreeSet<String>),
    Text(String),
}

impl Response {
    /// Build a numeric response from raw learner input.
    pub fn from_input(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Self::Number(value),
            _ => Self::Text(trimmed.to_string()),
        }
    }

    /// The numeric value, if this is a numeric response.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }
}

/// Payload sent to the item bank for grading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRequest {
    pub item_id: String,
    pub response: Response,
    pub used_hint: bool,
    /// Time on item in milliseconds. Not tracked by the engine, always 0.
    #[serde(default)]
    pub time_ms: u64,
}

impl GradeRequest {
    pub fn new(item_id: impl Into<String>, response: Response, used_hint: bool) -> Self {
        Self {
            item_id: item_id.into(),
            response,
            used_hint,
            time_ms: 0,
        }
    }
}

/// The item bank's verdict on a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeOutcome {
    pub correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_code: Option<String>,
}

impl GradeOutcome {
    pub fn correct() -> Self {
        Self {
            correct: true,
            feedback_code: None,
        }
    }

    pub fn incorrect() -> Self {
        Self {
            correct: false,
            feedback_code: None,
        }
    }

    pub fn with_feedback(mut self, code: impl Into<String>) -> Self {
        self.feedback_code = Some(code.into());
        self
    }
}

/// Result of one graded submission as shown to the learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptResult {
    pub correct: bool,
    /// Signed change applied to the mastery score before clamping.
    pub mastery_delta: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_code: Option<String>,
}
