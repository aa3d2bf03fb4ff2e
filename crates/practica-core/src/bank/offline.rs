//! Built-in offline item bank.

use async_trait::async_trait;

use crate::error::PracticaResult;
use crate::traits::ItemBank;
use crate::types::{AnswerForm, AnswerFormat, GradeOutcome, GradeRequest, Item, Response};

/// Identifier of the offline sample item.
pub const SAMPLE_ITEM_ID: &str = "sample-1";

/// The only answer the offline grader accepts.
pub const EXPECTED_SAMPLE_ANSWER: f64 = 48.0;

/// Deterministic item bank used when the remote bank is unreachable.
///
/// Always serves the same sample item regardless of the requested skill and
/// grades a response as correct iff it is the number 48.
#[derive(Debug, Clone, Default)]
pub struct OfflineItemBank;

impl OfflineItemBank {
    pub fn new() -> Self {
        Self
    }

    /// The fixed sample item.
    pub fn sample_item() -> Item {
        Item::numeric(SAMPLE_ITEM_ID, "6.7B", "What is $8 \\times 6$?")
            .with_seed(1)
            .with_difficulty(1)
            .with_answer_format(AnswerFormat {
                form: AnswerForm::Int,
                units: None,
            })
            .with_hints(["Think of 8 groups of 6", "Add: $6+6+6+6+6+6+6+6$"])
    }

    /// Grade a response against the sample answer.
    pub fn grade_response(response: &Response) -> GradeOutcome {
        match response.as_number() {
            Some(value) if value == EXPECTED_SAMPLE_ANSWER => GradeOutcome::correct(),
            _ => GradeOutcome::incorrect(),
        }
    }
}

#[async_trait]
impl ItemBank for OfflineItemBank {
    async fn next_item(&self, _target: Option<&str>) -> PracticaResult<Item> {
        Ok(Self::sample_item())
    }

    async fn grade(&self, request: &GradeRequest) -> PracticaResult<GradeOutcome> {
        Ok(Self::grade_response(&request.response))
    }

    fn name(&self) -> &str {
        "offline"
    }
}
