//! Review plans handed to a practice session.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{PracticaError, PracticaResult};
use crate::types::{MasteryRecord, SkillId};

/// Item counts a custom review may ask for.
pub const ALLOWED_ITEM_COUNTS: [u32; 3] = [10, 20, 30];

/// Where a review plan came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReviewKind {
    DueToday,
    ThisWeek,
    Custom,
}

/// An ordered list of skills to practice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewPlan {
    pub kind: ReviewKind,
    pub skills: Vec<SkillId>,
    pub item_count: u32,
}

impl ReviewPlan {
    /// Build a plan from a due bucket.
    pub fn from_records(kind: ReviewKind, records: &[MasteryRecord], item_count: u32) -> Self {
        Self {
            kind,
            skills: dedupe(records.iter().map(|r| r.skill_id.clone())),
            item_count,
        }
    }

    /// Build a custom plan from a learner's selection.
    ///
    /// Rejects an empty selection and item counts other than 10, 20 or 30.
    /// Duplicate skills are dropped, keeping the first occurrence.
    pub fn custom<I, S>(selection: I, item_count: u32) -> PracticaResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<SkillId>,
    {
        let skills = dedupe(selection.into_iter().map(Into::into));
        if skills.is_empty() {
            return Err(PracticaError::empty_selection());
        }
        if !ALLOWED_ITEM_COUNTS.contains(&item_count) {
            return Err(PracticaError::invalid_item_count(item_count));
        }

        Ok(Self {
            kind: ReviewKind::Custom,
            skills,
            item_count,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

fn dedupe(skills: impl Iterator<Item = SkillId>) -> Vec<SkillId> {
    let mut out: Vec<SkillId> = Vec::new();
    for skill in skills {
        if !out.contains(&skill) {
            out.push(skill);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_custom_keeps_order_and_drops_duplicates() {
        let plan = ReviewPlan::custom(["6.8B", "6.2", "6.8B", "6.4"], 20).unwrap();
        assert_eq!(plan.kind, ReviewKind::Custom);
        assert_eq!(plan.skills, vec!["6.8B", "6.2", "6.4"]);
        assert_eq!(plan.item_count, 20);
    }

    #[test]
    fn test_custom_rejects_empty_selection() {
        let err = ReviewPlan::custom(Vec::<String>::new(), 10).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValEmptySelection);
    }

    #[test]
    fn test_custom_rejects_odd_item_count() {
        let err = ReviewPlan::custom(["6.2"], 15).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValInvalidItemCount);
        for count in ALLOWED_ITEM_COUNTS {
            assert!(ReviewPlan::custom(["6.2"], count).is_ok());
        }
    }

    #[test]
    fn test_kind_strings() {
        assert_eq!(ReviewKind::DueToday.to_string(), "due_today");
        assert_eq!(
            serde_json::to_string(&ReviewKind::ThisWeek).unwrap(),
            "\"this_week\""
        );
    }
}
