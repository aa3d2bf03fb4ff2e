//! Mastery record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::skill::SkillId;

/// A learner's mastery estimate for one skill.
///
/// Created lazily on the first graded attempt and only changed through
/// [`MasteryRule`](crate::mastery::MasteryRule).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasteryRecord {
    /// Skill this record belongs to.
    pub skill_id: SkillId,
    /// Estimated proficiency in `[0, 1]`.
    pub score: f64,
    /// Number of graded attempts.
    pub attempts: u32,
    /// When the skill was last attempted.
    pub last_seen_at: DateTime<Utc>,
    /// When the skill is next due for review.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_review_at: Option<DateTime<Utc>>,
}

impl MasteryRecord {
    /// Create a fresh record for a skill that has never been attempted.
    pub fn new(skill_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            skill_id: skill_id.into(),
            score: 0.0,
            attempts: 0,
            last_seen_at: now,
            due_review_at: None,
        }
    }

    /// Whether the record is due for review strictly before `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due_review_at.is_some_and(|due| due < now)
    }
}

/// Human-readable mastery band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MasteryLevel {
    /// No graded attempt yet.
    NotStarted,
    /// Score below the beginning threshold.
    Struggling,
    /// Score at or above the beginning threshold.
    Beginning,
    /// Score at or above the developing threshold.
    Developing,
    /// Score at the mastery threshold with enough attempts.
    Mastered,
}

/// Thresholds used to band mastery scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MasteryThresholds {
    /// Score required for `Mastered`.
    pub mastered: f64,
    /// Attempts required for `Mastered`.
    pub min_attempts: u32,
    /// Score required for `Developing`.
    pub developing: f64,
    /// Score required for `Beginning`.
    pub beginning: f64,
}

impl Default for MasteryThresholds {
    fn default() -> Self {
        Self {
            mastered: 0.83,
            min_attempts: 15,
            developing: 0.6,
            beginning: 0.3,
        }
    }
}

impl MasteryThresholds {
    /// Band an optional record.
    pub fn level(&self, record: Option<&MasteryRecord>) -> MasteryLevel {
        let Some(record) = record else {
            return MasteryLevel::NotStarted;
        };

        if record.score >= self.mastered && record.attempts >= self.min_attempts {
            MasteryLevel::Mastered
        } else if record.score >= self.developing {
            MasteryLevel::Developing
        } else if record.score >= self.beginning {
            MasteryLevel::Beginning
        } else {
            MasteryLevel::Struggling
        }
    }
}
