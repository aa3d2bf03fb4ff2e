//! Progress summaries built from a learner's mastery records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{MasteryLevel, MasteryRecord, MasteryThresholds, SkillCatalog, SkillId};

/// One row of a progress report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillProgress {
    pub skill_id: SkillId,
    pub title: String,
    pub score: f64,
    pub attempts: u32,
    pub level: MasteryLevel,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub due_review_at: Option<DateTime<Utc>>,
    /// Whether the skill is in the due-today bucket.
    pub due_now: bool,
}

/// Aggregate view of a learner's progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    /// Graded attempts across all skills.
    pub total_attempts: u32,
    /// Mean score over attempted skills, 0 when nothing was attempted.
    pub average_score: f64,
    pub skills_attempted: usize,
    /// Catalog skills first, in catalog order, then any other attempted skill.
    pub skills: Vec<SkillProgress>,
}

impl ProgressSummary {
    pub fn build(
        records: &[MasteryRecord],
        catalog: &SkillCatalog,
        thresholds: &MasteryThresholds,
        now: DateTime<Utc>,
    ) -> Self {
        let find = |id: &str| records.iter().find(|r| r.skill_id == id);

        let mut skills: Vec<SkillProgress> = catalog
            .iter()
            .map(|skill| row(&skill.id, &skill.title, find(&skill.id), thresholds, now))
            .collect();

        for record in records.iter().filter(|r| !catalog.contains(&r.skill_id)) {
            skills.push(row(
                &record.skill_id,
                &record.skill_id,
                Some(record),
                thresholds,
                now,
            ));
        }

        let total_attempts = records.iter().map(|r| r.attempts).sum();
        let average_score = if records.is_empty() {
            0.0
        } else {
            records.iter().map(|r| r.score).sum::<f64>() / records.len() as f64
        };

        Self {
            total_attempts,
            average_score,
            skills_attempted: records.len(),
            skills,
        }
    }

    /// Rows at a given level.
    pub fn at_level(&self, level: MasteryLevel) -> impl Iterator<Item = &SkillProgress> {
        self.skills.iter().filter(move |s| s.level == level)
    }
}

fn row(
    skill_id: &str,
    title: &str,
    record: Option<&MasteryRecord>,
    thresholds: &MasteryThresholds,
    now: DateTime<Utc>,
) -> SkillProgress {
    SkillProgress {
        skill_id: skill_id.to_string(),
        title: title.to_string(),
        score: record.map_or(0.0, |r| r.score),
        attempts: record.map_or(0, |r| r.attempts),
        level: thresholds.level(record),
        last_seen_at: record.map(|r| r.last_seen_at),
        due_review_at: record.and_then(|r| r.due_review_at),
        due_now: record.is_some_and(|r| r.is_due(now)),
    }
}
