//! Due-review queries over a learner's mastery store.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use super::plan::{ReviewKind, ReviewPlan};
use crate::config::ReviewConfig;
use crate::error::PracticaResult;
use crate::mastery::MasteryStore;
use crate::types::{MasteryRecord, SkillId};

/// Read-only query layer producing review buckets.
///
/// Buckets are flat filters over the store in the order skills were first
/// attempted. Nothing is ranked or cached, so every call reflects the
/// latest recorded attempt.
#[derive(Clone)]
pub struct ReviewScheduler {
    store: Arc<MasteryStore>,
    look_ahead: Duration,
    default_item_count: u32,
}

impl ReviewScheduler {
    pub fn new(store: Arc<MasteryStore>) -> Self {
        Self::with_config(store, &ReviewConfig::default())
    }

    pub fn with_config(store: Arc<MasteryStore>, config: &ReviewConfig) -> Self {
        Self {
            store,
            look_ahead: Duration::days(config.look_ahead_days),
            default_item_count: config.default_item_count,
        }
    }

    /// Records whose review date is strictly before `now`.
    pub fn due_today(&self, now: DateTime<Utc>) -> PracticaResult<Vec<MasteryRecord>> {
        self.due_before(now)
    }

    /// Records whose review date falls before the end of the look-ahead window.
    ///
    /// Always a superset of [`due_today`](Self::due_today) for the same `now`.
    pub fn due_this_week(&self, now: DateTime<Utc>) -> PracticaResult<Vec<MasteryRecord>> {
        self.due_before(now + self.look_ahead)
    }

    /// The selected skills as a custom review, regardless of due status.
    ///
    /// `item_count` falls back to the configured default.
    pub fn custom_set(
        &self,
        selection: &[SkillId],
        item_count: Option<u32>,
    ) -> PracticaResult<ReviewPlan> {
        ReviewPlan::custom(
            selection.iter().cloned(),
            item_count.unwrap_or(self.default_item_count),
        )
    }

    /// The due-today bucket as a plan.
    pub fn today_plan(&self, now: DateTime<Utc>) -> PracticaResult<ReviewPlan> {
        let records = self.due_today(now)?;
        Ok(ReviewPlan::from_records(
            ReviewKind::DueToday,
            &records,
            self.default_item_count,
        ))
    }

    /// The due-this-week bucket as a plan.
    pub fn week_plan(&self, now: DateTime<Utc>) -> PracticaResult<ReviewPlan> {
        let records = self.due_this_week(now)?;
        Ok(ReviewPlan::from_records(
            ReviewKind::ThisWeek,
            &records,
            self.default_item_count,
        ))
    }

    fn due_before(&self, cutoff: DateTime<Utc>) -> PracticaResult<Vec<MasteryRecord>> {
        Ok(self
            .store
            .records()?
            .into_iter()
            .filter(|r| r.is_due(cutoff))
            .collect())
    }
}
