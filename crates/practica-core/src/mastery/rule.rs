//! The mastery update rule.

use chrono::{DateTime, Duration, Utc};

use crate::config::MasteryConfig;
use crate::types::MasteryRecord;

/// Fixed-step mastery update rule.
///
/// Every graded attempt moves the score by a constant step (up when
/// correct, down when not), clamps it to `[0, 1]`, bumps the attempt
/// count and pushes the next review a fixed interval past the attempt.
/// The review date moves on every attempt, correct or not.
#[derive(Debug, Clone, PartialEq)]
pub struct MasteryRule {
    correct_delta: f64,
    incorrect_delta: f64,
    review_interval: Duration,
}

impl Default for MasteryRule {
    fn default() -> Self {
        Self::from_config(&MasteryConfig::default())
    }
}

impl MasteryRule {
    /// Create a rule from configuration.
    pub fn from_config(config: &MasteryConfig) -> Self {
        Self {
            correct_delta: config.correct_delta,
            incorrect_delta: config.incorrect_delta,
            review_interval: Duration::days(config.review_interval_days),
        }
    }

    /// Signed score change for an outcome.
    pub fn delta(&self, correct: bool) -> f64 {
        if correct {
            self.correct_delta
        } else {
            self.incorrect_delta
        }
    }

    /// Interval between an attempt and its scheduled review.
    pub fn review_interval(&self) -> Duration {
        self.review_interval
    }

    /// Apply one attempt to `previous` (or to a fresh record when `None`).
    pub fn apply(
        &self,
        previous: Option<MasteryRecord>,
        skill_id: &str,
        correct: bool,
        now: DateTime<Utc>,
    ) -> MasteryRecord {
        let mut record = previous.unwrap_or_else(|| MasteryRecord::new(skill_id, now));

        record.score = (record.score + self.delta(correct)).clamp(0.0, 1.0);
        record.attempts = record.attempts.saturating_add(1);
        record.last_seen_at = now;
        record.due_review_at = Some(now + self.review_interval);

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_score(score: f64, attempts: u32, now: DateTime<Utc>) -> MasteryRecord {
        MasteryRecord {
            score,
            attempts,
            ..MasteryRecord::new("6.2", now)
        }
    }

    #[test]
    fn test_first_correct_attempt() {
        let rule = MasteryRule::default();
        let now = Utc::now();

        let rec = rule.apply(None, "6.2", true, now);

        assert!((rec.score - 0.03).abs() < 1e-12);
        assert_eq!(rec.attempts, 1);
        assert_eq!(rec.last_seen_at, now);
        assert_eq!(rec.due_review_at, Some(now + Duration::days(7)));
    }

    #[test]
    fn test_correct_saturates_at_one() {
        let rule = MasteryRule::default();
        let now = Utc::now();

        let rec = rule.apply(Some(with_score(0.99, 40, now)), "6.2", true, now);

        assert_eq!(rec.score, 1.0);
        assert_eq!(rec.attempts, 41);
    }

    #[test]
    fn test_incorrect_floors_at_zero() {
        let rule = MasteryRule::default();
        let now = Utc::now();

        let rec = rule.apply(Some(with_score(0.0, 2, now)), "6.2", false, now);

        assert_eq!(rec.score, 0.0);
        assert_eq!(rec.attempts, 3);
    }

    #[test]
    fn test_score_grid_matches_clamped_step() {
        let rule = MasteryRule::default();
        let now = Utc::now();

        for i in 0..=100 {
            let score = i as f64 / 100.0;
            for correct in [true, false] {
                let expected = (score + if correct { 0.03 } else { -0.01 }).clamp(0.0, 1.0);
                let rec = rule.apply(Some(with_score(score, 5, now)), "6.2", correct, now);
                assert!((rec.score - expected).abs() < 1e-12);
                assert!((0.0..=1.0).contains(&rec.score));
                assert_eq!(rec.attempts, 6);
            }
        }
    }

    #[test]
    fn test_incorrect_still_pushes_review_out() {
        let rule = MasteryRule::default();
        let earlier = Utc::now();
        let later = earlier + Duration::days(3);

        let first = rule.apply(None, "6.2", true, earlier);
        let second = rule.apply(Some(first), "6.2", false, later);

        assert_eq!(second.due_review_at, Some(later + Duration::days(7)));
        assert_eq!(second.last_seen_at, later);
    }

    #[test]
    fn test_custom_config() {
        let rule = MasteryRule::from_config(&MasteryConfig {
            correct_delta: 0.1,
            incorrect_delta: -0.05,
            review_interval_days: 1,
            ..Default::default()
        });
        assert_eq!(rule.delta(true), 0.1);
        assert_eq!(rule.delta(false), -0.05);
        assert_eq!(rule.review_interval(), Duration::days(1));
    }
}
