//! Learner sign-in and the per-learner object graph.
//!
//! A [`LearnerContext`] is created at sign-in and owns everything scoped to
//! one learner: the mastery store, the review scheduler and at most one
//! practice session. Signing out disposes the session and clears the
//! learner's records.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

use crate::config::PracticaConfig;
use crate::error::PracticaResult;
use crate::mastery::{MasteryDb, MasteryRule, MasteryStore};
use crate::progress::ProgressSummary;
use crate::review::ReviewScheduler;
use crate::session::PracticeSession;
use crate::traits::{Clock, ItemBank};
use crate::types::{MasteryLevel, SkillCatalog};

const USER_ID_PREFIX: &str = "u_";
const USER_ID_LEN: usize = 8;
const USER_ID_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// A signed-in learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Learner {
    pub user_id: String,
    pub display_name: String,
    pub signed_in_at: DateTime<Utc>,
}

impl Learner {
    /// Sign in with a freshly generated user id.
    pub fn sign_in(display_name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: generate_user_id(),
            display_name: display_name.into(),
            signed_in_at: now,
        }
    }
}

/// Generate a user id of the form `u_` followed by 8 lowercase
/// alphanumerics.
pub fn generate_user_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..USER_ID_LEN)
        .map(|_| USER_ID_CHARSET[rng.gen_range(0..USER_ID_CHARSET.len())] as char)
        .collect();
    format!("{}{}", USER_ID_PREFIX, suffix)
}

/// Everything scoped to one signed-in learner.
pub struct LearnerContext {
    learner: Learner,
    store: Arc<MasteryStore>,
    scheduler: ReviewScheduler,
    bank: Arc<dyn ItemBank>,
    clock: Arc<dyn Clock>,
    config: PracticaConfig,
    session: Mutex<Option<Arc<PracticeSession>>>,
}

impl LearnerContext {
    /// Open the learner's store on `db` and wire up the scheduler.
    pub fn open(
        db: &MasteryDb,
        learner: Learner,
        bank: Arc<dyn ItemBank>,
        clock: Arc<dyn Clock>,
        config: PracticaConfig,
    ) -> Self {
        let rule = MasteryRule::from_config(&config.mastery);
        let store = Arc::new(db.store(learner.user_id.clone(), rule));
        let scheduler = ReviewScheduler::with_config(store.clone(), &config.review);

        info!(user_id = %learner.user_id, "Learner signed in");

        Self {
            learner,
            store,
            scheduler,
            bank,
            clock,
            config,
            session: Mutex::new(None),
        }
    }

    pub fn learner(&self) -> &Learner {
        &self.learner
    }

    pub fn store(&self) -> &Arc<MasteryStore> {
        &self.store
    }

    pub fn scheduler(&self) -> &ReviewScheduler {
        &self.scheduler
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// The active practice session, created on first use.
    ///
    /// A disposed session is replaced by a fresh one.
    pub fn session(&self) -> Arc<PracticeSession> {
        let mut slot = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(session) = slot.as_ref().filter(|s| !s.is_disposed()) {
            return session.clone();
        }

        let session = Arc::new(PracticeSession::with_clock(
            self.bank.clone(),
            self.store.clone(),
            self.clock.clone(),
            self.config.session.clone(),
        ));
        *slot = Some(session.clone());
        session
    }

    /// The active session without creating one.
    pub fn active_session(&self) -> Option<Arc<PracticeSession>> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(|s| !s.is_disposed())
    }

    /// Dispose the active session, if any.
    pub async fn end_session(&self) {
        let session = self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(session) = session {
            session.dispose().await;
        }
    }

    /// Progress summary over the skills of `catalog`.
    pub fn progress(&self, catalog: &SkillCatalog) -> PracticaResult<ProgressSummary> {
        let records = self.store.records()?;
        Ok(ProgressSummary::build(
            &records,
            catalog,
            &self.config.mastery.thresholds,
            self.clock.now(),
        ))
    }

    /// Mastery level of one skill.
    pub fn level(&self, skill_id: &str) -> PracticaResult<MasteryLevel> {
        let record = self.store.get(skill_id)?;
        Ok(self.config.mastery.thresholds.level(record.as_ref()))
    }

    /// Sign out: dispose the session and delete every mastery record.
    ///
    /// Returns the number of records removed.
    pub async fn sign_out(&self) -> PracticaResult<usize> {
        self.end_session().await;
        let removed = self.store.reset()?;
        info!(user_id = %self.learner.user_id, removed, "Learner signed out");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::OfflineItemBank;
    use crate::traits::ManualClock;

    fn context(db: &MasteryDb) -> LearnerContext {
        LearnerContext::open(
            db,
            Learner::sign_in("Ada", Utc::now()),
            Arc::new(OfflineItemBank::new()),
            Arc::new(ManualClock::new(Utc::now())),
            PracticaConfig::default(),
        )
    }

    #[test]
    fn test_user_id_shape() {
        for _ in 0..50 {
            let id = generate_user_id();
            assert_eq!(id.len(), 10);
            assert!(id.starts_with("u_"));
            assert!(id[2..]
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn test_session_is_reused_until_disposed() {
        let db = MasteryDb::in_memory().unwrap();
        let ctx = context(&db);

        let a = ctx.session();
        let b = ctx.session();
        assert!(Arc::ptr_eq(&a, &b));

        ctx.end_session().await;
        assert!(a.is_disposed());
        assert!(ctx.active_session().is_none());

        let c = ctx.session();
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[tokio::test]
    async fn test_sign_out_clears_records() {
        let db = MasteryDb::in_memory().unwrap();
        let ctx = context(&db);
        let now = ctx.now();

        ctx.store().record_attempt("6.2", true, now).unwrap();
        ctx.store().record_attempt("6.4", false, now).unwrap();
        assert_eq!(ctx.level("6.2").unwrap(), MasteryLevel::Struggling);
        assert_eq!(ctx.level("6.9A").unwrap(), MasteryLevel::NotStarted);

        let session = ctx.session();
        let store = ctx.store().clone();
        assert_eq!(ctx.sign_out().await.unwrap(), 2);

        assert!(session.is_disposed());
        assert_eq!(store.count().unwrap(), 0);
    }
}
