//! The practice session controller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, MutexGuard as AsyncMutexGuard};
use tracing::{debug, info, warn};

use super::advance::AdvanceHandle;
use super::state::{SessionCore, SessionSnapshot, SessionState, SubmitOutcome};
use crate::config::SessionConfig;
use crate::error::{PracticaError, PracticaResult};
use crate::mastery::MasteryStore;
use crate::review::ReviewPlan;
use crate::traits::{Clock, ItemBank, SystemClock};
use crate::types::{AttemptResult, GradeRequest, Item, ItemKind, SkillId};

/// Drives item delivery, response capture, grading and auto-advance for
/// one learner.
///
/// All operations on a session are serialized by an internal lock. Item
/// fetches run outside the lock and are tagged with an epoch: a fetch that
/// was superseded by a retarget or disposal is discarded when it returns.
/// Grading runs under the lock, so submissions are strictly sequential.
///
/// After a correct answer the session schedules a reload of the same skill
/// once the configured delay has elapsed. Retargeting, starting a review,
/// moving to the next skill, disposing or dropping the session cancels it.
pub struct PracticeSession {
    inner: Arc<Inner>,
}

struct Inner {
    core: AsyncMutex<SessionCore>,
    bank: Arc<dyn ItemBank>,
    store: Arc<MasteryStore>,
    clock: Arc<dyn Clock>,
    config: SessionConfig,
    advance: Mutex<Option<AdvanceHandle>>,
    disposed: AtomicBool,
}

impl PracticeSession {
    /// Create a session using the system clock.
    pub fn new(bank: Arc<dyn ItemBank>, store: Arc<MasteryStore>, config: SessionConfig) -> Self {
        Self::with_clock(bank, store, Arc::new(SystemClock), config)
    }

    /// Create a session with an explicit clock.
    pub fn with_clock(
        bank: Arc<dyn ItemBank>,
        store: Arc<MasteryStore>,
        clock: Arc<dyn Clock>,
        config: SessionConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                core: AsyncMutex::new(SessionCore::default()),
                bank,
                store,
                clock,
                config,
                advance: Mutex::new(None),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    /// Make sure an item for `target` is presented, loading one if there is
    /// no current item or the target changed.
    ///
    /// Changing the target cancels a pending auto-advance.
    pub async fn ensure_item(&self, target: Option<&str>) -> PracticaResult<SessionSnapshot> {
        let (epoch, target) = {
            let mut core = self.inner.lock_live().await?;
            if !core.needs_load(target) {
                if let Some(t) = target {
                    core.target = Some(t.to_string());
                }
                return Ok(core.snapshot(self.inner.advance_pending()));
            }

            self.inner.cancel_advance();
            let target = target.map(str::to_string);
            (core.begin_load(target.clone()), target)
        };

        self.inner.fetch(epoch, target).await?;
        Ok(self.snapshot().await)
    }

    /// Load a fresh item for `target` unconditionally.
    ///
    /// Any in-flight fetch is superseded and a pending auto-advance is
    /// cancelled.
    pub async fn retarget(&self, target: Option<&str>) -> PracticaResult<SessionSnapshot> {
        let (epoch, target) = {
            let mut core = self.inner.lock_live().await?;
            self.inner.cancel_advance();
            let target = target.map(str::to_string);
            (core.begin_load(target.clone()), target)
        };

        self.inner.fetch(epoch, target).await?;
        Ok(self.snapshot().await)
    }

    /// Seed the skill queue from a review plan and load its first skill.
    pub async fn start_review(&self, plan: ReviewPlan) -> PracticaResult<SessionSnapshot> {
        if plan.is_empty() {
            return Err(PracticaError::validation_with_suggestion(
                "Review plan has no skills",
                "Nothing is due yet; try a custom review",
            ));
        }

        let (epoch, head) = {
            let mut core = self.inner.lock_live().await?;
            self.inner.cancel_advance();
            core.queue = plan.skills.iter().cloned().collect();
            let head = core.queue.front().cloned();
            info!(kind = %plan.kind, skills = plan.skills.len(), items = plan.item_count, "Starting review");
            core.review = Some(plan);
            (core.begin_load(head.clone()), head)
        };

        self.inner.fetch(epoch, head).await?;
        Ok(self.snapshot().await)
    }

    /// Move to the next skill of the review queue.
    ///
    /// Returns the new target, or `None` when the queue is exhausted. The
    /// current item stays presented once the review is over.
    pub async fn next_skill(&self) -> PracticaResult<Option<SkillId>> {
        let (epoch, head) = {
            let mut core = self.inner.lock_live().await?;
            core.queue.pop_front();
            let Some(head) = core.queue.front().cloned() else {
                if core.review.take().is_some() {
                    info!("Review finished");
                }
                return Ok(None);
            };

            self.inner.cancel_advance();
            (core.begin_load(Some(head.clone())), head)
        };

        self.inner.fetch(epoch, Some(head.clone())).await?;
        Ok(Some(head))
    }

    /// Replace the numeric response text.
    pub async fn set_response_text(&self, text: impl Into<String>) -> PracticaResult<()> {
        let mut core = self.inner.lock_live().await?;
        let kind = interactive_kind(&core)?;
        if kind != ItemKind::Numeric {
            return Err(PracticaError::validation(
                "Multiple-choice items take selected options, not text",
            ));
        }
        core.response_text = text.into();
        Ok(())
    }

    /// Toggle an option of a multiple-choice item. Returns whether the
    /// option is selected afterwards.
    pub async fn toggle_option(&self, option_id: &str) -> PracticaResult<bool> {
        let mut core = self.inner.lock_live().await?;
        check_options(&core, [option_id])?;

        if core.selected.remove(option_id) {
            Ok(false)
        } else {
            core.selected.insert(option_id.to_string());
            Ok(true)
        }
    }

    /// Replace the whole option selection of a multiple-choice item.
    pub async fn set_selection<I, S>(&self, option_ids: I) -> PracticaResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = option_ids.into_iter().map(Into::into).collect();
        let mut core = self.inner.lock_live().await?;
        check_options(&core, ids.iter().map(String::as_str))?;
        core.selected = ids.into_iter().collect();
        Ok(())
    }

    /// Whether the current response could be submitted.
    pub async fn can_submit(&self) -> bool {
        self.inner.core.lock().await.can_submit()
    }

    /// Reveal the hints of the current item and mark the hint as used.
    pub async fn hints(&self) -> PracticaResult<Vec<String>> {
        let mut core = self.inner.lock_live().await?;
        interactive_kind(&core)?;
        core.hint_used = true;

        let hints = core
            .item
            .as_ref()
            .map(|item| item.visible_hints(self.inner.config.max_hints).to_vec())
            .unwrap_or_default();
        debug!(count = hints.len(), "Hints revealed");
        Ok(hints)
    }

    /// Submit the current response for grading.
    ///
    /// An invalid response is rejected without contacting the item bank.
    /// Otherwise the response is graded, the attempt recorded against the
    /// item's skill, and on a correct answer the auto-advance scheduled.
    pub async fn submit(&self) -> PracticaResult<SubmitOutcome> {
        let mut core = self.inner.lock_live().await?;

        let (item_id, skill_id, response) = match core.response() {
            Ok((item, response)) => (item.id.clone(), item.skill_id.clone(), response),
            Err(reason) => {
                debug!(%reason, "Submission rejected");
                return Ok(SubmitOutcome::Rejected(reason));
            }
        };

        let request = GradeRequest::new(item_id, response, core.hint_used);
        let outcome = self.inner.bank.grade(&request).await?;

        let now = self.inner.clock.now();
        let record = self
            .inner
            .store
            .record_attempt(&skill_id, outcome.correct, now)?;

        let result = AttemptResult {
            correct: outcome.correct,
            mastery_delta: self.inner.store.rule().delta(outcome.correct),
            feedback_code: outcome.feedback_code,
        };
        debug!(
            item_id = %request.item_id,
            skill = %skill_id,
            correct = result.correct,
            score = record.score,
            "Graded submission"
        );

        core.last_result = Some(result.clone());
        core.state = SessionState::Graded;

        if result.correct && !self.is_disposed() {
            self.schedule_advance(core.epoch);
        }

        Ok(SubmitOutcome::Graded(result))
    }

    /// Tear the session down.
    ///
    /// Cancels the pending auto-advance, discards any in-flight fetch and
    /// clears all state. Further operations fail with a session error.
    pub async fn dispose(&self) {
        if self.inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.cancel_advance();

        let mut core = self.inner.core.lock().await;
        core.clear();
        info!(user_id = %self.inner.store.user_id(), "Practice session disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }

    /// Current state.
    pub async fn state(&self) -> SessionState {
        self.inner.core.lock().await.state
    }

    /// The presented item, if any.
    pub async fn current_item(&self) -> Option<Item> {
        self.inner.core.lock().await.item.clone()
    }

    /// Result of the last graded submission for the current item.
    pub async fn last_result(&self) -> Option<AttemptResult> {
        self.inner.core.lock().await.last_result.clone()
    }

    /// Serializable view of the whole session.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let core = self.inner.core.lock().await;
        core.snapshot(self.inner.advance_pending())
    }

    fn schedule_advance(&self, epoch: u64) {
        let weak = Arc::downgrade(&self.inner);
        let delay = self.inner.config.auto_advance_delay();
        debug!(delay_ms = delay.as_millis() as u64, "Scheduling auto-advance");

        let handle = AdvanceHandle::spawn(delay, async move {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if let Err(e) = inner.advance(epoch).await {
                warn!(error = %e, "Auto-advance failed");
            }
        });

        // Replacing the slot drops, and so aborts, an older handle
        *self.inner.advance_slot() = Some(handle);
    }
}

impl Drop for PracticeSession {
    fn drop(&mut self) {
        self.inner.disposed.store(true, Ordering::SeqCst);
        self.inner.cancel_advance();
    }
}

impl Inner {
    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    async fn lock_live(&self) -> PracticaResult<AsyncMutexGuard<'_, SessionCore>> {
        if self.is_disposed() {
            return Err(PracticaError::session_disposed());
        }
        let core = self.core.lock().await;
        if self.is_disposed() {
            return Err(PracticaError::session_disposed());
        }
        Ok(core)
    }

    fn advance_slot(&self) -> MutexGuard<'_, Option<AdvanceHandle>> {
        self.advance.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn advance_pending(&self) -> bool {
        self.advance_slot()
            .as_ref()
            .is_some_and(AdvanceHandle::is_pending)
    }

    fn cancel_advance(&self) {
        if let Some(handle) = self.advance_slot().take() {
            if handle.is_pending() {
                debug!("Cancelled pending auto-advance");
            }
            handle.cancel();
        }
    }

    /// Fetch an item and present it if `epoch` is still current.
    async fn fetch(&self, epoch: u64, target: Option<SkillId>) -> PracticaResult<()> {
        let fetched = self.bank.next_item(target.as_deref()).await;

        let mut core = self.core.lock().await;
        if self.is_disposed() || core.epoch != epoch {
            debug!(epoch, current = core.epoch, "Discarding superseded item");
            return Ok(());
        }

        match fetched {
            Ok(item) => {
                core.present(item);
                Ok(())
            }
            Err(e) => {
                core.abandon_load();
                Err(e)
            }
        }
    }

    /// Reload the current skill after a correct answer, unless anything
    /// happened since the answer was graded.
    async fn advance(&self, epoch: u64) -> PracticaResult<()> {
        let (load_epoch, target) = {
            let mut core = self.core.lock().await;
            if self.is_disposed() || core.epoch != epoch || core.state != SessionState::Graded {
                debug!(epoch, "Skipping stale auto-advance");
                return Ok(());
            }

            let target = core
                .target
                .clone()
                .or_else(|| core.item.as_ref().map(|item| item.skill_id.clone()));
            (core.begin_load(target.clone()), target)
        };

        self.fetch(load_epoch, target).await
    }
}

fn interactive_kind(core: &SessionCore) -> PracticaResult<ItemKind> {
    match &core.item {
        Some(item) if core.state.is_interactive() => Ok(item.kind),
        _ => Err(PracticaError::no_current_item()),
    }
}

fn check_options<'a>(
    core: &SessionCore,
    option_ids: impl IntoIterator<Item = &'a str>,
) -> PracticaResult<()> {
    if interactive_kind(core)? != ItemKind::MultipleChoice {
        return Err(PracticaError::validation(
            "Numeric items take a text response, not options",
        ));
    }

    let Some(item) = &core.item else {
        return Err(PracticaError::no_current_item());
    };
    for id in option_ids {
        if !item.has_option(id) {
            return Err(PracticaError::validation(format!(
                "Unknown option '{}' for item '{}'",
                id, item.id
            )));
        }
    }
    Ok(())
}
