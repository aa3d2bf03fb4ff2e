//! Session state and the mutable core guarded by the session lock.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};
use strum::{Display, EnumString};
use tracing::{debug, warn};

use crate::review::ReviewPlan;
use crate::types::{AttemptResult, Item, ItemKind, Response, SkillId};

/// Lifecycle state of a practice session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionState {
    /// No item requested yet, or the session was disposed.
    #[default]
    Idle,
    /// Waiting for the item bank.
    Loading,
    /// An item is shown and accepts a response.
    Presented,
    /// The last response was graded; feedback is available.
    Graded,
}

impl SessionState {
    /// Whether the learner can interact with the current item.
    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Presented | Self::Graded)
    }
}

/// Why a submission was refused without contacting the item bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RejectReason {
    /// Nothing is presented.
    NoCurrentItem,
    /// Numeric input is blank or no option is selected.
    EmptyResponse,
}

/// Result of [`PracticeSession::submit`](super::PracticeSession::submit).
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The submission was invalid; nothing changed.
    Rejected(RejectReason),
    /// The response was graded and recorded.
    Graded(AttemptResult),
}

/// Serializable view of a session. The default is an idle session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub target: Option<SkillId>,
    pub item: Option<Item>,
    pub response_text: String,
    pub selected_options: Vec<String>,
    pub hint_used: bool,
    pub last_result: Option<AttemptResult>,
    pub can_submit: bool,
    pub queue: Vec<SkillId>,
    pub review: Option<ReviewPlan>,
    pub advance_pending: bool,
}

#[derive(Debug, Default)]
pub(crate) struct SessionCore {
    pub(crate) state: SessionState,
    pub(crate) target: Option<SkillId>,
    pub(crate) item: Option<Item>,
    pub(crate) response_text: String,
    pub(crate) selected: BTreeSet<String>,
    pub(crate) hint_used: bool,
    pub(crate) last_result: Option<AttemptResult>,
    pub(crate) queue: VecDeque<SkillId>,
    pub(crate) review: Option<ReviewPlan>,
    /// Bumped on every load request; a fetched item is kept only if the
    /// epoch is unchanged when it arrives.
    pub(crate) epoch: u64,
    /// Target in effect before the load in flight.
    pub(crate) settled_target: Option<SkillId>,
}

impl SessionCore {
    /// Start a load for `target` and return its epoch.
    pub(crate) fn begin_load(&mut self, target: Option<SkillId>) -> u64 {
        self.epoch += 1;
        let previous = std::mem::replace(&mut self.target, target);
        if self.state != SessionState::Loading {
            self.settled_target = previous;
        }
        self.state = SessionState::Loading;
        debug!(epoch = self.epoch, target = ?self.target, "Loading item");
        self.epoch
    }

    /// Undo a failed load, returning to the item and target it replaced.
    pub(crate) fn abandon_load(&mut self) {
        self.target = self.settled_target.take();
        self.state = match (&self.item, &self.last_result) {
            (None, _) => SessionState::Idle,
            (Some(_), None) => SessionState::Presented,
            (Some(_), Some(_)) => SessionState::Graded,
        };
        debug!(epoch = self.epoch, target = ?self.target, "Load abandoned");
    }

    /// Replace the current item and reset everything tied to it.
    pub(crate) fn present(&mut self, item: Item) {
        if let Some(target) = self.target.as_deref() {
            if item.skill_id != target {
                warn!(
                    item_id = %item.id,
                    item_skill = %item.skill_id,
                    target,
                    "Item bank returned an item for a different skill"
                );
            }
        }

        debug!(item_id = %item.id, skill = %item.skill_id, "Presenting item");
        self.item = Some(item);
        self.response_text.clear();
        self.selected.clear();
        self.hint_used = false;
        self.last_result = None;
        self.settled_target = None;
        self.state = SessionState::Presented;
    }

    /// Whether a load is needed to satisfy `target`.
    pub(crate) fn needs_load(&self, target: Option<&str>) -> bool {
        let Some(item) = &self.item else {
            return true;
        };
        match target {
            None => false,
            Some(t) => item.skill_id != t && self.target.as_deref() != Some(t),
        }
    }

    /// The response to send for grading, or why there is none.
    pub(crate) fn response(&self) -> Result<(&Item, Response), RejectReason> {
        let item = match &self.item {
            Some(item) if self.state.is_interactive() => item,
            _ => return Err(RejectReason::NoCurrentItem),
        };

        match item.kind {
            ItemKind::Numeric => {
                if self.response_text.trim().is_empty() {
                    return Err(RejectReason::EmptyResponse);
                }
                Ok((item, Response::from_input(&self.response_text)))
            }
            ItemKind::MultipleChoice => {
                if self.selected.is_empty() {
                    return Err(RejectReason::EmptyResponse);
                }
                Ok((item, Response::Options(self.selected.clone())))
            }
        }
    }

    pub(crate) fn can_submit(&self) -> bool {
        self.response().is_ok()
    }

    /// Drop the item and every per-item field.
    pub(crate) fn clear(&mut self) {
        self.epoch += 1;
        self.state = SessionState::Idle;
        self.target = None;
        self.item = None;
        self.response_text.clear();
        self.selected.clear();
        self.hint_used = false;
        self.last_result = None;
        self.queue.clear();
        self.review = None;
        self.settled_target = None;
    }

    pub(crate) fn snapshot(&self, advance_pending: bool) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            target: self.target.clone(),
            item: self.item.clone(),
            response_text: self.response_text.clone(),
            selected_options: self.selected.iter().cloned().collect(),
            hint_used: self.hint_used,
            last_result: self.last_result.clone(),
            can_submit: self.can_submit(),
            queue: self.queue.iter().cloned().collect(),
            review: self.review.clone(),
            advance_pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemOption;

    fn presented(item: Item) -> SessionCore {
        let mut core = SessionCore::default();
        core.begin_load(Some(item.skill_id.clone()));
        core.present(item);
        core
    }

    #[test]
    fn test_blank_numeric_is_rejected() {
        let mut core = presented(Item::numeric("i1", "6.2", "1 + 1"));
        assert_eq!(core.response().unwrap_err(), RejectReason::EmptyResponse);

        core.response_text = "   ".to_string();
        assert!(!core.can_submit());

        core.response_text = " 2 ".to_string();
        let (_, response) = core.response().unwrap();
        assert_eq!(response, Response::Number(2.0));
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        let item = Item::multiple_choice(
            "i2",
            "6.7B",
            "Which is an equation?",
            vec![ItemOption::new("a", "x + 2"), ItemOption::new("b", "x + 2 = 5")],
        );
        let mut core = presented(item);
        assert_eq!(core.response().unwrap_err(), RejectReason::EmptyResponse);

        core.selected.insert("b".to_string());
        let (_, response) = core.response().unwrap();
        assert_eq!(response, Response::Options(BTreeSet::from(["b".to_string()])));
    }

    #[test]
    fn test_loading_blocks_submission() {
        let mut core = presented(Item::numeric("i1", "6.2", "1 + 1"));
        core.response_text = "2".to_string();
        core.begin_load(Some("6.2".to_string()));
        assert_eq!(core.response().unwrap_err(), RejectReason::NoCurrentItem);
    }

    #[test]
    fn test_present_clears_item_fields() {
        let mut core = presented(Item::numeric("i1", "6.2", "1 + 1"));
        core.response_text = "2".to_string();
        core.hint_used = true;
        core.last_result = Some(AttemptResult {
            correct: false,
            mastery_delta: -0.01,
            feedback_code: None,
        });

        core.present(Item::numeric("i2", "6.2", "2 + 2"));
        assert!(core.response_text.is_empty());
        assert!(!core.hint_used);
        assert!(core.last_result.is_none());
        assert_eq!(core.state, SessionState::Presented);
    }

    #[test]
    fn test_needs_load() {
        let core = SessionCore::default();
        assert!(core.needs_load(None));

        let core = presented(Item::numeric("i1", "6.2", "1 + 1"));
        assert!(!core.needs_load(None));
        assert!(!core.needs_load(Some("6.2")));
        assert!(core.needs_load(Some("6.4")));
    }

    #[test]
    fn test_needs_load_with_mismatched_item() {
        // Offline item is tagged 6.7B while the learner asked for 6.2
        let mut core = SessionCore::default();
        core.begin_load(Some("6.2".to_string()));
        core.present(Item::numeric("sample-1", "6.7B", "8 x 6"));

        assert!(!core.needs_load(Some("6.2")));
        assert!(!core.needs_load(Some("6.7B")));
        assert!(core.needs_load(Some("6.9A")));
    }
}
