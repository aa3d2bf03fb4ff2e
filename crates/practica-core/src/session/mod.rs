//! Practice session state machine.
//!
//! A session moves through `Idle -> Loading -> Presented -> Graded` and back
//! to `Loading` after a correct answer. See [`PracticeSession`].

mod advance;
mod practice;
mod state;

pub use practice::PracticeSession;
pub use state::{RejectReason, SessionSnapshot, SessionState, SubmitOutcome};
