//! practica-core - Core library for practica.
//!
//! This crate provides the adaptive practice engine: the mastery update rule
//! and its SQLite-backed store, the review scheduler, and the practice
//! session state machine that sequences item delivery, grading and
//! auto-advance.
//!
//! # Example
//!
//! ```ignore
//! use practica_core::{FallbackItemBank, MasteryDb, MasteryRule, PracticeSession, SessionConfig};
//!
//! let db = MasteryDb::open("mastery.db")?;
//! let store = Arc::new(db.store("u_abc12345", MasteryRule::default()));
//! let bank = Arc::new(FallbackItemBank::new(remote_bank));
//!
//! let session = PracticeSession::new(bank, store, SessionConfig::default());
//! session.ensure_item(Some("6.8B")).await?;
//! session.set_response_text("24").await?;
//! let outcome = session.submit().await?;
//! ```

pub mod bank;
pub mod config;
pub mod error;
pub mod learner;
pub mod mastery;
pub mod progress;
pub mod review;
pub mod session;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use bank::{FallbackItemBank, OfflineItemBank};
pub use config::{MasteryConfig, PracticaConfig, ReviewConfig, SessionConfig};
pub use error::{ErrorCode, PracticaError, PracticaResult};
pub use learner::{Learner, LearnerContext};
pub use mastery::{MasteryDb, MasteryRule, MasteryStore};
pub use progress::{ProgressSummary, SkillProgress};
pub use review::{ReviewKind, ReviewPlan, ReviewScheduler};
pub use session::{PracticeSession, RejectReason, SessionSnapshot, SessionState, SubmitOutcome};
pub use traits::{Clock, ItemBank, ItemBankConfig, ItemBankProvider, ManualClock, SystemClock};
pub use types::{
    AttemptResult, GradeOutcome, GradeRequest, Item, ItemKind, ItemOption, MasteryLevel,
    MasteryRecord, MasteryThresholds, Response, Skill, SkillCatalog, SkillId,
};
