//! Review scheduling: due buckets and custom review plans.

mod plan;
mod scheduler;

pub use plan::{ReviewKind, ReviewPlan, ALLOWED_ITEM_COUNTS};
pub use scheduler::ReviewScheduler;
