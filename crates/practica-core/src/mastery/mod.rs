//! Mastery tracking: the update rule and its SQLite-backed store.

mod rule;
mod store;

pub use rule::MasteryRule;
pub use store::{MasteryDb, MasteryStore};
