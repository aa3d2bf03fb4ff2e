//! Core traits for practica collaborators.

mod clock;
mod item_bank;

pub use clock::*;
pub use item_bank::*;
