//! Core types for practica.

mod attempt;
mod item;
mod mastery;
mod skill;

pub use attempt::*;
pub use item::*;
pub use mastery::*;
pub use skill::*;
