//! Item bank implementations that live in the core crate.
//!
//! The HTTP bank lives in `practica-client`; every bank handed to a session
//! is wrapped in [`FallbackItemBank`].

mod fallback;
mod offline;

pub use fallback::FallbackItemBank;
pub use offline::{OfflineItemBank, EXPECTED_SAMPLE_ANSWER, SAMPLE_ITEM_ID};
