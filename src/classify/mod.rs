//! CN code classification from free-text product descriptions.
//!
//! Deterministic keyword scoring against the static taxonomy. Never fails:
//! when nothing matches, classification degrades to a fixed fallback code
//! at low confidence rather than erroring.

pub mod types;
pub mod cache;
pub mod engine;

pub use types::*;
pub use cache::*;
pub use engine::*;
