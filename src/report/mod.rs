//! The CBAM quarterly report aggregate and its regulatory rule checks.
//!
//! A [`CbamReport`] is a single-use value assembled by the caller from
//! classification and extraction output, then handed to the XML writer.
//! Totals are always recomputed from the goods tree, never trusted from
//! the caller.

pub mod types;
pub mod rules;

pub use types::*;
pub use rules::*;
