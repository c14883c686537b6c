//! Trade-compliance core for EU CBAM quarterly reporting.
//!
//! Three independently invocable components form the pipeline:
//!
//! - [`classify`] — maps free-text product descriptions to 8-digit CN codes
//!   with confidence scoring and human-review gating.
//! - [`extract`] — parses unstructured document text into normalized
//!   activity data (mass, energy, dates, origin, producer identity).
//! - [`xml`] — serializes a [`report::CbamReport`] aggregate into a
//!   QReport v23.00 XML document and validates it.
//!
//! Composition happens in the caller: classify a description, extract
//! activity data from supporting documents, assemble a `CbamReport`, then
//! generate and validate the XML. None of the components depends on another
//! at the interface level; they share only the read-only [`taxonomy`]
//! reference tables.

pub mod config;
pub mod taxonomy;
pub mod classify;
pub mod extract;
pub mod report;
pub mod xml;
