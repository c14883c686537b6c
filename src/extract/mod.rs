//! Activity-data extraction from unstructured trade documents.
//!
//! A [`PatternBackend`] applies ordered regex pattern families to document
//! text and normalizes every numeric+unit pair; higher-fidelity backends
//! plug in through the [`ExtractionBackend`] trait and fall back to the
//! pattern backend when their collaborator is not configured.

pub mod types;
pub mod patterns;
pub mod units;
pub mod backend;
pub mod validate;

pub use types::*;
pub use units::*;
pub use backend::*;
pub use validate::*;

use thiserror::Error;

/// Failures of a [`TextSource`] collaborator. Never fatal to extraction:
/// the backend degrades to empty text and records a warning.
#[derive(Error, Debug)]
pub enum TextSourceError {
    #[error("text decoding failed: {0}")]
    Decode(String),

    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
