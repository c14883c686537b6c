//! CBAM QReport XML generation and schema-conformance checking.
//!
//! Generation is pure and deterministic: the same report value always
//! produces byte-identical output. Validation is tolerant by design —
//! a missing schema degrades to a warning, and generation never depends
//! on validation succeeding.

pub mod writer;
pub mod schema;

pub use writer::*;
pub use schema::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum XmlError {
    #[error("XML write error: {0}")]
    Write(#[from] quick_xml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
