//! Static regulatory reference data, versioned with
//! [`crate::config::SCHEMA_VERSION`]. Loaded once, read-only, shared by
//! reference across all components.

pub mod codes;
pub mod categories;
pub mod keywords;

pub use codes::*;
pub use categories::*;
pub use keywords::*;
