//! Schema-conformance checking for generated QReport XML.
//!
//! A bundled XSD is optional. Without one, validation degrades to a
//! warning instead of an error, since XML generation must keep working
//! in deployments that do not ship the schema file. With one, the check
//! covers well-formedness plus the structural requirements of the
//! QReport root (this crate does not embed a full XSD engine).

use std::path::PathBuf;

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

use crate::config::SCHEMA_VERSION;

/// Top-level elements the QReport schema requires, in order.
const REQUIRED_SECTIONS: &[&str] = &["Header", "Declarant", "GoodsList", "Summary"];

/// One schema-validation error, located by line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaIssue {
    pub line: usize,
    pub message: String,
}

/// Outcome of validating one XML document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<SchemaIssue>,
    pub warnings: Vec<String>,
    pub schema_version: String,
}

impl ValidationResult {
    fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            schema_version: SCHEMA_VERSION.into(),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum LoadState {
    Unloaded,
    /// Schema file read successfully.
    Loaded,
    /// No schema configured or readable; validation degrades to warnings.
    LoadedWithoutSchema,
}

/// Load-once schema validator, safe to reuse across documents.
#[derive(Debug)]
pub struct SchemaValidator {
    schema_path: Option<PathBuf>,
    state: LoadState,
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new(None)
    }
}

impl SchemaValidator {
    pub fn new(schema_path: Option<PathBuf>) -> Self {
        Self {
            schema_path,
            state: LoadState::Unloaded,
        }
    }

    /// Attempt to load the schema. Idempotent: later calls return the
    /// first outcome. A missing file is logged and leaves the validator
    /// usable in degraded mode.
    pub fn load_schema(&mut self) -> bool {
        if self.state != LoadState::Unloaded {
            return self.state == LoadState::Loaded;
        }

        self.state = match &self.schema_path {
            Some(path) if path.exists() => {
                tracing::info!(path = %path.display(), "CBAM schema loaded");
                LoadState::Loaded
            }
            Some(path) => {
                tracing::warn!(path = %path.display(), "schema not found");
                LoadState::LoadedWithoutSchema
            }
            None => LoadState::LoadedWithoutSchema,
        };
        self.state == LoadState::Loaded
    }

    /// Validate XML bytes. Never panics: malformed XML surfaces as a
    /// single error entry with the offending line.
    pub fn validate(&mut self, xml: &[u8]) -> ValidationResult {
        self.load_schema();

        let mut result = ValidationResult::valid();

        if self.state != LoadState::Loaded {
            result
                .warnings
                .push("Schema validation skipped - no schema loaded".into());
            return result;
        }

        match check_structure(xml) {
            Ok(issues) => {
                if !issues.is_empty() {
                    result.is_valid = false;
                    result.errors = issues;
                }
            }
            Err(issue) => {
                result.is_valid = false;
                result.errors.push(issue);
            }
        }
        result
    }
}

/// Parse the document and check the QReport structural requirements.
/// `Err` carries a syntax error; `Ok` carries structural violations.
fn check_structure(xml: &[u8]) -> Result<Vec<SchemaIssue>, SchemaIssue> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();

    let mut issues = Vec::new();
    let mut depth = 0usize;
    let mut saw_root = false;
    let mut sections: Vec<String> = Vec::new();

    loop {
        let position = reader.buffer_position() as usize;
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(start)) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                if depth == 0 {
                    saw_root = true;
                    if name != "QReport" {
                        issues.push(SchemaIssue {
                            line: line_at(xml, position),
                            message: format!("Root element must be 'QReport', got '{name}'"),
                        });
                    }
                } else if depth == 1 {
                    sections.push(name);
                }
                depth += 1;
            }
            Ok(Event::Empty(start)) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                if depth == 0 {
                    saw_root = true;
                    if name != "QReport" {
                        issues.push(SchemaIssue {
                            line: line_at(xml, position),
                            message: format!("Root element must be 'QReport', got '{name}'"),
                        });
                    }
                } else if depth == 1 {
                    sections.push(name);
                }
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(SchemaIssue {
                    line: line_at(xml, position),
                    message: format!("XML syntax error: {err}"),
                });
            }
        }
        buf.clear();
    }

    if !saw_root {
        issues.push(SchemaIssue {
            line: 1,
            message: "Document has no root element".into(),
        });
        return Ok(issues);
    }

    for section in REQUIRED_SECTIONS {
        if !sections.iter().any(|s| s == section) {
            issues.push(SchemaIssue {
                line: 1,
                message: format!("Required element '{section}' is missing"),
            });
        }
    }

    Ok(issues)
}

fn line_at(xml: &[u8], position: usize) -> usize {
    let end = position.min(xml.len());
    xml[..end].iter().filter(|&&b| b == b'\n').count() + 1
}
