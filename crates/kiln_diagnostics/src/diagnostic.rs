//! Structured diagnostic messages with severity, codes and locations.

use std::path::PathBuf;

use kiln_source::Location;
use serde::{Deserialize, Serialize};

use crate::code::DiagnosticCode;
use crate::severity::Severity;

/// A structured diagnostic message attached to a file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The stable code identifying the kind of diagnostic.
    pub code: DiagnosticCode,
    /// The main diagnostic message.
    pub message: String,
    /// The file the diagnostic refers to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// 0-based position inside `file`, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Explanatory footnotes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl Diagnostic {
    /// Creates a new error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    /// Creates a new warning diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    fn new(severity: Severity, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            file: None,
            location: None,
            notes: Vec::new(),
        }
    }

    /// Attaches the file this diagnostic belongs to.
    pub fn in_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Attaches a position inside the file.
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Adds a note to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_warning() {
        let diag = Diagnostic::warning(DiagnosticCode::TEMPLATE_WARNING, "unused attribute");
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.message, "unused attribute");
        assert!(diag.file.is_none());
    }

    #[test]
    fn builder_methods() {
        let diag = Diagnostic::error(DiagnosticCode::LOAD_FAILED, "cannot read")
            .in_file("src/card.html")
            .at(Location { line: 3, column: 7 })
            .with_note("file was deleted during the build");
        assert_eq!(diag.file, Some(PathBuf::from("src/card.html")));
        assert_eq!(diag.location.unwrap().line, 3);
        assert_eq!(diag.notes.len(), 1);
    }

    #[test]
    fn json_omits_empty_fields() {
        let diag = Diagnostic::warning(DiagnosticCode::MISSING_SUB_RESOURCE, "gone");
        let json = serde_json::to_string(&diag).unwrap();
        assert!(!json.contains("location"));
        assert!(!json.contains("notes"));
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(back, diag);
    }
}
