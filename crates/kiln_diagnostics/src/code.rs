//! Diagnostic codes with category prefixes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The category of a diagnostic code, determining its prefix letter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Error diagnostics, prefixed with `E`.
    Error,
    /// Warning diagnostics, prefixed with `W`.
    Warning,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Error => 'E',
            Category::Warning => 'W',
        }
    }
}

/// A category prefix plus a numeric identifier, displayed as e.g. `W002`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// A warning reported by the template parser or code generator.
    pub const TEMPLATE_WARNING: DiagnosticCode = DiagnosticCode::new(Category::Warning, 1);

    /// A sub-resource was requested that its owning template does not have.
    pub const MISSING_SUB_RESOURCE: DiagnosticCode = DiagnosticCode::new(Category::Warning, 2);

    /// Duplicate helper symbol; the first definition is kept.
    pub const DUPLICATE_HELPER: DiagnosticCode = DiagnosticCode::new(Category::Warning, 3);

    /// A load failed with a fatal error.
    pub const LOAD_FAILED: DiagnosticCode = DiagnosticCode::new(Category::Error, 1);

    /// Creates a new diagnostic code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        assert_eq!(DiagnosticCode::TEMPLATE_WARNING.to_string(), "W001");
        assert_eq!(DiagnosticCode::MISSING_SUB_RESOURCE.to_string(), "W002");
        assert_eq!(DiagnosticCode::LOAD_FAILED.to_string(), "E001");
    }

    #[test]
    fn serde_roundtrip() {
        let code = DiagnosticCode::new(Category::Error, 101);
        let json = serde_json::to_string(&code).unwrap();
        let back: DiagnosticCode = serde_json::from_str(&json).unwrap();
        assert_eq!(code, back);
    }
}
