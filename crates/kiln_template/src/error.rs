//! Error types for template compilation.

use std::path::PathBuf;

use kiln_source::Location;

/// Errors that abort compilation of one template.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// The template or a helper file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// The file that failed to load.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The parser rejected the template.
    #[error("{}: {message}", display_at(.file, .location))]
    Parse {
        /// The template being parsed.
        file: PathBuf,
        /// The parser's message.
        message: String,
        /// 0-based position of the problem, if known.
        location: Option<Location>,
    },

    /// Code generation failed.
    #[error("{file}: code generation failed: {message}")]
    Generate {
        /// The template being generated.
        file: PathBuf,
        /// The generator's message.
        message: String,
    },
}

fn display_at(file: &std::path::Path, location: &Option<Location>) -> String {
    match location {
        Some(loc) => format!("{}:{loc}", file.display()),
        None => file.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_with_location() {
        let err = TemplateError::Parse {
            file: PathBuf::from("card.html"),
            message: "unclosed <style>".to_string(),
            location: Some(Location { line: 4, column: 2 }),
        };
        assert_eq!(err.to_string(), "card.html:5:3: unclosed <style>");
    }

    #[test]
    fn parse_error_without_location() {
        let err = TemplateError::Parse {
            file: PathBuf::from("card.html"),
            message: "empty".to_string(),
            location: None,
        };
        assert_eq!(err.to_string(), "card.html: empty");
    }

    #[test]
    fn generate_error_display() {
        let err = TemplateError::Generate {
            file: PathBuf::from("card.html"),
            message: "unsupported module format 'cjs'".to_string(),
        };
        assert!(err.to_string().contains("code generation failed"));
    }
}
