//! Error types for the stylesheet pipeline.

use std::path::PathBuf;

/// Errors that abort processing of one stylesheet.
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    /// A stylesheet or one of its imports could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// The file that failed to load.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The preprocessor rejected the input.
    #[error("{file}: {message}")]
    Preprocess {
        /// The stylesheet being compiled.
        file: PathBuf,
        /// The preprocessor's message.
        message: String,
    },

    /// The scoping transform rejected the input.
    #[error("{file}: cannot scope stylesheet: {message}")]
    Scope {
        /// The stylesheet being scoped.
        file: PathBuf,
        /// Description of the problem.
        message: String,
    },

    /// The preprocessor task panicked or was cancelled.
    #[error("preprocessor task failed: {0}")]
    Interrupted(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preprocess_display_names_file() {
        let err = StyleError::Preprocess {
            file: PathBuf::from("theme.scss"),
            message: "cannot resolve import 'vars'".to_string(),
        };
        assert_eq!(err.to_string(), "theme.scss: cannot resolve import 'vars'");
    }

    #[test]
    fn scope_display() {
        let err = StyleError::Scope {
            file: PathBuf::from("a.css"),
            message: "unbalanced braces".to_string(),
        };
        assert!(err.to_string().contains("cannot scope stylesheet"));
    }
}
