//! Virtual module identifiers for template sub-resources.
//!
//! A virtual identifier is a real file path optionally followed by a
//! query-like parameter bag, e.g.
//! `src/card.html?type=componentStylesheet&scope=sAbc123_x&i=0`.

use std::fmt;
use std::path::{Path, PathBuf};

/// Parameter value marking an inline or external component stylesheet.
pub const TYPE_STYLESHEET: &str = "componentStylesheet";

/// Parameter value marking an inline component script.
pub const TYPE_SCRIPT: &str = "componentScript";

/// Errors produced when decoding a virtual identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VirtualIdError {
    /// The `type` parameter names no known sub-resource kind.
    #[error("unknown sub-resource type '{0}'")]
    UnknownType(String),

    /// The `i` parameter is not a non-negative integer.
    #[error("invalid sub-resource index '{0}'")]
    InvalidIndex(String),

    /// A script sub-resource was requested without an index.
    #[error("script sub-resource requires an index")]
    MissingIndex,
}

/// The sub-resource a virtual identifier addresses inside its owner.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SubResource {
    /// The `index`-th script resource of a template.
    Script {
        /// Position in the owning template's script list.
        index: usize,
    },
    /// A stylesheet, inline (with an index) or external (without).
    Stylesheet {
        /// Scope token applied to the stylesheet's selectors.
        scope: Option<String>,
        /// Position in the owning template's style list, for inline styles.
        index: Option<usize>,
    },
}

/// A file path plus optional sub-resource parameters.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VirtualId {
    /// The real file path (the owning template for inline resources).
    pub path: PathBuf,
    /// Sub-resource parameters, absent for a plain file request.
    pub sub: Option<SubResource>,
}

impl VirtualId {
    /// A plain file request without parameters.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sub: None,
        }
    }

    /// The inline script at `index` of the template at `path`.
    pub fn script(path: impl Into<PathBuf>, index: usize) -> Self {
        Self {
            path: path.into(),
            sub: Some(SubResource::Script { index }),
        }
    }

    /// A component stylesheet, inline when `index` is given.
    pub fn stylesheet(path: impl Into<PathBuf>, scope: Option<String>, index: Option<usize>) -> Self {
        Self {
            path: path.into(),
            sub: Some(SubResource::Stylesheet { scope, index }),
        }
    }

    /// Decodes an identifier of the form `path[?key=value&...]`.
    ///
    /// Parameters other than `type`, `i` and `scope` are ignored, and a
    /// bag without `type` decodes as a plain file request.
    pub fn parse(id: &str) -> Result<Self, VirtualIdError> {
        let (path, query) = match id.split_once('?') {
            Some((path, query)) => (path, query),
            None => return Ok(Self::file(id)),
        };

        let mut kind = None;
        let mut index = None;
        let mut scope = None;
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "type" => kind = Some(value),
                "i" => {
                    let parsed = value
                        .parse::<usize>()
                        .map_err(|_| VirtualIdError::InvalidIndex(value.to_string()))?;
                    index = Some(parsed);
                }
                "scope" if !value.is_empty() => scope = Some(value.to_string()),
                _ => {}
            }
        }

        let sub = match kind {
            None => None,
            Some(TYPE_SCRIPT) => Some(SubResource::Script {
                index: index.ok_or(VirtualIdError::MissingIndex)?,
            }),
            Some(TYPE_STYLESHEET) => Some(SubResource::Stylesheet { scope, index }),
            Some(other) => return Err(VirtualIdError::UnknownType(other.to_string())),
        };
        Ok(Self {
            path: PathBuf::from(path),
            sub,
        })
    }

    /// The lowercase extension of the underlying file path.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.path)
    }
}

/// Returns the lowercase extension of `path`, if any.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

impl fmt::Display for VirtualId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())?;
        match &self.sub {
            None => Ok(()),
            Some(SubResource::Script { index }) => {
                write!(f, "?type={TYPE_SCRIPT}&i={index}")
            }
            Some(SubResource::Stylesheet { scope, index }) => {
                write!(f, "?type={TYPE_STYLESHEET}")?;
                if let Some(scope) = scope {
                    write!(f, "&scope={scope}")?;
                }
                if let Some(index) = index {
                    write!(f, "&i={index}")?;
                }
                Ok(())
            }
        }
    }
}
