//! The answer to a load request.

use std::fmt;
use std::path::PathBuf;

use kiln_diagnostics::Diagnostic;
use serde::Serialize;

/// How the host should interpret returned contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Loader {
    /// JavaScript module.
    #[serde(rename = "js")]
    Script,
    /// TypeScript module.
    #[serde(rename = "ts")]
    TypedScript,
    /// Stylesheet.
    #[serde(rename = "css")]
    Style,
}

impl Loader {
    /// The loader's short name as used by bundlers.
    pub fn as_str(self) -> &'static str {
        match self {
            Loader::Script => "js",
            Loader::TypedScript => "ts",
            Loader::Style => "css",
        }
    }

    /// The loader for an inline script of dialect `lang`.
    pub fn for_script(lang: &str) -> Self {
        match lang {
            "ts" | "tsx" => Loader::TypedScript,
            _ => Loader::Script,
        }
    }
}

impl fmt::Display for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Module contents handed back to the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoadResult {
    /// Module source.
    pub contents: String,
    /// How `contents` is to be interpreted.
    pub loader: Loader,
    /// Non-fatal warnings produced with the contents.
    pub diagnostics: Vec<Diagnostic>,
    /// Extra files whose changes should trigger a rebuild.
    pub watch_files: Vec<PathBuf>,
}
