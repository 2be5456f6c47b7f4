//! The stylesheet pipeline: preprocess, scope, embed source map.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::StyleError;
use crate::preprocess::{PreprocessOptions, Preprocessor};
use crate::scope::{ScopeConfig, ScopeOptions, Scoped, Scoper};
use crate::source_map::append_inline_map;

/// The stylesheet dialect of a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StyleKind {
    /// Plain CSS, scoped directly.
    Css,
    /// SCSS, run through the preprocessor first.
    Scss,
}

impl StyleKind {
    /// Infers the kind from a file extension or inline `lang` tag.
    ///
    /// With `preprocess` disabled, SCSS is passed through as plain CSS.
    pub fn from_lang(lang: &str, preprocess: bool) -> Option<Self> {
        match lang.to_ascii_lowercase().as_str() {
            "css" => Some(StyleKind::Css),
            "scss" if preprocess => Some(StyleKind::Scss),
            "scss" => Some(StyleKind::Css),
            _ => None,
        }
    }
}

/// One stylesheet to process.
#[derive(Clone, Copy, Debug)]
pub struct StyleRequest<'a> {
    /// The stylesheet's path (the owning template for inline styles).
    pub file: &'a Path,
    /// Scope token; scoping is skipped when absent.
    pub scope: Option<&'a str>,
    /// Dialect of the source.
    pub kind: StyleKind,
    /// Whether to embed a source map.
    pub source_map: bool,
    /// Settings for the scoping transform.
    pub scope_config: &'a ScopeConfig,
}

/// Output of the pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessedStyle {
    /// Final CSS, with an inline source map comment when one was available.
    pub code: String,
    /// Files loaded while processing, in load order without duplicates.
    ///
    /// For preprocessed input this starts with the entry file itself.
    pub dependencies: Vec<PathBuf>,
}

/// Runs stylesheets through the preprocessor and the scoping transform.
#[derive(Clone)]
pub struct StylePipeline {
    preprocessor: Arc<dyn Preprocessor>,
    scoper: Arc<dyn Scoper>,
}

impl StylePipeline {
    /// Creates a pipeline from its two collaborators.
    pub fn new(preprocessor: Arc<dyn Preprocessor>, scoper: Arc<dyn Scoper>) -> Self {
        Self {
            preprocessor,
            scoper,
        }
    }

    /// Processes `source` as described by `request`.
    ///
    /// Preprocessor and scoping errors are returned unchanged; the caller
    /// must not cache anything for a failed request.
    pub async fn process(
        &self,
        source: &str,
        request: StyleRequest<'_>,
    ) -> Result<ProcessedStyle, StyleError> {
        let mut dependencies: Vec<PathBuf> = Vec::new();
        let (css, mut map) = match request.kind {
            StyleKind::Css => (source.to_string(), None),
            StyleKind::Scss => {
                let preprocessor = Arc::clone(&self.preprocessor);
                let owned = source.to_string();
                let options = PreprocessOptions {
                    url: request.file.to_path_buf(),
                    source_map: request.source_map,
                };
                let out = tokio::task::spawn_blocking(move || preprocessor.compile(&owned, &options))
                    .await
                    .map_err(|e| StyleError::Interrupted(e.to_string()))??;
                dependencies.push(request.file.to_path_buf());
                for url in out.loaded_urls {
                    if !dependencies.contains(&url) {
                        dependencies.push(url);
                    }
                }
                (out.css, out.source_map)
            }
        };

        let mut code = match request.scope {
            Some(scope) => {
                let options = ScopeOptions {
                    filename: request.file,
                    map: map.as_deref(),
                    config: request.scope_config,
                };
                match self.scoper.scope(&css, scope, &options)? {
                    Scoped::PlainCode(code) => code,
                    Scoped::CodeWithMap { code, map: scoped } => {
                        map = Some(scoped);
                        code
                    }
                }
            }
            None => css,
        };

        if request.source_map {
            if let Some(map) = &map {
                append_inline_map(&mut code, map);
            }
        }

        tracing::debug!(
            file = %request.file.display(),
            dependencies = dependencies.len(),
            "processed stylesheet"
        );
        Ok(ProcessedStyle { code, dependencies })
    }
}
