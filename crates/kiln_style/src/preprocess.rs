//! Stylesheet preprocessing.

use std::path::{Path, PathBuf};

use crate::error::StyleError;

/// Inputs of a preprocessor run.
#[derive(Clone, Debug)]
pub struct PreprocessOptions {
    /// Path of the stylesheet; its directory is the import resolution base.
    pub url: PathBuf,
    /// Whether a source map should be produced.
    pub source_map: bool,
}

/// Output of a preprocessor run.
#[derive(Clone, Debug, Default)]
pub struct Preprocessed {
    /// Plain CSS.
    pub css: String,
    /// Source map JSON, when requested and supported.
    pub source_map: Option<String>,
    /// Every file read while compiling, in load order.
    pub loaded_urls: Vec<PathBuf>,
}

/// Compiles a preprocessed stylesheet dialect (SCSS) to CSS.
///
/// Implementations may block; the pipeline runs them on the blocking pool.
pub trait Preprocessor: Send + Sync {
    /// Compiles `source` and reports every file it loaded.
    fn compile(&self, source: &str, options: &PreprocessOptions) -> Result<Preprocessed, StyleError>;
}

/// A preprocessor that only resolves and inlines `@import`s.
///
/// `@import "x";` is looked up relative to the importing file as `x`,
/// `x.scss`, `_x.scss` and `x.css`. Remote imports (`http:`, `//`, `url(`)
/// are left in place. No source map is produced.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImportInliner;

impl Preprocessor for ImportInliner {
    fn compile(&self, source: &str, options: &PreprocessOptions) -> Result<Preprocessed, StyleError> {
        let mut loaded = Vec::new();
        let mut stack = vec![options.url.clone()];
        let css = inline_imports(source, &options.url, &mut loaded, &mut stack)?;
        Ok(Preprocessed {
            css,
            source_map: None,
            loaded_urls: loaded,
        })
    }
}

fn inline_imports(
    source: &str,
    file: &Path,
    loaded: &mut Vec<PathBuf>,
    stack: &mut Vec<PathBuf>,
) -> Result<String, StyleError> {
    let mut out = String::with_capacity(source.len());
    for line in source.split_inclusive('\n') {
        let Some(targets) = parse_import(line) else {
            out.push_str(line);
            continue;
        };
        for target in targets {
            let resolved = resolve_import(file, &target).ok_or_else(|| StyleError::Preprocess {
                file: file.to_path_buf(),
                message: format!("cannot resolve import '{target}'"),
            })?;
            if stack.contains(&resolved) {
                return Err(StyleError::Preprocess {
                    file: file.to_path_buf(),
                    message: format!("import cycle through '{}'", resolved.display()),
                });
            }
            let text = std::fs::read_to_string(&resolved).map_err(|source| StyleError::Io {
                path: resolved.clone(),
                source,
            })?;
            loaded.push(resolved.clone());
            stack.push(resolved.clone());
            let inlined = inline_imports(&text, &resolved, loaded, stack)?;
            stack.pop();
            out.push_str(&inlined);
            if !inlined.ends_with('\n') {
                out.push('\n');
            }
        }
    }
    Ok(out)
}

/// Returns the local targets of an `@import` line, or `None` when the line
/// is not an import that should be inlined.
fn parse_import(line: &str) -> Option<Vec<String>> {
    let rest = line.trim().strip_prefix("@import")?;
    let rest = rest.trim().strip_suffix(';')?.trim();
    let mut targets = Vec::new();
    for part in rest.split(',') {
        let part = part.trim();
        let unquoted = part
            .strip_prefix('"')
            .and_then(|p| p.strip_suffix('"'))
            .or_else(|| part.strip_prefix('\'').and_then(|p| p.strip_suffix('\'')))?;
        if unquoted.starts_with("http:")
            || unquoted.starts_with("https:")
            || unquoted.starts_with("//")
        {
            return None;
        }
        targets.push(unquoted.to_string());
    }
    (!targets.is_empty()).then_some(targets)
}

fn resolve_import(importer: &Path, target: &str) -> Option<PathBuf> {
    let base = importer.parent().unwrap_or_else(|| Path::new("."));
    let wanted = base.join(target);
    let dir = wanted.parent().unwrap_or(base);
    let name = wanted.file_name()?.to_string_lossy().into_owned();
    [
        wanted.clone(),
        dir.join(format!("{name}.scss")),
        dir.join(format!("_{name}.scss")),
        dir.join(format!("{name}.css")),
    ]
    .into_iter()
    .find(|candidate| candidate.is_file())
}
