//! Helper files and the symbols they export.
//!
//! Helper symbols are made available to every template. The index is
//! rebuilt whenever a build pass starts.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use kiln_diagnostics::{Diagnostic, DiagnosticCode};

use crate::error::TemplateError;

/// Extracts the exported symbol names of a script file.
pub trait SymbolExtractor: Send + Sync {
    /// Returns the names exported by `text`, in source order.
    fn exports(&self, file_name: &Path, text: &str) -> Vec<String>;
}

/// A line-oriented scanner for ES module exports.
///
/// Recognizes `export { a, b as c }` (with or without `from`),
/// `export * as ns from`, exported function declarations including `async`
/// and generator forms, and exported `const`/`let`/`var` declarations
/// including simple destructuring. `export default`, classes and type-only
/// exports are ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExportScanner;

impl SymbolExtractor for ExportScanner {
    fn exports(&self, _file_name: &Path, text: &str) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let mut offset = 0;
        for line in text.split_inclusive('\n') {
            let line_start = offset;
            offset += line.len();
            let trimmed = line.trim_start();
            if strip_keyword(trimmed, "export").is_none() {
                continue;
            }
            let after = line_start + (line.len() - trimmed.len()) + "export".len();
            for name in scan_export(&text[after..]) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }
}

fn scan_export(tail: &str) -> Vec<String> {
    let tail = tail.trim_start();
    if let Some(list) = tail.strip_prefix('{') {
        let Some(close) = list.find('}') else {
            return Vec::new();
        };
        return list[..close]
            .split(',')
            .filter_map(|item| {
                let item = item.trim();
                let exported = match item.rsplit_once(" as ") {
                    Some((_, alias)) => alias.trim(),
                    None => item,
                };
                read_ident(exported).map(str::to_string)
            })
            .collect();
    }
    if let Some(rest) = tail.strip_prefix('*') {
        return strip_keyword(rest.trim_start(), "as")
            .and_then(read_ident)
            .map(|n| vec![n.to_string()])
            .unwrap_or_default();
    }

    let rest = strip_keyword(tail, "async").unwrap_or(tail);
    if let Some(rest) = strip_keyword(rest, "function") {
        let rest = rest.strip_prefix('*').unwrap_or(rest).trim_start();
        return read_ident(rest).map(|n| vec![n.to_string()]).unwrap_or_default();
    }

    for keyword in ["const", "let", "var"] {
        if let Some(rest) = strip_keyword(tail, keyword) {
            return declared_names(rest);
        }
    }
    Vec::new()
}

fn declared_names(rest: &str) -> Vec<String> {
    let close = match rest.chars().next() {
        Some('{') => '}',
        Some('[') => ']',
        _ => return read_ident(rest).map(|n| vec![n.to_string()]).unwrap_or_default(),
    };
    let Some(end) = rest.find(close) else {
        return Vec::new();
    };
    rest[1..end]
        .split(',')
        .filter_map(|item| {
            let item = item.trim().trim_start_matches("...");
            let binding = item.split_once(':').map_or(item, |(_, b)| b);
            let binding = binding.split_once('=').map_or(binding, |(b, _)| b);
            read_ident(binding.trim()).map(str::to_string)
        })
        .collect()
}

/// Strips `keyword` when it is followed by a non-identifier character,
/// returning the remainder with leading whitespace removed.
fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(keyword)?;
    match rest.chars().next() {
        Some(c) if is_ident_char(c) => None,
        _ => Some(rest.trim_start()),
    }
}

fn read_ident(text: &str) -> Option<&str> {
    let end = text
        .char_indices()
        .find(|(_, c)| !is_ident_char(*c))
        .map_or(text.len(), |(i, _)| i);
    let ident = &text[..end];
    match ident.chars().next() {
        Some(c) if !c.is_ascii_digit() => Some(ident),
        _ => None,
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Maps helper symbol names to the file that exports them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HelperIndex {
    symbols: BTreeMap<String, PathBuf>,
}

impl HelperIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads every helper file and indexes its exports.
    ///
    /// The first file defining a name wins. Every later definition yields a
    /// warning diagnostic and is otherwise ignored.
    pub async fn scan(
        files: &[PathBuf],
        extractor: &dyn SymbolExtractor,
    ) -> Result<(Self, Vec<Diagnostic>), TemplateError> {
        let mut index = Self::new();
        let mut warnings = Vec::new();
        for file in files {
            let text = tokio::fs::read_to_string(file)
                .await
                .map_err(|source| TemplateError::Io {
                    path: file.clone(),
                    source,
                })?;
            for name in extractor.exports(file, &text) {
                if let Some(existing) = index.insert(&name, file) {
                    tracing::warn!(
                        helper = %name,
                        first = %existing.display(),
                        ignored = %file.display(),
                        "duplicate helper definition"
                    );
                    warnings.push(
                        Diagnostic::warning(
                            DiagnosticCode::DUPLICATE_HELPER,
                            format!("helper `{name}` is already defined"),
                        )
                        .in_file(file)
                        .with_note(format!("first defined in {}", existing.display())),
                    );
                }
            }
        }
        tracing::debug!(files = files.len(), symbols = index.len(), "indexed helpers");
        Ok((index, warnings))
    }

    /// Records `name` as exported by `file` unless it is already known, in
    /// which case the file of the earlier definition is returned.
    pub fn insert(&mut self, name: &str, file: &Path) -> Option<PathBuf> {
        match self.symbols.get(name) {
            Some(existing) => Some(existing.clone()),
            None => {
                self.symbols.insert(name.to_string(), file.to_path_buf());
                None
            }
        }
    }

    /// The file exporting `name`.
    pub fn get(&self, name: &str) -> Option<&Path> {
        self.symbols.get(name).map(PathBuf::as_path)
    }

    /// All symbols, sorted by name.
    pub fn symbols(&self) -> &BTreeMap<String, PathBuf> {
        &self.symbols
    }

    /// Number of indexed symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns `true` if no symbol is indexed.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
