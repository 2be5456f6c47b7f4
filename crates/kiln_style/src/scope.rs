//! Selector scoping.

use std::path::Path;

use kiln_config::ScopeStrategy;

use crate::error::StyleError;

/// Settings forwarded to the scoping transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScopeConfig {
    /// How the token attaches to selectors.
    pub strategy: ScopeStrategy,
}

/// Per-call inputs of the scoping transform besides code and token.
#[derive(Clone, Copy, Debug)]
pub struct ScopeOptions<'a> {
    /// The stylesheet's path, for error messages and maps.
    pub filename: &'a Path,
    /// Incoming source map JSON, if any.
    pub map: Option<&'a str>,
    /// Transform settings.
    pub config: &'a ScopeConfig,
}

/// Result of a scoping transform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scoped {
    /// Scoped code only; any incoming map is kept by the caller.
    PlainCode(String),
    /// Scoped code with a map that replaces the incoming one.
    CodeWithMap {
        /// Scoped code.
        code: String,
        /// Source map JSON.
        map: String,
    },
}

/// Rewrites a stylesheet so its rules only match elements carrying `scope`.
pub trait Scoper: Send + Sync {
    /// Scopes `code` with the token `scope`.
    fn scope(&self, code: &str, scope: &str, options: &ScopeOptions<'_>) -> Result<Scoped, StyleError>;
}

/// Conditional group rules whose bodies contain style rules to scope.
const GROUP_RULES: &[&str] = &["media", "supports", "layer", "container", "document"];

/// Appends the scope token to every selector of every style rule.
///
/// Pseudo-elements stay last (`.a::before` becomes `.a.s1::before`).
/// `@keyframes`, `@font-face` and other non-group at-rules are copied
/// unchanged. Always returns [`Scoped::PlainCode`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SelectorScoper;

impl Scoper for SelectorScoper {
    fn scope(&self, code: &str, scope: &str, options: &ScopeOptions<'_>) -> Result<Scoped, StyleError> {
        let marker = match options.config.strategy {
            ScopeStrategy::Class => format!(".{scope}"),
            ScopeStrategy::Attribute => format!("[data-{scope}]"),
        };
        let mut out = String::with_capacity(code.len() + code.len() / 4);
        scope_rules(code, &marker, &mut out).map_err(|message| StyleError::Scope {
            file: options.filename.to_path_buf(),
            message,
        })?;
        Ok(Scoped::PlainCode(out))
    }
}

fn scope_rules(css: &str, marker: &str, out: &mut String) -> Result<(), String> {
    let bytes = css.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() {
        let Some(stop) = find_top_level(css, pos, &[b'{', b';', b'}']) else {
            out.push_str(&css[pos..]);
            return Ok(());
        };
        match bytes[stop] {
            b'}' => return Err("unexpected '}'".to_string()),
            b';' => {
                out.push_str(&css[pos..=stop]);
                pos = stop + 1;
            }
            _ => {
                let close = matching_brace(css, stop).ok_or("unclosed '{'")?;
                let prelude = &css[pos..stop];
                let body = &css[stop + 1..close];
                let trimmed = prelude.trim_start();
                out.push_str(&prelude[..prelude.len() - trimmed.len()]);

                if let Some(at_rule) = trimmed.strip_prefix('@') {
                    let name: String = at_rule
                        .chars()
                        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
                        .collect();
                    out.push_str(trimmed);
                    out.push('{');
                    if GROUP_RULES.contains(&name.to_ascii_lowercase().as_str()) {
                        scope_rules(body, marker, out)?;
                    } else {
                        out.push_str(body);
                    }
                } else {
                    out.push_str(&scope_selector_list(trimmed, marker));
                    out.push('{');
                    out.push_str(body);
                }
                out.push('}');
                pos = close + 1;
            }
        }
    }
    Ok(())
}

fn scope_selector_list(prelude: &str, marker: &str) -> String {
    let trailing = &prelude[prelude.trim_end().len()..];
    let selectors: Vec<String> = split_top_level_commas(prelude.trim_end())
        .into_iter()
        .map(|sel| scope_selector(sel.trim(), marker))
        .collect();
    format!("{}{trailing}", selectors.join(", "))
}

fn scope_selector(selector: &str, marker: &str) -> String {
    match selector.find("::") {
        Some(idx) => format!("{}{marker}{}", &selector[..idx], &selector[idx..]),
        None => format!("{selector}{marker}"),
    }
}

fn split_top_level_commas(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Finds the first of `targets` at `from` or later, skipping strings and comments.
fn find_top_level(css: &str, from: usize, targets: &[u8]) -> Option<usize> {
    let bytes = css.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = css[i + 2..].find("*/").map(|e| i + 2 + e + 2)?;
                continue;
            }
            quote @ (b'"' | b'\'') => {
                i = skip_string(bytes, i, quote)?;
                continue;
            }
            b if targets.contains(&b) => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}

fn skip_string(bytes: &[u8], open: usize, quote: u8) -> Option<usize> {
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

fn matching_brace(css: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut pos = open;
    loop {
        let idx = find_top_level(css, pos, &[b'{', b'}'])?;
        if css.as_bytes()[idx] == b'{' {
            depth += 1;
        } else {
            depth -= 1;
            if depth == 0 {
                return Some(idx);
            }
        }
        pos = idx + 1;
    }
}
