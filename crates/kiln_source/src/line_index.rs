//! Line spans for byte-offset to line/column resolution.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A 0-based line and column inside a source text.
///
/// The column is a byte offset from the start of the line.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Location {
    /// 0-based line index.
    pub line: u32,
    /// 0-based byte offset within the line.
    pub column: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// Precomputed `[start, end)` byte spans of every line in a text.
///
/// Lines are split on `\r`, `\n` or `\r\n`; terminators belong to no span.
#[derive(Clone, Debug)]
pub struct LineIndex {
    spans: Vec<(u32, u32)>,
}

impl LineIndex {
    /// Scans `text` and records the span of each line.
    ///
    /// Scanning stops at the first line whose bounds do not fit in `u32`;
    /// offsets past that point resolve to no location.
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut spans = Vec::new();
        let mut start = 0usize;
        let mut i = 0usize;
        while i < bytes.len() {
            let terminator = match bytes[i] {
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => 2,
                b'\r' | b'\n' => 1,
                _ => {
                    i += 1;
                    continue;
                }
            };
            let Some(bounds) = span(start, i) else {
                return Self { spans };
            };
            spans.push(bounds);
            i += terminator;
            start = i;
        }
        if let Some(bounds) = span(start, bytes.len()) {
            spans.push(bounds);
        }
        Self { spans }
    }

    /// Resolves a byte offset to its line and column.
    ///
    /// Returns `None` when the offset falls outside every line span, which
    /// includes offsets pointing at a line terminator or past the end.
    pub fn locate(&self, offset: usize) -> Option<Location> {
        let offset = u32::try_from(offset).ok()?;
        let idx = match self.spans.binary_search_by(|(start, _)| start.cmp(&offset)) {
            Ok(idx) => idx,
            Err(0) => return None,
            Err(idx) => idx - 1,
        };
        let (start, end) = self.spans[idx];
        (offset < end).then(|| Location {
            line: idx as u32,
            column: offset - start,
        })
    }
}

fn span(start: usize, end: usize) -> Option<(u32, u32)> {
    Some((u32::try_from(start).ok()?, u32::try_from(end).ok()?))
}
