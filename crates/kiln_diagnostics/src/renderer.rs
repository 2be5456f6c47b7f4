//! Diagnostic rendering for terminal output.

use crate::diagnostic::Diagnostic;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic, quoting `source` when it is available.
    fn render(&self, diag: &Diagnostic, source: Option<&str>) -> String;
}

/// Renders diagnostics in a rustc-style terminal format.
///
/// ```text
/// warning[W001]: attribute `scoped` is deprecated
///   --> src/card.html:3:8
///    |
///  3 | <style scoped>
///    |        ^
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, text: &str, ansi: &str) -> String {
        if self.color {
            format!("\x1b[{ansi}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic, source: Option<&str>) -> String {
        let ansi = if diag.severity.is_error() { "1;31" } else { "1;33" };
        let mut out = format!(
            "{}: {}\n",
            self.paint(&format!("{}[{}]", diag.severity, diag.code), ansi),
            diag.message
        );

        if let Some(file) = &diag.file {
            match diag.location {
                Some(loc) => out.push_str(&format!("  --> {}:{loc}\n", file.display())),
                None => out.push_str(&format!("  --> {}\n", file.display())),
            }
        }

        if let (Some(loc), Some(text)) = (diag.location, source) {
            if let Some(line) = text.lines().nth(loc.line as usize) {
                let line_num = (loc.line + 1).to_string();
                let padding = " ".repeat(line_num.len());
                out.push_str(&format!("{padding} |\n"));
                out.push_str(&format!("{line_num} | {line}\n"));
                out.push_str(&format!(
                    "{padding} | {}^\n",
                    " ".repeat(loc.column as usize)
                ));
            }
        }

        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        out
    }
}
