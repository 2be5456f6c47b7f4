//! Thread-safe diagnostic accumulator.

use parking_lot::Mutex;

use crate::diagnostic::Diagnostic;

/// A thread-safe accumulator for diagnostics that are not returned inline
/// with a load result (missing sub-resources, duplicate helpers).
pub struct DiagnosticSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl DiagnosticSink {
    /// Creates a new empty diagnostic sink.
    pub fn new() -> Self {
        Self {
            diagnostics: Mutex::new(Vec::new()),
        }
    }

    /// Emits a diagnostic into the sink.
    pub fn emit(&self, diag: Diagnostic) {
        self.diagnostics.lock().push(diag);
    }

    /// Takes all accumulated diagnostics, leaving the sink empty.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.lock())
    }

    /// Returns a snapshot of all accumulated diagnostics without draining.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::DiagnosticCode;

    fn make_warning() -> Diagnostic {
        Diagnostic::warning(DiagnosticCode::MISSING_SUB_RESOURCE, "test warning")
    }

    #[test]
    fn empty_sink() {
        let sink = DiagnosticSink::new();
        assert!(sink.diagnostics().is_empty());
        assert!(sink.take_all().is_empty());
    }

    #[test]
    fn keeps_emission_order() {
        let sink = DiagnosticSink::new();
        sink.emit(Diagnostic::error(DiagnosticCode::LOAD_FAILED, "boom"));
        sink.emit(make_warning());
        let diags = sink.diagnostics();
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].code, DiagnosticCode::LOAD_FAILED);
        assert_eq!(diags[1].code, DiagnosticCode::MISSING_SUB_RESOURCE);
    }

    #[test]
    fn take_all_drains() {
        let sink = DiagnosticSink::new();
        sink.emit(make_warning());
        assert_eq!(sink.take_all().len(), 1);
        assert!(sink.take_all().is_empty());
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let sink = Arc::new(DiagnosticSink::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || {
                    for _ in 0..50 {
                        sink.emit(make_warning());
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(sink.take_all().len(), 400);
    }
}
