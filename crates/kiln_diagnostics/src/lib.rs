//! Structured diagnostics for template and stylesheet compilation.
//!
//! [`Diagnostic`] values carry a severity, a stable code, the file they
//! belong to and an optional 0-based location. The thread-safe
//! [`DiagnosticSink`] collects diagnostics that are not attached to a load
//! result, and [`TerminalRenderer`] formats them for the CLI.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
