//! Stylesheet pipeline: optional preprocessing, selector scoping, and inline
//! source maps.
//!
//! The preprocessor and the scoping transform are collaborators behind the
//! [`Preprocessor`] and [`Scoper`] traits. [`ImportInliner`] and
//! [`SelectorScoper`] are small built-in implementations that resolve
//! `@import`s and attach scope tokens to selectors.

#![warn(missing_docs)]

pub mod error;
pub mod pipeline;
pub mod preprocess;
pub mod scope;
pub mod source_map;

pub use error::StyleError;
pub use pipeline::{ProcessedStyle, StyleKind, StylePipeline, StyleRequest};
pub use preprocess::{ImportInliner, Preprocessed, PreprocessOptions, Preprocessor};
pub use scope::{ScopeConfig, ScopeOptions, Scoped, Scoper, SelectorScoper};
pub use source_map::append_inline_map;
