//! Template compilation glue.
//!
//! [`TemplateCompiler`] turns a template file into a [`TemplateEntry`]: it
//! derives the component's scope token, runs the [`TemplateParser`]
//! collaborator, and prepends a header that re-exports inline scripts and
//! imports stylesheets as separately loadable virtual modules.
//!
//! [`MarkupParser`] is a small built-in parser/generator, and
//! [`ExportScanner`] a built-in [`SymbolExtractor`] for helper files.
//!
//! [`TemplateEntry`]: kiln_cache::TemplateEntry

#![warn(missing_docs)]

pub mod compiler;
pub mod error;
pub mod helpers;
pub mod markup;
pub mod parser;

pub use compiler::TemplateCompiler;
pub use error::TemplateError;
pub use helpers::{ExportScanner, HelperIndex, SymbolExtractor};
pub use markup::MarkupParser;
pub use parser::{CompileConfig, Generated, ParsedTemplate, ResourceNode, TemplateParser, MODULE_FORMAT};
