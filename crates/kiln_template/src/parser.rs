//! The template parser / code generator interface.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::TemplateError;

/// Module format requested from every generator.
pub const MODULE_FORMAT: &str = "esm";

/// Settings handed to the parser and the generator for one template.
#[derive(Clone, Debug)]
pub struct CompileConfig {
    /// The template being compiled.
    pub file: PathBuf,
    /// Output module format, always [`MODULE_FORMAT`].
    pub module_format: String,
    /// Scope token shared by the markup and its stylesheets.
    pub scope: String,
    /// Name of the component.
    pub component_name: String,
    /// Helper symbols and the file exporting each of them.
    pub helpers: BTreeMap<String, PathBuf>,
    /// Parser options passed through from configuration unchanged.
    pub options: toml::Table,
}

/// A script or stylesheet element found in a template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceNode {
    /// External reference (`src` or `href`), if any.
    pub href: Option<String>,
    /// Inline body; `None` for external resources.
    pub content: Option<String>,
    /// Dialect tag such as `js`, `ts`, `css` or `scss`.
    pub lang: String,
}

impl ResourceNode {
    /// Returns `true` if the element carries its content inline.
    pub fn is_inline(&self) -> bool {
        self.href.is_none()
    }
}

/// The parsed form of a template.
///
/// Resource lists are in document order. `body` is the parser's own
/// representation of everything else and is only read back by the same
/// parser's generator.
#[derive(Clone, Debug, Default)]
pub struct ParsedTemplate {
    /// Stylesheet elements.
    pub stylesheets: Vec<ResourceNode>,
    /// Script elements.
    pub scripts: Vec<ResourceNode>,
    /// Remaining template body.
    pub body: String,
}

/// Generator output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generated {
    /// Module source.
    pub code: String,
    /// Source map JSON, if the generator produced one.
    pub map: Option<String>,
}

/// Parses templates and generates module code from the parsed form.
pub trait TemplateParser: Send + Sync {
    /// Parses `source`. Non-fatal problems are reported through `warn` as a
    /// message and a byte offset into `source`.
    fn parse(
        &self,
        source: &str,
        file: &Path,
        config: &CompileConfig,
        warn: &mut dyn FnMut(&str, usize),
    ) -> Result<ParsedTemplate, TemplateError>;

    /// Generates module code for a parsed template.
    fn generate(&self, parsed: &ParsedTemplate, config: &CompileConfig) -> Result<Generated, TemplateError>;
}
