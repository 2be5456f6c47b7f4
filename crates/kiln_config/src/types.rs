//! Option types deserialized from `kiln.toml` or built programmatically.
//!
//! Every field is optional so that partial option sets can be layered; see
//! [`PluginOptions::merge`] and [`PluginOptions::resolve`](crate::ResolvedOptions).

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

/// A path-to-string hook, used for component naming and scope tokens.
#[derive(Clone)]
pub struct PathFn(Arc<dyn Fn(&Path) -> String + Send + Sync>);

impl PathFn {
    /// Wraps a closure.
    pub fn new(f: impl Fn(&Path) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Invokes the hook.
    pub fn call(&self, path: &Path) -> String {
        (self.0)(path)
    }
}

impl fmt::Debug for PathFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PathFn(..)")
    }
}

/// Top-level plugin options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginOptions {
    /// Project root; template paths are made relative to it for scoping.
    pub root: Option<PathBuf>,
    /// Passthrough options handed to the template parser unchanged.
    pub template: Option<toml::Table>,
    /// File extensions handled as templates (without the leading dot).
    pub template_extensions: Option<Vec<String>>,
    /// Helper files scanned for exported symbols.
    pub helpers: Option<Vec<PathBuf>>,
    /// Whether stylesheet output carries an inline source map.
    pub source_map: Option<bool>,
    /// Maps a template path to its component name.
    #[serde(skip)]
    pub component_name: Option<PathFn>,
    /// Stylesheet options.
    #[serde(default)]
    pub css: CssOptions,
}

/// Stylesheet options, merged independently of the top-level fields.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CssOptions {
    /// Run `.scss` files through the preprocessor.
    pub preprocess: Option<bool>,
    /// Emit stylesheet imports from compiled templates.
    pub bundle: Option<bool>,
    /// How the scope token is attached to selectors.
    pub strategy: Option<ScopeStrategy>,
    /// Maps a root-relative template path to its scope token.
    #[serde(skip)]
    pub scope: Option<PathFn>,
}

/// How a scope token is attached to a selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeStrategy {
    /// `.btn` becomes `.btn.s1234abcd`.
    #[default]
    Class,
    /// `.btn` becomes `.btn[data-s1234abcd]`.
    Attribute,
}

impl PluginOptions {
    /// Layers `over` on top of `self`.
    ///
    /// Each field of `over` that is set wins; unset fields fall back to
    /// `self`. The `css` table is merged field by field, so setting
    /// `css.bundle` in `over` keeps `css.preprocess` from `self`.
    pub fn merge(self, over: PluginOptions) -> PluginOptions {
        PluginOptions {
            root: over.root.or(self.root),
            template: over.template.or(self.template),
            template_extensions: over.template_extensions.or(self.template_extensions),
            helpers: over.helpers.or(self.helpers),
            source_map: over.source_map.or(self.source_map),
            component_name: over.component_name.or(self.component_name),
            css: self.css.merge(over.css),
        }
    }
}

impl CssOptions {
    /// Layers `over` on top of `self`, field by field.
    pub fn merge(self, over: CssOptions) -> CssOptions {
        CssOptions {
            preprocess: over.preprocess.or(self.preprocess),
            bundle: over.bundle.or(self.bundle),
            strategy: over.strategy.or(self.strategy),
            scope: over.scope.or(self.scope),
        }
    }
}
