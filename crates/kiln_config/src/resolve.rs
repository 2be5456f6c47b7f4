//! Resolution of layered options into concrete settings.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::types::{PathFn, PluginOptions, ScopeStrategy};

/// Extensions always routed to the stylesheet pipeline.
const STYLE_EXTENSIONS: &[&str] = &["css", "scss"];

/// Options with every field concrete, ready for a build session.
#[derive(Debug, Clone)]
pub struct ResolvedOptions {
    /// Absolute or cwd-relative project root.
    pub root: PathBuf,
    /// Passthrough template parser options.
    pub template: toml::Table,
    /// Lowercase template extensions without the leading dot.
    pub template_extensions: Vec<String>,
    /// Helper files, joined onto `root` when relative.
    pub helpers: Vec<PathBuf>,
    /// Whether stylesheet output carries an inline source map.
    pub source_map: bool,
    /// Component naming hook.
    pub component_name: PathFn,
    /// Stylesheet settings.
    pub css: ResolvedCss,
}

/// Concrete stylesheet settings.
#[derive(Debug, Clone)]
pub struct ResolvedCss {
    /// Run `.scss` files through the preprocessor.
    pub preprocess: bool,
    /// Emit stylesheet imports from compiled templates.
    pub bundle: bool,
    /// How scope tokens attach to selectors.
    pub strategy: ScopeStrategy,
    /// Custom scope token hook; `None` selects the fingerprint default.
    pub scope: Option<PathFn>,
}

impl PluginOptions {
    /// Fills unset fields with defaults and validates the result.
    pub fn resolve(self) -> Result<ResolvedOptions, ConfigError> {
        let root = self.root.unwrap_or_else(|| PathBuf::from("."));
        let template_extensions: Vec<String> = self
            .template_extensions
            .unwrap_or_else(|| vec!["html".to_string()])
            .into_iter()
            .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
            .collect();
        validate_extensions(&template_extensions)?;

        let helpers = self
            .helpers
            .unwrap_or_default()
            .into_iter()
            .map(|p| if p.is_relative() { root.join(p) } else { p })
            .collect();

        Ok(ResolvedOptions {
            template: self.template.unwrap_or_default(),
            template_extensions,
            helpers,
            source_map: self.source_map.unwrap_or(true),
            component_name: self
                .component_name
                .unwrap_or_else(|| PathFn::new(kiln_common::default_component_name)),
            css: ResolvedCss {
                preprocess: self.css.preprocess.unwrap_or(true),
                bundle: self.css.bundle.unwrap_or(true),
                strategy: self.css.strategy.unwrap_or_default(),
                scope: self.css.scope,
            },
            root,
        })
    }
}

impl ResolvedOptions {
    /// Returns `true` if `ext` is a configured template extension.
    pub fn is_template_extension(&self, ext: &str) -> bool {
        self.template_extensions.iter().any(|e| e == ext)
    }

    /// Returns `true` if `path` has a template extension.
    pub fn is_template(&self, path: &Path) -> bool {
        path.extension()
            .map(|e| self.is_template_extension(&e.to_string_lossy().to_ascii_lowercase()))
            .unwrap_or(false)
    }
}

fn validate_extensions(exts: &[String]) -> Result<(), ConfigError> {
    if exts.is_empty() {
        return Err(ConfigError::ValidationError(
            "template_extensions must not be empty".to_string(),
        ));
    }
    for ext in exts {
        if ext.is_empty() {
            return Err(ConfigError::ValidationError(
                "template_extensions contains an empty extension".to_string(),
            ));
        }
        if STYLE_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "'{ext}' is a stylesheet extension and cannot be a template extension"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CssOptions;

    #[test]
    fn defaults() {
        let resolved = PluginOptions::default().resolve().unwrap();
        assert_eq!(resolved.root, PathBuf::from("."));
        assert_eq!(resolved.template_extensions, vec!["html"]);
        assert!(resolved.source_map);
        assert!(resolved.css.preprocess);
        assert!(resolved.css.bundle);
        assert_eq!(resolved.css.strategy, ScopeStrategy::Class);
        assert!(resolved.css.scope.is_none());
        assert_eq!(
            resolved
                .component_name
                .call(Path::new("components/button/index.html")),
            "button"
        );
    }

    #[test]
    fn extensions_are_normalized() {
        let resolved = PluginOptions {
            template_extensions: Some(vec![".HTML".into(), "tpl".into()]),
            ..Default::default()
        }
        .resolve()
        .unwrap();
        assert_eq!(resolved.template_extensions, vec!["html", "tpl"]);
        assert!(resolved.is_template(Path::new("a/b.tpl")));
        assert!(!resolved.is_template(Path::new("a/b.css")));
    }

    #[test]
    fn style_extension_rejected() {
        let err = PluginOptions {
            template_extensions: Some(vec!["scss".into()]),
            ..Default::default()
        }
        .resolve()
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn empty_extensions_rejected() {
        let err = PluginOptions {
            template_extensions: Some(vec![]),
            ..Default::default()
        }
        .resolve()
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn relative_helpers_join_root() {
        let resolved = PluginOptions {
            root: Some(PathBuf::from("/work/app")),
            helpers: Some(vec![PathBuf::from("src/helpers.ts")]),
            css: CssOptions::default(),
            ..Default::default()
        }
        .resolve()
        .unwrap();
        assert_eq!(
            resolved.helpers,
            vec![PathBuf::from("/work/app/src/helpers.ts")]
        );
    }
}
