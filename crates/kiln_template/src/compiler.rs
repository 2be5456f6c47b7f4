//! Template compilation: scope token, parse, header synthesis, generate.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use kiln_cache::{CacheEntry, CacheKey, Resource, TemplateEntry};
use kiln_common::{relative_to_root, Fingerprinter};
use kiln_config::ResolvedOptions;
use kiln_diagnostics::{Diagnostic, DiagnosticCode};
use kiln_source::{LineIndex, VirtualId};

use crate::error::TemplateError;
use crate::helpers::HelperIndex;
use crate::parser::{CompileConfig, ResourceNode, TemplateParser, MODULE_FORMAT};

/// Compiles template files into [`TemplateEntry`] values.
///
/// The compiled module starts with a header that turns every inline script
/// into a re-exported virtual module and every stylesheet into an imported
/// one, so the bundler requests them back through the loader.
#[derive(Clone)]
pub struct TemplateCompiler {
    parser: Arc<dyn TemplateParser>,
    fingerprints: Arc<Fingerprinter>,
}

impl TemplateCompiler {
    /// Creates a compiler around a parser collaborator.
    pub fn new(parser: Arc<dyn TemplateParser>, fingerprints: Arc<Fingerprinter>) -> Self {
        Self { parser, fingerprints }
    }

    /// The scope token of the template at `file`.
    ///
    /// Derived from the root-relative, `/`-separated path: a configured
    /// `css.scope` hook receives that path, otherwise the token is `s`
    /// followed by its fingerprint.
    pub fn scope_token(&self, file: &Path, options: &ResolvedOptions) -> String {
        let relative = relative_to_root(file, &options.root);
        match &options.css.scope {
            Some(hook) => hook.call(Path::new(&relative)),
            None => format!("s{}", self.fingerprints.fingerprint(&relative)),
        }
    }

    /// Reads, parses and generates the template at `file`.
    ///
    /// The returned entry carries `cache_key`, no dependencies and a fresh
    /// style sub-cache. Parser warnings become diagnostics on the entry;
    /// warnings whose offset lies outside every line are dropped.
    pub async fn compile(
        &self,
        file: &Path,
        cache_key: CacheKey,
        options: &ResolvedOptions,
        helpers: &HelperIndex,
    ) -> Result<TemplateEntry, TemplateError> {
        let started = Instant::now();
        let source = tokio::fs::read_to_string(file)
            .await
            .map_err(|source| TemplateError::Io {
                path: file.to_path_buf(),
                source,
            })?;

        let scope = self.scope_token(file, options);
        let config = CompileConfig {
            file: file.to_path_buf(),
            module_format: MODULE_FORMAT.to_string(),
            scope: scope.clone(),
            component_name: options.component_name.call(file),
            helpers: helpers.symbols().clone(),
            options: options.template.clone(),
        };

        let lines = LineIndex::new(&source);
        let mut diagnostics = Vec::new();
        let mut parsed = self.parser.parse(&source, file, &config, &mut |message, offset| {
            match lines.locate(offset) {
                Some(location) => diagnostics.push(
                    Diagnostic::warning(DiagnosticCode::TEMPLATE_WARNING, message)
                        .in_file(file)
                        .at(location),
                ),
                None => tracing::debug!(offset, %message, "dropped template warning without a location"),
            }
        })?;

        let mut header = String::new();
        let mut scripts = Vec::with_capacity(parsed.scripts.len());
        for (index, node) in parsed.scripts.iter_mut().enumerate() {
            if node.is_inline() {
                let id = VirtualId::script(file, index).to_string();
                if node.content.as_deref().is_some_and(str::is_empty) {
                    scripts.push(Resource {
                        url: id,
                        content: None,
                        lang: node.lang.clone(),
                    });
                    continue;
                }
                header.push_str(&format!("export * from {};\n", quote(file, &id)?));
                scripts.push(Resource {
                    url: id,
                    content: node.content.replace(String::new()),
                    lang: node.lang.clone(),
                });
            } else {
                scripts.push(external(node));
            }
        }

        let mut styles = Vec::with_capacity(parsed.stylesheets.len());
        for (index, node) in parsed.stylesheets.iter().enumerate() {
            let resource = match &node.href {
                None => Resource {
                    url: VirtualId::stylesheet(file, Some(scope.clone()), Some(index)).to_string(),
                    content: node.content.clone(),
                    lang: node.lang.clone(),
                },
                Some(href) => Resource {
                    url: VirtualId::stylesheet(href, Some(scope.clone()), None).to_string(),
                    content: None,
                    lang: node.lang.clone(),
                },
            };
            if options.css.bundle {
                header.push_str(&format!("import {};\n", quote(file, &resource.url)?));
            }
            styles.push(resource);
        }

        let generated = self.parser.generate(&parsed, &config)?;
        let mut entry = CacheEntry::new(cache_key, source, header + &generated.code);
        entry.diagnostics = diagnostics;

        tracing::debug!(
            file = %file.display(),
            scope = %scope,
            scripts = scripts.len(),
            styles = styles.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "compiled template"
        );
        Ok(TemplateEntry::new(entry, scripts, styles))
    }
}

fn external(node: &ResourceNode) -> Resource {
    Resource {
        url: node.href.clone().unwrap_or_default(),
        content: None,
        lang: node.lang.clone(),
    }
}

fn quote(file: &Path, text: &str) -> Result<String, TemplateError> {
    serde_json::to_string(text).map_err(|e| TemplateError::Generate {
        file: file.to_path_buf(),
        message: e.to_string(),
    })
}
