//! The build session: caches, collaborators and the load state machine.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use kiln_cache::{
    validate, CacheEntry, CacheKey, CacheStats, EntryCache, IdentityResolver, StatsSnapshot, TemplateEntry,
};
use kiln_common::Fingerprinter;
use kiln_config::ResolvedOptions;
use kiln_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use kiln_source::{extension_of, VirtualId};
use kiln_style::{
    ImportInliner, Preprocessor, ScopeConfig, Scoper, SelectorScoper, StyleError, StyleKind, StylePipeline,
    StyleRequest,
};
use kiln_template::{ExportScanner, HelperIndex, MarkupParser, SymbolExtractor, TemplateCompiler, TemplateParser};
use parking_lot::Mutex;

use crate::error::LoadError;
use crate::request::{is_stylesheet_extension, Request};
use crate::response::{LoadResult, Loader};

/// Configures the collaborators of a [`Session`].
///
/// Every collaborator defaults to the built-in implementation.
pub struct SessionBuilder {
    options: ResolvedOptions,
    parser: Arc<dyn TemplateParser>,
    preprocessor: Arc<dyn Preprocessor>,
    scoper: Arc<dyn Scoper>,
    extractor: Arc<dyn SymbolExtractor>,
}

impl SessionBuilder {
    /// Replaces the template parser and code generator.
    pub fn parser(mut self, parser: Arc<dyn TemplateParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Replaces the stylesheet preprocessor.
    pub fn preprocessor(mut self, preprocessor: Arc<dyn Preprocessor>) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    /// Replaces the selector scoping transform.
    pub fn scoper(mut self, scoper: Arc<dyn Scoper>) -> Self {
        self.scoper = scoper;
        self
    }

    /// Replaces the helper symbol extractor.
    pub fn symbol_extractor(mut self, extractor: Arc<dyn SymbolExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Creates the session. A relative root is resolved against the
    /// current directory.
    pub fn build(self) -> Session {
        let mut options = self.options;
        if options.root.is_relative() {
            if let Ok(cwd) = std::env::current_dir() {
                options.root = cwd.join(&options.root);
            }
        }
        let scope_config = ScopeConfig {
            strategy: options.css.strategy,
        };
        Session {
            compiler: TemplateCompiler::new(self.parser, Arc::new(Fingerprinter::new())),
            styles: StylePipeline::new(self.preprocessor, self.scoper),
            extractor: self.extractor,
            scope_config,
            identities: IdentityResolver::new(),
            templates: EntryCache::new(),
            stylesheets: EntryCache::new(),
            helpers: Mutex::new(Arc::new(HelperIndex::new())),
            sink: DiagnosticSink::new(),
            stats: CacheStats::default(),
            options,
        }
    }
}

/// One build integration instance and all of its caches.
///
/// Caches live as long as the session. Template entries are keyed by file
/// path, their inline styles live in each entry's private sub-cache, and
/// directly requested stylesheets share one top-level cache keyed by the
/// full module identifier.
pub struct Session {
    options: ResolvedOptions,
    compiler: TemplateCompiler,
    styles: StylePipeline,
    extractor: Arc<dyn SymbolExtractor>,
    scope_config: ScopeConfig,
    identities: IdentityResolver,
    templates: EntryCache<TemplateEntry>,
    stylesheets: EntryCache<CacheEntry>,
    helpers: Mutex<Arc<HelperIndex>>,
    sink: DiagnosticSink,
    stats: CacheStats,
}

impl Session {
    /// Creates a session with the built-in collaborators.
    pub fn new(options: ResolvedOptions) -> Self {
        Self::builder(options).build()
    }

    /// Starts configuring a session.
    pub fn builder(options: ResolvedOptions) -> SessionBuilder {
        SessionBuilder {
            options,
            parser: Arc::new(MarkupParser),
            preprocessor: Arc::new(ImportInliner),
            scoper: Arc::new(SelectorScoper),
            extractor: Arc::new(ExportScanner),
        }
    }

    /// The resolved options of this session.
    pub fn options(&self) -> &ResolvedOptions {
        &self.options
    }

    /// Signals the start of a build pass.
    ///
    /// Forgets all memoized file identities (entries stay cached and are
    /// revalidated on demand) and rescans the helper files.
    pub async fn build_start(&self) -> Result<(), LoadError> {
        self.identities.begin_pass();
        let (index, warnings) = HelperIndex::scan(&self.options.helpers, self.extractor.as_ref()).await?;
        for warning in warnings {
            self.sink.emit(warning);
        }
        *self.helpers.lock() = Arc::new(index);
        tracing::debug!(
            templates = self.templates.len(),
            stylesheets = self.stylesheets.len(),
            "build pass started"
        );
        Ok(())
    }

    /// Resolves one module identifier.
    ///
    /// Returns `Ok(None)` for files this integration does not handle and for
    /// missing sub-resources; the latter also leave one warning in
    /// [`diagnostics`](Self::diagnostics).
    pub async fn load(&self, id: &str) -> Result<Option<LoadResult>, LoadError> {
        let parsed = match VirtualId::parse(id) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = Path::new(id.split_once('?').map_or(id, |(path, _)| path));
                return if self.handles(path) { Err(err.into()) } else { Ok(None) };
            }
        };
        let Some(request) = Request::classify(&parsed, &self.options) else {
            return Ok(None);
        };
        tracing::trace!(id, ?request, "load");

        let path = parsed.path.as_path();
        match request {
            Request::Template => self.load_template(path).await.map(Some),
            Request::InlineScript { index } => self.load_inline_script(id, path, index).await,
            Request::InlineStyle { scope, index } => self.load_inline_style(id, path, scope, index).await,
            Request::Stylesheet { scope } => self.load_stylesheet(id, path, scope).await.map(Some),
        }
    }

    /// Diagnostics not attached to any load result.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.sink.diagnostics()
    }

    /// Drains the diagnostics not attached to any load result.
    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        self.sink.take_all()
    }

    /// Cache hit and miss counts since the session was created.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Number of cached template entries.
    pub fn cached_templates(&self) -> usize {
        self.templates.len()
    }

    /// Number of cached top-level stylesheet entries.
    pub fn cached_stylesheets(&self) -> usize {
        self.stylesheets.len()
    }

    /// Drops every template and stylesheet entry. Inline style sub-caches go
    /// with their templates.
    pub fn clear_caches(&self) {
        self.templates.clear();
        self.stylesheets.clear();
        tracing::debug!("cleared entry caches");
    }

    fn handles(&self, path: &Path) -> bool {
        extension_of(path)
            .map(|ext| self.options.is_template_extension(&ext) || is_stylesheet_extension(&ext))
            .unwrap_or(false)
    }

    async fn load_template(&self, path: &Path) -> Result<LoadResult, LoadError> {
        let (entry, hit) = self.template_entry(path).await?;
        if hit {
            self.stats.hit();
        } else {
            self.stats.miss();
        }
        Ok(LoadResult {
            contents: entry.base.code.clone(),
            loader: Loader::Script,
            diagnostics: entry.base.diagnostics.clone(),
            watch_files: Vec::new(),
        })
    }

    /// Returns a valid entry for the template at `path`, compiling it when
    /// absent or stale. The flag reports whether the cached entry was reused.
    async fn template_entry(&self, path: &Path) -> Result<(Arc<TemplateEntry>, bool), LoadError> {
        let key = self.identities.identity(path).await?;
        let cache_id = template_cache_id(path);
        if let Some(cached) = self.templates.get(&cache_id) {
            if validate(Some(cached.as_ref()), &key, &self.identities).await {
                tracing::debug!(file = %path.display(), "template cache hit");
                return Ok((cached, true));
            }
        }

        let helpers = self.helpers.lock().clone();
        let entry = Arc::new(self.compiler.compile(path, key, &self.options, &helpers).await?);
        self.templates.put(cache_id, Arc::clone(&entry));
        Ok((entry, false))
    }

    /// The entry owning an inline sub-resource, brought up to date.
    async fn owning_template(&self, path: &Path) -> Result<Arc<TemplateEntry>, LoadError> {
        if self.templates.get(&template_cache_id(path)).is_none() {
            return Err(LoadError::MissingTemplate(path.to_path_buf()));
        }
        let (entry, hit) = self.template_entry(path).await?;
        if !hit {
            self.stats.miss();
        }
        Ok(entry)
    }

    async fn load_inline_script(&self, id: &str, path: &Path, index: usize) -> Result<Option<LoadResult>, LoadError> {
        let template = self.owning_template(path).await?;
        let Some((content, lang)) = template
            .scripts
            .get(index)
            .and_then(|script| present(&script.content).map(|c| (c, &script.lang)))
        else {
            return Ok(self.missing_sub_resource(id, path));
        };
        Ok(Some(LoadResult {
            contents: content.clone(),
            loader: Loader::for_script(lang),
            diagnostics: Vec::new(),
            watch_files: Vec::new(),
        }))
    }

    async fn load_inline_style(
        &self,
        id: &str,
        path: &Path,
        scope: Option<String>,
        index: Option<usize>,
    ) -> Result<Option<LoadResult>, LoadError> {
        let template = self.owning_template(path).await?;
        let Some((content, lang)) = index
            .and_then(|i| template.styles.get(i))
            .and_then(|style| present(&style.content).map(|c| (c, &style.lang)))
        else {
            return Ok(self.missing_sub_resource(id, path));
        };

        let key = template.base.cache_key.clone();
        if let Some(cached) = template.style_cache.get(id) {
            if validate(Some(cached.as_ref()), &key, &self.identities).await {
                self.stats.hit();
                tracing::debug!(id, "inline style cache hit");
                return Ok(Some(style_result(&cached)));
            }
        }
        self.stats.miss();

        let scope = scope.unwrap_or_else(|| self.compiler.scope_token(path, &self.options));
        let kind = StyleKind::from_lang(lang, self.options.css.preprocess).unwrap_or(StyleKind::Css);
        let mut entry = self.process_style(path, key.clone(), content, Some(&scope), kind).await?;
        entry.dependencies.insert(path.to_path_buf(), key);

        let entry = Arc::new(entry);
        template.style_cache.put(id, Arc::clone(&entry));
        Ok(Some(style_result(&entry)))
    }

    async fn load_stylesheet(&self, id: &str, path: &Path, scope: Option<String>) -> Result<LoadResult, LoadError> {
        let key = self.identities.identity(path).await?;
        if let Some(cached) = self.stylesheets.get(id) {
            if validate(Some(cached.as_ref()), &key, &self.identities).await {
                self.stats.hit();
                tracing::debug!(id, "stylesheet cache hit");
                return Ok(style_result(&cached));
            }
        }
        self.stats.miss();

        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| StyleError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let kind = extension_of(path)
            .and_then(|ext| StyleKind::from_lang(&ext, self.options.css.preprocess))
            .unwrap_or(StyleKind::Css);
        let entry = Arc::new(self.process_style(path, key, &source, scope.as_deref(), kind).await?);
        self.stylesheets.put(id, Arc::clone(&entry));
        Ok(style_result(&entry))
    }

    /// Runs the pipeline and records the identity of every file it loaded.
    async fn process_style(
        &self,
        file: &Path,
        key: CacheKey,
        source: &str,
        scope: Option<&str>,
        kind: StyleKind,
    ) -> Result<CacheEntry, LoadError> {
        let request = StyleRequest {
            file,
            scope,
            kind,
            source_map: self.options.source_map,
            scope_config: &self.scope_config,
        };
        let processed = self.styles.process(source, request).await?;

        let mut dependencies = BTreeMap::new();
        for dep in processed.dependencies {
            let dep_key = self.identities.identity(&dep).await?;
            dependencies.insert(dep, dep_key);
        }
        let mut entry = CacheEntry::new(key, source.to_string(), processed.code);
        entry.dependencies = dependencies;
        Ok(entry)
    }

    fn missing_sub_resource(&self, id: &str, path: &Path) -> Option<LoadResult> {
        tracing::warn!(id, "no inline resource for sub-resource request");
        self.sink.emit(
            Diagnostic::warning(
                DiagnosticCode::MISSING_SUB_RESOURCE,
                format!("`{id}` does not address an inline resource"),
            )
            .in_file(path),
        );
        None
    }
}

/// Inline content, treating an empty element as absent.
fn present(content: &Option<String>) -> Option<&String> {
    content.as_ref().filter(|c| !c.is_empty())
}

fn template_cache_id(path: &Path) -> String {
    path.display().to_string()
}

fn style_result(entry: &CacheEntry) -> LoadResult {
    LoadResult {
        contents: entry.code.clone(),
        loader: Loader::Style,
        diagnostics: entry.diagnostics.clone(),
        watch_files: entry.dependencies.keys().cloned().collect::<Vec<PathBuf>>(),
    }
}
