//! Cache entries and their validation against current file identities.

use std::collections::BTreeMap;
use std::path::PathBuf;

use kiln_diagnostics::Diagnostic;

use crate::identity::{CacheKey, IdentityResolver};
use crate::store::EntryCache;

/// A compiled artifact and the identities it was produced from.
#[derive(Clone, Debug)]
pub struct CacheEntry {
    /// Identity of the primary input file at compile time.
    pub cache_key: CacheKey,
    /// Raw text as read.
    pub source: String,
    /// Compiled or transformed output.
    pub code: String,
    /// Auxiliary files and the identity each had when this entry was produced.
    pub dependencies: BTreeMap<PathBuf, CacheKey>,
    /// Non-fatal warnings produced alongside `code`.
    pub diagnostics: Vec<Diagnostic>,
}

impl CacheEntry {
    /// Creates an entry without dependencies or diagnostics.
    pub fn new(cache_key: CacheKey, source: String, code: String) -> Self {
        Self {
            cache_key,
            source,
            code,
            dependencies: BTreeMap::new(),
            diagnostics: Vec::new(),
        }
    }
}

/// A script or stylesheet discovered in a template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resource {
    /// Virtual identifier (inline) or external URL the resource is loaded from.
    pub url: String,
    /// Embedded content; `None` for externally referenced resources.
    pub content: Option<String>,
    /// Content-type tag, e.g. `ts`, `js`, `css`, `scss`.
    pub lang: String,
}

/// A compiled template plus the resources it exposes as sub-modules.
#[derive(Debug)]
pub struct TemplateEntry {
    /// The compiled module and its identity.
    pub base: CacheEntry,
    /// Script resources in document order.
    pub scripts: Vec<Resource>,
    /// Stylesheet resources in document order.
    pub styles: Vec<Resource>,
    /// Processed inline stylesheets of this template, keyed by virtual identifier.
    ///
    /// Created empty with every compile, so recompiling the template drops
    /// all of its inline style results at once.
    pub style_cache: EntryCache<CacheEntry>,
}

impl TemplateEntry {
    /// Creates a template entry with a fresh, empty style sub-cache.
    pub fn new(base: CacheEntry, scripts: Vec<Resource>, styles: Vec<Resource>) -> Self {
        Self {
            base,
            scripts,
            styles,
            style_cache: EntryCache::new(),
        }
    }
}

/// Access to the [`CacheEntry`] part of a cached value.
pub trait Cached {
    /// The base entry holding keys and dependencies.
    fn entry(&self) -> &CacheEntry;
}

impl Cached for CacheEntry {
    fn entry(&self) -> &CacheEntry {
        self
    }
}

impl Cached for TemplateEntry {
    fn entry(&self) -> &CacheEntry {
        &self.base
    }
}

/// Decides whether `entry` may be reused.
///
/// Valid iff the entry exists, its key equals `current_key`, and every
/// recorded dependency still resolves to the key stored for it. A dependency
/// that can no longer be read counts as changed. Only the keys of already
/// recorded dependencies are checked; the entry itself is never modified.
pub async fn validate<E: Cached>(
    entry: Option<&E>,
    current_key: &CacheKey,
    resolver: &IdentityResolver,
) -> bool {
    let Some(entry) = entry.map(Cached::entry) else {
        return false;
    };
    if entry.cache_key != *current_key {
        return false;
    }
    for (dep_path, dep_key) in &entry.dependencies {
        match resolver.identity(dep_path).await {
            Ok(key) if key == *dep_key => {}
            Ok(_) => {
                tracing::debug!(dependency = %dep_path.display(), "dependency changed");
                return false;
            }
            Err(err) => {
                tracing::debug!(%err, "dependency unreadable");
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::tests::set_mtime;

    #[tokio::test]
    async fn absent_entry_is_invalid() {
        let resolver = IdentityResolver::new();
        assert!(!validate::<CacheEntry>(None, &CacheKey::new("k"), &resolver).await);
    }

    #[tokio::test]
    async fn key_mismatch_is_invalid() {
        let resolver = IdentityResolver::new();
        let entry = CacheEntry::new(CacheKey::new("k1"), String::new(), String::new());
        assert!(validate(Some(&entry), &CacheKey::new("k1"), &resolver).await);
        assert!(!validate(Some(&entry), &CacheKey::new("k2"), &resolver).await);
    }

    #[tokio::test]
    async fn changed_dependency_invalidates() {
        let dir = tempfile::tempdir().unwrap();
        let dep = dir.path().join("_vars.scss");
        std::fs::write(&dep, "$c: red;").unwrap();
        set_mtime(&dep, 1_000_000);

        let resolver = IdentityResolver::new();
        let mut entry = CacheEntry::new(CacheKey::new("main"), String::new(), String::new());
        entry
            .dependencies
            .insert(dep.clone(), resolver.identity(&dep).await.unwrap());
        assert!(validate(Some(&entry), &CacheKey::new("main"), &resolver).await);

        set_mtime(&dep, 1_000_500);
        resolver.begin_pass();
        assert!(!validate(Some(&entry), &CacheKey::new("main"), &resolver).await);
        assert_eq!(entry.dependencies.len(), 1, "validation must not mutate");
    }

    #[tokio::test]
    async fn deleted_dependency_invalidates() {
        let dir = tempfile::tempdir().unwrap();
        let dep = dir.path().join("_vars.scss");
        std::fs::write(&dep, "$c: red;").unwrap();

        let resolver = IdentityResolver::new();
        let mut entry = CacheEntry::new(CacheKey::new("main"), String::new(), String::new());
        entry
            .dependencies
            .insert(dep.clone(), resolver.identity(&dep).await.unwrap());

        std::fs::remove_file(&dep).unwrap();
        resolver.begin_pass();
        assert!(!validate(Some(&entry), &CacheKey::new("main"), &resolver).await);
    }

    #[tokio::test]
    async fn template_entry_validates_through_base() {
        let resolver = IdentityResolver::new();
        let base = CacheEntry::new(CacheKey::new("t"), "<p/>".into(), "code".into());
        let entry = TemplateEntry::new(base, Vec::new(), Vec::new());
        assert!(entry.style_cache.is_empty());
        assert!(validate(Some(&entry), &CacheKey::new("t"), &resolver).await);
    }
}
