//! File identity tokens with per-pass memoization.

use std::collections::HashMap;
use std::fmt;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Opaque identity of a file's content at the moment it was observed.
///
/// Built from filesystem metadata rather than content, so computing it never
/// reads the file. Keys are compared by equality only.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// Wraps an already-composed token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Composes a token from inode, modification time and length.
    pub fn from_metadata(meta: &Metadata) -> Self {
        let mtime = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        Self(format!("{}-{mtime}-{}", inode(meta), meta.len()))
    }

    /// The token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(unix)]
fn inode(meta: &Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    meta.ino()
}

#[cfg(not(unix))]
fn inode(_meta: &Metadata) -> u64 {
    0
}

/// Resolves file paths to [`CacheKey`]s, memoized within one build pass.
///
/// The memo must be cleared with [`begin_pass`](Self::begin_pass) when the
/// host signals that a build is starting, so identities never leak from one
/// pass into the next.
#[derive(Debug, Default)]
pub struct IdentityResolver {
    memo: Mutex<HashMap<PathBuf, CacheKey>>,
}

impl IdentityResolver {
    /// Creates a resolver with an empty memo.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets every identity computed during the previous pass.
    pub fn begin_pass(&self) {
        self.memo.lock().clear();
    }

    /// Returns the identity of `path`, reading metadata at most once per pass.
    ///
    /// Failures are not memoized, so a file that appears later in the same
    /// pass is picked up.
    pub async fn identity(&self, path: &Path) -> Result<CacheKey, CacheError> {
        if let Some(key) = self.memo.lock().get(path) {
            return Ok(key.clone());
        }
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|source| CacheError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let key = CacheKey::from_metadata(&meta);
        self.memo.lock().insert(path.to_path_buf(), key.clone());
        Ok(key)
    }

    /// Number of identities memoized in the current pass.
    pub fn memoized(&self) -> usize {
        self.memo.lock().len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    /// Sets the modification time of `path` to a fixed offset from the epoch.
    pub(crate) fn set_mtime(path: &Path, secs: u64) {
        let file = std::fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
    }

    #[tokio::test]
    async fn stable_for_unchanged_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.html");
        std::fs::write(&path, "<p>hi</p>").unwrap();

        let resolver = IdentityResolver::new();
        let a = resolver.identity(&path).await.unwrap();
        resolver.begin_pass();
        let b = resolver.identity(&path).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn changes_with_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.html");
        std::fs::write(&path, "<p>hi</p>").unwrap();
        set_mtime(&path, 1_000_000);

        let resolver = IdentityResolver::new();
        let before = resolver.identity(&path).await.unwrap();
        set_mtime(&path, 1_000_100);
        resolver.begin_pass();
        let after = resolver.identity(&path).await.unwrap();
        assert_ne!(before, after);
    }

    #[tokio::test]
    async fn memoized_within_pass() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("card.html");
        std::fs::write(&path, "<p>hi</p>").unwrap();
        set_mtime(&path, 1_000_000);

        let resolver = IdentityResolver::new();
        let first = resolver.identity(&path).await.unwrap();
        set_mtime(&path, 2_000_000);
        let second = resolver.identity(&path).await.unwrap();
        assert_eq!(first, second, "identity must not be recomputed within a pass");
        assert_eq!(resolver.memoized(), 1);

        resolver.begin_pass();
        assert_eq!(resolver.memoized(), 0);
        let third = resolver.identity(&path).await.unwrap();
        assert_ne!(first, third);
    }

    #[tokio::test]
    async fn missing_file_errors_and_is_not_memoized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.html");

        let resolver = IdentityResolver::new();
        let err = resolver.identity(&path).await.unwrap_err();
        assert!(matches!(err, CacheError::Io { .. }));
        assert_eq!(resolver.memoized(), 0);

        std::fs::write(&path, "x").unwrap();
        assert!(resolver.identity(&path).await.is_ok());
    }
}
