//! Path helpers for component naming and root-relative scoping seeds.

use std::path::{Component, Path};

/// Base name treated as a placeholder for its directory.
const INDEX_STEM: &str = "index";

/// Derives a component name from a template path.
///
/// Uses the file's base name without extension, or the parent directory's
/// name when the base name is `index`.
pub fn default_component_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if stem == INDEX_STEM {
        if let Some(dir) = path.parent().and_then(Path::file_name) {
            return dir.to_string_lossy().into_owned();
        }
    }
    stem
}

/// Returns `path` relative to `root` with `/` separators.
///
/// A path outside `root` is returned unchanged (still `/`-joined), so the
/// result is stable across platforms and usable as a fingerprint seed.
pub fn relative_to_root(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect();
    parts.join("/")
}
