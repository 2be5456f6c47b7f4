//! Configuration file discovery and loading.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::types::PluginOptions;

/// Name of the configuration file.
pub const CONFIG_FILE: &str = "kiln.toml";

/// Walks up from `start` looking for the nearest directory containing `kiln.toml`.
///
/// Returns the path of the configuration file itself.
pub fn find_config(start: &Path) -> Result<PathBuf, ConfigError> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILE);
        if candidate.is_file() {
            return Ok(candidate);
        }
        if !current.pop() {
            return Err(ConfigError::NotFound(CONFIG_FILE.to_string()));
        }
    }
}

/// Loads options from a configuration file.
///
/// A relative or missing `root` is interpreted relative to the directory
/// containing the file.
pub fn load_options(config_path: &Path) -> Result<PluginOptions, ConfigError> {
    let content = std::fs::read_to_string(config_path)?;
    let mut options = load_options_from_str(&content)?;
    let base = config_path.parent().unwrap_or_else(|| Path::new("."));
    options.root = Some(match options.root.take() {
        Some(root) if root.is_relative() => base.join(root),
        Some(root) => root,
        None => base.to_path_buf(),
    });
    Ok(options)
}

/// Parses options from a TOML string.
pub fn load_options_from_str(content: &str) -> Result<PluginOptions, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
}
