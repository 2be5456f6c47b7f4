//! Option resolution for CLI commands.

use std::error::Error;
use std::path::{Path, PathBuf};

use kiln_config::{find_config, load_options, ConfigError, PluginOptions, ResolvedOptions};

use crate::GlobalArgs;

/// Resolves session options: defaults, then `kiln.toml` (from `--config` or
/// found by walking up from the current directory), then `--root`.
pub fn resolve_options(global: &GlobalArgs) -> Result<ResolvedOptions, Box<dyn Error>> {
    let from_file = match &global.config {
        Some(path) => load_options(Path::new(path))?,
        None => match find_config(&std::env::current_dir()?) {
            Ok(path) => {
                tracing::debug!(config = %path.display(), "using configuration file");
                load_options(&path)?
            }
            Err(ConfigError::NotFound(_)) => PluginOptions::default(),
            Err(e) => return Err(e.into()),
        },
    };
    let overrides = PluginOptions {
        root: global.root.as_ref().map(PathBuf::from),
        ..Default::default()
    };
    Ok(from_file.merge(overrides).resolve()?)
}
