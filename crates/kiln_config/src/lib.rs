//! Plugin options: the `kiln.toml` file, programmatic overrides, and the
//! documented merge order that turns them into [`ResolvedOptions`].

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{find_config, load_options, load_options_from_str, CONFIG_FILE};
pub use resolve::{ResolvedCss, ResolvedOptions};
pub use types::*;
