//! Errors returned by [`Session::load`](crate::Session::load).

use std::path::PathBuf;

use kiln_cache::CacheError;
use kiln_source::VirtualIdError;
use kiln_style::StyleError;
use kiln_template::TemplateError;

/// A fatal failure of one load request. Nothing is cached for it.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The module identifier is malformed.
    #[error("invalid module id: {0}")]
    InvalidId(#[from] VirtualIdError),

    /// A file's identity could not be determined.
    #[error(transparent)]
    Identity(#[from] CacheError),

    /// The stylesheet pipeline failed.
    #[error(transparent)]
    Style(#[from] StyleError),

    /// Template compilation or helper scanning failed.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// A sub-resource was requested before its template was loaded.
    #[error("template {0} has not been loaded")]
    MissingTemplate(PathBuf),
}
