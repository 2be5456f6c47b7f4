//! Incremental compilation cache for templates and stylesheets.
//!
//! Entries are keyed by virtual identifier and validated against cheap file
//! identity tokens (inode + modification time) instead of content hashes.
//! An entry is reused only if its own key and the key of every recorded
//! dependency still match what the filesystem reports in the current pass.

#![warn(missing_docs)]

pub mod entry;
pub mod error;
pub mod identity;
pub mod stats;
pub mod store;

pub use entry::{validate, CacheEntry, Cached, Resource, TemplateEntry};
pub use error::CacheError;
pub use identity::{CacheKey, IdentityResolver};
pub use stats::{CacheStats, StatsSnapshot};
pub use store::EntryCache;
