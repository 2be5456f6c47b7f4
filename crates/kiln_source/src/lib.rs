//! Source addressing: virtual module identifiers and byte-offset locations.
//!
//! [`VirtualId`] encodes a real file path plus the sub-resource parameters
//! that let an inline script or stylesheet be loaded as its own module.
//! [`LineIndex`] converts byte offsets reported by collaborators into
//! 0-based line/column [`Location`]s for diagnostics.

#![warn(missing_docs)]

pub mod line_index;
pub mod virtual_id;

pub use line_index::{LineIndex, Location};
pub use virtual_id::{
    extension_of, SubResource, VirtualId, VirtualIdError, TYPE_SCRIPT, TYPE_STYLESHEET,
};
