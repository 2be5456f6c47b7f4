//! Shared foundational helpers used across the Kiln build integration.
//!
//! This crate provides content fingerprinting for scope-token derivation and
//! the path helpers that turn a template path into a stable component name.

#![warn(missing_docs)]

pub mod fingerprint;
pub mod naming;

pub use fingerprint::{Fingerprinter, FINGERPRINT_LEN};
pub use naming::{default_component_name, relative_to_root};
