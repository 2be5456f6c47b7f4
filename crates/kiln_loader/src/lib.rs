//! Load orchestration for the host bundler.
//!
//! A [`Session`] owns every cache of one build integration instance. The
//! host calls [`Session::build_start`] whenever a build pass begins and
//! [`Session::load`] for every module identifier it wants resolved; each
//! load is classified, answered from a valid cache entry or compiled, and
//! returned as a [`LoadResult`].

#![warn(missing_docs)]

pub mod error;
pub mod request;
pub mod response;
pub mod session;

pub use error::LoadError;
pub use request::Request;
pub use response::{LoadResult, Loader};
pub use session::{Session, SessionBuilder};
