//! Normalizes RSS 2.0 and Atom syndication documents into typed models.
//!
//! - [`feed`] - parsing engine and the HTTP fetch adapter
//! - [`model`] - the immutable values parsing produces
//! - [`config`] - settings for the fetch adapter
//! - [`outline`] - plain-text summary used by the `sift` binary

pub mod config;
pub mod feed;
pub mod model;
pub mod outline;
