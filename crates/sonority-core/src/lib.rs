//! Core domain model for sonority.
//!
//! This crate defines the catalog track record, its audio-feature vector,
//! the partially-specified feature set produced by mood translation, and
//! the SQLite schema that stores the catalog.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod model;
pub mod schema;

pub use error::{Error, Result};
