//! Lookups against external music services.

pub mod deezer;
pub mod resilience;
