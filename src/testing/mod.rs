//! Testing utilities
//!
//! Fixtures for building registrations, workflow graphs and populated
//! registries without repeating setup in every test.

pub mod fixtures;

pub use fixtures::*;
