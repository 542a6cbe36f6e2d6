//! Testing utilities for the vocabulary engine.
//!
//! - Deterministic catalogs and seeded random sources
//! - Scratch SQLite databases that survive reopening
//! - Property-based testing generators

pub mod fixtures;

#[cfg(feature = "proptest-support")]
pub mod generators;

// Re-exports
pub use fixtures::{Fixtures, ScratchDb};
