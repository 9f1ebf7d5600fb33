//! Signal source integration for the scoring pipeline
//!
//! This module defines the read-only interface the engine uses to pull
//! user signals and presentation profiles, with in-memory and mock
//! implementations.

pub mod store;

// Re-export commonly used types
pub use store::{InMemorySignalStore, MockSignalStore, SignalStore};
