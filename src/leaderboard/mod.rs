//! Leaderboard materialization and serving
//!
//! This module turns raw user signals into immutable, fully-ordered
//! snapshots, one per leaderboard variant, and coordinates when those
//! snapshots are recomputed and atomically swapped in.

pub mod coordinator;
pub mod ranking;
pub mod snapshot;

// Re-export commonly used types
pub use coordinator::{CoordinatorStats, RecomputeCoordinator, RefreshOutcome, VariantState};
pub use ranking::build_snapshot;
pub use snapshot::{PageSlice, RankedEntry, Snapshot};
