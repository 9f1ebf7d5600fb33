//! Public read API for the podium leaderboard service
//!
//! This module exposes the paginated leaderboard views over HTTP. It is a
//! read-only surface; rankings are recomputed by the coordinator, never
//! through this API.

pub mod server;

pub use server::{ApiServer, ApiServerConfig, ApiState};
