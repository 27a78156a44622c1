//! Marker Core
//!
//! Shared building blocks for the placement crates:
//! - Pose math on top of glam
//! - Version information

pub mod math;

pub use glam;

/// Workspace version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
