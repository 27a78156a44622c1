//! Marker Scene
//!
//! Everything between "an asset is loading" and "a node hangs off the
//! anchor":
//! - Readiness gate over load handles
//! - Placement routine (idempotent, anchor-relative)
//! - Scene graph seam plus an in-memory implementation
//! - Session driver fed by tracking updates

pub mod anchor;
pub mod gate;
pub mod graph;
pub mod placement;
pub mod session;

pub use anchor::{AnchorContext, TrackedImage};
pub use gate::{Continuation, Readiness, ReadinessGate, Settlement};
pub use graph::{AnchorId, NodeId, Scene, SceneGraph, SceneNode};
pub use placement::{PlacedNode, PlacementPass, Placer};
pub use session::{PlacementEvent, Session, SessionReport};
