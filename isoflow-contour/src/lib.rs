//! # Isoflow Contour
//!
//! Isosurface extraction from regular scalar volumes.
//!
//! This crate implements the Flying Edges algorithm: a four-pass,
//! edge-based variant of marching cubes that sizes its output exactly before
//! writing it and runs its passes in parallel without locking.

pub mod config;
pub mod contour_values;
pub mod flying_edges;
pub mod parallel;
pub mod sources;

// Re-export commonly used items
pub use config::*;
pub use contour_values::*;
pub use flying_edges::{flying_edges, FlyingEdges};
pub use sources::*;
