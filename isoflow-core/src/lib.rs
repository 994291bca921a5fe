//! Core data structures for isoflow
//!
//! This crate provides the fundamental types shared by the contouring
//! kernels: strided scalar volume views, point attributes, the contour mesh
//! produced by isosurface extraction, and the common error type.

pub mod point;
pub mod volume;
pub mod mesh;
pub mod error;

pub use point::*;
pub use volume::*;
pub use mesh::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};
