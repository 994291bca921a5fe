//! Contour mesh output

use crate::point::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Range;

/// A point field interpolated onto contour vertices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpolatedAttribute {
    pub name: String,
    pub components: usize,
    /// `components` values per vertex
    pub values: Vec<f32>,
}

/// The vertex and face ranges produced by one isovalue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourRange {
    pub value: f64,
    pub points: Range<usize>,
    pub faces: Range<usize>,
}

/// Triangulated isosurface with optional per-vertex data
///
/// Every optional per-vertex array has exactly one entry per vertex. Several
/// isovalues share the same buffers; `contours` records which vertex and face
/// ranges belong to which value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContourMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[usize; 3]>,
    pub normals: Option<Vec<Vector3f>>,
    pub gradients: Option<Vec<Vector3f>>,
    pub scalars: Option<Vec<f64>>,
    pub attributes: Vec<InterpolatedAttribute>,
    pub contours: Vec<ContourRange>,
}

impl ContourMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Ranges produced by the `index`-th isovalue
    pub fn contour(&self, index: usize) -> Option<&ContourRange> {
        self.contours.get(index)
    }

    /// Look up an interpolated attribute by name
    pub fn attribute(&self, name: &str) -> Option<&InterpolatedAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Face connectivity as a flat index slice, three entries per face
    pub fn flat_indices(&self) -> &[usize] {
        bytemuck::cast_slice(&self.faces)
    }

    /// Multiplicity of every undirected edge, keyed by `(min, max)` vertex ids
    pub fn edge_counts(&self) -> HashMap<(usize, usize), usize> {
        let mut counts = HashMap::new();
        for face in &self.faces {
            for (a, b) in [(face[0], face[1]), (face[1], face[2]), (face[2], face[0])] {
                *counts.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }
        counts
    }

    /// True when every edge is shared by exactly two faces
    pub fn is_watertight(&self) -> bool {
        !self.faces.is_empty() && self.edge_counts().values().all(|&n| n == 2)
    }

    /// `V - E + F` over the referenced vertices
    pub fn euler_characteristic(&self) -> i64 {
        let edges = self.edge_counts().len() as i64;
        self.vertices.len() as i64 - edges + self.faces.len() as i64
    }

    /// Axis-aligned bounds of the vertices, `None` when empty
    pub fn bounding_box(&self) -> Option<(Point3f, Point3f)> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(mut min, mut max), v| {
            for axis in 0..3 {
                min[axis] = min[axis].min(v[axis]);
                max[axis] = max[axis].max(v[axis]);
            }
            (min, max)
        }))
    }

    /// Calculate face normals
    pub fn calculate_face_normals(&self) -> Vec<Vector3f> {
        self.faces
            .iter()
            .map(|face| {
                let v0 = self.vertices[face[0]];
                let v1 = self.vertices[face[1]];
                let v2 = self.vertices[face[2]];

                let edge1 = v1 - v0;
                let edge2 = v2 - v0;

                edge1.cross(&edge2).normalize()
            })
            .collect()
    }
}
