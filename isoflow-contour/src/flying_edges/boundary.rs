//! Volume boundary handling
//!
//! Voxels touching the +x, +y or +z faces of the volume own edges that no
//! interior voxel axis reaches. [`BOUNDARY_EDGES`] lists those edges for each
//! combination of faces; both the counting pass and the output pass read
//! from it so that the two always agree. Vertex gradients use one-sided
//! differences on the faces.

use isoflow_core::{GridIndex, ScalarVolume, Vector3d, VolumeScalar};

/// Location of a voxel or vertex relative to the volume boundary
///
/// Two bits per axis (x in bits 0-1, y in 2-3, z in 4-5): `MIN` on the lower
/// face, `MAX` on the upper face. A voxel of a volume two samples thick
/// touches both faces of that axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundaryLoc(u8);

impl BoundaryLoc {
    pub const INTERIOR: u8 = 0;
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 2;

    /// Location of the voxel whose origin corner is `ijk`
    pub fn voxel(ijk: GridIndex, dims: [usize; 3]) -> Self {
        let mut loc = 0;
        for axis in 0..3 {
            let mut flags = Self::INTERIOR;
            if ijk[axis] == 0 {
                flags |= Self::MIN;
            }
            if ijk[axis] + 2 >= dims[axis] {
                flags |= Self::MAX;
            }
            loc |= flags << (2 * axis);
        }
        Self(loc)
    }

    /// Location of the grid vertex `ijk`
    pub fn vertex(ijk: GridIndex, dims: [usize; 3]) -> Self {
        let mut loc = 0;
        for axis in 0..3 {
            let flags = if ijk[axis] == 0 {
                Self::MIN
            } else if ijk[axis] + 1 >= dims[axis] {
                Self::MAX
            } else {
                Self::INTERIOR
            };
            loc |= flags << (2 * axis);
        }
        Self(loc)
    }

    #[inline]
    pub fn axis(self, axis: usize) -> u8 {
        (self.0 >> (2 * axis)) & 0b11
    }

    #[inline]
    pub fn is_max(self, axis: usize) -> bool {
        self.axis(axis) & Self::MAX != 0
    }

    #[inline]
    pub fn is_interior(self) -> bool {
        self.0 == 0
    }

    /// Bit set of the upper faces touched: x = 1, y = 2, z = 4
    #[inline]
    pub fn max_faces(self) -> usize {
        (self.is_max(0) as usize) | (self.is_max(1) as usize) << 1 | (self.is_max(2) as usize) << 2
    }
}

/// Extra voxel edges owned by voxels on the upper faces, indexed by
/// [`BoundaryLoc::max_faces`]
pub const BOUNDARY_EDGES: [&[usize]; 8] = [
    &[],                              // interior
    &[5, 9],                          // +x
    &[1, 10],                         // +y
    &[1, 5, 9, 10, 11],               // +x +y
    &[2, 6],                          // +z
    &[2, 5, 9, 6, 7],                 // +x +z
    &[1, 2, 3, 6, 10],                // +y +z
    &[1, 2, 3, 5, 9, 10, 11, 6, 7],   // +x +y +z, at most one voxel per volume
];

/// Boundary edges a voxel at `loc` must generate or count
#[inline]
pub fn boundary_edges(loc: BoundaryLoc) -> &'static [usize] {
    BOUNDARY_EDGES[loc.max_faces()]
}

/// Scalar gradient at a grid vertex
///
/// Central differences inside the volume, forward differences on the lower
/// face and backward differences on the upper face of each axis.
pub fn vertex_gradient<T: VolumeScalar>(
    volume: &ScalarVolume<'_, T>,
    component: usize,
    ijk: GridIndex,
) -> Vector3d {
    let dims = volume.dimensions();
    let spacing = volume.spacing();
    let loc = BoundaryLoc::vertex(ijk, dims);
    let sample = |index: GridIndex| {
        volume.sample(volume.point_index(index[0], index[1], index[2]), component)
    };

    let mut gradient = Vector3d::zeros();
    for axis in 0..3 {
        let mut minus = ijk;
        let mut plus = ijk;
        let span = match loc.axis(axis) {
            BoundaryLoc::MIN => {
                plus[axis] += 1;
                1.0
            }
            BoundaryLoc::MAX => {
                minus[axis] -= 1;
                1.0
            }
            _ => {
                minus[axis] -= 1;
                plus[axis] += 1;
                2.0
            }
        };
        gradient[axis] = (sample(plus) - sample(minus)) / (span * spacing[axis] as f64);
    }
    gradient
}
