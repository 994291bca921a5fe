//! Regular scalar volumes
//!
//! [`ScalarVolume`] is an immutable, strided view over a caller-owned buffer of
//! samples. Grid coordinates `(i, j, k)` map to a linear *point index* through
//! a base offset and one increment per axis, which lets a view address a
//! sub-extent of a larger buffer or a non-contiguous layout without copying.
//! Multi-component fields store `components` consecutive values per point.
//!
//! [`VolumeBuffer`] is the owned counterpart used by synthetic sources and
//! tests; it lends out dense views.

use crate::error::{Error, Result};
use crate::point::{GridIndex, Point3f};
use ndarray::ArrayView3;
use serde::{Deserialize, Serialize};

/// Numeric sample types a volume can hold
pub trait VolumeScalar: Copy + Send + Sync + Into<f64> {}

impl<T> VolumeScalar for T where T: Copy + Send + Sync + Into<f64> {}

/// An extra per-point field carried alongside the scalars
///
/// Values are addressed with the same point indexing as the owning volume:
/// component `c` of point `p` lives at `values[p * components + c]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PointAttribute<'a> {
    pub name: &'a str,
    pub components: usize,
    pub values: &'a [f32],
}

impl<'a> PointAttribute<'a> {
    /// Create a new attribute view
    pub fn new(name: &'a str, components: usize, values: &'a [f32]) -> Self {
        Self {
            name,
            components,
            values,
        }
    }
}

/// Immutable strided view over a 3D array of samples
#[derive(Debug, Clone)]
pub struct ScalarVolume<'a, T> {
    data: &'a [T],
    dimensions: [usize; 3],
    increments: [usize; 3],
    base: usize,
    components: usize,
    origin: Point3f,
    spacing: [f32; 3],
    attributes: Vec<PointAttribute<'a>>,
}

impl<'a, T: VolumeScalar> ScalarVolume<'a, T> {
    /// Create a dense single-component view (x varies fastest)
    pub fn new(data: &'a [T], dimensions: [usize; 3]) -> Self {
        Self {
            data,
            dimensions,
            increments: [1, dimensions[0], dimensions[0] * dimensions[1]],
            base: 0,
            components: 1,
            origin: Point3f::origin(),
            spacing: [1.0, 1.0, 1.0],
            attributes: Vec::new(),
        }
    }

    /// Set the number of interleaved components per point
    pub fn with_components(mut self, components: usize) -> Self {
        self.components = components;
        self
    }

    /// Set the per-axis increments, in points
    pub fn with_increments(mut self, increments: [usize; 3]) -> Self {
        self.increments = increments;
        self
    }

    /// Set the point index of sample `(0, 0, 0)`
    pub fn with_base(mut self, base: usize) -> Self {
        self.base = base;
        self
    }

    /// Set the world position of sample `(0, 0, 0)`
    pub fn with_origin(mut self, origin: Point3f) -> Self {
        self.origin = origin;
        self
    }

    /// Set the physical distance between samples along each axis
    pub fn with_spacing(mut self, spacing: [f32; 3]) -> Self {
        self.spacing = spacing;
        self
    }

    /// Attach an extra point field to be interpolated onto contours
    pub fn with_attribute(mut self, attribute: PointAttribute<'a>) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Wrap an ndarray view indexed as `[x][y][z]`
    ///
    /// The view must have non-negative strides and occupy a contiguous block
    /// of memory (any axis order).
    pub fn from_ndarray(view: ArrayView3<'a, T>) -> Result<Self> {
        let (nx, ny, nz) = view.dim();
        let mut increments = [0usize; 3];
        for (axis, &stride) in view.strides().iter().enumerate() {
            increments[axis] = usize::try_from(stride).map_err(|_| {
                Error::InvalidData(format!(
                    "Negative stride {} along axis {} is not supported",
                    stride, axis
                ))
            })?;
        }

        let data = view.to_slice_memory_order().ok_or_else(|| {
            Error::InvalidData("Array view does not occupy contiguous memory".to_string())
        })?;

        Ok(Self::new(data, [nx, ny, nz]).with_increments(increments))
    }

    /// View the inclusive index range `min..=max` of this volume
    ///
    /// The returned view shares the buffer and attributes; its origin is
    /// moved so that world positions are unchanged.
    pub fn sub_volume(&self, min: GridIndex, max: GridIndex) -> Result<Self> {
        for axis in 0..3 {
            if min[axis] > max[axis] || max[axis] >= self.dimensions[axis] {
                return Err(Error::InvalidData(format!(
                    "Sub-extent {:?}..={:?} lies outside dimensions {:?}",
                    min, max, self.dimensions
                )));
            }
        }

        let mut sub = self.clone();
        sub.base = self.point_index(min[0], min[1], min[2]);
        sub.dimensions = [
            max[0] - min[0] + 1,
            max[1] - min[1] + 1,
            max[2] - min[2] + 1,
        ];
        sub.origin = self.index_to_world([min[0] as f64, min[1] as f64, min[2] as f64]);
        Ok(sub)
    }

    /// Check that the view is contourable and addresses only valid memory
    pub fn validate(&self) -> Result<()> {
        if self.dimensions.iter().any(|&d| d < 2) {
            return Err(Error::InvalidData(format!(
                "Volume dimensions {:?} must have at least 2 samples along every axis",
                self.dimensions
            )));
        }
        if self.components == 0 {
            return Err(Error::InvalidData(
                "Scalar field has no components".to_string(),
            ));
        }
        if self.spacing.iter().any(|s| !s.is_finite() || *s == 0.0) {
            return Err(Error::InvalidData(format!(
                "Spacing {:?} must be finite and non-zero",
                self.spacing
            )));
        }

        let points = self.addressed_points().ok_or_else(|| {
            Error::InvalidData("Volume extent overflows the index range".to_string())
        })?;
        check_len("scalar field", points, self.components, self.data.len())?;

        for attribute in &self.attributes {
            if attribute.components == 0 {
                return Err(Error::InvalidData(format!(
                    "Attribute '{}' has no components",
                    attribute.name
                )));
            }
            check_len(
                attribute.name,
                points,
                attribute.components,
                attribute.values.len(),
            )?;
        }

        Ok(())
    }

    /// Number of points spanned by the view's highest addressed sample
    fn addressed_points(&self) -> Option<usize> {
        let mut last = self.base;
        for axis in 0..3 {
            let span = (self.dimensions[axis] - 1).checked_mul(self.increments[axis])?;
            last = last.checked_add(span)?;
        }
        last.checked_add(1)
    }

    pub fn dimensions(&self) -> [usize; 3] {
        self.dimensions
    }

    pub fn increments(&self) -> [usize; 3] {
        self.increments
    }

    pub fn components(&self) -> usize {
        self.components
    }

    pub fn origin(&self) -> Point3f {
        self.origin
    }

    pub fn spacing(&self) -> [f32; 3] {
        self.spacing
    }

    pub fn attributes(&self) -> &[PointAttribute<'a>] {
        &self.attributes
    }

    /// Total number of grid points
    pub fn point_count(&self) -> usize {
        self.dimensions.iter().product()
    }

    /// Linear point index of grid coordinates `(i, j, k)`
    #[inline]
    pub fn point_index(&self, i: usize, j: usize, k: usize) -> usize {
        self.base + i * self.increments[0] + j * self.increments[1] + k * self.increments[2]
    }

    /// Component `component` of the sample at a linear point index
    ///
    /// The index must come from [`point_index`](Self::point_index) on a
    /// validated view.
    #[inline]
    pub fn sample(&self, point: usize, component: usize) -> f64 {
        self.data[point * self.components + component].into()
    }

    /// Bounds-checked sample lookup
    pub fn value(&self, index: GridIndex, component: usize) -> Option<f64> {
        let [i, j, k] = index;
        if i >= self.dimensions[0]
            || j >= self.dimensions[1]
            || k >= self.dimensions[2]
            || component >= self.components
        {
            return None;
        }
        self.data
            .get(self.point_index(i, j, k) * self.components + component)
            .map(|&v| v.into())
    }

    /// Minimum and maximum of one component over the whole view
    pub fn scalar_range(&self, component: usize) -> Option<(f64, f64)> {
        if component >= self.components {
            return None;
        }
        let [nx, ny, nz] = self.dimensions;
        let mut range: Option<(f64, f64)> = None;
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    let v = self.value([i, j, k], component)?;
                    range = Some(match range {
                        Some((lo, hi)) => (lo.min(v), hi.max(v)),
                        None => (v, v),
                    });
                }
            }
        }
        range
    }

    /// World position of (possibly fractional) grid coordinates
    #[inline]
    pub fn index_to_world(&self, ijk: [f64; 3]) -> Point3f {
        Point3f::new(
            (self.origin.x as f64 + ijk[0] * self.spacing[0] as f64) as f32,
            (self.origin.y as f64 + ijk[1] * self.spacing[1] as f64) as f32,
            (self.origin.z as f64 + ijk[2] * self.spacing[2] as f64) as f32,
        )
    }
}

fn check_len(name: &str, points: usize, components: usize, len: usize) -> Result<()> {
    let needed = points.checked_mul(components).ok_or_else(|| {
        Error::InvalidData(format!("Extent of '{}' overflows the index range", name))
    })?;
    if needed > len {
        return Err(Error::InvalidData(format!(
            "'{}' has {} values but the volume addresses {}",
            name, len, needed
        )));
    }
    Ok(())
}

/// Owned dense volume, x varying fastest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeBuffer<T> {
    /// Samples in `i + j * nx + k * nx * ny` order
    pub values: Vec<T>,
    /// Grid dimensions
    pub dimensions: [usize; 3],
    /// Physical size of each voxel
    pub spacing: [f32; 3],
    /// Origin position of the grid in world coordinates
    pub origin: Point3f,
}

impl<T: VolumeScalar> VolumeBuffer<T> {
    /// Create a volume from existing samples
    pub fn new(
        values: Vec<T>,
        dimensions: [usize; 3],
        spacing: [f32; 3],
        origin: Point3f,
    ) -> Result<Self> {
        let expected = dimensions.iter().product::<usize>();
        if values.len() != expected {
            return Err(Error::InvalidData(format!(
                "Expected {} samples for dimensions {:?}, got {}",
                expected,
                dimensions,
                values.len()
            )));
        }
        Ok(Self {
            values,
            dimensions,
            spacing,
            origin,
        })
    }

    /// Create a unit-spaced volume with every sample set to `value`
    pub fn filled(dimensions: [usize; 3], value: T) -> Self {
        Self {
            values: vec![value; dimensions.iter().product()],
            dimensions,
            spacing: [1.0, 1.0, 1.0],
            origin: Point3f::origin(),
        }
    }

    fn linear_index(&self, index: GridIndex) -> Option<usize> {
        let [i, j, k] = index;
        let [nx, ny, nz] = self.dimensions;
        (i < nx && j < ny && k < nz).then(|| i + j * nx + k * nx * ny)
    }

    /// Get the sample at grid coordinates (with bounds checking)
    pub fn get(&self, index: GridIndex) -> Option<T> {
        self.linear_index(index).map(|idx| self.values[idx])
    }

    /// Set the sample at grid coordinates
    pub fn set(&mut self, index: GridIndex, value: T) -> Result<()> {
        match self.linear_index(index) {
            Some(idx) => {
                self.values[idx] = value;
                Ok(())
            }
            None => Err(Error::InvalidData(format!(
                "Grid coordinates {:?} out of bounds for dimensions {:?}",
                index, self.dimensions
            ))),
        }
    }

    /// Borrow the samples as a single-component view
    pub fn view(&self) -> ScalarVolume<'_, T> {
        ScalarVolume::new(&self.values, self.dimensions)
            .with_spacing(self.spacing)
            .with_origin(self.origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{s, Array3};

    #[test]
    fn test_dense_indexing() {
        let data: Vec<f32> = (0..24).map(|v| v as f32).collect();
        let volume = ScalarVolume::new(&data, [2, 3, 4]);

        assert!(volume.validate().is_ok());
        assert_eq!(volume.point_index(1, 2, 3), 1 + 2 * 2 + 3 * 6);
        assert_eq!(volume.value([1, 0, 0], 0), Some(1.0));
        assert_eq!(volume.value([0, 1, 0], 0), Some(2.0));
        assert_eq!(volume.value([0, 0, 1], 0), Some(6.0));
        assert_eq!(volume.value([2, 0, 0], 0), None);
        assert_eq!(volume.scalar_range(0), Some((0.0, 23.0)));
    }

    #[test]
    fn test_validation_errors() {
        let data = vec![0u8; 8];
        assert!(ScalarVolume::new(&data, [1, 2, 4]).validate().is_err());
        assert!(ScalarVolume::new(&data, [2, 2, 3]).validate().is_err());
        assert!(ScalarVolume::new(&data, [2, 2, 2])
            .with_spacing([1.0, 0.0, 1.0])
            .validate()
            .is_err());
        assert!(ScalarVolume::new(&data, [2, 2, 2])
            .with_components(2)
            .validate()
            .is_err());

        let short = vec![0.0f32; 4];
        let err = ScalarVolume::new(&data, [2, 2, 2])
            .with_attribute(PointAttribute::new("temperature", 1, &short))
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_multi_component_access() {
        // Two components per point: (v, -v)
        let data: Vec<i32> = (0..8).flat_map(|v| [v, -v]).collect();
        let volume = ScalarVolume::new(&data, [2, 2, 2]).with_components(2);

        assert!(volume.validate().is_ok());
        assert_eq!(volume.value([1, 1, 1], 0), Some(7.0));
        assert_eq!(volume.value([1, 1, 1], 1), Some(-7.0));
        assert_eq!(volume.value([1, 1, 1], 2), None);
        assert_eq!(volume.scalar_range(1), Some((-7.0, 0.0)));
    }

    #[test]
    fn test_sub_volume_preserves_world_positions() {
        let data: Vec<f64> = (0..64).map(|v| v as f64).collect();
        let volume = ScalarVolume::new(&data, [4, 4, 4])
            .with_spacing([0.5, 1.0, 2.0])
            .with_origin(Point3f::new(1.0, 2.0, 3.0));
        let sub = volume.sub_volume([1, 1, 2], [3, 2, 3]).unwrap();

        assert_eq!(sub.dimensions(), [3, 2, 2]);
        assert!(sub.validate().is_ok());
        assert_eq!(sub.value([0, 0, 0], 0), volume.value([1, 1, 2], 0));
        assert_eq!(sub.value([2, 1, 1], 0), volume.value([3, 2, 3], 0));

        let p = sub.index_to_world([0.0, 0.0, 0.0]);
        let q = volume.index_to_world([1.0, 1.0, 2.0]);
        assert_relative_eq!(p, q);

        assert!(volume.sub_volume([0, 0, 0], [4, 1, 1]).is_err());
        assert!(volume.sub_volume([2, 0, 0], [1, 1, 1]).is_err());
    }

    #[test]
    fn test_from_ndarray_strides() {
        let array = Array3::from_shape_fn((3, 4, 5), |(x, y, z)| (x * 100 + y * 10 + z) as f32);
        let volume = ScalarVolume::from_ndarray(array.view()).unwrap();

        assert_eq!(volume.dimensions(), [3, 4, 5]);
        assert!(volume.validate().is_ok());
        assert_eq!(volume.value([2, 3, 4], 0), Some(234.0));

        // Fortran-ordered data is contiguous too
        let reversed = array.view().reversed_axes();
        let transposed = ScalarVolume::from_ndarray(reversed).unwrap();
        assert_eq!(transposed.value([4, 3, 2], 0), Some(234.0));

        // A stepped slice is not contiguous
        let stepped = array.slice(s![.., .., ..;2]);
        assert!(ScalarVolume::from_ndarray(stepped).is_err());
    }

    #[test]
    fn test_volume_buffer_access() {
        let mut buffer = VolumeBuffer::filled([3, 3, 3], 0.0f32);
        buffer.set([1, 2, 0], 5.0).unwrap();

        assert_eq!(buffer.get([1, 2, 0]), Some(5.0));
        assert_eq!(buffer.get([3, 0, 0]), None);
        assert!(buffer.set([0, 3, 0], 1.0).is_err());
        assert_eq!(buffer.view().value([1, 2, 0], 0), Some(5.0));
        assert!(VolumeBuffer::new(vec![0.0f32; 5], [2, 2, 2], [1.0; 3], Point3f::origin()).is_err());
    }
}
