//! Synthetic volumes for tests, benchmarks and demos

use crate::parallel;
use isoflow_core::{Error, Point3f, Result, VolumeBuffer};

/// Sample `f` at every grid point in parallel
///
/// Samples are stored x-fastest, matching [`VolumeBuffer`]'s layout.
pub fn sample_function<F>(
    resolution: [usize; 3],
    spacing: [f32; 3],
    origin: Point3f,
    f: F,
) -> Result<VolumeBuffer<f32>>
where
    F: Fn(Point3f) -> f32 + Sync + Send,
{
    let [nx, ny, nz] = resolution;
    let count = nx
        .checked_mul(ny)
        .and_then(|n| n.checked_mul(nz))
        .ok_or_else(|| Error::InvalidData(format!("Resolution {:?} is too large", resolution)))?;

    let indices: Vec<usize> = (0..count).collect();
    let values = parallel::parallel_map(&indices, |&index| {
        let i = index % nx;
        let j = (index / nx) % ny;
        let k = index / (nx * ny);
        f(Point3f::new(
            origin.x + i as f32 * spacing[0],
            origin.y + j as f32 * spacing[1],
            origin.z + k as f32 * spacing[2],
        ))
    });

    VolumeBuffer::new(values, resolution, spacing, origin)
}

/// Signed distance to a sphere, negative inside
///
/// The grid spans `size` and is centered on `center`.
pub fn sphere_volume(
    center: Point3f,
    radius: f32,
    resolution: [usize; 3],
    size: [f32; 3],
) -> Result<VolumeBuffer<f32>> {
    if resolution.iter().any(|&n| n < 2) {
        return Err(Error::InvalidData(format!(
            "Sphere volume needs at least 2 samples per axis, got {:?}",
            resolution
        )));
    }

    let origin = Point3f::new(
        center.x - size[0] / 2.0,
        center.y - size[1] / 2.0,
        center.z - size[2] / 2.0,
    );
    let spacing = [
        size[0] / (resolution[0] - 1) as f32,
        size[1] / (resolution[1] - 1) as f32,
        size[2] / (resolution[2] - 1) as f32,
    ];

    sample_function(resolution, spacing, origin, |p| (p - center).magnitude() - radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sphere_volume_creation() {
        let center = Point3f::new(0.0, 0.0, 0.0);
        let volume = sphere_volume(center, 1.0, [11, 11, 11], [4.0, 4.0, 4.0]).unwrap();

        // Center is inside, corner outside
        assert_relative_eq!(volume.get([5, 5, 5]).unwrap(), -1.0, epsilon = 1e-6);
        assert!(volume.get([0, 0, 0]).unwrap() > 0.0);
        assert_eq!(volume.spacing, [0.4, 0.4, 0.4]);
        assert_eq!(volume.origin, Point3f::new(-2.0, -2.0, -2.0));
    }

    #[test]
    fn test_sample_function_layout() {
        let volume = sample_function([3, 2, 2], [1.0, 2.0, 3.0], Point3f::new(1.0, 0.0, 0.0), |p| {
            p.x + 10.0 * p.y + 100.0 * p.z
        })
        .unwrap();

        assert_eq!(volume.values.len(), 12);
        assert_relative_eq!(volume.get([2, 0, 0]).unwrap(), 3.0);
        assert_relative_eq!(volume.get([0, 1, 0]).unwrap(), 21.0);
        assert_relative_eq!(volume.get([0, 0, 1]).unwrap(), 301.0);
    }

    #[test]
    fn test_sphere_volume_rejects_degenerate_resolution() {
        assert!(sphere_volume(Point3f::origin(), 1.0, [1, 4, 4], [1.0; 3]).is_err());
    }
}
