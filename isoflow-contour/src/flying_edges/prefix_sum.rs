//! Third pass: turn per-row counts into output offsets

use super::metadata::EdgeMetaData;
use isoflow_core::{Error, Result};

/// Replace every row's counts with the offsets where its output begins
///
/// Rows are scanned in slice-then-row order starting from the running
/// `points` and `triangles` totals of earlier isovalues. Returns the new
/// totals.
pub(super) fn accumulate_offsets(
    meta: &mut [EdgeMetaData],
    points: usize,
    triangles: usize,
) -> Result<(usize, usize)> {
    let overflow = || {
        Error::CapacityExceeded("Contour output exceeds the addressable index range".to_string())
    };

    let mut num_points = points;
    let mut num_triangles = triangles;
    for row in meta.iter_mut() {
        let (x, y, z, t) = (row.x_points, row.y_points, row.z_points, row.triangles);
        row.x_points = num_points;
        row.y_points = num_points.checked_add(x).ok_or_else(overflow)?;
        row.z_points = row.y_points.checked_add(y).ok_or_else(overflow)?;
        row.triangles = num_triangles;
        num_points = row.z_points.checked_add(z).ok_or_else(overflow)?;
        num_triangles = num_triangles.checked_add(t).ok_or_else(overflow)?;
    }

    Ok((num_points, num_triangles))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(x: usize, y: usize, z: usize, t: usize) -> EdgeMetaData {
        EdgeMetaData {
            x_points: x,
            y_points: y,
            z_points: z,
            triangles: t,
            ..Default::default()
        }
    }

    #[test]
    fn test_offsets_are_contiguous_per_row() {
        let mut meta = vec![counts(2, 1, 3, 4), counts(0, 0, 0, 0), counts(1, 2, 0, 1)];
        let totals = accumulate_offsets(&mut meta, 10, 5).unwrap();

        assert_eq!(totals, (10 + 6 + 3, 5 + 5));
        assert_eq!((meta[0].x_points, meta[0].y_points, meta[0].z_points), (10, 12, 13));
        assert_eq!(meta[0].triangles, 5);
        assert_eq!((meta[1].x_points, meta[1].y_points, meta[1].z_points), (16, 16, 16));
        assert_eq!(meta[1].triangles, 9);
        assert_eq!((meta[2].x_points, meta[2].y_points, meta[2].z_points), (16, 17, 19));
        assert_eq!(meta[2].triangles, 9);
    }

    #[test]
    fn test_overflow_is_reported() {
        let mut meta = vec![counts(usize::MAX, 0, 0, 0), counts(1, 0, 0, 0)];
        let err = accumulate_offsets(&mut meta, 1, 0).unwrap_err();
        assert!(matches!(err, Error::CapacityExceeded(_)));
    }
}
