//! Second pass: count y/z intersections and triangles per voxel row
//!
//! A voxel row `(j, k)` is bounded by the x-rows `(j, k)`, `(j + 1, k)`,
//! `(j, k + 1)` and `(j + 1, k + 1)`. Its counts go to row `(j, k)`, except
//! for edges on the +y and +z volume faces, which belong to the neighbouring
//! rows that have no voxel row of their own.

use super::boundary::{boundary_edges, BoundaryLoc};
use super::metadata::{case_code, EdgeMetaData, XEdgeState};
use super::ContourContext;
use crate::parallel;
use isoflow_core::VolumeScalar;
use std::ops::Range;

/// Rows owned by one slice task
struct SliceRows<'m> {
    k: usize,
    rows: &'m mut [EdgeMetaData],
    /// Rows of slice `k + 1`, handed to the last voxel slice only
    above: Option<&'m mut [EdgeMetaData]>,
}

/// Counts accumulated over one voxel row
#[derive(Debug, Default, PartialEq, Eq)]
struct RowCounts {
    y_points: usize,
    z_points: usize,
    triangles: usize,
    /// z-edges on the +y face, owned by row `(j + 1, k)`
    next_row_z: usize,
    /// y-edges on the +z face, owned by row `(j, k + 1)`
    next_slice_y: usize,
}

pub(super) fn count_yz_edges<T: VolumeScalar>(
    ctx: &ContourContext<'_, '_, T>,
    meta: &mut [EdgeMetaData],
    states: &[XEdgeState],
) {
    let [_, ny, nz] = ctx.dims;

    // Trim decisions read the first-pass bounds of neighbouring rows, which
    // other tasks may widen concurrently
    let first_pass = meta.to_vec();

    let (body, top) = meta.split_at_mut((nz - 1) * ny);
    let mut top = Some(top);
    let tasks: Vec<SliceRows<'_>> = body
        .chunks_mut(ny)
        .enumerate()
        .map(|(k, rows)| SliceRows {
            k,
            rows,
            above: if k + 2 == nz { top.take() } else { None },
        })
        .collect();

    parallel::for_each_task(tasks, |slice| {
        if ctx.is_cancelled() {
            return;
        }
        count_slice(ctx, &first_pass, states, slice);
    });
}

fn count_slice<T: VolumeScalar>(
    ctx: &ContourContext<'_, '_, T>,
    first_pass: &[EdgeMetaData],
    states: &[XEdgeState],
    slice: SliceRows<'_>,
) {
    let SliceRows { k, rows, mut above } = slice;
    let ny = ctx.dims[1];

    for j in 0..ny - 1 {
        let edges = ctx.voxel_row_states(states, j, k);
        let neighbours = [
            &first_pass[ctx.row(j, k)],
            &first_pass[ctx.row(j + 1, k)],
            &first_pass[ctx.row(j, k + 1)],
            &first_pass[ctx.row(j + 1, k + 1)],
        ];
        let Some(range) = trim_voxel_row(ctx, &edges, neighbours, &mut rows[j]) else {
            continue;
        };

        let counts = count_voxel_row(ctx, &edges, j, k, range);
        let row = &mut rows[j];
        row.y_points += counts.y_points;
        row.z_points += counts.z_points;
        row.triangles += counts.triangles;
        rows[j + 1].z_points += counts.next_row_z;
        if let Some(above) = above.as_deref_mut() {
            above[j].y_points += counts.next_slice_y;
        } else {
            debug_assert_eq!(counts.next_slice_y, 0);
        }
    }
}

/// Range of voxels in row `(j, k)` that may hold contour
///
/// Returns `None` when the whole voxel row is empty. Widened bounds are
/// stored back into `row` so the output pass walks the same voxels.
fn trim_voxel_row<T: VolumeScalar>(
    ctx: &ContourContext<'_, '_, T>,
    edges: &[&[XEdgeState]; 4],
    neighbours: [&EdgeMetaData; 4],
    row: &mut EdgeMetaData,
) -> Option<Range<usize>> {
    let x_cells = ctx.dims[0] - 1;

    if !ctx.config.computational_trimming {
        row.trim_left = 0;
        row.trim_right = x_cells;
        return Some(0..x_cells);
    }

    if neighbours.iter().all(|n| n.x_points == 0) {
        // Each bounding row is uniform; only a y/z crossing can cut the voxels
        if edges.iter().all(|e| e[0] == edges[0][0]) {
            return None;
        }
        row.trim_left = 0;
        row.trim_right = x_cells;
        return Some(0..x_cells);
    }

    let (mut left, mut right) = EdgeMetaData::union_trim(neighbours);

    // The contour can leave through a y/z face outside the x-crossings
    if left > 0 && !all_agree(edges, left, XEdgeState::left_above) {
        left = 0;
        row.trim_left = 0;
    }
    if right < x_cells && !all_agree(edges, right, XEdgeState::right_above) {
        right = x_cells;
        row.trim_right = x_cells;
    }

    Some(left..right)
}

fn all_agree(edges: &[&[XEdgeState]; 4], i: usize, side: fn(XEdgeState) -> bool) -> bool {
    let first = side(edges[0][i]);
    edges[1..].iter().all(|e| side(e[i]) == first)
}

fn count_voxel_row<T: VolumeScalar>(
    ctx: &ContourContext<'_, '_, T>,
    edges: &[&[XEdgeState]; 4],
    j: usize,
    k: usize,
    range: Range<usize>,
) -> RowCounts {
    let table = ctx.table;
    let mut counts = RowCounts::default();

    for i in range {
        let code = case_code(edges, i);
        let triangles = table.triangle_count(code);
        if triangles == 0 {
            continue;
        }

        let uses = table.edge_uses(code);
        counts.triangles += triangles;
        counts.y_points += uses[4] as usize;
        counts.z_points += uses[8] as usize;

        let loc = BoundaryLoc::voxel([i, j, k], ctx.dims);
        for &edge in boundary_edges(loc) {
            let used = uses[edge] as usize;
            match edge {
                5 => counts.y_points += used,
                9 => counts.z_points += used,
                6 | 7 => counts.next_slice_y += used,
                10 | 11 => counts.next_row_z += used,
                // x-edges were counted by the first pass
                _ => {}
            }
        }
    }

    counts
}
