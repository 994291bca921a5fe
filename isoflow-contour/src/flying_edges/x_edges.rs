//! First pass: classify x-edges and find per-row trim bounds

use super::metadata::{EdgeMetaData, XEdgeState};
use super::ContourContext;
use crate::parallel;
use isoflow_core::VolumeScalar;

/// Classify every x-edge of the volume against the current isovalue
///
/// Slices are processed independently; each writes only its own rows of
/// `meta` and `states`.
pub(super) fn classify_x_edges<T: VolumeScalar>(
    ctx: &ContourContext<'_, '_, T>,
    meta: &mut [EdgeMetaData],
    states: &mut [XEdgeState],
) {
    let [nx, ny, _] = ctx.dims;
    let x_cells = nx - 1;

    let tasks: Vec<_> = meta
        .chunks_mut(ny)
        .zip(states.chunks_mut(ny * x_cells))
        .enumerate()
        .collect();

    parallel::for_each_task(tasks, |(k, (rows, slice_states))| {
        if ctx.is_cancelled() {
            return;
        }
        for (j, (row, row_states)) in rows
            .iter_mut()
            .zip(slice_states.chunks_mut(x_cells))
            .enumerate()
        {
            *row = classify_row(ctx, j, k, row_states);
        }
    });
}

fn classify_row<T: VolumeScalar>(
    ctx: &ContourContext<'_, '_, T>,
    j: usize,
    k: usize,
    states: &mut [XEdgeState],
) -> EdgeMetaData {
    let volume = ctx.volume;
    let component = ctx.component();
    let mut row = EdgeMetaData::empty(states.len());

    let mut left = volume.sample(volume.point_index(0, j, k), component);
    for (i, state) in states.iter_mut().enumerate() {
        let right = volume.sample(volume.point_index(i + 1, j, k), component);
        *state = XEdgeState::classify(left, right, ctx.value);
        if state.is_crossing() {
            row.x_points += 1;
            row.trim_left = row.trim_left.min(i);
            row.trim_right = i + 1;
        }
        left = right;
    }
    row
}
