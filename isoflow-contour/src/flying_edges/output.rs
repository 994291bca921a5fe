//! Fourth pass: write points, triangles and per-point data
//!
//! After the prefix sum every row knows where its x-, y- and z-edge points
//! and its triangles start. Walking a voxel row, the id of each of the
//! voxel's twelve edges is kept in `ids` and advanced by the case's edge
//! usage, so neighbouring voxels agree on the ids of shared edges without
//! any lookup.
//!
//! Output buffers are split into disjoint per-slice chunks. Every point a
//! voxel slice generates lies in that slice's rows, or in the top slice's
//! rows for the last voxel slice, so each task writes only its own chunk.

use super::boundary::{boundary_edges, vertex_gradient, BoundaryLoc};
use super::case_table::{EDGE_VERTEX_MAP, VERTEX_OFFSETS};
use super::metadata::{case_code, EdgeMetaData, XEdgeState};
use super::ContourContext;
use crate::parallel;
use isoflow_core::{GridIndex, Point3f, Vector3d, Vector3f, VolumeScalar};
use itertools::izip;
use std::ops::Range;

/// Output storage for one isovalue, starting at its first point and face
pub(super) struct OutputBuffers<'m> {
    pub vertices: &'m mut [Point3f],
    pub faces: &'m mut [[usize; 3]],
    pub normals: Option<&'m mut [Vector3f]>,
    pub gradients: Option<&'m mut [Vector3f]>,
    pub scalars: Option<&'m mut [f64]>,
    /// One buffer per volume attribute, empty when attributes are skipped
    pub attributes: Vec<&'m mut [f32]>,
}

/// The chunk of output owned by voxel slice `k`
struct SliceOutput<'m> {
    k: usize,
    /// Id of the first point in `vertices`
    point_base: usize,
    /// Id of the first triangle in `faces`
    face_base: usize,
    vertices: &'m mut [Point3f],
    faces: &'m mut [[usize; 3]],
    normals: Option<&'m mut [Vector3f]>,
    gradients: Option<&'m mut [Vector3f]>,
    scalars: Option<&'m mut [f64]>,
    attributes: Vec<&'m mut [f32]>,
}

/// Generate the contour for the offsets in `meta`
///
/// `end` holds the point and triangle totals returned by the prefix sum.
pub(super) fn generate_output<T: VolumeScalar>(
    ctx: &ContourContext<'_, '_, T>,
    meta: &[EdgeMetaData],
    states: &[XEdgeState],
    buffers: OutputBuffers<'_>,
    end: (usize, usize),
) {
    let slices = ctx.dims[2] - 1;

    let point_starts: Vec<usize> = (0..slices)
        .map(|k| meta[ctx.row(0, k)].x_points)
        .chain(std::iter::once(end.0))
        .collect();
    let face_starts: Vec<usize> = (0..slices)
        .map(|k| meta[ctx.row(0, k)].triangles)
        .chain(std::iter::once(end.1))
        .collect();
    let point_lens: Vec<usize> = point_starts.windows(2).map(|w| w[1] - w[0]).collect();
    let face_lens: Vec<usize> = face_starts.windows(2).map(|w| w[1] - w[0]).collect();

    let OutputBuffers {
        vertices,
        faces,
        normals,
        gradients,
        scalars,
        attributes,
    } = buffers;

    let components: Vec<usize> = ctx.volume.attributes().iter().map(|a| a.components).collect();
    let mut attribute_parts = transpose_attributes(attributes, &components, &point_lens);

    let tasks: Vec<SliceOutput<'_>> = izip!(
        0..slices,
        split_at_bounds(vertices, &point_lens),
        split_at_bounds(faces, &face_lens),
        split_optional(normals, &point_lens),
        split_optional(gradients, &point_lens),
        split_optional(scalars, &point_lens),
    )
    .map(|(k, vertices, faces, normals, gradients, scalars)| SliceOutput {
        k,
        point_base: point_starts[k],
        face_base: face_starts[k],
        vertices,
        faces,
        normals,
        gradients,
        scalars,
        attributes: std::mem::take(&mut attribute_parts[k]),
    })
    .collect();

    parallel::for_each_task(tasks, |mut out| {
        if ctx.is_cancelled() {
            return;
        }
        generate_slice(ctx, meta, states, &mut out);
    });
}

/// Split `data` into consecutive chunks of the given lengths
fn split_at_bounds<'a, T>(mut data: &'a mut [T], lens: &[usize]) -> Vec<&'a mut [T]> {
    let mut parts = Vec::with_capacity(lens.len());
    for &len in lens {
        let (head, tail) = std::mem::take(&mut data).split_at_mut(len);
        parts.push(head);
        data = tail;
    }
    parts
}

fn split_optional<'a, T>(data: Option<&'a mut [T]>, lens: &[usize]) -> Vec<Option<&'a mut [T]>> {
    match data {
        Some(data) => split_at_bounds(data, lens).into_iter().map(Some).collect(),
        None => lens.iter().map(|_| None).collect(),
    }
}

/// Per-slice chunks of every attribute buffer, indexed `[slice][attribute]`
fn transpose_attributes<'a>(
    attributes: Vec<&'a mut [f32]>,
    components: &[usize],
    point_lens: &[usize],
) -> Vec<Vec<&'a mut [f32]>> {
    let mut per_slice: Vec<Vec<&'a mut [f32]>> = point_lens
        .iter()
        .map(|_| Vec::with_capacity(attributes.len()))
        .collect();

    for (values, &count) in attributes.into_iter().zip(components) {
        let lens: Vec<usize> = point_lens.iter().map(|len| len * count).collect();
        for (slot, part) in per_slice.iter_mut().zip(split_at_bounds(values, &lens)) {
            slot.push(part);
        }
    }
    per_slice
}

fn generate_slice<T: VolumeScalar>(
    ctx: &ContourContext<'_, '_, T>,
    meta: &[EdgeMetaData],
    states: &[XEdgeState],
    out: &mut SliceOutput<'_>,
) {
    let k = out.k;
    let ny = ctx.dims[1];

    for j in 0..ny - 1 {
        let rows = [
            &meta[ctx.row(j, k)],
            &meta[ctx.row(j + 1, k)],
            &meta[ctx.row(j, k + 1)],
            &meta[ctx.row(j + 1, k + 1)],
        ];
        // No triangles in this voxel row
        if rows[0].triangles == rows[1].triangles {
            continue;
        }

        let (left, right) = EdgeMetaData::union_trim(rows);
        if left >= right {
            continue;
        }
        let edges = ctx.voxel_row_states(states, j, k);
        generate_voxel_row(ctx, out, &edges, rows, j, left..right);
    }
}

fn generate_voxel_row<T: VolumeScalar>(
    ctx: &ContourContext<'_, '_, T>,
    out: &mut SliceOutput<'_>,
    edges: &[&[XEdgeState]; 4],
    rows: [&EdgeMetaData; 4],
    j: usize,
    range: Range<usize>,
) {
    let table = ctx.table;
    let k = out.k;

    let first = table.edge_uses(case_code(edges, range.start));
    let mut ids = [0usize; 12];
    ids[0] = rows[0].x_points;
    ids[1] = rows[1].x_points;
    ids[2] = rows[2].x_points;
    ids[3] = rows[3].x_points;
    ids[4] = rows[0].y_points;
    ids[5] = ids[4] + first[4] as usize;
    ids[6] = rows[2].y_points;
    ids[7] = ids[6] + first[6] as usize;
    ids[8] = rows[0].z_points;
    ids[9] = ids[8] + first[8] as usize;
    ids[10] = rows[1].z_points;
    ids[11] = ids[10] + first[10] as usize;

    let mut face = rows[0].triangles;
    for i in range {
        let code = case_code(edges, i);
        let triangles = table.triangles(code);
        if triangles.is_empty() {
            continue;
        }

        for triangle in triangles {
            out.faces[face - out.face_base] = [
                ids[triangle[0] as usize],
                ids[triangle[1] as usize],
                ids[triangle[2] as usize],
            ];
            face += 1;
        }

        let uses = table.edge_uses(code);
        let loc = BoundaryLoc::voxel([i, j, k], ctx.dims);
        if table.includes_axes(code) || loc.max_faces() != 0 {
            let mut origin_gradient = None;
            for &edge in [0, 4, 8].iter().chain(boundary_edges(loc)) {
                if uses[edge] != 0 {
                    interpolate_edge(ctx, out, [i, j, k], edge, ids[edge], &mut origin_gradient);
                }
            }
        }

        advance_ids(&mut ids, uses);
    }
}

/// Move the edge ids on to the next voxel along x
#[inline]
fn advance_ids(ids: &mut [usize; 12], uses: &[u8; 12]) {
    for edge in 0..4 {
        ids[edge] += uses[edge] as usize;
    }
    // y- and z-edges pair up: the far edge of one voxel is the near edge of
    // the next
    for near in [4, 6, 8, 10] {
        ids[near] += uses[near] as usize;
        ids[near + 1] = ids[near] + uses[near + 1] as usize;
    }
}

/// Interpolate the point where `edge` of voxel `ijk` crosses the isovalue
///
/// `origin_gradient` caches the gradient at the voxel's first corner, which
/// the three axis edges share.
fn interpolate_edge<T: VolumeScalar>(
    ctx: &ContourContext<'_, '_, T>,
    out: &mut SliceOutput<'_>,
    ijk: GridIndex,
    edge: usize,
    id: usize,
    origin_gradient: &mut Option<Vector3d>,
) {
    let volume = ctx.volume;
    let component = ctx.component();
    let [a, b] = EDGE_VERTEX_MAP[edge];
    let pa = corner(ijk, a);
    let pb = corner(ijk, b);

    let ia = volume.point_index(pa[0], pa[1], pa[2]);
    let ib = volume.point_index(pb[0], pb[1], pb[2]);
    let sa = volume.sample(ia, component);
    let sb = volume.sample(ib, component);
    let t = (ctx.value - sa) / (sb - sa);

    let position: [f64; 3] =
        std::array::from_fn(|d| pa[d] as f64 + t * (pb[d] as f64 - pa[d] as f64));
    let local = id - out.point_base;
    out.vertices[local] = volume.index_to_world(position);

    if ctx.config.needs_gradients() {
        let ga = if a == 0 {
            *origin_gradient.get_or_insert_with(|| vertex_gradient(volume, component, pa))
        } else {
            vertex_gradient(volume, component, pa)
        };
        let gb = vertex_gradient(volume, component, pb);
        let gradient = ga + (gb - ga) * t;

        if let Some(normals) = out.normals.as_deref_mut() {
            normals[local] = (-gradient)
                .try_normalize(0.0)
                .unwrap_or_else(Vector3d::zeros)
                .cast::<f32>();
        }
        if let Some(gradients) = out.gradients.as_deref_mut() {
            gradients[local] = gradient.cast::<f32>();
        }
    }

    if let Some(scalars) = out.scalars.as_deref_mut() {
        scalars[local] = ctx.value;
    }

    let t = t as f32;
    for (attribute, values) in volume.attributes().iter().zip(out.attributes.iter_mut()) {
        let n = attribute.components;
        for c in 0..n {
            let va = attribute.values[ia * n + c];
            let vb = attribute.values[ib * n + c];
            values[local * n + c] = va + t * (vb - va);
        }
    }
}

#[inline]
fn corner(ijk: GridIndex, vertex: usize) -> GridIndex {
    let offset = VERTEX_OFFSETS[vertex];
    [ijk[0] + offset[0], ijk[1] + offset[1], ijk[2] + offset[2]]
}
