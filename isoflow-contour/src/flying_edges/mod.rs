//! Flying Edges isosurface extraction
//!
//! Contours a regular scalar volume in four passes per isovalue:
//!
//! 1. [`x_edges`] classifies every x-edge and records per-row trim bounds.
//! 2. [`yz_edges`] walks the trimmed voxel rows and counts y/z-edge points
//!    and triangles per row.
//! 3. [`prefix_sum`] turns the counts into output offsets, after which the
//!    output buffers are sized exactly once.
//! 4. [`output`] fills in points, triangles and per-point data.
//!
//! Passes 1, 2 and 4 run one task per z-slice; each task writes only rows it
//! owns, so no locking is needed.

pub mod boundary;
pub mod case_table;
pub mod metadata;
mod output;
mod prefix_sum;
mod x_edges;
mod yz_edges;

use crate::config::ContourConfig;
use crate::contour_values::ContourValues;
use case_table::EdgeCaseTable;
use isoflow_core::{
    ContourMesh, ContourRange, Error, InterpolatedAttribute, Point3f, Result, ScalarVolume,
    Vector3f, VolumeScalar,
};
use metadata::{EdgeMetaData, XEdgeState};
use output::OutputBuffers;

/// State shared by the passes for one isovalue
pub(crate) struct ContourContext<'c, 'a, T> {
    pub volume: &'c ScalarVolume<'a, T>,
    pub config: &'c ContourConfig,
    pub table: &'static EdgeCaseTable,
    pub value: f64,
    pub dims: [usize; 3],
}

impl<T: VolumeScalar> ContourContext<'_, '_, T> {
    #[inline]
    fn component(&self) -> usize {
        self.config.array_component
    }

    /// Metadata index of x-row `(j, k)`
    #[inline]
    fn row(&self, j: usize, k: usize) -> usize {
        k * self.dims[1] + j
    }

    #[inline]
    fn x_row<'s>(&self, states: &'s [XEdgeState], j: usize, k: usize) -> &'s [XEdgeState] {
        let x_cells = self.dims[0] - 1;
        let start = self.row(j, k) * x_cells;
        &states[start..start + x_cells]
    }

    /// The four x-rows bounding voxel row `(j, k)`
    fn voxel_row_states<'s>(
        &self,
        states: &'s [XEdgeState],
        j: usize,
        k: usize,
    ) -> [&'s [XEdgeState]; 4] {
        [
            self.x_row(states, j, k),
            self.x_row(states, j + 1, k),
            self.x_row(states, j, k + 1),
            self.x_row(states, j + 1, k + 1),
        ]
    }

    fn is_cancelled(&self) -> bool {
        self.config.is_cancelled()
    }
}

/// Flying Edges contour filter
#[derive(Debug, Clone, Default)]
pub struct FlyingEdges {
    config: ContourConfig,
}

impl FlyingEdges {
    /// Create a new Flying Edges instance
    pub fn new(config: ContourConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ContourConfig {
        &self.config
    }

    /// Extract the isosurfaces of `volume` at each of `values`
    ///
    /// Surfaces are appended to one mesh in the order of `values`; the
    /// mesh's `contours` list records the point and face range of each.
    pub fn contour<T: VolumeScalar>(
        &self,
        volume: &ScalarVolume<'_, T>,
        values: &ContourValues,
    ) -> Result<ContourMesh> {
        self.validate(volume, values)?;

        let mut mesh = self.empty_mesh(volume);
        let table = EdgeCaseTable::get();
        let dims = volume.dimensions();
        let rows = dims[1] * dims[2];

        for (index, &value) in values.iter().enumerate() {
            self.check_cancelled()?;

            let ctx = ContourContext {
                volume,
                config: &self.config,
                table,
                value,
                dims,
            };

            let mut meta = try_filled(rows, EdgeMetaData::default(), "row records")?;
            let mut states = try_filled((dims[0] - 1) * rows, XEdgeState::Below, "edge states")?;

            log::trace!("Isovalue {}: classifying x-edges", value);
            x_edges::classify_x_edges(&ctx, &mut meta, &mut states);
            self.check_cancelled()?;

            log::trace!("Isovalue {}: counting y/z-edges", value);
            yz_edges::count_yz_edges(&ctx, &mut meta, &states);
            self.check_cancelled()?;

            let start = (mesh.vertices.len(), mesh.faces.len());
            let end = prefix_sum::accumulate_offsets(&mut meta, start.0, start.1)?;
            log::debug!(
                "Isovalue {} ({}/{}): {} points, {} triangles",
                value,
                index + 1,
                values.len(),
                end.0 - start.0,
                end.1 - start.1
            );

            if end.1 > start.1 {
                allocate(&mut mesh, volume, end)?;
                log::trace!("Isovalue {}: generating output", value);
                output::generate_output(&ctx, &meta, &states, output_buffers(&mut mesh, start), end);
                self.check_cancelled()?;
            }

            mesh.contours.push(ContourRange {
                value,
                points: start.0..end.0,
                faces: start.1..end.1,
            });
        }

        Ok(mesh)
    }

    fn validate<T: VolumeScalar>(
        &self,
        volume: &ScalarVolume<'_, T>,
        values: &ContourValues,
    ) -> Result<()> {
        let component = self.config.array_component;
        if component >= volume.components() {
            return Err(Error::ComponentOutOfRange {
                component,
                components: volume.components(),
            });
        }
        volume.validate()?;

        if let Some(value) = values.iter().find(|v| v.is_nan()) {
            return Err(Error::InvalidData(format!(
                "Isovalue {} is not a number",
                value
            )));
        }
        Ok(())
    }

    /// Mesh with the optional arrays the configuration asks for
    fn empty_mesh<T: VolumeScalar>(&self, volume: &ScalarVolume<'_, T>) -> ContourMesh {
        let config = &self.config;
        ContourMesh {
            normals: config.compute_normals.then(Vec::new),
            gradients: config.compute_gradients.then(Vec::new),
            scalars: config.compute_scalars.then(Vec::new),
            attributes: if config.interpolate_attributes {
                volume
                    .attributes()
                    .iter()
                    .map(|a| InterpolatedAttribute {
                        name: a.name.to_string(),
                        components: a.components,
                        values: Vec::new(),
                    })
                    .collect()
            } else {
                Vec::new()
            },
            ..Default::default()
        }
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.config.is_cancelled() {
            log::warn!("Contouring cancelled, discarding partial output");
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}

/// Convenience function for contouring a single isovalue with default options
pub fn flying_edges<T: VolumeScalar>(
    volume: &ScalarVolume<'_, T>,
    isovalue: f64,
) -> Result<ContourMesh> {
    FlyingEdges::default().contour(volume, &ContourValues::single(isovalue))
}

fn try_filled<T: Clone>(len: usize, value: T, what: &str) -> Result<Vec<T>> {
    let mut buffer = Vec::new();
    grow(&mut buffer, len, value, what)?;
    Ok(buffer)
}

fn grow<T: Clone>(buffer: &mut Vec<T>, len: usize, value: T, what: &str) -> Result<()> {
    let additional = len.saturating_sub(buffer.len());
    buffer.try_reserve_exact(additional).map_err(|e| {
        Error::CapacityExceeded(format!("Cannot allocate {} {}: {}", additional, what, e))
    })?;
    buffer.resize(len, value);
    Ok(())
}

/// Size every output array for `end = (points, triangles)` in one step
fn allocate<T: VolumeScalar>(
    mesh: &mut ContourMesh,
    volume: &ScalarVolume<'_, T>,
    end: (usize, usize),
) -> Result<()> {
    let (points, triangles) = end;
    grow(&mut mesh.vertices, points, Point3f::origin(), "points")?;
    grow(&mut mesh.faces, triangles, [0; 3], "triangles")?;
    if let Some(normals) = mesh.normals.as_mut() {
        grow(normals, points, Vector3f::zeros(), "normals")?;
    }
    if let Some(gradients) = mesh.gradients.as_mut() {
        grow(gradients, points, Vector3f::zeros(), "gradients")?;
    }
    if let Some(scalars) = mesh.scalars.as_mut() {
        grow(scalars, points, 0.0, "scalars")?;
    }
    for (attribute, source) in mesh.attributes.iter_mut().zip(volume.attributes()) {
        let len = points.checked_mul(source.components).ok_or_else(|| {
            Error::CapacityExceeded(format!("Attribute '{}' is too large", source.name))
        })?;
        grow(&mut attribute.values, len, 0.0, source.name)?;
    }
    Ok(())
}

fn output_buffers(mesh: &mut ContourMesh, start: (usize, usize)) -> OutputBuffers<'_> {
    let (points, faces) = start;
    OutputBuffers {
        vertices: &mut mesh.vertices[points..],
        faces: &mut mesh.faces[faces..],
        normals: mesh.normals.as_mut().map(|n| &mut n[points..]),
        gradients: mesh.gradients.as_mut().map(|g| &mut g[points..]),
        scalars: mesh.scalars.as_mut().map(|s| &mut s[points..]),
        attributes: mesh
            .attributes
            .iter_mut()
            .map(|a| &mut a.values[points * a.components..])
            .collect(),
    }
}
