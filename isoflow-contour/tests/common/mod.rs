//! Brute-force reference used by the integration tests
//!
//! Classifies every voxel independently from its eight corner samples and
//! interpolates every crossed edge on its own, with no sharing between
//! voxels. Flying Edges output must describe exactly the same triangles.

#![allow(dead_code)]

use isoflow_contour::flying_edges::case_table::{EdgeCaseTable, EDGE_VERTEX_MAP, VERTEX_OFFSETS};
use isoflow_core::{ContourMesh, GridIndex, Point3f, ScalarVolume};

pub type PositionKey = [u32; 3];

/// Route `log` output through the test harness; set `RUST_LOG` to see it
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn key(p: &Point3f) -> PositionKey {
    [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()]
}

/// Rotate a triangle so its smallest key comes first, keeping the winding
fn canonical(mut tri: [PositionKey; 3]) -> [PositionKey; 3] {
    let first = (0..3).min_by_key(|&i| tri[i]).unwrap_or(0);
    tri.rotate_left(first);
    tri
}

fn sample(volume: &ScalarVolume<'_, f32>, ijk: GridIndex) -> f64 {
    volume.value(ijk, 0).unwrap()
}

fn edge_point(volume: &ScalarVolume<'_, f32>, ijk: GridIndex, edge: usize, value: f64) -> Point3f {
    let [a, b] = EDGE_VERTEX_MAP[edge];
    let corner = |c: usize| {
        let o = VERTEX_OFFSETS[c];
        [ijk[0] + o[0], ijk[1] + o[1], ijk[2] + o[2]]
    };
    let (pa, pb) = (corner(a), corner(b));
    let (sa, sb) = (sample(volume, pa), sample(volume, pb));
    let t = (value - sa) / (sb - sa);
    let position: [f64; 3] =
        std::array::from_fn(|d| pa[d] as f64 + t * (pb[d] as f64 - pa[d] as f64));
    volume.index_to_world(position)
}

/// Triangles of every voxel, as canonical position triples, sorted
pub fn reference_triangles(volume: &ScalarVolume<'_, f32>, value: f64) -> Vec<[PositionKey; 3]> {
    let table = EdgeCaseTable::get();
    let [nx, ny, nz] = volume.dimensions();
    let mut triangles = Vec::new();

    for k in 0..nz - 1 {
        for j in 0..ny - 1 {
            for i in 0..nx - 1 {
                let mut code = 0u8;
                for (c, offset) in VERTEX_OFFSETS.iter().enumerate() {
                    let s = sample(volume, [i + offset[0], j + offset[1], k + offset[2]]);
                    if s >= value {
                        code |= 1 << c;
                    }
                }
                for tri in table.triangles(code) {
                    let p = tri.map(|e| key(&edge_point(volume, [i, j, k], e as usize, value)));
                    triangles.push(canonical(p));
                }
            }
        }
    }

    triangles.sort_unstable();
    triangles
}

/// Faces of `mesh` in the same form as [`reference_triangles`]
pub fn mesh_triangles(mesh: &ContourMesh) -> Vec<[PositionKey; 3]> {
    let mut triangles: Vec<_> = mesh
        .faces
        .iter()
        .map(|face| canonical(face.map(|id| key(&mesh.vertices[id]))))
        .collect();
    triangles.sort_unstable();
    triangles
}

/// Number of grid edges whose endpoints lie on different sides of `value`
pub fn crossed_edge_count(volume: &ScalarVolume<'_, f32>, value: f64) -> usize {
    let [nx, ny, nz] = volume.dimensions();
    let mut count = 0;
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let above = sample(volume, [i, j, k]) >= value;
                for (di, dj, dk) in [(1, 0, 0), (0, 1, 0), (0, 0, 1)] {
                    let n = [i + di, j + dj, k + dk];
                    if n[0] < nx && n[1] < ny && n[2] < nz && (sample(volume, n) >= value) != above {
                        count += 1;
                    }
                }
            }
        }
    }
    count
}

/// Every face uses three distinct, valid point ids
pub fn assert_faces_valid(mesh: &ContourMesh) {
    for face in &mesh.faces {
        assert!(face.iter().all(|&id| id < mesh.vertex_count()), "face {:?} out of range", face);
        assert!(
            face[0] != face[1] && face[1] != face[2] && face[0] != face[2],
            "degenerate face {:?}",
            face
        );
    }
}
