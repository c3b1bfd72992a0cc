//! Catmull-Clark and linear polygon subdivision.

use log::debug;
use nalgebra::{Point3, Vector3};
use slotmap::SecondaryMap;

use crate::algo::Progress;
use crate::error::Result;
use crate::mesh::{build, EdgeId, FaceId, HalfEdgeMesh, VertexId};

use super::{SubdivideOptions, SubdivisionScheme};

/// Split every face of degree `k` into `k` quads.
///
/// Works on any closed polygon mesh. Each iteration turns `V, E, F` into
/// `V + E + F` vertices and `2E + Σ deg` edges, rebuilding the
/// connectivity from scratch; all element handles change.
pub fn subdivide_quad(mesh: &mut HalfEdgeMesh, options: &SubdivideOptions) -> Result<()> {
    subdivide_quad_internal(mesh, options, None)
}

/// Polygon subdivision with progress reporting.
///
/// See [`subdivide_quad`] for details.
pub fn subdivide_quad_with_progress(
    mesh: &mut HalfEdgeMesh,
    options: &SubdivideOptions,
    progress: &Progress,
) -> Result<()> {
    subdivide_quad_internal(mesh, options, Some(progress))
}

fn subdivide_quad_internal(
    mesh: &mut HalfEdgeMesh,
    options: &SubdivideOptions,
    progress: Option<&Progress>,
) -> Result<()> {
    if options.iterations == 0 {
        return Ok(());
    }

    let mut work = mesh.clone();
    for iter in 0..options.iterations {
        if let Some(p) = progress {
            p.report(iter, options.iterations, "Subdividing");
        }
        work = subdivide_once(&work, options.scheme)?;
    }
    if let Some(p) = progress {
        p.report(options.iterations, options.iterations, "Subdivision complete");
    }

    debug!(
        "subdivided to {} vertices, {} faces",
        work.num_vertices(),
        work.num_faces()
    );
    *mesh = work;
    Ok(())
}

fn subdivide_once(mesh: &HalfEdgeMesh, scheme: SubdivisionScheme) -> Result<HalfEdgeMesh> {
    let mut positions: Vec<Point3<f64>> =
        Vec::with_capacity(mesh.num_vertices() + mesh.num_edges() + mesh.num_faces());

    // Face points
    let mut face_index: SecondaryMap<FaceId, usize> = SecondaryMap::new();
    let mut face_points: SecondaryMap<FaceId, Point3<f64>> = SecondaryMap::new();
    for f in mesh.face_ids() {
        let c = mesh.face_centroid(f);
        face_points.insert(f, c);
        face_index.insert(f, positions.len());
        positions.push(c);
    }

    // Edge points
    let mut edge_index: SecondaryMap<EdgeId, usize> = SecondaryMap::new();
    for e in mesh.edge_ids() {
        let p = match scheme {
            SubdivisionScheme::Linear => mesh.edge_midpoint(e),
            SubdivisionScheme::Smooth => {
                let [a, b] = mesh.edge_vertices(e);
                let [f0, f1] = mesh.edge_faces(e);
                let sum = mesh.position(a).coords
                    + mesh.position(b).coords
                    + face_points[f0].coords
                    + face_points[f1].coords;
                Point3::from(sum / 4.0)
            }
        };
        edge_index.insert(e, positions.len());
        positions.push(p);
    }

    // Vertex points
    let mut vertex_index: SecondaryMap<VertexId, usize> = SecondaryMap::new();
    for v in mesh.vertex_ids() {
        let p = match scheme {
            SubdivisionScheme::Linear => *mesh.position(v),
            SubdivisionScheme::Smooth => smooth_vertex_point(mesh, v, &face_points),
        };
        vertex_index.insert(v, positions.len());
        positions.push(p);
    }

    // corner, next edge point, face point, previous edge point
    let mut polygons: Vec<[usize; 4]> = Vec::new();
    for f in mesh.face_ids() {
        let fp = face_index[f];
        for h in mesh.face_halfedges(f) {
            let prev = mesh.prev(h);
            polygons.push([
                vertex_index[mesh.origin(h)],
                edge_index[mesh.edge_of(h)],
                fp,
                edge_index[mesh.edge_of(prev)],
            ]);
        }
    }

    Ok(build(&polygons, &positions)?)
}

/// `(F + 2R + (n - 3) P) / n` with `F` the mean face point and `R` the mean
/// edge midpoint around the vertex.
fn smooth_vertex_point(
    mesh: &HalfEdgeMesh,
    v: VertexId,
    face_points: &SecondaryMap<FaceId, Point3<f64>>,
) -> Point3<f64> {
    let p = mesh.position(v).coords;
    let mut face_sum = Vector3::zeros();
    let mut mid_sum = Vector3::zeros();
    let mut n = 0usize;
    for h in mesh.vertex_halfedges(v) {
        face_sum += face_points[mesh.face_of(h)].coords;
        mid_sum += mesh.edge_midpoint(mesh.edge_of(h)).coords;
        n += 1;
    }
    if n == 0 {
        return Point3::from(p);
    }
    let k = n as f64;
    Point3::from((face_sum / k + mid_sum * (2.0 / k) + p * (k - 3.0)) / k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::primitives;

    #[test]
    fn test_cube_counts() {
        let mut mesh = primitives::cube(1.0).build().unwrap();
        subdivide_quad(&mut mesh, &SubdivideOptions::new(1)).unwrap();

        assert!(mesh.is_valid());
        assert_eq!(mesh.num_vertices(), 26);
        assert_eq!(mesh.num_edges(), 48);
        assert_eq!(mesh.num_faces(), 24);
        assert!(mesh.face_ids().all(|f| mesh.face_degree(f) == 4));
    }

    #[test]
    fn test_triangles_become_quads() {
        let mut mesh = primitives::tetrahedron(1.0).build().unwrap();
        subdivide_quad(&mut mesh, &SubdivideOptions::new(2)).unwrap();

        // 4 triangles -> 12 quads -> 48 quads
        assert_eq!(mesh.num_faces(), 48);
        assert_eq!(mesh.euler_characteristic(), 2);
    }

    #[test]
    fn test_catmull_clark_cube_corner() {
        let mut mesh = primitives::cube(2.0).build().unwrap();
        subdivide_quad(&mut mesh, &SubdivideOptions::new(1)).unwrap();

        // Corner (1, 1, 1): F = (1/3, 1/3, 1/3), R = (2/3, 2/3, 2/3),
        // n = 3, so the corner moves to (5/9, 5/9, 5/9).
        let expected = 5.0 / 9.0;
        let corners = mesh
            .vertex_ids()
            .filter(|&v| mesh.valence(v) == 3)
            .map(|v| *mesh.position(v))
            .collect::<Vec<_>>();
        assert_eq!(corners.len(), 8);
        for p in corners {
            for c in p.iter() {
                assert!((c.abs() - expected).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_linear_keeps_surface() {
        let mut mesh = primitives::cube(1.0).build().unwrap();
        subdivide_quad(&mut mesh, &SubdivideOptions::new(1).linear()).unwrap();

        assert!((mesh.surface_area() - 6.0).abs() < 1e-12);
        let (lo, hi) = mesh.bounding_box().unwrap();
        assert_eq!(lo, Point3::new(-0.5, -0.5, -0.5));
        assert_eq!(hi, Point3::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_zero_iterations_no_change() {
        let mut mesh = primitives::cube(1.0).build().unwrap();
        let before = mesh.to_polygon_soup();
        subdivide_quad(&mut mesh, &SubdivideOptions::new(0)).unwrap();
        assert_eq!(mesh.to_polygon_soup(), before);
    }
}
