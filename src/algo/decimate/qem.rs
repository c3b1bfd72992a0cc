//! Quadric Error Metrics (QEM) downsampling.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::{debug, info};
use nalgebra::{Matrix4, Point3, Vector4};
use slotmap::SecondaryMap;

use crate::algo::{require_triangles, Progress};
use crate::error::{PrecisionError, Result};
use crate::mesh::{EdgeId, HalfEdgeMesh, VertexId};

use super::DecimateOptions;

/// Sum of squared distances to a set of planes, as a symmetric 4x4 matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Quadric(Matrix4<f64>);

impl Quadric {
    fn zero() -> Self {
        Self(Matrix4::zeros())
    }

    /// Quadric of the plane `n . x + d = 0` with unit `n`.
    fn from_plane(plane: Vector4<f64>) -> Self {
        Self(plane * plane.transpose())
    }

    /// `v^T Q v` with `v = [x, y, z, 1]`.
    fn evaluate(&self, p: &Point3<f64>) -> f64 {
        let v = p.to_homogeneous();
        (v.transpose() * self.0 * v)[(0, 0)]
    }

    /// Point minimising the error, if the quadric is not singular.
    fn optimal_point(&self) -> Option<Point3<f64>> {
        let mut m = self.0;
        m.set_row(3, &Vector4::new(0.0, 0.0, 0.0, 1.0).transpose());
        let inv = m.try_inverse()?;
        let v = inv * Vector4::new(0.0, 0.0, 0.0, 1.0);
        Some(Point3::new(v.x, v.y, v.z))
    }
}

impl std::ops::Add for Quadric {
    type Output = Quadric;

    fn add(self, other: Quadric) -> Quadric {
        Quadric(self.0 + other.0)
    }
}

/// An edge collapse waiting in the queue.
#[derive(Debug, Clone)]
struct EdgeCandidate {
    edge: EdgeId,
    /// Endpoints when the candidate was queued.
    ends: [VertexId; 2],
    /// Endpoint versions when the candidate was queued.
    stamps: [u32; 2],
    position: Point3<f64>,
    error: f64,
}

// Implement ordering for min-heap (we want smallest error first)
impl PartialEq for EdgeCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.error == other.error
    }
}

impl Eq for EdgeCandidate {}

impl PartialOrd for EdgeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EdgeCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap
        other
            .error
            .partial_cmp(&self.error)
            .unwrap_or(Ordering::Equal)
    }
}

/// Per-vertex state of a downsampling run.
struct Simplifier {
    quadrics: SecondaryMap<VertexId, Quadric>,
    stamps: SecondaryMap<VertexId, u32>,
    heap: BinaryHeap<EdgeCandidate>,
}

impl Simplifier {
    fn new(mesh: &HalfEdgeMesh) -> Self {
        let mut quadrics: SecondaryMap<VertexId, Quadric> =
            mesh.vertex_ids().map(|v| (v, Quadric::zero())).collect();
        for f in mesh.face_ids() {
            let n = mesh.face_normal(f);
            let p = mesh.face_centroid(f);
            let q = Quadric::from_plane(Vector4::new(n.x, n.y, n.z, -n.dot(&p.coords)));
            for v in mesh.face_vertices(f) {
                if let Some(acc) = quadrics.get_mut(v) {
                    *acc = *acc + q;
                }
            }
        }
        let stamps = mesh.vertex_ids().map(|v| (v, 0)).collect();

        let mut simplifier = Self {
            quadrics,
            stamps,
            heap: BinaryHeap::with_capacity(mesh.num_edges()),
        };
        for e in mesh.edge_ids() {
            simplifier.push(mesh, e);
        }
        simplifier
    }

    fn push(&mut self, mesh: &HalfEdgeMesh, e: EdgeId) {
        let [a, b] = mesh.edge_vertices(e);
        let (Some(&qa), Some(&qb)) = (self.quadrics.get(a), self.quadrics.get(b)) else {
            return;
        };
        let q = qa + qb;
        let pa = *mesh.position(a);
        let pb = *mesh.position(b);

        let mid = nalgebra::center(&pa, &pb);
        let mut options = vec![pa, pb, mid];
        // Nearly singular quadrics can put the optimum far off the surface.
        if let Some(p) = q.optimal_point().filter(|p| (p - mid).norm() <= (pb - pa).norm()) {
            options.push(p);
        }
        let (position, error) = options
            .into_iter()
            .map(|p| (p, q.evaluate(&p)))
            .min_by(|x, y| x.1.partial_cmp(&y.1).unwrap_or(Ordering::Equal))
            .unwrap_or((pa, 0.0));

        self.heap.push(EdgeCandidate {
            edge: e,
            ends: [a, b],
            stamps: [self.stamp(a), self.stamp(b)],
            position,
            error,
        });
    }

    fn stamp(&self, v: VertexId) -> u32 {
        self.stamps.get(v).copied().unwrap_or(0)
    }

    fn is_current(&self, mesh: &HalfEdgeMesh, c: &EdgeCandidate) -> bool {
        mesh.contains_edge(c.edge)
            && mesh.edge_vertices(c.edge) == c.ends
            && c.ends
                .iter()
                .zip(&c.stamps)
                .all(|(&v, &s)| self.stamps.get(v) == Some(&s))
    }
}

/// Simplify a triangle mesh by repeated edge collapse.
///
/// Returns the number of edges collapsed.
///
/// # Errors
///
/// - [`PrecisionError::NonTriangular`] if any face is not a triangle
/// - [`PrecisionError::NoSimplification`] if not a single edge could be
///   collapsed; the mesh is unchanged
pub fn downsample(mesh: &mut HalfEdgeMesh, options: &DecimateOptions) -> Result<usize> {
    downsample_internal(mesh, options, None)
}

/// Downsample with progress reporting.
///
/// See [`downsample`] for details.
pub fn downsample_with_progress(
    mesh: &mut HalfEdgeMesh,
    options: &DecimateOptions,
    progress: &Progress,
) -> Result<usize> {
    downsample_internal(mesh, options, Some(progress))
}

fn downsample_internal(
    mesh: &mut HalfEdgeMesh,
    options: &DecimateOptions,
    progress: Option<&Progress>,
) -> Result<usize> {
    require_triangles(mesh)?;

    let original = mesh.num_faces();
    let target = options.compute_target(original);
    if target >= original {
        return Ok(0);
    }
    let to_remove = original - target;

    let mut simplifier = Simplifier::new(mesh);
    let mut collapsed = 0;
    let mut skipped = 0;

    while mesh.num_faces() > target {
        let Some(candidate) = simplifier.heap.pop() else {
            break;
        };
        if !simplifier.is_current(mesh, &candidate) {
            continue;
        }
        if options.max_error.is_some_and(|max| candidate.error > max) {
            break;
        }

        let [a, b] = candidate.ends;
        let merged = simplifier.quadrics[a] + simplifier.quadrics[b];
        match mesh.collapse_edge_to(candidate.edge, candidate.position) {
            Ok(s) => {
                simplifier.quadrics.insert(s, merged);
                let stamp = simplifier.stamp(s) + 1;
                simplifier.stamps.insert(s, stamp);
                for e in mesh.vertex_edges(s).collect::<Vec<_>>() {
                    simplifier.push(mesh, e);
                }
                collapsed += 1;

                if let Some(p) = progress {
                    let done = original - mesh.num_faces();
                    p.report(done.min(to_remove), to_remove, "Collapsing edges");
                }
            }
            Err(err) => {
                skipped += 1;
                debug!("skipped collapse of {:?}: {}", candidate.edge, err);
            }
        }
    }

    if collapsed == 0 {
        return Err(PrecisionError::NoSimplification.into());
    }
    if let Some(p) = progress {
        p.report(to_remove, to_remove, "Downsampling complete");
    }

    info!(
        "downsampled {} -> {} faces ({} collapses, {} refused)",
        original,
        mesh.num_faces(),
        collapsed,
        skipped
    );
    Ok(collapsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::subdivide::{upsample, SubdivideOptions};
    use crate::error::MeshError;
    use crate::mesh::primitives;
    use nalgebra::Vector3;

    fn sphere() -> HalfEdgeMesh {
        let mut mesh = primitives::icosahedron(1.0).build().unwrap();
        upsample(&mut mesh, &SubdivideOptions::new(2)).unwrap();
        mesh
    }

    #[test]
    fn test_quadric_measures_plane_distance() {
        let n = Vector3::new(0.0, 0.0, 1.0);
        let q = Quadric::from_plane(Vector4::new(n.x, n.y, n.z, -2.0));
        assert!((q.evaluate(&Point3::new(5.0, -3.0, 2.0))).abs() < 1e-12);
        assert!((q.evaluate(&Point3::new(0.0, 0.0, 5.0)) - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_optimal_point_of_three_planes() {
        let q = Quadric::from_plane(Vector4::new(1.0, 0.0, 0.0, -1.0))
            + Quadric::from_plane(Vector4::new(0.0, 1.0, 0.0, -2.0))
            + Quadric::from_plane(Vector4::new(0.0, 0.0, 1.0, -3.0));
        let p = q.optimal_point().unwrap();
        assert!((p - Point3::new(1.0, 2.0, 3.0)).norm() < 1e-9);
        assert!(Quadric::zero().optimal_point().is_none());
    }

    #[test]
    fn test_downsample_reduces_vertices() {
        let mut mesh = sphere();
        let (v, f) = (mesh.num_vertices(), mesh.num_faces());

        let collapsed = downsample(&mut mesh, &DecimateOptions::default()).unwrap();

        assert!(collapsed > 0);
        assert!(mesh.num_vertices() < v);
        assert!(mesh.num_faces() < f);
        assert!(mesh.is_valid());
        assert_eq!(mesh.euler_characteristic(), 2);
        assert!(mesh.is_triangle_mesh());
    }

    #[test]
    fn test_downsample_target_faces() {
        let mut mesh = sphere();
        downsample(&mut mesh, &DecimateOptions::with_target_faces(200)).unwrap();
        assert!(mesh.num_faces() <= 200);
        assert!(mesh.num_faces() >= 190);
    }

    #[test]
    fn test_downsample_stays_near_surface() {
        let mut mesh = sphere();
        downsample(&mut mesh, &DecimateOptions::with_target_ratio(0.5)).unwrap();
        for v in mesh.vertex_ids() {
            let r = mesh.position(v).coords.norm();
            assert!(r > 0.7 && r < 1.1, "radius {}", r);
        }
    }

    #[test]
    fn test_downsample_requires_triangles() {
        let mut mesh = primitives::cube(1.0).build().unwrap();
        assert!(matches!(
            downsample(&mut mesh, &DecimateOptions::default()),
            Err(MeshError::Precision(PrecisionError::NonTriangular { .. }))
        ));
    }

    #[test]
    fn test_tetrahedron_cannot_be_simplified() {
        let mut mesh = primitives::tetrahedron(1.0).build().unwrap();
        let before = mesh.to_polygon_soup();
        assert_eq!(
            downsample(&mut mesh, &DecimateOptions::default()),
            Err(MeshError::Precision(PrecisionError::NoSimplification))
        );
        assert_eq!(mesh.to_polygon_soup(), before);
    }

    #[test]
    fn test_max_error_blocks_costly_collapses() {
        let mut mesh = primitives::cube(1.0).build().unwrap();
        mesh.triangulate();
        let before = mesh.to_polygon_soup();
        let options = DecimateOptions::default().with_max_error(1e-9);
        assert_eq!(
            downsample(&mut mesh, &options),
            Err(MeshError::Precision(PrecisionError::NoSimplification))
        );
        assert_eq!(mesh.to_polygon_soup(), before);
    }

    #[test]
    fn test_full_ratio_is_noop() {
        let mut mesh = sphere();
        let before = mesh.num_faces();
        assert_eq!(downsample(&mut mesh, &DecimateOptions::with_target_ratio(1.0)), Ok(0));
        assert_eq!(mesh.num_faces(), before);
    }
}
