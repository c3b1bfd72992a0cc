//! Fan triangulation.

use log::{debug, warn};
use smallvec::SmallVec;

use super::OpResult;
use crate::error::OperatorError;
use crate::mesh::{FaceId, HalfEdgeId, HalfEdgeMesh, VertexId};

impl HalfEdgeMesh {
    /// Fan-triangulate every face with more than three sides.
    ///
    /// Returns the number of faces that were split. A mesh that is already
    /// all triangles is left untouched.
    pub fn triangulate(&mut self) -> usize {
        let polygons: Vec<FaceId> = self
            .face_ids()
            .filter(|&f| self.face_degree(f) > 3)
            .collect();

        let mut count = 0;
        for f in polygons {
            match self.triangulate_face(f) {
                Ok(_) => count += 1,
                Err(err) => warn!("face {:?} left untriangulated: {}", f, err),
            }
        }
        if count > 0 {
            debug!("triangulated {} faces", count);
        }
        count
    }

    /// Split one face into a fan of triangles.
    ///
    /// The fan starts at the face's first half-edge. If a diagonal from that
    /// corner would duplicate an existing edge the next corner is tried.
    /// The original face handle becomes the first triangle; all triangles
    /// are returned in fan order.
    ///
    /// # Errors
    ///
    /// [`OperatorError::WouldViolateManifoldness`] if every corner already
    /// connects to a non-adjacent corner of the face.
    pub fn triangulate_face(&mut self, f: FaceId) -> OpResult<Vec<FaceId>> {
        self.require_face(f)?;

        let mut ks: SmallVec<[HalfEdgeId; 8]> = self.face_halfedges(f).collect();
        let n = ks.len();
        if n <= 3 {
            return Ok(vec![f]);
        }

        let start = (0..n)
            .find(|&s| self.can_fan_from(&ks, s))
            .ok_or_else(|| OperatorError::non_manifold("every fan diagonal already exists"))?;
        ks.rotate_left(start);
        let us: SmallVec<[VertexId; 8]> = ks.iter().map(|&h| self.origin(h)).collect();

        // (u_k -> u_0, u_0 -> u_k) for k in 2..n-1
        let diagonals: SmallVec<[(HalfEdgeId, HalfEdgeId); 8]> = (2..n - 1)
            .map(|_| {
                let (_, down, up) = self.add_edge_pair();
                (down, up)
            })
            .collect();

        let first_down = diagonals[0].0;
        self.link(ks[0], us[0], ks[1], f);
        self.link(ks[1], us[1], first_down, f);
        self.link(first_down, us[2], ks[0], f);
        self.faces[f].halfedge = ks[0];

        let mut triangles = Vec::with_capacity(n - 2);
        triangles.push(f);
        for k in 2..n - 1 {
            let up = diagonals[k - 2].1;
            let closing = if k + 1 < n - 1 {
                diagonals[k - 1].0
            } else {
                ks[n - 1]
            };
            let g = self.add_face();
            self.link(up, us[0], ks[k], g);
            self.link(ks[k], us[k], closing, g);
            self.link(closing, us[k + 1], up, g);
            self.faces[g].halfedge = up;
            triangles.push(g);
        }

        Ok(triangles)
    }

    /// True if the fan from corner `s` adds no duplicate edge.
    fn can_fan_from(&self, loop_ids: &[HalfEdgeId], s: usize) -> bool {
        let n = loop_ids.len();
        let apex = self.origin(loop_ids[s]);
        (2..n - 1).all(|k| {
            let u = self.origin(loop_ids[(s + k) % n]);
            u != apex && self.find_halfedge(apex, u).is_none()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::test_util::*;
    use crate::mesh::{build, primitives};
    use nalgebra::Point3;

    #[test]
    fn test_triangulate_cube() {
        let mut mesh = primitives::cube(1.0).build().unwrap();
        assert_eq!(mesh.triangulate(), 6);

        assert_valid(&mesh);
        assert_eq!(counts(&mesh), (8, 18, 12));
        assert!(mesh.is_triangle_mesh());
        assert_eq!(mesh.euler_characteristic(), 2);
    }

    #[test]
    fn test_triangulate_triangles_is_noop() {
        let mut mesh = primitives::icosahedron(1.0).build().unwrap();
        let before = mesh.to_polygon_soup();
        assert_eq!(mesh.triangulate(), 0);
        assert_eq!(mesh.to_polygon_soup(), before);
    }

    #[test]
    fn test_triangulate_twice_is_noop() {
        let mut mesh = triangulated_cube();
        let before = mesh.to_polygon_soup();
        mesh.triangulate();
        assert_eq!(mesh.to_polygon_soup(), before);
    }

    #[test]
    fn test_fan_starts_at_first_halfedge() {
        let mut mesh = primitives::cube(1.0).build().unwrap();
        let f = mesh.face_ids().next().unwrap();
        let apex = mesh.origin(mesh.face_halfedge(f));

        let triangles = mesh.triangulate_face(f).unwrap();

        assert_eq!(triangles.len(), 2);
        assert_eq!(triangles[0], f);
        for t in triangles {
            assert_eq!(mesh.face_degree(t), 3);
            assert!(mesh.face_vertices(t).any(|v| v == apex));
        }
        assert_valid(&mesh);
    }

    #[test]
    fn test_triangulate_hexagonal_prism() {
        let n = 6;
        let mut positions = Vec::new();
        for z in [0.0, 1.0] {
            for i in 0..n {
                let a = i as f64 * std::f64::consts::TAU / n as f64;
                positions.push(Point3::new(a.cos(), a.sin(), z));
            }
        }
        let mut polygons: Vec<Vec<usize>> = vec![
            (0..n).rev().collect(),
            (n..2 * n).collect(),
        ];
        for i in 0..n {
            let j = (i + 1) % n;
            polygons.push(vec![i, j, n + j, n + i]);
        }
        let mut mesh = build(&polygons, &positions).unwrap();
        let area = mesh.surface_area();

        mesh.triangulate();

        assert_valid(&mesh);
        // Caps: 4 triangles each, sides: 2 each.
        assert_eq!(mesh.num_faces(), 2 * 4 + 2 * n);
        assert_eq!(mesh.euler_characteristic(), 2);
        assert!((mesh.surface_area() - area).abs() < 1e-9);
    }

    #[test]
    fn test_triangulate_stale_face() {
        let mut mesh = primitives::cube(1.0).build().unwrap();
        let f = mesh.face_ids().next().unwrap();
        mesh.faces.remove(f);
        assert_eq!(mesh.triangulate_face(f), Err(OperatorError::StaleHandle));
    }
}
