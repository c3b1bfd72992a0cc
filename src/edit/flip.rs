//! Edge flip.

use log::debug;

use super::OpResult;
use crate::error::OperatorError;
use crate::mesh::{EdgeId, HalfEdgeMesh};

impl HalfEdgeMesh {
    /// Rotate an edge shared by two triangles to the other diagonal of their quad.
    ///
    /// ```text
    ///        c                c
    ///      /   \            / | \
    ///     a --- b    =>    a  |  b
    ///      \   /            \ | /
    ///        d                d
    /// ```
    ///
    /// No elements are created or destroyed and the edge keeps its handle.
    /// Flipping the same edge twice restores the original connectivity.
    ///
    /// # Errors
    ///
    /// - [`OperatorError::InvalidOperator`] if either side is not a triangle
    /// - [`OperatorError::WouldViolateManifoldness`] if `c` and `d` are already
    ///   adjacent or an endpoint would drop below degree 3
    pub fn flip_edge(&mut self, e: EdgeId) -> OpResult<EdgeId> {
        self.require_edge(e)?;

        let h0 = self.edge_halfedge(e);
        let t0 = self.twin(h0);
        let f0 = self.face_of(h0);
        let f1 = self.face_of(t0);

        if f0 == f1 {
            return Err(OperatorError::invalid("edge borders the same face on both sides"));
        }
        if self.face_degree(f0) != 3 || self.face_degree(f1) != 3 {
            return Err(OperatorError::invalid("flip requires two adjacent triangles"));
        }

        let h1 = self.next(h0);
        let h2 = self.next(h1);
        let t1 = self.next(t0);
        let t2 = self.next(t1);

        let a = self.origin(h0);
        let b = self.origin(t0);
        let c = self.origin(h2);
        let d = self.origin(t2);

        if c == d || self.find_halfedge(c, d).is_some() {
            return Err(OperatorError::non_manifold("flipped diagonal already exists"));
        }
        if self.valence(a) <= 3 || self.valence(b) <= 3 {
            return Err(OperatorError::non_manifold("endpoint would drop below degree 3"));
        }

        // f0: d -> c -> a, f1: c -> d -> b
        self.link(h0, d, h2, f0);
        self.link(h2, c, t1, f0);
        self.link(t1, a, h0, f0);

        self.link(t0, c, t2, f1);
        self.link(t2, d, h1, f1);
        self.link(h1, b, t0, f1);

        self.vertices[a].halfedge = t1;
        self.vertices[b].halfedge = h1;
        self.faces[f0].halfedge = h0;
        self.faces[f1].halfedge = t0;

        debug!("flipped edge {:?}", e);
        Ok(e)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use nalgebra::Point3;

    use super::*;
    use crate::edit::test_util::*;
    use crate::mesh::{build, primitives, VertexId};

    /// Sorted vertex sets of every face.
    fn face_sets(mesh: &HalfEdgeMesh) -> BTreeSet<Vec<VertexId>> {
        mesh.face_ids()
            .map(|f| {
                let mut vs: Vec<VertexId> = mesh.face_vertices(f).collect();
                vs.sort();
                vs
            })
            .collect()
    }

    #[test]
    fn test_flip_swaps_diagonal() {
        let mut mesh = primitives::octahedron(1.0).build().unwrap();
        let (v0, v2) = (nth_vertex(&mesh, 0), nth_vertex(&mesh, 2));
        let e = mesh.edge_of(mesh.find_halfedge(v0, v2).unwrap());
        let before = counts(&mesh);

        // Edge (+x, +y) is shared by faces with apexes +z and -z.
        let (v4, v5) = (nth_vertex(&mesh, 4), nth_vertex(&mesh, 5));
        assert_eq!(mesh.flip_edge(e), Ok(e));

        assert_valid(&mesh);
        assert_eq!(counts(&mesh), before);
        let ends: BTreeSet<VertexId> = mesh.edge_vertices(e).into_iter().collect();
        assert_eq!(ends, [v4, v5].into_iter().collect());
        assert!(mesh.find_halfedge(v0, v2).is_none());
    }

    #[test]
    fn test_flip_twice_restores_connectivity() {
        let mut mesh = primitives::icosahedron(1.0).build().unwrap();
        let original = face_sets(&mesh);
        let e = mesh.edge_ids().nth(7).unwrap();

        mesh.flip_edge(e).unwrap();
        assert_ne!(face_sets(&mesh), original);
        mesh.flip_edge(e).unwrap();

        assert_valid(&mesh);
        assert_eq!(face_sets(&mesh), original);
    }

    #[test]
    fn test_flip_on_quad_is_rejected() {
        let mut mesh = primitives::cube(1.0).build().unwrap();
        let e = mesh.edge_ids().next().unwrap();
        let err = mesh.flip_edge(e).unwrap_err();
        assert!(matches!(err, OperatorError::InvalidOperator(_)));
        assert_valid(&mesh);
    }

    #[test]
    fn test_flip_on_tetrahedron_is_rejected() {
        let mut mesh = primitives::tetrahedron(1.0).build().unwrap();
        let before = mesh.to_polygon_soup();
        for e in mesh.edge_ids().collect::<Vec<_>>() {
            assert!(matches!(
                mesh.flip_edge(e),
                Err(OperatorError::WouldViolateManifoldness(_))
            ));
        }
        assert_eq!(mesh.to_polygon_soup(), before);
    }

    #[test]
    fn test_flip_stale_handle() {
        let mut mesh = triangulated_cube();
        let e = mesh.edge_ids().next().unwrap();
        mesh.remove_edge_pair(e);
        assert_eq!(mesh.flip_edge(e), Err(OperatorError::StaleHandle));
    }

    #[test]
    fn test_flip_planar_pair_in_bipyramid() {
        // Pentagonal bipyramid: every equator edge is flippable.
        let mut positions: Vec<Point3<f64>> = (0..5)
            .map(|i| {
                let a = i as f64 * std::f64::consts::TAU / 5.0;
                Point3::new(a.cos(), a.sin(), 0.0)
            })
            .collect();
        positions.push(Point3::new(0.0, 0.0, 1.0));
        positions.push(Point3::new(0.0, 0.0, -1.0));
        let mut polygons = Vec::new();
        for i in 0..5 {
            let j = (i + 1) % 5;
            polygons.push([i, j, 5]);
            polygons.push([j, i, 6]);
        }
        let mut mesh = build(&polygons, &positions).unwrap();

        let (top, bottom) = (nth_vertex(&mesh, 5), nth_vertex(&mesh, 6));
        let e = mesh
            .edge_ids()
            .find(|&e| {
                let [a, b] = mesh.edge_vertices(e);
                ![a, b].iter().any(|v| *v == top || *v == bottom)
            })
            .unwrap();
        mesh.flip_edge(e).unwrap();

        assert_valid(&mesh);
        assert_eq!(mesh.euler_characteristic(), 2);
        let ends = mesh.edge_vertices(e);
        assert!(ends.contains(&top) && ends.contains(&bottom));
    }
}
