//! Edge split.

use log::debug;
use nalgebra::Point3;

use super::OpResult;
use crate::error::OperatorError;
use crate::mesh::{EdgeId, HalfEdgeMesh, VertexId};

/// Elements touched by an edge split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitEdge {
    /// The inserted vertex.
    pub vertex: VertexId,
    /// The two halves of the split edge; the first keeps the original handle.
    pub halves: [EdgeId; 2],
    /// The new edges joining the inserted vertex to the two opposite corners.
    pub cross: [EdgeId; 2],
}

impl HalfEdgeMesh {
    /// Insert a vertex at the midpoint of an edge between two triangles.
    ///
    /// Both triangles are split in two through the new vertex, so the mesh
    /// gains one vertex, three edges and two faces. Returns the new vertex.
    ///
    /// # Errors
    ///
    /// [`OperatorError::InvalidOperator`] if either adjacent face is not a
    /// triangle, [`OperatorError::WouldViolateManifoldness`] if both triangles
    /// share their opposite corner.
    pub fn split_edge(&mut self, e: EdgeId) -> OpResult<VertexId> {
        self.require_edge(e)?;
        let midpoint = self.edge_midpoint(e);
        self.split_edge_at(e, midpoint)
    }

    /// Like [`split_edge`](Self::split_edge), placing the vertex at `position`.
    pub fn split_edge_at(&mut self, e: EdgeId, position: Point3<f64>) -> OpResult<VertexId> {
        self.split_edge_parts(e, position).map(|parts| parts.vertex)
    }

    /// Split an edge and report every element involved.
    ///
    /// ```text
    ///        c                  c
    ///      /   \              / | \
    ///     a --- b    =>     a - m - b
    ///      \   /              \ | /
    ///        d                  d
    /// ```
    pub fn split_edge_parts(&mut self, e: EdgeId, position: Point3<f64>) -> OpResult<SplitEdge> {
        self.require_edge(e)?;

        let h0 = self.edge_halfedge(e);
        let t0 = self.twin(h0);
        let f0 = self.face_of(h0);
        let f1 = self.face_of(t0);

        if f0 == f1 {
            return Err(OperatorError::invalid("edge borders the same face on both sides"));
        }
        if self.face_degree(f0) != 3 || self.face_degree(f1) != 3 {
            return Err(OperatorError::invalid("split requires two adjacent triangles"));
        }

        let h1 = self.next(h0);
        let h2 = self.next(h1);
        let t1 = self.next(t0);
        let t2 = self.next(t1);

        let a = self.origin(h0);
        let b = self.origin(t0);
        let c = self.origin(h2);
        let d = self.origin(t2);

        // Both triangles share their apex: m would be joined to it twice.
        if c == d {
            return Err(OperatorError::non_manifold(
                "opposite corners coincide, split would duplicate an edge",
            ));
        }

        let m = self.add_vertex(position);
        let (eb, g0, g1) = self.add_edge_pair(); // m -> b, b -> m
        let (ec, c0, c1) = self.add_edge_pair(); // m -> c, c -> m
        let (ed, d0, d1) = self.add_edge_pair(); // m -> d, d -> m
        let f2 = self.add_face();
        let f3 = self.add_face();

        // f0: a -> m -> c
        self.link(h0, a, c0, f0);
        self.link(c0, m, h2, f0);
        self.link(h2, c, h0, f0);

        // f2: m -> b -> c
        self.link(g0, m, h1, f2);
        self.link(h1, b, c1, f2);
        self.link(c1, c, g0, f2);

        // f1: m -> a -> d
        self.link(t0, m, t1, f1);
        self.link(t1, a, d1, f1);
        self.link(d1, d, t0, f1);

        // f3: b -> m -> d
        self.link(g1, b, d0, f3);
        self.link(d0, m, t2, f3);
        self.link(t2, d, g1, f3);

        self.vertices[m].halfedge = g0;
        self.vertices[b].halfedge = h1;
        self.faces[f0].halfedge = h0;
        self.faces[f1].halfedge = t0;
        self.faces[f2].halfedge = g0;
        self.faces[f3].halfedge = g1;

        debug!("split edge {:?} at new vertex {:?}", e, m);
        Ok(SplitEdge {
            vertex: m,
            halves: [e, eb],
            cross: [ec, ed],
        })
    }
}
