//! Vertex and edge erasure.
//!
//! Erasing removes an element and merges the faces around it into one face.
//! Every boundary half-edge of the merged region is kept.

use std::collections::HashSet;

use log::debug;
use smallvec::SmallVec;

use super::OpResult;
use crate::error::OperatorError;
use crate::mesh::{EdgeId, FaceId, HalfEdgeId, HalfEdgeMesh, VertexId};

impl HalfEdgeMesh {
    /// Remove a vertex and merge its incident faces into one.
    ///
    /// The mesh loses the vertex, its `n` edges and `n - 1` faces. Returns
    /// the merged face.
    ///
    /// # Errors
    ///
    /// [`OperatorError::WouldViolateManifoldness`] if the incident faces are
    /// not distinct or the merged face would visit a vertex twice.
    pub fn erase_vertex(&mut self, v: VertexId) -> OpResult<FaceId> {
        self.require_vertex(v)?;

        let spokes = self.collect_spokes(v);
        let faces: SmallVec<[FaceId; 8]> = spokes.iter().map(|&h| self.face_of(h)).collect();
        let distinct: HashSet<FaceId> = faces.iter().copied().collect();
        if distinct.len() != faces.len() {
            return Err(OperatorError::non_manifold(
                "vertex touches the same face more than once",
            ));
        }

        // Boundary of the merged face: in each incident face, everything
        // between the spoke leaving v and the half-edge returning to v.
        let mut boundary: HashSet<VertexId> = HashSet::new();
        for &h in &spokes {
            let stop = self.prev(self.prev(h));
            let mut cur = self.next(h);
            loop {
                if !boundary.insert(self.origin(cur)) {
                    return Err(OperatorError::non_manifold(
                        "merged face would visit a vertex twice",
                    ));
                }
                if cur == stop {
                    break;
                }
                cur = self.next(cur);
            }
        }
        if spokes.iter().any(|&h| self.valence(self.dest(h)) < 3) {
            return Err(OperatorError::non_manifold(
                "a neighbouring vertex would be left with a single edge",
            ));
        }

        // (prev of the incoming half-edge, next of the spoke) per spoke
        let joins: SmallVec<[(HalfEdgeId, HalfEdgeId); 8]> = spokes
            .iter()
            .map(|&h| (self.prev(self.twin(h)), self.next(h)))
            .collect();

        for (&h, &(p, n)) in spokes.iter().zip(&joins) {
            self.halfedges[p].next = n;
            let w = self.dest(h);
            if self.vertex_halfedge(w) == self.twin(h) {
                self.vertices[w].halfedge = n;
            }
        }

        let keep = faces[0];
        self.claim_loop(joins[0].1, keep);

        for &f in &faces[1..] {
            self.faces.remove(f);
        }
        for &h in &spokes {
            let e = self.edge_of(h);
            self.remove_edge_pair(e);
        }
        self.vertices.remove(v);

        debug!("erased vertex {:?} into face {:?}", v, keep);
        Ok(keep)
    }

    /// Remove an edge and merge its two faces into one.
    ///
    /// The mesh loses one edge and one face. Returns the merged face, which
    /// keeps the handle of the face on the edge's stored half-edge side.
    ///
    /// # Errors
    ///
    /// [`OperatorError::WouldViolateManifoldness`] if both sides are the same
    /// face, the faces share any vertex besides the edge's endpoints, or an
    /// endpoint would be left with a single edge.
    pub fn erase_edge(&mut self, e: EdgeId) -> OpResult<FaceId> {
        self.require_edge(e)?;

        let h0 = self.edge_halfedge(e);
        let t0 = self.twin(h0);
        let f0 = self.face_of(h0);
        let f1 = self.face_of(t0);
        let a = self.origin(h0);
        let b = self.origin(t0);

        if f0 == f1 {
            return Err(OperatorError::non_manifold("edge borders the same face on both sides"));
        }
        let shared = self
            .face_vertices(f0)
            .filter(|&u| self.face_vertices(f1).any(|w| w == u))
            .count();
        if shared != 2 {
            return Err(OperatorError::non_manifold(
                "faces share more than the erased edge",
            ));
        }
        if self.valence(a) < 3 || self.valence(b) < 3 {
            return Err(OperatorError::non_manifold(
                "an endpoint would be left with a single edge",
            ));
        }

        let ph = self.prev(h0);
        let pt = self.prev(t0);
        let nh = self.next(h0);
        let nt = self.next(t0);

        self.halfedges[ph].next = nt;
        self.halfedges[pt].next = nh;
        self.claim_loop(nh, f0);

        if self.vertex_halfedge(a) == h0 {
            self.vertices[a].halfedge = nt;
        }
        if self.vertex_halfedge(b) == t0 {
            self.vertices[b].halfedge = nh;
        }

        self.remove_edge_pair(e);
        self.faces.remove(f1);

        debug!("erased edge {:?} into face {:?}", e, f0);
        Ok(f0)
    }
}
