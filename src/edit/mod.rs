//! Local topological operators.
//!
//! Each operator is an inherent method on [`HalfEdgeMesh`] that rewrites only
//! the neighbourhood of its target and returns the element that survives or
//! is created:
//!
//! | Operator | Target | Returns |
//! |----------|--------|---------|
//! | [`flip_edge`](HalfEdgeMesh::flip_edge) | edge between two triangles | the same edge |
//! | [`split_edge`](HalfEdgeMesh::split_edge) | edge between two triangles | new vertex |
//! | [`collapse_edge`](HalfEdgeMesh::collapse_edge) | edge | surviving vertex |
//! | [`collapse_face`](HalfEdgeMesh::collapse_face) | face | surviving vertex |
//! | [`erase_vertex`](HalfEdgeMesh::erase_vertex) | vertex | merged face |
//! | [`erase_edge`](HalfEdgeMesh::erase_edge) | edge | merged face |
//! | [`bevel_vertex`](HalfEdgeMesh::bevel_vertex) / [`bevel_edge`](HalfEdgeMesh::bevel_edge) / [`bevel_face`](HalfEdgeMesh::bevel_face) | element | new face |
//! | [`triangulate`](HalfEdgeMesh::triangulate) | whole mesh | - |
//!
//! Every operator validates its preconditions before touching the mesh. On
//! error the mesh is unchanged. Handles to elements an operator destroys are
//! stale afterwards; [`HalfEdgeMesh::contains`] reports them as such.

mod bevel;
mod collapse;
mod erase;
mod flip;
mod split;
mod triangulate;

pub use bevel::{BevelKind, BevelSession};
pub use split::SplitEdge;

use crate::error::OperatorError;
use crate::mesh::{EdgeId, FaceId, HalfEdgeId, HalfEdgeMesh, VertexId};

type OpResult<T> = std::result::Result<T, OperatorError>;

impl HalfEdgeMesh {
    pub(crate) fn require_vertex(&self, v: VertexId) -> OpResult<()> {
        if self.contains_vertex(v) {
            Ok(())
        } else {
            Err(OperatorError::StaleHandle)
        }
    }

    pub(crate) fn require_edge(&self, e: EdgeId) -> OpResult<()> {
        if self.contains_edge(e) {
            Ok(())
        } else {
            Err(OperatorError::StaleHandle)
        }
    }

    pub(crate) fn require_face(&self, f: FaceId) -> OpResult<()> {
        if self.contains_face(f) {
            Ok(())
        } else {
            Err(OperatorError::StaleHandle)
        }
    }

    /// Destroy a half-edge pair and its edge record.
    pub(crate) fn remove_edge_pair(&mut self, e: EdgeId) {
        if let Some(edge) = self.edges.remove(e) {
            let twin = self.halfedges[edge.halfedge].twin;
            self.halfedges.remove(edge.halfedge);
            self.halfedges.remove(twin);
        }
    }

    /// Remove a two-sided face left behind by a collapse.
    ///
    /// The digon `x: u -> s`, `y: s -> u` is dropped and the outer twins of
    /// its two sides are glued into a single edge.
    pub(crate) fn dissolve_digon(&mut self, face: FaceId) {
        let x = self.face_halfedge(face);
        let y = self.next(x);
        let tx = self.twin(x);
        let ty = self.twin(y);
        let keep = self.edge_of(x);
        let drop = self.edge_of(y);
        let u = self.origin(x);
        let s = self.origin(y);

        self.halfedges[tx].twin = ty;
        self.halfedges[ty].twin = tx;
        self.halfedges[ty].edge = keep;
        self.edges[keep].halfedge = tx;

        // tx leaves s, ty leaves u.
        if self.vertex_halfedge(u) == x {
            self.vertices[u].halfedge = ty;
        }
        if self.vertex_halfedge(s) == y {
            self.vertices[s].halfedge = tx;
        }

        self.halfedges.remove(x);
        self.halfedges.remove(y);
        self.edges.remove(drop);
        self.faces.remove(face);
    }

    /// Outgoing half-edges of `v`, collected so the fan can be rewired.
    pub(crate) fn collect_spokes(&self, v: VertexId) -> Vec<HalfEdgeId> {
        self.vertex_halfedges(v).collect()
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use crate::mesh::{primitives, HalfEdgeMesh, VertexId};

    /// The unit cube with every quad fan-triangulated.
    pub fn triangulated_cube() -> HalfEdgeMesh {
        let mut mesh = primitives::cube(1.0).build().unwrap();
        mesh.triangulate();
        mesh
    }

    /// The n-th vertex in build order.
    pub fn nth_vertex(mesh: &HalfEdgeMesh, n: usize) -> VertexId {
        mesh.vertex_ids().nth(n).unwrap()
    }

    /// `(V, E, F)` of a mesh.
    pub fn counts(mesh: &HalfEdgeMesh) -> (usize, usize, usize) {
        (mesh.num_vertices(), mesh.num_edges(), mesh.num_faces())
    }

    /// Assert that the mesh is valid, reporting the broken invariant.
    pub fn assert_valid(mesh: &HalfEdgeMesh) {
        if let Err(msg) = mesh.validate() {
            panic!("invalid mesh: {}", msg);
        }
    }
}
