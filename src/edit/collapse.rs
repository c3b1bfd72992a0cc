//! Edge and face collapse.
//!
//! Both operators merge a connected set of vertices into a single survivor.
//! Faces that drop to two sides are removed and their outer edges glued, so a
//! triangle next to the collapsed region disappears while larger polygons lose
//! one side.

use std::collections::{HashMap, HashSet};

use log::debug;
use nalgebra::Point3;
use smallvec::SmallVec;

use super::OpResult;
use crate::error::OperatorError;
use crate::mesh::{EdgeId, FaceId, HalfEdgeId, HalfEdgeMesh, VertexId};

/// A set of vertices to merge, joined by the edges that will disappear.
struct MergePlan {
    /// Merged vertices; the first one survives.
    vertices: SmallVec<[VertexId; 8]>,
    /// Edges with both endpoints in `vertices`.
    internal: SmallVec<[EdgeId; 8]>,
    /// Face consumed by the merge (face collapse only).
    consumed: Option<FaceId>,
}

impl MergePlan {
    fn contains(&self, v: VertexId) -> bool {
        self.vertices.contains(&v)
    }

    fn survivor(&self) -> VertexId {
        self.vertices[0]
    }
}

impl HalfEdgeMesh {
    /// Merge the endpoints of an edge into one vertex at the edge midpoint.
    ///
    /// Triangles on either side of the edge are removed; larger faces lose one
    /// side. Returns the surviving vertex.
    ///
    /// # Errors
    ///
    /// [`OperatorError::WouldViolateManifoldness`] when the endpoints share a
    /// neighbour other than a triangle apex, when the edge has the same face
    /// on both sides, or when some vertex would drop below degree 3.
    pub fn collapse_edge(&mut self, e: EdgeId) -> OpResult<VertexId> {
        self.require_edge(e)?;
        let midpoint = self.edge_midpoint(e);
        self.collapse_edge_to(e, midpoint)
    }

    /// Like [`collapse_edge`](Self::collapse_edge), placing the survivor at `position`.
    pub fn collapse_edge_to(&mut self, e: EdgeId, position: Point3<f64>) -> OpResult<VertexId> {
        self.require_edge(e)?;
        let [a, b] = self.edge_vertices(e);
        let plan = MergePlan {
            vertices: SmallVec::from_slice(&[a, b]),
            internal: SmallVec::from_slice(&[e]),
            consumed: None,
        };
        self.check_merge(&plan)?;
        let v = self.apply_merge(&plan, position);
        debug!("collapsed edge {:?} into vertex {:?}", e, v);
        Ok(v)
    }

    /// Merge every vertex of a face into one vertex at the face centroid.
    ///
    /// The face and its edges are removed; neighbouring triangles collapse
    /// away, larger neighbours lose one side. Returns the surviving vertex.
    ///
    /// # Errors
    ///
    /// [`OperatorError::WouldViolateManifoldness`] under the same conditions
    /// as [`collapse_edge`](Self::collapse_edge), applied to the whole face.
    pub fn collapse_face(&mut self, f: FaceId) -> OpResult<VertexId> {
        self.require_face(f)?;
        let loop_ids: SmallVec<[HalfEdgeId; 8]> = self.face_halfedges(f).collect();
        if loop_ids.iter().any(|&h| self.face_of(self.twin(h)) == f) {
            return Err(OperatorError::non_manifold("face borders itself"));
        }
        let plan = MergePlan {
            vertices: loop_ids.iter().map(|&h| self.origin(h)).collect(),
            internal: loop_ids.iter().map(|&h| self.edge_of(h)).collect(),
            consumed: Some(f),
        };
        let centroid = self.face_centroid(f);
        self.check_merge(&plan)?;
        let v = self.apply_merge(&plan, centroid);
        debug!("collapsed face {:?} into vertex {:?}", f, v);
        Ok(v)
    }

    /// Half-edges of internal edges that stay in a surviving face.
    fn rim_halfedges(&self, plan: &MergePlan) -> SmallVec<[HalfEdgeId; 8]> {
        plan.internal
            .iter()
            .flat_map(|&e| {
                let h = self.edge_halfedge(e);
                [h, self.twin(h)]
            })
            .filter(|&h| Some(self.face_of(h)) != plan.consumed)
            .collect()
    }

    /// Reject merges that would produce a non-manifold or degenerate mesh.
    fn check_merge(&self, plan: &MergePlan) -> OpResult<()> {
        let internal: HashSet<EdgeId> = plan.internal.iter().copied().collect();

        let mut rim_faces: SmallVec<[FaceId; 8]> = SmallVec::new();
        for h in self.rim_halfedges(plan) {
            let f = self.face_of(h);
            if rim_faces.contains(&f) {
                return Err(OperatorError::non_manifold(
                    "a face touches the collapsed region twice",
                ));
            }
            rim_faces.push(f);
        }

        // Outside neighbours and how many edges each has into the merged set.
        let mut links: HashMap<VertexId, usize> = HashMap::new();
        for &v in &plan.vertices {
            for h in self.vertex_halfedges(v) {
                let w = self.dest(h);
                if plan.contains(w) {
                    if !internal.contains(&self.edge_of(h)) {
                        return Err(OperatorError::non_manifold(
                            "merged vertices are joined by another edge",
                        ));
                    }
                } else {
                    *links.entry(w).or_insert(0) += 1;
                }
            }
        }

        for &v in &plan.vertices {
            for f in self.vertex_faces(v) {
                if Some(f) == plan.consumed {
                    continue;
                }
                let inside = self.face_vertices(f).filter(|&u| plan.contains(u)).count();
                let allowed = if rim_faces.contains(&f) { 2 } else { 1 };
                if inside > allowed {
                    return Err(OperatorError::non_manifold(
                        "a face would visit the merged vertex twice",
                    ));
                }
            }
        }

        // Each rim triangle glues two edges of its apex into one.
        let mut glued: HashMap<VertexId, usize> = HashMap::new();
        for &f in &rim_faces {
            if self.face_degree(f) == 3 {
                if let Some(apex) = self.face_vertices(f).find(|&u| !plan.contains(u)) {
                    *glued.entry(apex).or_insert(0) += 1;
                }
            }
        }

        for (&u, &count) in &links {
            let g = glued.get(&u).copied().unwrap_or(0);
            if count != g + 1 {
                return Err(OperatorError::non_manifold(
                    "collapse would create a duplicate edge",
                ));
            }
            if self.valence(u) - g < 3 {
                return Err(OperatorError::non_manifold(
                    "a neighbouring vertex would drop below degree 3",
                ));
            }
        }
        if links.len() < 3 {
            return Err(OperatorError::non_manifold(
                "merged vertex would have degree below 3",
            ));
        }

        Ok(())
    }

    /// Rewire the mesh for a plan that passed [`check_merge`](Self::check_merge).
    fn apply_merge(&mut self, plan: &MergePlan, position: Point3<f64>) -> VertexId {
        let s = plan.survivor();

        let spokes: Vec<HalfEdgeId> = plan
            .vertices
            .iter()
            .flat_map(|&v| self.collect_spokes(v))
            .collect();

        // (prev, removed, next, face) for each rim half-edge
        let splices: SmallVec<[(HalfEdgeId, HalfEdgeId, HalfEdgeId, FaceId); 8]> = self
            .rim_halfedges(plan)
            .into_iter()
            .map(|h| (self.prev(h), h, self.next(h), self.face_of(h)))
            .collect();

        for &h in &spokes {
            self.halfedges[h].origin = s;
        }

        for &(prev, h, next, f) in &splices {
            self.halfedges[prev].next = next;
            if self.faces[f].halfedge == h {
                self.faces[f].halfedge = next;
            }
        }

        if let Some(f) = plan.consumed {
            self.faces.remove(f);
        }
        for &e in &plan.internal {
            self.remove_edge_pair(e);
        }
        for &v in &plan.vertices[1..] {
            self.vertices.remove(v);
        }

        for &(_, _, _, f) in &splices {
            if self.contains_face(f) && self.face_degree(f) == 2 {
                self.dissolve_digon(f);
            }
        }

        if let Some(&h) = spokes.iter().find(|&&h| self.contains_halfedge(h)) {
            self.vertices[s].halfedge = h;
        }
        self.vertices[s].position = position;
        s
    }
}
