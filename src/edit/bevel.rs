//! Vertex, edge and face bevel.
//!
//! Bevel runs in two phases. The topological rewrite inserts the new face
//! with every new vertex sitting on the element it replaced, so the bevel
//! has zero size. Repositioning then moves the new vertices as a function of
//! an inset (and for faces a shift) amount, always starting from positions
//! captured right after the rewrite. Adjusting the amount any number of times
//! never accumulates drift.
//!
//! [`BevelSession`] bundles both phases for interactive use.
//!
//! # Example
//!
//! ```
//! use meshedit::edit::{BevelKind, BevelSession};
//! use meshedit::mesh::primitives;
//!
//! let mut mesh = primitives::cube(1.0).build().unwrap();
//! let v = mesh.vertex_ids().next().unwrap();
//! let face = mesh.bevel_vertex(v).unwrap();
//!
//! let mut session = BevelSession::begin(&mesh, BevelKind::Vertex, face).unwrap();
//! session.set_amount(&mut mesh, 0.25, 0.0).unwrap();
//! assert_eq!(mesh.face_degree(face), 3);
//! ```

use log::debug;
use nalgebra::Point3;
use smallvec::SmallVec;

use super::OpResult;
use crate::error::OperatorError;
use crate::mesh::{
    centroid, newell_vector, EdgeId, ElementKind, ElementRef, FaceId, HalfEdgeId, HalfEdgeMesh,
    VertexId,
};

/// Scale from drag distance (in screen units) to bevel amount.
const DRAG_SCALE: f64 = 100.0;

/// Which element a bevel replaced. Selects the reposition rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BevelKind {
    /// New vertices slide along the old edges toward the neighbours.
    Vertex,
    /// Same rule as [`BevelKind::Vertex`], around both endpoints.
    Edge,
    /// The inset face shrinks toward its centroid and moves along its normal.
    Face,
}

impl HalfEdgeMesh {
    // ==================== Topology ====================

    /// Replace a vertex of degree `n` with an `n`-sided face.
    ///
    /// The vertex is removed; each of its edges now ends at its own new
    /// vertex placed where the old vertex was. Returns the new face.
    ///
    /// # Errors
    ///
    /// [`OperatorError::InvalidOperator`] if the vertex has fewer than three
    /// edges.
    pub fn bevel_vertex(&mut self, v: VertexId) -> OpResult<FaceId> {
        self.require_vertex(v)?;
        let spokes = self.collect_spokes(v);
        if spokes.len() < 3 {
            return Err(OperatorError::invalid("bevel needs a vertex of degree 3 or more"));
        }

        let face = self.bevel_ring(&spokes);
        self.vertices.remove(v);

        debug!("bevelled vertex {:?} into face {:?}", v, face);
        Ok(face)
    }

    /// Replace an edge with a face joining the other edges of its endpoints.
    ///
    /// Both endpoints and the edge are removed. The new face has one side per
    /// remaining edge at either endpoint. Returns the new face.
    ///
    /// # Errors
    ///
    /// [`OperatorError::InvalidOperator`] if the edge has the same face on
    /// both sides or the new face would have fewer than three sides.
    pub fn bevel_edge(&mut self, e: EdgeId) -> OpResult<FaceId> {
        self.require_edge(e)?;

        let h0 = self.edge_halfedge(e);
        let t0 = self.twin(h0);
        if self.face_of(h0) == self.face_of(t0) {
            return Err(OperatorError::invalid("edge borders the same face on both sides"));
        }

        let mut spokes = self.fan_between(self.next(t0), h0);
        spokes.extend(self.fan_between(self.next(h0), t0));
        if spokes.len() < 3 {
            return Err(OperatorError::invalid("bevel would create a face with fewer than three sides"));
        }

        let a = self.origin(h0);
        let b = self.origin(t0);
        let face = self.bevel_ring(&spokes);
        self.remove_edge_pair(e);
        self.vertices.remove(a);
        self.vertices.remove(b);

        debug!("bevelled edge {:?} into face {:?}", e, face);
        Ok(face)
    }

    /// Inset a face, joining it to its old boundary with a ring of quads.
    ///
    /// The face keeps its handle and becomes the inset copy; each of its
    /// `n` sides gains a quad. The mesh gains `n` vertices, `2n` edges and
    /// `n` faces. Returns the inset face.
    pub fn bevel_face(&mut self, f: FaceId) -> OpResult<FaceId> {
        self.require_face(f)?;

        let ks: SmallVec<[HalfEdgeId; 8]> = self.face_halfedges(f).collect();
        let n = ks.len();
        let us: SmallVec<[VertexId; 8]> = ks.iter().map(|&h| self.origin(h)).collect();
        let xs: SmallVec<[VertexId; 8]> = us
            .iter()
            .map(|&u| {
                let p = *self.position(u);
                self.add_vertex(p)
            })
            .collect();

        // u_i -> x_i and back
        let rails: SmallVec<[(HalfEdgeId, HalfEdgeId); 8]> = (0..n)
            .map(|_| {
                let (_, out, back) = self.add_edge_pair();
                (out, back)
            })
            .collect();
        // x_i -> x_{i+1} in the inset face, and its twin in the quad
        let inner: SmallVec<[(HalfEdgeId, HalfEdgeId); 8]> = (0..n)
            .map(|_| {
                let (_, fwd, rev) = self.add_edge_pair();
                (fwd, rev)
            })
            .collect();

        for i in 0..n {
            let j = (i + 1) % n;
            let q = self.add_face();
            let (k, r_next, m_rev, r_back) = (ks[i], rails[j].0, inner[i].1, rails[i].1);
            self.link(k, us[i], r_next, q);
            self.link(r_next, us[j], m_rev, q);
            self.link(m_rev, xs[j], r_back, q);
            self.link(r_back, xs[i], k, q);
            self.faces[q].halfedge = k;

            self.link(inner[i].0, xs[i], inner[j].0, f);
            self.vertices[xs[i]].halfedge = inner[i].0;
        }
        self.faces[f].halfedge = inner[0].0;

        debug!("bevelled face {:?}", f);
        Ok(f)
    }

    /// Spokes of one vertex from `first` up to but excluding `stop`.
    fn fan_between(&self, first: HalfEdgeId, stop: HalfEdgeId) -> Vec<HalfEdgeId> {
        let mut spokes = Vec::new();
        let mut cur = first;
        while cur != stop {
            spokes.push(cur);
            cur = self.next(self.twin(cur));
        }
        spokes
    }

    /// Detach each spoke onto its own new vertex and close the ring with a face.
    ///
    /// Consecutive spokes must satisfy `next(twin(s_i)) == s_{i+1}` in the
    /// current mesh except where the ring bridges over a removed edge.
    fn bevel_ring(&mut self, spokes: &[HalfEdgeId]) -> FaceId {
        let n = spokes.len();
        let ring: SmallVec<[VertexId; 8]> = spokes
            .iter()
            .map(|&s| {
                let p = *self.position(self.origin(s));
                self.add_vertex(p)
            })
            .collect();
        let incoming: SmallVec<[HalfEdgeId; 8]> = spokes.iter().map(|&s| self.twin(s)).collect();
        let sides: SmallVec<[FaceId; 8]> = spokes.iter().map(|&s| self.face_of(s)).collect();
        let pairs: SmallVec<[(HalfEdgeId, HalfEdgeId); 8]> = (0..n)
            .map(|_| {
                let (_, side, cap) = self.add_edge_pair();
                (side, cap)
            })
            .collect();
        let cap = self.add_face();

        for i in 0..n {
            let j = (i + 1) % n;
            let h = (i + n - 1) % n;
            self.halfedges[spokes[i]].origin = ring[i];
            self.vertices[ring[i]].halfedge = spokes[i];

            // ring[i] -> ring[j] inside the face between the two spokes
            let (side, rim) = pairs[i];
            self.halfedges[incoming[i]].next = side;
            self.link(side, ring[i], spokes[j], sides[j]);
            self.faces[sides[j]].halfedge = side;

            self.link(rim, ring[j], pairs[h].1, cap);
        }
        self.faces[cap].halfedge = pairs[0].1;
        cap
    }

    // ==================== Reposition ====================

    /// Half-edges leaving each corner of a bevel face away from it.
    ///
    /// For a vertex or edge bevel each rail runs along an old edge toward a
    /// neighbour; for a face bevel each rail runs back to the old boundary.
    pub fn bevel_rails(&self, face: FaceId) -> OpResult<Vec<HalfEdgeId>> {
        self.require_face(face)?;
        Ok(self
            .face_halfedges(face)
            .map(|h| self.next(self.twin(h)))
            .collect())
    }

    /// Move the vertices of a vertex bevel to `inset` of the way along their rails.
    ///
    /// `originals[i]` is the position of `origin(rails[i])` right after the
    /// bevel. `inset` is clamped to `[0, 1]`.
    pub fn bevel_vertex_reposition(
        &mut self,
        originals: &[Point3<f64>],
        rails: &[HalfEdgeId],
        inset: f64,
    ) -> OpResult<()> {
        self.slide_along_rails(originals, rails, inset)
    }

    /// Move the vertices of an edge bevel; same rule as
    /// [`bevel_vertex_reposition`](Self::bevel_vertex_reposition).
    pub fn bevel_edge_reposition(
        &mut self,
        originals: &[Point3<f64>],
        rails: &[HalfEdgeId],
        inset: f64,
    ) -> OpResult<()> {
        self.slide_along_rails(originals, rails, inset)
    }

    /// Shrink an inset face toward its centroid and push it along its normal.
    ///
    /// Each vertex moves to `o + inset * (c - o) + shift * n`, where `o` is
    /// its original position and `c`, `n` are the centroid and unit normal
    /// of the original polygon. `inset` is clamped to `[0, 1]`.
    pub fn bevel_face_reposition(
        &mut self,
        originals: &[Point3<f64>],
        rails: &[HalfEdgeId],
        inset: f64,
        shift: f64,
    ) -> OpResult<()> {
        self.check_rails(originals, rails)?;
        let t = inset.clamp(0.0, 1.0);
        let c = centroid(originals);
        let normal = newell_vector(originals)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(nalgebra::Vector3::zeros);

        for (&o, &rail) in originals.iter().zip(rails) {
            let v = self.origin(rail);
            self.vertices[v].position = o + (c - o) * t + normal * shift;
        }
        Ok(())
    }

    fn slide_along_rails(
        &mut self,
        originals: &[Point3<f64>],
        rails: &[HalfEdgeId],
        inset: f64,
    ) -> OpResult<()> {
        self.check_rails(originals, rails)?;
        let t = inset.clamp(0.0, 1.0);
        for (&o, &rail) in originals.iter().zip(rails) {
            let anchor = *self.position(self.dest(rail));
            let v = self.origin(rail);
            self.vertices[v].position = o + (anchor - o) * t;
        }
        Ok(())
    }

    fn check_rails(&self, originals: &[Point3<f64>], rails: &[HalfEdgeId]) -> OpResult<()> {
        if rails.is_empty() || originals.len() != rails.len() {
            return Err(OperatorError::invalid(format!(
                "{} original positions for {} bevel vertices",
                originals.len(),
                rails.len()
            )));
        }
        if rails.iter().any(|&r| !self.contains_halfedge(r)) {
            return Err(OperatorError::StaleHandle);
        }
        Ok(())
    }
}

// ==================== Session ====================

/// State of an interactive bevel: the new face, its rails and the positions
/// every reposition starts from.
#[derive(Debug, Clone, PartialEq)]
pub struct BevelSession {
    kind: BevelKind,
    face: FaceId,
    rails: Vec<HalfEdgeId>,
    originals: Vec<Point3<f64>>,
    inset: f64,
    shift: f64,
}

impl BevelSession {
    /// Bevel `target` and start a session on the resulting face.
    ///
    /// # Errors
    ///
    /// [`OperatorError::InvalidTarget`] for a half-edge, otherwise whatever
    /// the bevel operator reports.
    pub fn bevel(mesh: &mut HalfEdgeMesh, target: ElementRef) -> OpResult<Self> {
        let (kind, face) = match target {
            ElementRef::Vertex(v) => (BevelKind::Vertex, mesh.bevel_vertex(v)?),
            ElementRef::Edge(e) => (BevelKind::Edge, mesh.bevel_edge(e)?),
            ElementRef::Face(f) => (BevelKind::Face, mesh.bevel_face(f)?),
            ElementRef::HalfEdge(_) => {
                return Err(OperatorError::InvalidTarget {
                    operation: "bevel",
                    found: ElementKind::HalfEdge,
                })
            }
        };
        Self::begin(mesh, kind, face)
    }

    /// Start a session on a face produced by a bevel of the given kind.
    ///
    /// The current positions of the face's vertices become the originals.
    pub fn begin(mesh: &HalfEdgeMesh, kind: BevelKind, face: FaceId) -> OpResult<Self> {
        let rails = mesh.bevel_rails(face)?;
        let originals = rails
            .iter()
            .map(|&r| *mesh.position(mesh.origin(r)))
            .collect();
        Ok(Self {
            kind,
            face,
            rails,
            originals,
            inset: 0.0,
            shift: 0.0,
        })
    }

    /// What was bevelled.
    pub fn kind(&self) -> BevelKind {
        self.kind
    }

    /// The face created by the bevel.
    pub fn face(&self) -> FaceId {
        self.face
    }

    /// Current inset amount in `[0, 1]`.
    pub fn inset(&self) -> f64 {
        self.inset
    }

    /// Current shift amount (face bevel only).
    pub fn shift(&self) -> f64 {
        self.shift
    }

    /// Set both amounts and reposition.
    pub fn set_amount(&mut self, mesh: &mut HalfEdgeMesh, inset: f64, shift: f64) -> OpResult<()> {
        self.inset = inset.clamp(0.0, 1.0);
        self.shift = shift;
        self.apply(mesh)
    }

    /// Adjust the amounts by a drag of `(dx, dy)` screen units and reposition.
    pub fn drag(&mut self, mesh: &mut HalfEdgeMesh, dx: f64, dy: f64) -> OpResult<()> {
        let inset = self.inset + dx / DRAG_SCALE;
        let shift = self.shift + dy / DRAG_SCALE;
        self.set_amount(mesh, inset, shift)
    }

    /// Recompute the bevel vertices from the stored originals.
    pub fn apply(&self, mesh: &mut HalfEdgeMesh) -> OpResult<()> {
        match self.kind {
            BevelKind::Vertex => mesh.bevel_vertex_reposition(&self.originals, &self.rails, self.inset),
            BevelKind::Edge => mesh.bevel_edge_reposition(&self.originals, &self.rails, self.inset),
            BevelKind::Face => {
                mesh.bevel_face_reposition(&self.originals, &self.rails, self.inset, self.shift)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::test_util::*;
    use crate::mesh::primitives;

    fn positions(mesh: &HalfEdgeMesh, face: FaceId) -> Vec<Point3<f64>> {
        mesh.face_positions(face)
    }

    #[test]
    fn test_bevel_cube_vertex() {
        let mut mesh = primitives::cube(1.0).build().unwrap();
        let v = nth_vertex(&mesh, 6);
        let p = *mesh.position(v);

        let face = mesh.bevel_vertex(v).unwrap();

        assert_valid(&mesh);
        assert_eq!(counts(&mesh), (10, 15, 7));
        assert_eq!(mesh.face_degree(face), 3);
        assert!(!mesh.contains_vertex(v));
        for q in positions(&mesh, face) {
            assert_eq!(q, p);
        }
    }

    #[test]
    fn test_bevel_vertex_reposition_slides_along_edges() {
        let mut mesh = primitives::cube(1.0).build().unwrap();
        let v = nth_vertex(&mesh, 6);
        let face = mesh.bevel_vertex(v).unwrap();
        let rails = mesh.bevel_rails(face).unwrap();
        let originals: Vec<_> = rails.iter().map(|&r| *mesh.position(mesh.origin(r))).collect();

        mesh.bevel_vertex_reposition(&originals, &rails, 0.5).unwrap();

        // Corner (0.5, 0.5, 0.5) cut half-way along each unit edge.
        let expected = 0.5f64.hypot(0.5);
        for h in mesh.face_halfedges(face).collect::<Vec<_>>() {
            let len = mesh.halfedge_vector(h).norm();
            assert!((len - expected).abs() < 1e-12);
        }
        assert!((mesh.face_centroid(face) - Point3::new(1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0)).norm() < 1e-12);
    }

    #[test]
    fn test_reposition_is_idempotent() {
        let mut mesh = primitives::icosahedron(1.0).build().unwrap();
        let v = nth_vertex(&mesh, 0);
        let face = mesh.bevel_vertex(v).unwrap();
        let mut session = BevelSession::begin(&mesh, BevelKind::Vertex, face).unwrap();

        session.set_amount(&mut mesh, 0.3, 0.0).unwrap();
        let once = positions(&mesh, face);
        session.set_amount(&mut mesh, 0.3, 0.0).unwrap();
        session.apply(&mut mesh).unwrap();
        assert_eq!(positions(&mesh, face), once);

        session.set_amount(&mut mesh, 0.8, 0.0).unwrap();
        session.set_amount(&mut mesh, 0.3, 0.0).unwrap();
        assert_eq!(positions(&mesh, face), once);
    }

    #[test]
    fn test_drag_accumulates_amounts() {
        let mut mesh = primitives::cube(1.0).build().unwrap();
        let f = mesh.face_ids().nth(1).unwrap();
        let mut dragged = BevelSession::bevel(&mut mesh, f.into()).unwrap();
        let mut reference = mesh.clone();
        let mut direct = BevelSession::begin(&reference, BevelKind::Face, f).unwrap();

        dragged.drag(&mut mesh, 20.0, 10.0).unwrap();
        dragged.drag(&mut mesh, 30.0, 15.0).unwrap();
        direct.set_amount(&mut reference, 0.5, 0.25).unwrap();

        assert!((dragged.inset() - 0.5).abs() < 1e-12);
        assert!((dragged.shift() - 0.25).abs() < 1e-12);
        for (a, b) in positions(&mesh, f).iter().zip(positions(&reference, f)) {
            assert!((a - b).norm() < 1e-12);
        }
    }

    #[test]
    fn test_inset_is_clamped() {
        let mut mesh = primitives::cube(1.0).build().unwrap();
        let v = nth_vertex(&mesh, 0);
        let mut session = BevelSession::bevel(&mut mesh, v.into()).unwrap();
        session.drag(&mut mesh, 500.0, 0.0).unwrap();
        assert_eq!(session.inset(), 1.0);
        session.drag(&mut mesh, -1000.0, 0.0).unwrap();
        assert_eq!(session.inset(), 0.0);
    }

    #[test]
    fn test_bevel_cube_edge() {
        let mut mesh = primitives::cube(1.0).build().unwrap();
        let e = mesh.edge_ids().next().unwrap();
        let [a, b] = mesh.edge_vertices(e);

        let face = mesh.bevel_edge(e).unwrap();

        assert_valid(&mesh);
        assert_eq!(counts(&mesh), (10, 15, 7));
        assert_eq!(mesh.face_degree(face), 4);
        assert!(!mesh.contains_vertex(a) && !mesh.contains_vertex(b));
        assert!(!mesh.contains_edge(e));
    }

    #[test]
    fn test_bevel_icosahedron_edge_and_reposition() {
        let mut mesh = primitives::icosahedron(1.0).build().unwrap();
        let e = mesh.edge_ids().next().unwrap();

        let mut session = BevelSession::bevel(&mut mesh, e.into()).unwrap();

        assert_valid(&mesh);
        assert_eq!(counts(&mesh), (18, 37, 21));
        assert_eq!(mesh.face_degree(session.face()), 8);
        assert_eq!(session.kind(), BevelKind::Edge);

        session.set_amount(&mut mesh, 0.2, 0.0).unwrap();
        assert!(mesh.face_area(session.face()) > 0.0);
        assert_valid(&mesh);
    }

    #[test]
    fn test_bevel_face_inset_and_shift() {
        let mut mesh = primitives::cube(1.0).build().unwrap();
        let top = mesh.face_ids().nth(1).unwrap();

        let mut session = BevelSession::bevel(&mut mesh, top.into()).unwrap();
        assert_eq!(session.face(), top);
        assert_valid(&mesh);
        assert_eq!(counts(&mesh), (12, 20, 10));
        assert_eq!(mesh.face_degree(top), 4);

        session.set_amount(&mut mesh, 0.5, 0.25).unwrap();
        for p in positions(&mesh, top) {
            assert!((p.x.abs() - 0.25).abs() < 1e-12);
            assert!((p.y.abs() - 0.25).abs() < 1e-12);
            assert!((p.z - 0.75).abs() < 1e-12);
        }
        let sides: Vec<_> = mesh
            .face_ids()
            .filter(|&f| f != top && mesh.face_normal(f).z.abs() < 0.99)
            .collect();
        assert!(sides.iter().all(|&f| mesh.face_degree(f) == 4));
    }

    #[test]
    fn test_bevel_half_edge_target_is_rejected() {
        let mut mesh = primitives::cube(1.0).build().unwrap();
        let h = mesh.halfedge_ids().next().unwrap();
        let err = BevelSession::bevel(&mut mesh, h.into()).unwrap_err();
        assert_eq!(
            err,
            OperatorError::InvalidTarget {
                operation: "bevel",
                found: ElementKind::HalfEdge
            }
        );
    }

    #[test]
    fn test_bevel_degree_two_vertex_is_rejected() {
        let mut mesh = primitives::cube(1.0).build().unwrap();
        let v = nth_vertex(&mesh, 0);
        let w = mesh.vertex_neighbors(v).next().unwrap();
        mesh.erase_vertex(v).unwrap();
        assert_eq!(mesh.valence(w), 2);
        assert!(matches!(
            mesh.bevel_vertex(w),
            Err(OperatorError::InvalidOperator(_))
        ));
    }

    #[test]
    fn test_reposition_length_mismatch() {
        let mut mesh = primitives::cube(1.0).build().unwrap();
        let face = mesh.bevel_vertex(nth_vertex(&mesh, 0)).unwrap();
        let rails = mesh.bevel_rails(face).unwrap();
        assert!(matches!(
            mesh.bevel_vertex_reposition(&[Point3::origin()], &rails, 0.5),
            Err(OperatorError::InvalidOperator(_))
        ));
    }
}
