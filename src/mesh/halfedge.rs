//! Half-edge mesh data structure.
//!
//! This module provides the half-edge (doubly-connected edge list) store used
//! by every operator in the crate. Meshes are closed, two-manifold and may
//! mix faces of any degree ≥ 3.
//!
//! # Structure
//!
//! - Each edge is split into two **half-edges** pointing in opposite directions
//! - Each half-edge knows its **twin**, the **next** half-edge around its face,
//!   its **origin** vertex (the vertex it leaves), its **edge** and its **face**
//! - Each vertex stores one outgoing half-edge, so `next(twin(h))` walks the fan
//! - Each edge and each face stores one of its half-edges
//!
//! All elements live in generational arenas. Handles to destroyed elements are
//! detected with the `contains_*` queries instead of silently aliasing new
//! elements.

use std::collections::{HashMap, HashSet};

use nalgebra::{Point3, Vector3};
use slotmap::SlotMap;

use super::index::{EdgeId, ElementRef, FaceId, HalfEdgeId, VertexId};
use crate::error::TopologyError;

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// One outgoing half-edge from this vertex.
    pub(crate) halfedge: HalfEdgeId,
}

/// An undirected edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct Edge {
    /// Either of the two half-edges of this edge.
    pub(crate) halfedge: HalfEdgeId,
}

/// A face in the half-edge mesh.
#[derive(Debug, Clone, Copy, Default)]
pub struct Face {
    /// One half-edge on the boundary of this face.
    pub(crate) halfedge: HalfEdgeId,
}

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy, Default)]
pub struct HalfEdge {
    /// The vertex this half-edge leaves.
    pub(crate) origin: VertexId,

    /// The oppositely directed half-edge of the same edge.
    pub(crate) twin: HalfEdgeId,

    /// The next half-edge around the face.
    pub(crate) next: HalfEdgeId,

    /// The edge this half-edge belongs to.
    pub(crate) edge: EdgeId,

    /// The face this half-edge bounds.
    pub(crate) face: FaceId,
}

/// A closed polygon mesh stored as a half-edge graph.
///
/// Use [`build`](crate::mesh::build) to construct one from a polygon soup.
/// Local operators (`flip_edge`, `split_edge`, ...) are inherent methods
/// implemented in [`crate::edit`].
#[derive(Debug, Clone, Default)]
pub struct HalfEdgeMesh {
    pub(crate) vertices: SlotMap<VertexId, Vertex>,
    pub(crate) edges: SlotMap<EdgeId, Edge>,
    pub(crate) faces: SlotMap<FaceId, Face>,
    pub(crate) halfedges: SlotMap<HalfEdgeId, HalfEdge>,
}

impl HalfEdgeMesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(num_vertices: usize, num_faces: usize, num_halfedges: usize) -> Self {
        Self {
            vertices: SlotMap::with_capacity_and_key(num_vertices),
            edges: SlotMap::with_capacity_and_key(num_halfedges / 2),
            faces: SlotMap::with_capacity_and_key(num_faces),
            halfedges: SlotMap::with_capacity_and_key(num_halfedges),
        }
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get the number of half-edges.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// `V - E + F`. Equals 2 for a closed genus-0 surface.
    pub fn euler_characteristic(&self) -> i64 {
        self.num_vertices() as i64 - self.num_edges() as i64 + self.num_faces() as i64
    }

    /// Whether the vertex handle refers to a live vertex.
    #[inline]
    pub fn contains_vertex(&self, v: VertexId) -> bool {
        self.vertices.contains_key(v)
    }

    /// Whether the edge handle refers to a live edge.
    #[inline]
    pub fn contains_edge(&self, e: EdgeId) -> bool {
        self.edges.contains_key(e)
    }

    /// Whether the face handle refers to a live face.
    #[inline]
    pub fn contains_face(&self, f: FaceId) -> bool {
        self.faces.contains_key(f)
    }

    /// Whether the half-edge handle refers to a live half-edge.
    #[inline]
    pub fn contains_halfedge(&self, h: HalfEdgeId) -> bool {
        self.halfedges.contains_key(h)
    }

    /// Whether the element address refers to a live element.
    pub fn contains(&self, element: ElementRef) -> bool {
        match element {
            ElementRef::Vertex(v) => self.contains_vertex(v),
            ElementRef::Edge(e) => self.contains_edge(e),
            ElementRef::Face(f) => self.contains_face(f),
            ElementRef::HalfEdge(h) => self.contains_halfedge(h),
        }
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId) -> &Point3<f64> {
        &self.vertices[v].position
    }

    /// Set the position of a vertex.
    #[inline]
    pub fn set_position(&mut self, v: VertexId, pos: Point3<f64>) {
        self.vertices[v].position = pos;
    }

    /// The outgoing half-edge stored on a vertex.
    #[inline]
    pub fn vertex_halfedge(&self, v: VertexId) -> HalfEdgeId {
        self.vertices[v].halfedge
    }

    /// The half-edge stored on an edge.
    #[inline]
    pub fn edge_halfedge(&self, e: EdgeId) -> HalfEdgeId {
        self.edges[e].halfedge
    }

    /// The half-edge stored on a face.
    #[inline]
    pub fn face_halfedge(&self, f: FaceId) -> HalfEdgeId {
        self.faces[f].halfedge
    }

    // ==================== Topology Queries ====================

    /// Get the twin (opposite) half-edge.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedges[he].twin
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedges[he].next
    }

    /// Get the previous half-edge around the face.
    ///
    /// Previous links are not stored, so this walks the face: O(degree).
    pub fn prev(&self, he: HalfEdgeId) -> HalfEdgeId {
        let mut cur = he;
        loop {
            let n = self.next(cur);
            if n == he {
                return cur;
            }
            cur = n;
        }
    }

    /// Get the vertex a half-edge leaves.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId) -> VertexId {
        self.halfedges[he].origin
    }

    /// Get the vertex a half-edge points to.
    #[inline]
    pub fn dest(&self, he: HalfEdgeId) -> VertexId {
        self.origin(self.twin(he))
    }

    /// Get the edge of a half-edge.
    #[inline]
    pub fn edge_of(&self, he: HalfEdgeId) -> EdgeId {
        self.halfedges[he].edge
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId) -> FaceId {
        self.halfedges[he].face
    }

    /// The two endpoints of an edge.
    pub fn edge_vertices(&self, e: EdgeId) -> [VertexId; 2] {
        let h = self.edge_halfedge(e);
        [self.origin(h), self.dest(h)]
    }

    /// The two faces on either side of an edge.
    pub fn edge_faces(&self, e: EdgeId) -> [FaceId; 2] {
        let h = self.edge_halfedge(e);
        [self.face_of(h), self.face_of(self.twin(h))]
    }

    /// Find the half-edge going from `a` to `b`, if the two are adjacent.
    pub fn find_halfedge(&self, a: VertexId, b: VertexId) -> Option<HalfEdgeId> {
        self.vertex_halfedges(a).find(|&h| self.dest(h) == b)
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.vertices.keys()
    }

    /// Iterate over all edge IDs.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.keys()
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces.keys()
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        self.halfedges.keys()
    }

    /// Iterate over all vertices with their IDs.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> + '_ {
        self.vertices.iter()
    }

    /// Iterate over half-edges around a vertex (outgoing half-edges).
    pub fn vertex_halfedges(&self, v: VertexId) -> VertexHalfEdgeIter<'_> {
        VertexHalfEdgeIter::new(self, v)
    }

    /// Iterate over vertices adjacent to a vertex.
    pub fn vertex_neighbors(&self, v: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.vertex_halfedges(v).map(|he| self.dest(he))
    }

    /// Iterate over faces around a vertex.
    pub fn vertex_faces(&self, v: VertexId) -> impl Iterator<Item = FaceId> + '_ {
        self.vertex_halfedges(v).map(|he| self.face_of(he))
    }

    /// Iterate over edges incident to a vertex.
    pub fn vertex_edges(&self, v: VertexId) -> impl Iterator<Item = EdgeId> + '_ {
        self.vertex_halfedges(v).map(|he| self.edge_of(he))
    }

    /// Iterate over half-edges around a face.
    pub fn face_halfedges(&self, f: FaceId) -> FaceHalfEdgeIter<'_> {
        FaceHalfEdgeIter::new(self, self.face_halfedge(f))
    }

    /// Iterate over vertices of a face.
    pub fn face_vertices(&self, f: FaceId) -> impl Iterator<Item = VertexId> + '_ {
        self.face_halfedges(f).map(|he| self.origin(he))
    }

    /// Number of sides of a face.
    pub fn face_degree(&self, f: FaceId) -> usize {
        self.face_halfedges(f).count()
    }

    /// Number of edges incident to a vertex.
    pub fn valence(&self, v: VertexId) -> usize {
        self.vertex_halfedges(v).count()
    }

    /// Whether every face is a triangle.
    pub fn is_triangle_mesh(&self) -> bool {
        self.face_ids().all(|f| self.face_degree(f) == 3)
    }

    // ==================== Geometry ====================

    /// Positions of the corners of a face, in order.
    pub fn face_positions(&self, f: FaceId) -> Vec<Point3<f64>> {
        self.face_vertices(f).map(|v| *self.position(v)).collect()
    }

    /// Newell's vector of a face: twice the area times the unit normal.
    pub fn face_area_vector(&self, f: FaceId) -> Vector3<f64> {
        newell_vector(&self.face_positions(f))
    }

    /// Unit normal of a face (zero for a degenerate face).
    pub fn face_normal(&self, f: FaceId) -> Vector3<f64> {
        self.face_area_vector(f)
            .try_normalize(1e-15)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Area of a (planar) face.
    pub fn face_area(&self, f: FaceId) -> f64 {
        0.5 * self.face_area_vector(f).norm()
    }

    /// Mean of the corners of a face.
    pub fn face_centroid(&self, f: FaceId) -> Point3<f64> {
        centroid(&self.face_positions(f))
    }

    /// Area-weighted normal at a vertex.
    pub fn vertex_normal(&self, v: VertexId) -> Vector3<f64> {
        let sum: Vector3<f64> = self.vertex_faces(v).map(|f| self.face_area_vector(f)).sum();
        sum.try_normalize(1e-15).unwrap_or_else(Vector3::zeros)
    }

    /// Length of an edge.
    pub fn edge_length(&self, e: EdgeId) -> f64 {
        let [a, b] = self.edge_vertices(e);
        (self.position(b) - self.position(a)).norm()
    }

    /// Midpoint of an edge.
    pub fn edge_midpoint(&self, e: EdgeId) -> Point3<f64> {
        let [a, b] = self.edge_vertices(e);
        nalgebra::center(self.position(a), self.position(b))
    }

    /// Vector from the origin to the destination of a half-edge.
    pub fn halfedge_vector(&self, he: HalfEdgeId) -> Vector3<f64> {
        self.position(self.dest(he)) - self.position(self.origin(he))
    }

    /// Mean edge length over the whole mesh.
    pub fn average_edge_length(&self) -> f64 {
        if self.edges.is_empty() {
            return 0.0;
        }
        let total: f64 = self.edge_ids().map(|e| self.edge_length(e)).sum();
        total / self.num_edges() as f64
    }

    /// Compute the bounding box of the mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let mut positions = self.vertices.values().map(|v| v.position);
        let first = positions.next()?;
        Some(positions.fold((first, first), |(min, max), p| (min.inf(&p), max.sup(&p))))
    }

    /// Compute the total surface area of the mesh.
    pub fn surface_area(&self) -> f64 {
        self.face_ids().map(|f| self.face_area(f)).sum()
    }

    // ==================== Construction ====================

    pub(crate) fn add_vertex(&mut self, position: Point3<f64>) -> VertexId {
        self.vertices.insert(Vertex {
            position,
            halfedge: HalfEdgeId::default(),
        })
    }

    pub(crate) fn add_edge(&mut self) -> EdgeId {
        self.edges.insert(Edge::default())
    }

    pub(crate) fn add_face(&mut self) -> FaceId {
        self.faces.insert(Face::default())
    }

    pub(crate) fn add_halfedge(&mut self) -> HalfEdgeId {
        self.halfedges.insert(HalfEdge::default())
    }

    /// Allocate a full edge: one edge record and its two twinned half-edges.
    ///
    /// Origins, `next` and `face` links are left for the caller to set.
    pub(crate) fn add_edge_pair(&mut self) -> (EdgeId, HalfEdgeId, HalfEdgeId) {
        let e = self.add_edge();
        let h = self.add_halfedge();
        let t = self.add_halfedge();
        self.edges[e].halfedge = h;
        self.halfedges[h].twin = t;
        self.halfedges[h].edge = e;
        self.halfedges[t].twin = h;
        self.halfedges[t].edge = e;
        (e, h, t)
    }

    /// Set every link of a half-edge except `twin` and `edge`.
    #[inline]
    pub(crate) fn link(&mut self, he: HalfEdgeId, origin: VertexId, next: HalfEdgeId, face: FaceId) {
        let h = &mut self.halfedges[he];
        h.origin = origin;
        h.next = next;
        h.face = face;
    }

    /// Assign `face` to every half-edge of the loop starting at `start`.
    pub(crate) fn claim_loop(&mut self, start: HalfEdgeId, face: FaceId) {
        let mut h = start;
        loop {
            self.halfedges[h].face = face;
            h = self.halfedges[h].next;
            if h == start {
                break;
            }
        }
        self.faces[face].halfedge = start;
    }

    // ==================== Validation ====================

    /// Check if the mesh is valid (all connectivity is consistent).
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Check every connectivity invariant, describing the first one broken.
    ///
    /// Verifies twin symmetry, face loops, edge sharing, vertex fans, that no
    /// link points at a destroyed element and that no two vertices share more
    /// than one edge. Vertices in [`TopologyError::DuplicateEdge`] are numbered
    /// as in [`to_polygon_soup`](Self::to_polygon_soup).
    pub fn validate(&self) -> std::result::Result<(), TopologyError> {
        let bound = self.halfedges.len() + 1;

        for (h, he) in self.halfedges.iter() {
            if !self.contains_halfedge(he.twin) || !self.contains_halfedge(he.next) {
                return Err(TopologyError::BrokenLink(format!(
                    "{:?} has a dangling twin or next", h
                )));
            }
            if !self.contains_vertex(he.origin)
                || !self.contains_edge(he.edge)
                || !self.contains_face(he.face)
            {
                return Err(TopologyError::BrokenLink(format!(
                    "{:?} has a dangling origin, edge or face", h
                )));
            }
            if he.twin == h || self.twin(he.twin) != h {
                return Err(TopologyError::BrokenLink(format!(
                    "{:?} is not the twin of its twin", h
                )));
            }
            if self.edge_of(he.twin) != he.edge {
                return Err(TopologyError::BrokenLink(format!(
                    "{:?} and its twin disagree on their edge", h
                )));
            }
            if self.origin(he.next) != self.dest(h) {
                return Err(TopologyError::BrokenLink(format!(
                    "{:?} does not connect to its next", h
                )));
            }
        }

        for (e, edge) in self.edges.iter() {
            if !self.contains_halfedge(edge.halfedge) || self.edge_of(edge.halfedge) != e {
                return Err(TopologyError::BrokenLink(format!(
                    "{:?} has a bad half-edge", e
                )));
            }
        }
        if 2 * self.edges.len() != self.halfedges.len() {
            return Err(TopologyError::BrokenLink(
                "edge and half-edge counts disagree".to_string(),
            ));
        }

        let mut face_sizes: HashMap<FaceId, usize> = HashMap::new();
        for he in self.halfedges.values() {
            *face_sizes.entry(he.face).or_insert(0) += 1;
        }
        for (f, face) in self.faces.iter() {
            if !self.contains_halfedge(face.halfedge) || self.face_of(face.halfedge) != f {
                return Err(TopologyError::BrokenLink(format!(
                    "{:?} has a bad half-edge", f
                )));
            }
            let mut degree = 0;
            let mut h = face.halfedge;
            loop {
                if self.face_of(h) != f {
                    return Err(TopologyError::BrokenLink(format!(
                        "{:?} has a foreign half-edge in its loop", f
                    )));
                }
                degree += 1;
                h = self.next(h);
                if h == face.halfedge {
                    break;
                }
                if degree > bound {
                    return Err(TopologyError::BrokenLink(format!(
                        "{:?} loop does not close", f
                    )));
                }
            }
            if degree < 3 {
                return Err(TopologyError::BrokenLink(format!(
                    "{:?} has degree {}", f, degree
                )));
            }
            if face_sizes.get(&f).copied().unwrap_or(0) != degree {
                return Err(TopologyError::BrokenLink(format!(
                    "{:?} loop misses some of its half-edges", f
                )));
            }
        }

        let mut outgoing: HashMap<VertexId, usize> = HashMap::new();
        for he in self.halfedges.values() {
            *outgoing.entry(he.origin).or_insert(0) += 1;
        }
        for (v, vertex) in self.vertices.iter() {
            if !self.contains_halfedge(vertex.halfedge) || self.origin(vertex.halfedge) != v {
                return Err(TopologyError::BrokenLink(format!(
                    "{:?} does not own its half-edge", v
                )));
            }
            let mut fan = 0;
            let mut h = vertex.halfedge;
            loop {
                if self.origin(h) != v {
                    return Err(TopologyError::BrokenLink(format!(
                        "{:?} fan leaves the vertex", v
                    )));
                }
                fan += 1;
                h = self.next(self.twin(h));
                if h == vertex.halfedge {
                    break;
                }
                if fan > bound {
                    return Err(TopologyError::BrokenLink(format!(
                        "{:?} fan does not close", v
                    )));
                }
            }
            if outgoing.get(&v).copied().unwrap_or(0) != fan {
                return Err(TopologyError::BrokenLink(format!(
                    "{:?} has more than one fan", v
                )));
            }
        }

        // At most one edge per vertex pair
        let index: HashMap<VertexId, usize> =
            self.vertex_ids().enumerate().map(|(i, v)| (v, i)).collect();
        for v in self.vertex_ids() {
            let mut seen = HashSet::new();
            for h in self.vertex_halfedges(v) {
                let w = self.dest(h);
                if !seen.insert(w) {
                    return Err(TopologyError::DuplicateEdge {
                        v0: index[&v],
                        v1: index[&w],
                    });
                }
            }
        }

        Ok(())
    }
}

/// Newell's method: sum of cross products of consecutive corners.
pub(crate) fn newell_vector(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    (0..n)
        .map(|i| points[i].coords.cross(&points[(i + 1) % n].coords))
        .sum()
}

pub(crate) fn centroid(points: &[Point3<f64>]) -> Point3<f64> {
    if points.is_empty() {
        return Point3::origin();
    }
    let sum: Vector3<f64> = points.iter().map(|p| p.coords).sum();
    Point3::from(sum / points.len() as f64)
}

/// Iterator over outgoing half-edges around a vertex.
pub struct VertexHalfEdgeIter<'a> {
    mesh: &'a HalfEdgeMesh,
    start: HalfEdgeId,
    current: HalfEdgeId,
    done: bool,
}

impl<'a> VertexHalfEdgeIter<'a> {
    fn new(mesh: &'a HalfEdgeMesh, v: VertexId) -> Self {
        let start = mesh.vertex_halfedge(v);
        Self {
            mesh,
            start,
            current: start,
            done: !mesh.contains_halfedge(start),
        }
    }
}

impl<'a> Iterator for VertexHalfEdgeIter<'a> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;

        // he: v -> w, twin(he): w -> v, next(twin(he)) leaves v again.
        self.current = self.mesh.next(self.mesh.twin(self.current));

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}

/// Iterator over half-edges around a face.
pub struct FaceHalfEdgeIter<'a> {
    mesh: &'a HalfEdgeMesh,
    start: HalfEdgeId,
    current: HalfEdgeId,
    done: bool,
}

impl<'a> FaceHalfEdgeIter<'a> {
    pub(crate) fn new(mesh: &'a HalfEdgeMesh, start: HalfEdgeId) -> Self {
        Self {
            mesh,
            start,
            current: start,
            done: !mesh.contains_halfedge(start),
        }
    }
}

impl<'a> Iterator for FaceHalfEdgeIter<'a> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.mesh.next(self.current);

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}
