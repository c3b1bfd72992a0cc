//! Handle types for mesh elements.
//!
//! Every element lives in a generational arena ([`slotmap`]). A handle is an
//! index plus a generation, so a handle to a destroyed element never aliases
//! a newer one: lookups through it simply fail.

use std::fmt;

use slotmap::new_key_type;

new_key_type! {
    /// Handle to a vertex.
    pub struct VertexId;

    /// Handle to an undirected edge.
    pub struct EdgeId;

    /// Handle to a face.
    pub struct FaceId;

    /// Handle to a half-edge.
    pub struct HalfEdgeId;
}

/// The four kinds of mesh element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// A vertex.
    Vertex,
    /// An undirected edge.
    Edge,
    /// A face.
    Face,
    /// A half-edge.
    HalfEdge,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::Vertex => "vertex",
            ElementKind::Edge => "edge",
            ElementKind::Face => "face",
            ElementKind::HalfEdge => "half-edge",
        };
        f.write_str(name)
    }
}

/// Opaque address of any mesh element.
///
/// Usable as a map key. Stays valid for the lifetime of the element it names
/// and is rejected by [`HalfEdgeMesh::contains`](super::HalfEdgeMesh::contains)
/// once the element is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementRef {
    /// A vertex.
    Vertex(VertexId),
    /// An undirected edge.
    Edge(EdgeId),
    /// A face.
    Face(FaceId),
    /// A half-edge.
    HalfEdge(HalfEdgeId),
}

impl ElementRef {
    /// The kind of element this refers to.
    pub fn kind(&self) -> ElementKind {
        match self {
            ElementRef::Vertex(_) => ElementKind::Vertex,
            ElementRef::Edge(_) => ElementKind::Edge,
            ElementRef::Face(_) => ElementKind::Face,
            ElementRef::HalfEdge(_) => ElementKind::HalfEdge,
        }
    }

    /// The vertex handle, if this is a vertex.
    pub fn as_vertex(&self) -> Option<VertexId> {
        match *self {
            ElementRef::Vertex(v) => Some(v),
            _ => None,
        }
    }

    /// The edge handle, if this is an edge.
    pub fn as_edge(&self) -> Option<EdgeId> {
        match *self {
            ElementRef::Edge(e) => Some(e),
            _ => None,
        }
    }

    /// The face handle, if this is a face.
    pub fn as_face(&self) -> Option<FaceId> {
        match *self {
            ElementRef::Face(f) => Some(f),
            _ => None,
        }
    }

    /// The half-edge handle, if this is a half-edge.
    pub fn as_halfedge(&self) -> Option<HalfEdgeId> {
        match *self {
            ElementRef::HalfEdge(h) => Some(h),
            _ => None,
        }
    }
}

impl From<VertexId> for ElementRef {
    fn from(id: VertexId) -> Self {
        ElementRef::Vertex(id)
    }
}

impl From<EdgeId> for ElementRef {
    fn from(id: EdgeId) -> Self {
        ElementRef::Edge(id)
    }
}

impl From<FaceId> for ElementRef {
    fn from(id: FaceId) -> Self {
        ElementRef::Face(id)
    }
}

impl From<HalfEdgeId> for ElementRef {
    fn from(id: HalfEdgeId) -> Self {
        ElementRef::HalfEdge(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;
    use std::collections::HashMap;

    #[test]
    fn test_stale_key_is_rejected() {
        let mut arena: SlotMap<VertexId, u32> = SlotMap::with_key();
        let a = arena.insert(1);
        arena.remove(a);
        let b = arena.insert(2);

        // Same slot, new generation.
        assert_ne!(a, b);
        assert!(!arena.contains_key(a));
        assert!(arena.contains_key(b));
    }

    #[test]
    fn test_element_ref_as_map_key() {
        let mut verts: SlotMap<VertexId, ()> = SlotMap::with_key();
        let mut faces: SlotMap<FaceId, ()> = SlotMap::with_key();
        let v = verts.insert(());
        let f = faces.insert(());

        let mut labels = HashMap::new();
        labels.insert(ElementRef::from(v), "v");
        labels.insert(ElementRef::from(f), "f");

        assert_eq!(labels[&ElementRef::Vertex(v)], "v");
        assert_eq!(labels[&ElementRef::Face(f)], "f");
        assert_eq!(ElementRef::from(v).kind(), ElementKind::Vertex);
        assert_eq!(ElementRef::from(f).as_face(), Some(f));
        assert_eq!(ElementRef::from(f).as_vertex(), None);
    }
}
