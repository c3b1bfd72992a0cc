//! Selections and half-edge traversal.

use crate::mesh::{ElementRef, HalfEdgeMesh};

use super::ObjectId;

/// An object in the scene plus, optionally, one element of its mesh.
///
/// A selection only names things. Nothing keeps the element alive, so
/// commands that destroy elements reassign or clear every selection that
/// could point at them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Selection {
    /// The selected object.
    pub object: Option<ObjectId>,
    /// The selected element within the object.
    pub element: Option<ElementRef>,
}

impl Selection {
    /// Select an object and optionally one of its elements.
    pub fn new(object: ObjectId, element: Option<ElementRef>) -> Self {
        Self {
            object: Some(object),
            element,
        }
    }

    /// Select nothing.
    pub fn clear(&mut self) {
        self.object = None;
        self.element = None;
    }

    /// Whether no object is selected.
    pub fn is_empty(&self) -> bool {
        self.object.is_none()
    }

    /// The selected element if it is still part of `mesh`.
    pub fn live_element(&self, mesh: &HalfEdgeMesh) -> Option<ElementRef> {
        self.element.filter(|&el| mesh.contains(el))
    }

    /// Move a selected half-edge to the next one around its face.
    pub fn select_next_halfedge(&mut self, mesh: &HalfEdgeMesh) {
        if let Some(h) = self.live_element(mesh).and_then(|el| el.as_halfedge()) {
            self.element = Some(ElementRef::HalfEdge(mesh.next(h)));
        }
    }

    /// Move a selected half-edge to its twin.
    pub fn select_twin_halfedge(&mut self, mesh: &HalfEdgeMesh) {
        if let Some(h) = self.live_element(mesh).and_then(|el| el.as_halfedge()) {
            self.element = Some(ElementRef::HalfEdge(mesh.twin(h)));
        }
    }

    /// Replace a selected vertex, edge or face by the half-edge it stores.
    pub fn select_halfedge(&mut self, mesh: &HalfEdgeMesh) {
        let h = match self.live_element(mesh) {
            Some(ElementRef::Vertex(v)) => mesh.vertex_halfedge(v),
            Some(ElementRef::Edge(e)) => mesh.edge_halfedge(e),
            Some(ElementRef::Face(f)) => mesh.face_halfedge(f),
            _ => return,
        };
        self.element = Some(ElementRef::HalfEdge(h));
    }
}
