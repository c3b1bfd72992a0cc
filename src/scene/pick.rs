//! Pick IDs.
//!
//! Every pickable thing in the scene gets a consecutive integer ID. A renderer
//! draws each ID as a flat 24-bit colour ([`index_to_rgb`]); reading the pixel
//! under the cursor back through [`rgb_to_index`] and [`PickIndex::lookup`]
//! recovers what was hit.
//!
//! For a mesh, each face corner contributes four IDs, in this order: the
//! corner vertex, the face, the edge leaving the corner, and the half-edge
//! leaving the corner.

use std::ops::Range;

use crate::mesh::{ElementRef, HalfEdgeMesh};

use super::{ObjectId, Selection};

/// Pick IDs per face corner.
pub const IDS_PER_CORNER: u32 = 4;

/// Mapping from pick IDs to the selections they stand for.
#[derive(Debug, Clone, Default)]
pub struct PickIndex {
    targets: Vec<Selection>,
    ranges: Vec<(ObjectId, Range<u32>)>,
}

impl PickIndex {
    /// An index with no IDs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of IDs handed out so far.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether no IDs have been handed out.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Assign IDs to every face corner of `mesh`. Returns the IDs used.
    pub fn add_mesh(&mut self, object: ObjectId, mesh: &HalfEdgeMesh) -> Range<u32> {
        let start = self.next_id();
        for f in mesh.face_ids() {
            for h in mesh.face_halfedges(f) {
                let corner = mesh.next(h);
                self.push(object, ElementRef::Vertex(mesh.origin(corner)));
                self.push(object, ElementRef::Face(f));
                self.push(object, ElementRef::Edge(mesh.edge_of(corner)));
                self.push(object, ElementRef::HalfEdge(corner));
            }
        }
        self.close(object, start)
    }

    /// Assign a single ID that selects the whole object.
    pub fn add_object(&mut self, object: ObjectId) -> Range<u32> {
        let start = self.next_id();
        self.targets.push(Selection::new(object, None));
        self.close(object, start)
    }

    /// The selection an ID stands for.
    pub fn lookup(&self, id: u32) -> Option<Selection> {
        self.targets.get(id as usize).copied()
    }

    /// The IDs assigned to `object`.
    pub fn range(&self, object: ObjectId) -> Option<Range<u32>> {
        self.ranges
            .iter()
            .find(|(o, _)| *o == object)
            .map(|(_, r)| r.clone())
    }

    fn next_id(&self) -> u32 {
        self.targets.len() as u32
    }

    fn push(&mut self, object: ObjectId, element: ElementRef) {
        self.targets.push(Selection::new(object, Some(element)));
    }

    fn close(&mut self, object: ObjectId, start: u32) -> Range<u32> {
        let range = start..self.next_id();
        self.ranges.push((object, range.clone()));
        range
    }
}

/// Encode a pick ID as an RGB colour. Only the low 24 bits are kept.
pub fn index_to_rgb(id: u32) -> [u8; 3] {
    [
        (id & 0xff) as u8,
        ((id >> 8) & 0xff) as u8,
        ((id >> 16) & 0xff) as u8,
    ]
}

/// Decode an RGB colour written by [`index_to_rgb`].
pub fn rgb_to_index(rgb: [u8; 3]) -> u32 {
    u32::from(rgb[0]) | (u32::from(rgb[1]) << 8) | (u32::from(rgb[2]) << 16)
}
