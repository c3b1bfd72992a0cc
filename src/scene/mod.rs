//! Editing scene.
//!
//! A [`Scene`] holds the objects being edited and the selections that
//! commands act on:
//!
//! - `selected`: the element the next command applies to
//! - `hovered`: the element under the cursor, set by [`Scene::pick`]
//! - `edited`: the face of the bevel currently being dragged
//! - `widget_target`: the element attached to the transform widget
//!
//! Commands mirror an interactive editor. Each one looks at `selected`,
//! does nothing if it names the wrong kind of thing, and otherwise runs the
//! matching operator. On success the selections are moved to the surviving
//! element or cleared, so none of them can name a destroyed element. On
//! error the mesh and every selection are left as they were.
//!
//! # Example
//!
//! ```
//! use meshedit::mesh::{primitives, ElementRef};
//! use meshedit::scene::{MeshObject, Scene, Selection};
//!
//! let mut scene = Scene::new();
//! let mesh = primitives::cube(1.0).build().unwrap();
//! let id = scene.add_object(MeshObject::new(mesh));
//!
//! let v = scene.mesh(id).unwrap().vertex_ids().next().unwrap();
//! scene.select(Selection::new(id, Some(ElementRef::Vertex(v))));
//! scene.erase_selected_element().unwrap();
//!
//! assert!(matches!(scene.selected().element, Some(ElementRef::Face(_))));
//! assert_eq!(scene.mesh(id).unwrap().num_vertices(), 7);
//! ```

mod object;
mod pick;
mod selection;

pub use object::{MeshObject, ObjectId, SceneObject, Sphere};
pub use pick::{index_to_rgb, rgb_to_index, PickIndex, IDS_PER_CORNER};
pub use selection::Selection;

use log::debug;

use crate::algo::subdivide::SubdivisionScheme;
use crate::algo::{MeshResampler, Progress, ResampleOp, ResampleReport};
use crate::edit::{BevelKind, BevelSession};
use crate::error::Result;
use crate::mesh::{ElementRef, HalfEdgeMesh};

/// Objects plus the selections the editing commands act on.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
    selected: Selection,
    hovered: Selection,
    edited: Selection,
    widget_target: Selection,
    bevel: Option<BevelSession>,
    resampler: MeshResampler,
}

impl Scene {
    /// An empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `resampler` for upsample, downsample, resample and subdivide.
    pub fn with_resampler(mut self, resampler: MeshResampler) -> Self {
        self.resampler = resampler;
        self
    }

    // ==================== Objects ====================

    /// Add an object and return its ID.
    pub fn add_object(&mut self, object: impl Into<SceneObject>) -> ObjectId {
        self.objects.push(object.into());
        ObjectId::new(self.objects.len() - 1)
    }

    /// Look up an object.
    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id.index())
    }

    /// The mesh of an object, if it has one.
    pub fn mesh(&self, id: ObjectId) -> Option<&HalfEdgeMesh> {
        self.object(id).and_then(SceneObject::as_mesh)
    }

    /// Number of objects.
    pub fn num_objects(&self) -> usize {
        self.objects.len()
    }

    /// The resampler used by the global commands.
    pub fn resampler(&self) -> &MeshResampler {
        &self.resampler
    }

    // ==================== Selections ====================

    /// The selection commands act on.
    pub fn selected(&self) -> &Selection {
        &self.selected
    }

    /// The selection under the cursor.
    pub fn hovered(&self) -> &Selection {
        &self.hovered
    }

    /// The bevel being edited.
    pub fn edited(&self) -> &Selection {
        &self.edited
    }

    /// The transform widget's target.
    pub fn widget_target(&self) -> &Selection {
        &self.widget_target
    }

    /// The interactive bevel, if one is in progress.
    pub fn bevel_session(&self) -> Option<&BevelSession> {
        self.bevel.as_ref()
    }

    /// Whether an object is selected.
    pub fn has_selection(&self) -> bool {
        !self.selected.is_empty()
    }

    /// Whether anything is under the cursor.
    pub fn has_hover(&self) -> bool {
        !self.hovered.is_empty()
    }

    /// Replace the selection.
    pub fn select(&mut self, selection: Selection) {
        self.selected = selection;
    }

    /// Select whatever is under the cursor.
    pub fn select_hovered(&mut self) {
        self.selected = self.hovered;
    }

    /// Attach the transform widget to a selection.
    pub fn set_widget_target(&mut self, target: Selection) {
        self.widget_target = target;
    }

    /// Clear every selection and end any bevel in progress.
    pub fn clear_selections(&mut self) {
        self.hovered.clear();
        self.selected.clear();
        self.edited.clear();
        self.widget_target.clear();
        self.bevel = None;
    }

    /// Move a selected half-edge to the next one around its face.
    pub fn select_next_halfedge(&mut self) {
        if let Some(mesh) = self.selected.object.and_then(|id| self.mesh(id)) {
            let mut selected = self.selected;
            selected.select_next_halfedge(mesh);
            self.selected = selected;
        }
    }

    /// Move a selected half-edge to its twin.
    pub fn select_twin_halfedge(&mut self) {
        if let Some(mesh) = self.selected.object.and_then(|id| self.mesh(id)) {
            let mut selected = self.selected;
            selected.select_twin_halfedge(mesh);
            self.selected = selected;
        }
    }

    /// Replace a selected vertex, edge or face by its half-edge.
    pub fn select_halfedge(&mut self) {
        if let Some(mesh) = self.selected.object.and_then(|id| self.mesh(id)) {
            let mut selected = self.selected;
            selected.select_halfedge(mesh);
            self.selected = selected;
        }
    }

    /// One line per fact about the current selection.
    pub fn selection_info(&self) -> Vec<String> {
        let Some(id) = self.selected.object else {
            return vec!["(nothing selected)".to_string()];
        };
        match self.object(id) {
            None => vec![format!("{} (missing)", id)],
            Some(SceneObject::Sphere(s)) => vec![
                "sphere".to_string(),
                format!("center: ({:.4}, {:.4}, {:.4})", s.center.x, s.center.y, s.center.z),
                format!("radius: {:.4}", s.radius),
            ],
            Some(SceneObject::Mesh(m)) => element_info(m.mesh(), self.selected.live_element(m.mesh())),
        }
    }

    // ==================== Picking ====================

    /// Assign pick IDs to every object, in order.
    pub fn pick_index(&self) -> PickIndex {
        let mut index = PickIndex::new();
        for (i, object) in self.objects.iter().enumerate() {
            let id = ObjectId::new(i);
            match object {
                SceneObject::Mesh(m) => {
                    index.add_mesh(id, m.mesh());
                }
                SceneObject::Sphere(_) => {
                    index.add_object(id);
                }
            }
        }
        index
    }

    /// Set `hovered` to whatever `id` stands for, or clear it.
    pub fn pick(&mut self, id: u32) {
        self.hovered.clear();
        if let Some(target) = self.pick_index().lookup(id) {
            self.hovered = target;
        }
    }

    /// Like [`pick`](Self::pick), for a colour read back from a pick buffer.
    pub fn pick_rgb(&mut self, rgb: [u8; 3]) {
        self.pick(rgb_to_index(rgb));
    }

    // ==================== Local commands ====================

    /// Flip the selected edge. The edge stays selected.
    pub fn flip_selected_edge(&mut self) -> Result<()> {
        let Some((mesh, Some(ElementRef::Edge(e)))) = self.selected_mesh_mut() else {
            return Ok(());
        };
        let e = mesh.flip_edge(e)?;
        self.after_local_edit(ElementRef::Edge(e));
        Ok(())
    }

    /// Split the selected edge and select the new vertex.
    pub fn split_selected_edge(&mut self) -> Result<()> {
        let Some((mesh, Some(ElementRef::Edge(e)))) = self.selected_mesh_mut() else {
            return Ok(());
        };
        let v = mesh.split_edge(e)?;
        self.after_local_edit(ElementRef::Vertex(v));
        Ok(())
    }

    /// Collapse the selected edge or face and select the surviving vertex.
    pub fn collapse_selected_element(&mut self) -> Result<()> {
        let v = match self.selected_mesh_mut() {
            Some((mesh, Some(ElementRef::Edge(e)))) => mesh.collapse_edge(e)?,
            Some((mesh, Some(ElementRef::Face(f)))) => mesh.collapse_face(f)?,
            _ => return Ok(()),
        };
        self.after_local_edit(ElementRef::Vertex(v));
        Ok(())
    }

    /// Erase the selected vertex or edge and select the merged face.
    pub fn erase_selected_element(&mut self) -> Result<()> {
        let f = match self.selected_mesh_mut() {
            Some((mesh, Some(ElementRef::Vertex(v)))) => mesh.erase_vertex(v)?,
            Some((mesh, Some(ElementRef::Edge(e)))) => mesh.erase_edge(e)?,
            _ => return Ok(()),
        };
        self.after_local_edit(ElementRef::Face(f));
        Ok(())
    }

    /// Bevel the selected vertex, edge or face and start editing the bevel.
    ///
    /// Selecting the bevel that is already being edited does nothing, so
    /// repeating the command does not stack bevels. Afterwards the selection
    /// names the new face for a face bevel, one of its edges for an edge
    /// bevel and one of its vertices for a vertex bevel.
    pub fn bevel_selected_element(&mut self) -> Result<()> {
        if self.selected.element.is_none() || self.edited.element == self.selected.element {
            return Ok(());
        }
        let Some((mesh, Some(target))) = self.selected_mesh_mut() else {
            return Ok(());
        };
        let session = BevelSession::bevel(mesh, target)?;
        let h = mesh.face_halfedge(session.face());
        let element = match session.kind() {
            BevelKind::Face => ElementRef::Face(session.face()),
            BevelKind::Edge => ElementRef::Edge(mesh.edge_of(h)),
            BevelKind::Vertex => ElementRef::Vertex(mesh.origin(h)),
        };

        self.selected.element = Some(element);
        self.hovered.clear();
        self.widget_target.clear();
        self.edited = self.selected;
        self.bevel = Some(session);
        Ok(())
    }

    /// Drag the bevel being edited by `(dx, dy)` screen units.
    pub fn update_bevel_amount(&mut self, dx: f64, dy: f64) -> Result<()> {
        let Some(session) = self.bevel.as_mut() else {
            return Ok(());
        };
        let Some(mesh) = self.edited.object.and_then(|id| mesh_of(&mut self.objects, id)) else {
            return Ok(());
        };
        session.drag(mesh, dx, dy)?;
        self.hovered.clear();
        self.widget_target.clear();
        Ok(())
    }

    // ==================== Global commands ====================

    /// Triangulate the selected mesh. Returns the number of faces split.
    pub fn triangulate_selection(&mut self) -> usize {
        let Some(mesh) = self.selected.object.and_then(|id| mesh_of(&mut self.objects, id)) else {
            return 0;
        };
        let split = mesh.triangulate();
        self.clear_selections();
        split
    }

    /// Subdivide the selected mesh into quads.
    ///
    /// The mesh stays selected, with its first vertex as the element, so the
    /// command can be repeated.
    pub fn subdivide_selection(&mut self, scheme: SubdivisionScheme) -> Result<()> {
        let Some(id) = self.selected.object else {
            return Ok(());
        };
        let options = self.resampler.subdivide_options().clone().with_scheme(scheme);
        self.resampler.set_subdivide_options(options);
        if self.run_on_selection(ResampleOp::Subdivide)?.is_none() {
            return Ok(());
        }

        let first = self.mesh(id).and_then(|m| m.vertex_ids().next());
        self.selected = Selection::new(id, first.map(ElementRef::Vertex));
        Ok(())
    }

    /// Loop-subdivide the selected triangle mesh.
    pub fn upsample_selected_mesh(&mut self) -> Result<()> {
        self.run_on_selection(ResampleOp::Upsample).map(|_| ())
    }

    /// Simplify the selected triangle mesh.
    pub fn downsample_selected_mesh(&mut self) -> Result<()> {
        self.run_on_selection(ResampleOp::Downsample).map(|_| ())
    }

    /// Remesh the selected triangle mesh.
    pub fn resample_selected_mesh(&mut self) -> Result<()> {
        self.run_on_selection(ResampleOp::Resample).map(|_| ())
    }

    // ==================== Internals ====================

    /// The selected mesh and the selected element, if it is still alive.
    fn selected_mesh_mut(&mut self) -> Option<(&mut HalfEdgeMesh, Option<ElementRef>)> {
        let mesh = mesh_of(&mut self.objects, self.selected.object?)?;
        let element = self.selected.live_element(mesh);
        Some((mesh, element))
    }

    /// Point the selection at the element a local operator returned.
    fn after_local_edit(&mut self, element: ElementRef) {
        debug!("selection moved to {:?}", element);
        self.selected.element = Some(element);
        self.hovered.clear();
        self.widget_target.clear();
        self.edited.clear();
        self.bevel = None;
    }

    /// Run a global operator on the selected mesh. Selections are cleared on
    /// success; on failure the mesh is unchanged and they are kept.
    fn run_on_selection(&mut self, op: ResampleOp) -> Result<Option<ResampleReport>> {
        let Some(mesh) = self.selected.object.and_then(|id| mesh_of(&mut self.objects, id)) else {
            return Ok(None);
        };
        let report = self.resampler.run(op, mesh, &Progress::none())?;
        self.clear_selections();
        Ok(Some(report))
    }
}

fn mesh_of(objects: &mut [SceneObject], id: ObjectId) -> Option<&mut HalfEdgeMesh> {
    objects.get_mut(id.index()).and_then(SceneObject::as_mesh_mut)
}

fn element_info(mesh: &HalfEdgeMesh, element: Option<ElementRef>) -> Vec<String> {
    match element {
        None => vec![format!(
            "mesh: {} vertices, {} edges, {} faces",
            mesh.num_vertices(),
            mesh.num_edges(),
            mesh.num_faces()
        )],
        Some(ElementRef::Vertex(v)) => {
            let p = mesh.position(v);
            vec![
                "vertex".to_string(),
                format!("position: ({:.4}, {:.4}, {:.4})", p.x, p.y, p.z),
                format!("degree: {}", mesh.valence(v)),
            ]
        }
        Some(ElementRef::Edge(e)) => vec![
            "edge".to_string(),
            format!("length: {:.4}", mesh.edge_length(e)),
        ],
        Some(ElementRef::Face(f)) => vec![
            "face".to_string(),
            format!("degree: {}", mesh.face_degree(f)),
            format!("area: {:.4}", mesh.face_area(f)),
        ],
        Some(ElementRef::HalfEdge(h)) => vec![
            "halfedge".to_string(),
            format!("face degree: {}", mesh.face_degree(mesh.face_of(h))),
            format!("length: {:.4}", mesh.halfedge_vector(h).norm()),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MeshError, OperatorError, PrecisionError};
    use crate::mesh::primitives;
    use nalgebra::Point3;

    fn cube_scene(triangulated: bool) -> (Scene, ObjectId) {
        let mut mesh = primitives::cube(1.0).build().unwrap();
        if triangulated {
            mesh.triangulate();
        }
        let mut scene = Scene::new();
        let id = scene.add_object(MeshObject::new(mesh));
        (scene, id)
    }

    fn counts(scene: &Scene, id: ObjectId) -> (usize, usize, usize) {
        let m = scene.mesh(id).unwrap();
        (m.num_vertices(), m.num_edges(), m.num_faces())
    }

    /// The first edge added by triangulation: a diagonal inside a cube side.
    fn diagonal(scene: &Scene, id: ObjectId) -> ElementRef {
        ElementRef::Edge(scene.mesh(id).unwrap().edge_ids().nth(12).unwrap())
    }

    fn nth_face(scene: &Scene, id: ObjectId, n: usize) -> ElementRef {
        ElementRef::Face(scene.mesh(id).unwrap().face_ids().nth(n).unwrap())
    }

    #[test]
    fn test_flip_keeps_edge_selected() {
        let (mut scene, id) = cube_scene(true);
        let e = diagonal(&scene, id);
        scene.select(Selection::new(id, Some(e)));
        scene.set_widget_target(Selection::new(id, Some(e)));
        scene.pick(0);

        scene.flip_selected_edge().unwrap();

        assert_eq!(scene.selected().element, Some(e));
        assert!(!scene.has_hover());
        assert!(scene.widget_target().is_empty());
        assert!(scene.mesh(id).unwrap().is_valid());
    }

    #[test]
    fn test_split_selects_new_vertex() {
        let (mut scene, id) = cube_scene(true);
        scene.select(Selection::new(id, Some(diagonal(&scene, id))));

        scene.split_selected_edge().unwrap();

        assert_eq!(counts(&scene, id), (9, 21, 14));
        let v = scene.selected().element.and_then(|el| el.as_vertex()).unwrap();
        assert_eq!(scene.mesh(id).unwrap().valence(v), 4);
    }

    #[test]
    fn test_collapse_face_selects_survivor() {
        let (mut scene, id) = cube_scene(false);
        scene.select(Selection::new(id, Some(nth_face(&scene, id, 1))));

        scene.collapse_selected_element().unwrap();

        assert_eq!(counts(&scene, id), (5, 8, 5));
        let v = scene.selected().element.and_then(|el| el.as_vertex()).unwrap();
        assert!((scene.mesh(id).unwrap().position(v).z - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_erase_selects_merged_face() {
        let (mut scene, id) = cube_scene(false);
        let v = scene.mesh(id).unwrap().vertex_ids().next().unwrap();
        scene.select(Selection::new(id, Some(ElementRef::Vertex(v))));

        scene.erase_selected_element().unwrap();

        let f = scene.selected().element.and_then(|el| el.as_face()).unwrap();
        assert_eq!(scene.selected().object, Some(id));
        assert_eq!(scene.mesh(id).unwrap().face_degree(f), 6);
    }

    #[test]
    fn test_refused_operator_keeps_everything() {
        let (mut scene, id) = cube_scene(false);
        let e = ElementRef::Edge(scene.mesh(id).unwrap().edge_ids().next().unwrap());
        let selection = Selection::new(id, Some(e));
        scene.select(selection);

        let result = scene.flip_selected_edge();

        assert!(matches!(
            result,
            Err(MeshError::Operator(OperatorError::InvalidOperator(_)))
        ));
        assert_eq!(*scene.selected(), selection);
        assert_eq!(counts(&scene, id), (8, 12, 6));
    }

    #[test]
    fn test_commands_without_target_are_noops() {
        let (mut scene, id) = cube_scene(false);
        scene.flip_selected_edge().unwrap();
        scene.bevel_selected_element().unwrap();
        scene.update_bevel_amount(10.0, 10.0).unwrap();
        assert_eq!(scene.triangulate_selection(), 0);

        // A face is the wrong target for split.
        scene.select(Selection::new(id, Some(nth_face(&scene, id, 0))));
        scene.split_selected_edge().unwrap();

        assert_eq!(counts(&scene, id), (8, 12, 6));
    }

    #[test]
    fn test_bevel_face_then_drag() {
        let (mut scene, id) = cube_scene(false);
        let top = nth_face(&scene, id, 1);
        scene.select(Selection::new(id, Some(top)));

        scene.bevel_selected_element().unwrap();
        assert_eq!(counts(&scene, id), (12, 20, 10));
        assert_eq!(scene.selected().element, Some(top));
        assert_eq!(scene.edited(), scene.selected());

        // Already editing this face: no second bevel.
        scene.bevel_selected_element().unwrap();
        assert_eq!(counts(&scene, id), (12, 20, 10));

        scene.update_bevel_amount(50.0, 25.0).unwrap();
        let mesh = scene.mesh(id).unwrap();
        let f = top.as_face().unwrap();
        for v in mesh.face_vertices(f) {
            let p = mesh.position(v);
            assert!((p.x.abs() - 0.25).abs() < 1e-9);
            assert!((p.y.abs() - 0.25).abs() < 1e-9);
            assert!((p.z - 0.75).abs() < 1e-9);
        }
    }

    #[test]
    fn test_bevel_vertex_selects_vertex_of_new_face() {
        let (mut scene, id) = cube_scene(false);
        let v = scene.mesh(id).unwrap().vertex_ids().nth(6).unwrap();
        scene.select(Selection::new(id, Some(ElementRef::Vertex(v))));

        scene.bevel_selected_element().unwrap();

        let session = scene.bevel_session().unwrap();
        assert_eq!(session.kind(), BevelKind::Vertex);
        let mesh = scene.mesh(id).unwrap();
        let w = scene.selected().element.and_then(|el| el.as_vertex()).unwrap();
        assert!(mesh.face_vertices(session.face()).any(|x| x == w));
        assert!(!mesh.contains_vertex(v));
    }

    #[test]
    fn test_local_edit_ends_bevel() {
        let (mut scene, id) = cube_scene(false);
        scene.select(Selection::new(id, Some(nth_face(&scene, id, 1))));
        scene.bevel_selected_element().unwrap();

        let e = scene.mesh(id).unwrap().edge_ids().next().unwrap();
        scene.select(Selection::new(id, Some(ElementRef::Edge(e))));
        scene.erase_selected_element().unwrap();

        assert!(scene.bevel_session().is_none());
        assert!(scene.edited().is_empty());
    }

    #[test]
    fn test_upsample_requires_triangles() {
        let (mut scene, id) = cube_scene(false);
        let selection = Selection::new(id, Some(nth_face(&scene, id, 0)));
        scene.select(selection);

        assert_eq!(
            scene.upsample_selected_mesh(),
            Err(MeshError::Precision(PrecisionError::NonTriangular { degree: 4 }))
        );
        assert_eq!(*scene.selected(), selection);

        assert_eq!(scene.triangulate_selection(), 6);
        assert!(!scene.has_selection());

        scene.select(Selection::new(id, None));
        scene.upsample_selected_mesh().unwrap();
        assert_eq!(counts(&scene, id), (26, 72, 48));
        assert!(!scene.has_selection());
    }

    #[test]
    fn test_subdivide_reselects_first_vertex() {
        let (mut scene, id) = cube_scene(false);
        scene.select(Selection::new(id, None));

        scene.subdivide_selection(SubdivisionScheme::Smooth).unwrap();
        scene.subdivide_selection(SubdivisionScheme::Linear).unwrap();

        assert_eq!(counts(&scene, id).2, 96);
        let first = scene.mesh(id).unwrap().vertex_ids().next().unwrap();
        assert_eq!(scene.selected().object, Some(id));
        assert_eq!(scene.selected().element, Some(ElementRef::Vertex(first)));
    }

    #[test]
    fn test_pick_across_objects() {
        let (mut scene, id) = cube_scene(false);
        let sphere = scene.add_object(Sphere {
            center: Point3::new(3.0, 0.0, 0.0),
            radius: 1.0,
        });

        scene.pick(1);
        assert_eq!(scene.hovered().object, Some(id));
        assert_eq!(scene.hovered().element, Some(nth_face(&scene, id, 0)));

        scene.pick_rgb(index_to_rgb(96));
        assert_eq!(*scene.hovered(), Selection::new(sphere, None));

        scene.select_hovered();
        assert_eq!(scene.selection_info()[0], "sphere");
        scene.flip_selected_edge().unwrap();

        scene.pick(97);
        assert!(!scene.has_hover());
    }

    #[test]
    fn test_halfedge_traversal() {
        let (mut scene, id) = cube_scene(false);
        let f = nth_face(&scene, id, 0);
        scene.select(Selection::new(id, Some(f)));

        scene.select_halfedge();
        let h = scene.selected().element.and_then(|el| el.as_halfedge()).unwrap();
        scene.select_twin_halfedge();
        scene.select_next_halfedge();

        let mesh = scene.mesh(id).unwrap();
        assert_eq!(
            scene.selected().element,
            Some(ElementRef::HalfEdge(mesh.next(mesh.twin(h))))
        );
        assert_eq!(scene.selection_info()[0], "halfedge");
    }

    #[test]
    fn test_selection_info() {
        let (mut scene, id) = cube_scene(false);
        assert_eq!(scene.selection_info(), vec!["(nothing selected)".to_string()]);

        scene.select(Selection::new(id, None));
        assert_eq!(
            scene.selection_info(),
            vec!["mesh: 8 vertices, 12 edges, 6 faces".to_string()]
        );

        scene.select(Selection::new(id, Some(nth_face(&scene, id, 0))));
        assert_eq!(scene.selection_info()[1], "degree: 4");
    }
}
