//! Scene objects.

use std::fmt;

use nalgebra::{Matrix4, Point3};

use crate::error::TopologyError;
use crate::mesh::{build, HalfEdgeMesh};

/// Index of an object in a [`Scene`](super::Scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

impl ObjectId {
    /// Wrap a raw index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// The raw index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object {}", self.0)
    }
}

/// An editable polygon mesh.
#[derive(Debug, Clone)]
pub struct MeshObject {
    mesh: HalfEdgeMesh,
}

impl MeshObject {
    /// Wrap an existing mesh.
    pub fn new(mesh: HalfEdgeMesh) -> Self {
        Self { mesh }
    }

    /// Build a mesh from a polygon soup, moving every position by
    /// `transform` first.
    ///
    /// # Errors
    ///
    /// Whatever [`build`] reports for the soup.
    pub fn from_polygon_soup<P: AsRef<[usize]>>(
        polygons: &[P],
        positions: &[Point3<f64>],
        transform: &Matrix4<f64>,
    ) -> Result<Self, TopologyError> {
        let moved: Vec<Point3<f64>> = positions
            .iter()
            .map(|p| transform.transform_point(p))
            .collect();
        build(polygons, &moved).map(Self::new)
    }

    /// The mesh.
    pub fn mesh(&self) -> &HalfEdgeMesh {
        &self.mesh
    }

    /// The mesh, for editing.
    pub fn mesh_mut(&mut self) -> &mut HalfEdgeMesh {
        &mut self.mesh
    }
}

/// An analytic sphere. It can be picked and selected but not edited.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// Centre.
    pub center: Point3<f64>,
    /// Radius.
    pub radius: f64,
}

/// Anything the scene can hold.
#[derive(Debug, Clone)]
pub enum SceneObject {
    /// An editable mesh.
    Mesh(MeshObject),
    /// A sphere.
    Sphere(Sphere),
}

impl SceneObject {
    /// The mesh, if this object has one.
    pub fn as_mesh(&self) -> Option<&HalfEdgeMesh> {
        match self {
            SceneObject::Mesh(m) => Some(m.mesh()),
            SceneObject::Sphere(_) => None,
        }
    }

    /// The mesh, for editing, if this object has one.
    pub fn as_mesh_mut(&mut self) -> Option<&mut HalfEdgeMesh> {
        match self {
            SceneObject::Mesh(m) => Some(m.mesh_mut()),
            SceneObject::Sphere(_) => None,
        }
    }
}

impl From<MeshObject> for SceneObject {
    fn from(mesh: MeshObject) -> Self {
        SceneObject::Mesh(mesh)
    }
}

impl From<Sphere> for SceneObject {
    fn from(sphere: Sphere) -> Self {
        SceneObject::Sphere(sphere)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::primitives;
    use nalgebra::Vector3;

    #[test]
    fn test_soup_transform() {
        let cube = primitives::cube(1.0);
        let transform = Matrix4::new_translation(&Vector3::new(2.0, 0.0, 0.0))
            * Matrix4::new_nonuniform_scaling(&Vector3::new(2.0, 2.0, 2.0));

        let object =
            MeshObject::from_polygon_soup(&cube.polygons, &cube.positions, &transform).unwrap();

        let (min, max) = object.mesh().bounding_box().unwrap();
        assert!((min - Point3::new(1.0, -1.0, -1.0)).norm() < 1e-12);
        assert!((max - Point3::new(3.0, 1.0, 1.0)).norm() < 1e-12);
    }

    #[test]
    fn test_bad_soup() {
        let positions = vec![
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let polygons = vec![vec![0usize, 1, 2]];
        let result = MeshObject::from_polygon_soup(&polygons, &positions, &Matrix4::identity());
        assert!(matches!(result, Err(TopologyError::UnmatchedEdge { .. })));
    }

    #[test]
    fn test_variant_dispatch() {
        let mesh = primitives::tetrahedron(1.0).build().unwrap();
        let mut objects: Vec<SceneObject> = vec![
            MeshObject::new(mesh).into(),
            Sphere {
                center: Point3::origin(),
                radius: 1.0,
            }
            .into(),
        ];

        assert!(objects[0].as_mesh().is_some());
        assert!(objects[1].as_mesh().is_none());
        assert!(objects[1].as_mesh_mut().is_none());
    }
}
