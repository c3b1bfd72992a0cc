//! Mesh construction utilities.
//!
//! This module builds half-edge meshes from polygon soups (a list of vertex
//! positions plus a list of polygons, each an ordered list of indices into the
//! positions) and converts meshes back into that form.

use std::collections::HashMap;

use nalgebra::Point3;
use slotmap::SecondaryMap;

use super::halfedge::HalfEdgeMesh;
use super::index::{HalfEdgeId, VertexId};
use crate::error::TopologyError;

/// An indexed polygon soup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonSoup {
    /// Polygons as counter-clockwise index loops.
    pub polygons: Vec<Vec<usize>>,
    /// Vertex positions.
    pub positions: Vec<Point3<f64>>,
}

impl PolygonSoup {
    /// Create a soup from polygons and positions.
    pub fn new(polygons: Vec<Vec<usize>>, positions: Vec<Point3<f64>>) -> Self {
        Self {
            polygons,
            positions,
        }
    }

    /// Build a half-edge mesh from this soup. See [`build`].
    pub fn build(&self) -> Result<HalfEdgeMesh, TopologyError> {
        build(&self.polygons, &self.positions)
    }
}

/// Build a half-edge mesh from polygons and vertex positions.
///
/// Every oriented polygon edge `(a, b)` must be matched by exactly one
/// `(b, a)` elsewhere in the soup. Vertices, faces and edges are created in
/// input order, so iteration over a freshly built mesh follows the soup.
///
/// # Errors
///
/// - [`TopologyError::EmptyMesh`] for an empty polygon list
/// - [`TopologyError::InvalidVertexIndex`] / [`TopologyError::DegenerateFace`]
///   for malformed polygons
/// - [`TopologyError::NonManifoldEdge`] when an oriented edge repeats
/// - [`TopologyError::UnmatchedEdge`] when an edge has no twin
/// - [`TopologyError::NonManifoldVertex`] when a vertex has several fans
/// - [`TopologyError::IsolatedVertex`] for unused positions
///
/// # Example
/// ```
/// use meshedit::mesh::build;
/// use nalgebra::Point3;
///
/// let positions = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(0.0, 0.0, 1.0),
/// ];
/// let polygons = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
///
/// let mesh = build(&polygons, &positions).unwrap();
/// assert_eq!(mesh.num_vertices(), 4);
/// assert_eq!(mesh.num_edges(), 6);
/// assert_eq!(mesh.num_faces(), 4);
/// ```
pub fn build<P: AsRef<[usize]>>(
    polygons: &[P],
    positions: &[Point3<f64>],
) -> Result<HalfEdgeMesh, TopologyError> {
    if polygons.is_empty() {
        return Err(TopologyError::EmptyMesh);
    }

    let mut used = vec![false; positions.len()];
    let mut corner_count = 0;
    for (pi, polygon) in polygons.iter().enumerate() {
        let polygon = polygon.as_ref();
        if polygon.len() < 3 {
            return Err(TopologyError::DegenerateFace { polygon: pi });
        }
        for (i, &vi) in polygon.iter().enumerate() {
            if vi >= positions.len() {
                return Err(TopologyError::InvalidVertexIndex {
                    polygon: pi,
                    vertex: vi,
                });
            }
            if polygon[..i].contains(&vi) {
                return Err(TopologyError::DegenerateFace { polygon: pi });
            }
            used[vi] = true;
        }
        corner_count += polygon.len();
    }
    if let Some(vertex) = used.iter().position(|&u| !u) {
        return Err(TopologyError::IsolatedVertex { vertex });
    }

    let mut mesh = HalfEdgeMesh::with_capacity(positions.len(), polygons.len(), corner_count);

    let vertex_ids: Vec<VertexId> = positions.iter().map(|&p| mesh.add_vertex(p)).collect();

    // Directed edge (a, b) -> half-edge, plus the half-edges in build order.
    let mut edge_map: HashMap<(usize, usize), HalfEdgeId> = HashMap::with_capacity(corner_count);
    let mut ordered: Vec<((usize, usize), HalfEdgeId)> = Vec::with_capacity(corner_count);

    // First pass: faces and their half-edge loops
    for polygon in polygons {
        let polygon = polygon.as_ref();
        let n = polygon.len();
        let face = mesh.add_face();
        let loop_ids: Vec<HalfEdgeId> = (0..n).map(|_| mesh.add_halfedge()).collect();

        for i in 0..n {
            let a = polygon[i];
            let b = polygon[(i + 1) % n];
            let he = loop_ids[i];
            mesh.link(he, vertex_ids[a], loop_ids[(i + 1) % n], face);

            if edge_map.insert((a, b), he).is_some() {
                return Err(TopologyError::NonManifoldEdge { v0: a, v1: b });
            }
            ordered.push(((a, b), he));

            let vertex = &mut mesh.vertices[vertex_ids[a]];
            if !mesh.halfedges.contains_key(vertex.halfedge) {
                vertex.halfedge = he;
            }
        }
        mesh.faces[face].halfedge = loop_ids[0];
    }

    // Second pass: pair twins and create edges in build order
    for &((a, b), he) in &ordered {
        if mesh.contains_edge(mesh.edge_of(he)) {
            continue;
        }
        let twin = *edge_map
            .get(&(b, a))
            .ok_or(TopologyError::UnmatchedEdge { v0: a, v1: b })?;
        let edge = mesh.add_edge();
        mesh.edges[edge].halfedge = he;
        for (h, t) in [(he, twin), (twin, he)] {
            let record = &mut mesh.halfedges[h];
            record.twin = t;
            record.edge = edge;
        }
    }

    // Third pass: each vertex must have exactly one fan
    let mut outgoing = vec![0usize; positions.len()];
    for &((a, _), _) in &ordered {
        outgoing[a] += 1;
    }
    for (i, &v) in vertex_ids.iter().enumerate() {
        if mesh.valence(v) != outgoing[i] {
            return Err(TopologyError::NonManifoldVertex { vertex: i });
        }
    }

    Ok(mesh)
}

impl HalfEdgeMesh {
    /// Convert the mesh back into an indexed polygon soup.
    ///
    /// Vertices are numbered in iteration order; each polygon starts at its
    /// face's stored half-edge.
    pub fn to_polygon_soup(&self) -> PolygonSoup {
        let mut index: SecondaryMap<VertexId, usize> = SecondaryMap::new();
        let mut positions = Vec::with_capacity(self.num_vertices());
        for (v, vertex) in self.vertices() {
            index.insert(v, positions.len());
            positions.push(vertex.position);
        }

        let polygons = self
            .face_ids()
            .map(|f| self.face_vertices(f).map(|v| index[v]).collect())
            .collect();

        PolygonSoup {
            polygons,
            positions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tetrahedron_positions() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ]
    }

    #[test]
    fn test_build_tetrahedron() {
        let polygons = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        let mesh = build(&polygons, &tetrahedron_positions()).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_edges(), 6);
        assert_eq!(mesh.num_faces(), 4);
        assert_eq!(mesh.num_halfedges(), 12);
        assert!(mesh.validate().is_ok());
        for v in mesh.vertex_ids() {
            assert_eq!(mesh.valence(v), 3);
        }
    }

    #[test]
    fn test_build_order_is_stable() {
        let positions = tetrahedron_positions();
        let polygons = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        let mesh = build(&polygons, &positions).unwrap();

        let built: Vec<Point3<f64>> = mesh.vertex_ids().map(|v| *mesh.position(v)).collect();
        assert_eq!(built, positions);

        let soup = mesh.to_polygon_soup();
        assert_eq!(soup.positions, positions);
        let expected: Vec<Vec<usize>> = polygons.iter().map(|p| p.to_vec()).collect();
        assert_eq!(soup.polygons, expected);
    }

    #[test]
    fn test_build_mixed_degrees() {
        // Square pyramid: one quad and four triangles.
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let polygons: Vec<Vec<usize>> = vec![
            vec![0, 3, 2, 1],
            vec![0, 1, 4],
            vec![1, 2, 4],
            vec![2, 3, 4],
            vec![3, 0, 4],
        ];
        let mesh = build(&polygons, &positions).unwrap();
        assert_eq!(mesh.num_edges(), 8);
        assert_eq!(mesh.euler_characteristic(), 2);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_empty_soup() {
        let polygons: Vec<[usize; 3]> = Vec::new();
        assert_eq!(build(&polygons, &[]).unwrap_err(), TopologyError::EmptyMesh);
    }

    #[test]
    fn test_invalid_index() {
        let polygons = vec![[0, 1, 7]];
        assert_eq!(
            build(&polygons, &tetrahedron_positions()).unwrap_err(),
            TopologyError::InvalidVertexIndex {
                polygon: 0,
                vertex: 7
            }
        );
    }

    #[test]
    fn test_degenerate_polygon() {
        let polygons = vec![[0, 1, 1]];
        assert_eq!(
            build(&polygons, &tetrahedron_positions()).unwrap_err(),
            TopologyError::DegenerateFace { polygon: 0 }
        );

        let polygons: Vec<Vec<usize>> = vec![vec![0, 1]];
        assert_eq!(
            build(&polygons, &tetrahedron_positions()).unwrap_err(),
            TopologyError::DegenerateFace { polygon: 0 }
        );
    }

    #[test]
    fn test_open_surface_is_rejected() {
        let polygons = vec![[0, 1, 2], [0, 2, 3]];
        let err = build(&polygons, &tetrahedron_positions()).unwrap_err();
        assert!(matches!(err, TopologyError::UnmatchedEdge { .. }));
    }

    #[test]
    fn test_repeated_oriented_edge() {
        let polygons = vec![[0, 1, 2], [0, 1, 3]];
        assert_eq!(
            build(&polygons, &tetrahedron_positions()).unwrap_err(),
            TopologyError::NonManifoldEdge { v0: 0, v1: 1 }
        );
    }

    #[test]
    fn test_unused_position() {
        let mut positions = tetrahedron_positions();
        positions.push(Point3::new(9.0, 9.0, 9.0));
        let polygons = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        assert_eq!(
            build(&polygons, &positions).unwrap_err(),
            TopologyError::IsolatedVertex { vertex: 4 }
        );
    }

    #[test]
    fn test_bowtie_vertex() {
        // Two tetrahedra sharing a single apex.
        let mut positions = tetrahedron_positions();
        positions.extend([
            Point3::new(0.0, 0.0, 2.0),
            Point3::new(1.0, 0.0, 2.0),
            Point3::new(0.5, 1.0, 2.0),
        ]);
        let polygons = vec![
            [0, 2, 1],
            [0, 1, 3],
            [1, 2, 3],
            [2, 0, 3],
            [4, 5, 6],
            [4, 3, 5],
            [5, 3, 6],
            [6, 3, 4],
        ];
        assert_eq!(
            build(&polygons, &positions).unwrap_err(),
            TopologyError::NonManifoldVertex { vertex: 3 }
        );
    }
}
