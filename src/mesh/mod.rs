//! Core mesh data structures.
//!
//! This module provides the half-edge mesh representation and related types
//! for representing closed polygon meshes.
//!
//! # Overview
//!
//! The primary type is [`HalfEdgeMesh`], which stores vertices, edges, faces
//! and half-edges in generational arenas. Adjacency queries are O(1) (or
//! O(degree) for loops around a face or vertex).
//!
//! # Handle Types
//!
//! Mesh elements are identified by generation-checked handles:
//! - [`VertexId`] - Identifies a vertex
//! - [`EdgeId`] - Identifies an undirected edge
//! - [`FaceId`] - Identifies a face
//! - [`HalfEdgeId`] - Identifies a half-edge
//!
//! [`ElementRef`] wraps any of the four and is usable as a map key.
//!
//! # Construction
//!
//! ```
//! use meshedit::mesh::{build, primitives};
//!
//! let cube = primitives::cube(1.0);
//! let mesh = build(&cube.polygons, &cube.positions).unwrap();
//! assert_eq!(mesh.num_faces(), 6);
//! ```

mod builder;
mod halfedge;
mod index;
pub mod primitives;

pub use builder::{build, PolygonSoup};
pub use halfedge::{
    Edge, Face, FaceHalfEdgeIter, HalfEdge, HalfEdgeMesh, Vertex, VertexHalfEdgeIter,
};
pub use index::{EdgeId, ElementKind, ElementRef, FaceId, HalfEdgeId, VertexId};

pub(crate) use halfedge::{centroid, newell_vector};
