//! # meshedit
//!
//! The editing core of an interactive polygon mesh editor.
//!
//! meshedit stores closed, two-manifold polygon meshes in a half-edge
//! structure and rewrites them with local and global operators that keep
//! the structure valid after every call.
//!
//! ## Features
//!
//! - **Half-edge store**: generation-checked handles, O(1) adjacency,
//!   full invariant validation
//! - **Local operators**: flip, split, collapse, erase, bevel (with
//!   interactive reposition), triangulate
//! - **Global operators**: Loop and Catmull-Clark subdivision, quadric
//!   simplification, isotropic remeshing
//! - **Scene glue**: selections, pick IDs and editor commands that keep
//!   selections pointing at live elements
//!
//! ## Quick Start
//!
//! ```
//! use meshedit::prelude::*;
//!
//! let mut mesh = primitives::cube(1.0).build().unwrap();
//! assert_eq!(mesh.num_faces(), 6);
//!
//! mesh.triangulate();
//! assert_eq!((mesh.num_vertices(), mesh.num_edges(), mesh.num_faces()), (8, 18, 12));
//!
//! let mut resampler = MeshResampler::new();
//! resampler.upsample(&mut mesh).unwrap();
//! assert_eq!(mesh.num_faces(), 48);
//! assert_eq!(mesh.euler_characteristic(), 2);
//! ```
//!
//! ## Local Editing
//!
//! Every operator returns the element it created or kept, and refuses with
//! an [`OperatorError`](error::OperatorError) instead of breaking the mesh:
//!
//! ```
//! use meshedit::prelude::*;
//!
//! let mut mesh = primitives::icosahedron(1.0).build().unwrap();
//! let e = mesh.edge_ids().next().unwrap();
//!
//! let v = mesh.split_edge(e).unwrap();
//! assert_eq!(mesh.valence(v), 4);
//!
//! let e = mesh.vertex_edges(v).next().unwrap();
//! mesh.collapse_edge(e).unwrap();
//! assert!(mesh.is_valid());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod edit;
pub mod error;
pub mod mesh;
pub mod scene;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use meshedit::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::{MeshResampler, Progress, ResampleOp};
    pub use crate::edit::{BevelKind, BevelSession};
    pub use crate::error::{MeshError, OperatorError, PrecisionError, Result, TopologyError};
    pub use crate::mesh::{
        build, primitives, EdgeId, ElementKind, ElementRef, FaceId, HalfEdgeId, HalfEdgeMesh,
        PolygonSoup, VertexId,
    };
    pub use crate::scene::{MeshObject, ObjectId, Scene, SceneObject, Selection};
}

// Re-export nalgebra types for convenience
pub use nalgebra;
