//! Mesh subdivision.
//!
//! # Upsample (Triangle Meshes)
//!
//! [`upsample`] refines a triangle mesh by one level per iteration. Every
//! edge is split at a precomputed edge point, then each new edge joining an
//! old and a new vertex is flipped, leaving every original triangle cut
//! into four. With [`SubdivisionScheme::Smooth`] the positions follow Loop's
//! rules:
//!
//! - **Edge point**: `3/8 * (a + b) + 1/8 * (c + d)` for edge `a-b` with
//!   opposite apexes `c` and `d`
//! - **Vertex point**: `(1 - n*β) * v + β * Σ(neighbours)`, `β = 3/16` for
//!   `n = 3`, `3/(8n)` otherwise
//!
//! [`SubdivisionScheme::Linear`] keeps original positions and uses edge
//! midpoints, refining without smoothing.
//!
//! # Polygon Subdivision
//!
//! [`subdivide_quad`] splits every face of degree `k` into `k` quads
//! joining a face point, edge points and the corner. The smooth scheme is
//! Catmull-Clark; the linear scheme uses centroids and midpoints.
//!
//! # Example
//!
//! ```
//! use meshedit::algo::subdivide::{upsample, SubdivideOptions};
//! use meshedit::mesh::primitives;
//!
//! let mut mesh = primitives::cube(1.0).build().unwrap();
//! mesh.triangulate();
//! upsample(&mut mesh, &SubdivideOptions::new(1)).unwrap();
//! assert_eq!(mesh.num_vertices(), 26);
//! assert_eq!(mesh.num_faces(), 48);
//! ```
//!
//! # References
//!
//! - Loop, C. (1987). "Smooth Subdivision Surfaces Based on Triangles."
//!   Master's thesis, University of Utah.
//! - Catmull, E. & Clark, J. (1978). "Recursively generated B-spline surfaces
//!   on arbitrary topological meshes." Computer-Aided Design, 10(6), 350-355.

mod catmull_clark;
mod loop_subdivision;

pub use catmull_clark::{subdivide_quad, subdivide_quad_with_progress};
pub use loop_subdivision::{upsample, upsample_with_progress};

/// Position rule used by a subdivision pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubdivisionScheme {
    /// Loop for triangles, Catmull-Clark for polygons.
    #[default]
    Smooth,
    /// Midpoints and centroids only; the shape is unchanged.
    Linear,
}

/// Options for subdivision.
#[derive(Debug, Clone)]
pub struct SubdivideOptions {
    /// Number of subdivision levels.
    pub iterations: usize,

    /// Position rule.
    pub scheme: SubdivisionScheme,
}

impl SubdivideOptions {
    /// Smooth subdivision with the given number of levels.
    pub fn new(iterations: usize) -> Self {
        Self {
            iterations,
            scheme: SubdivisionScheme::Smooth,
        }
    }

    /// Set the position rule.
    pub fn with_scheme(mut self, scheme: SubdivisionScheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Switch to linear subdivision.
    pub fn linear(self) -> Self {
        self.with_scheme(SubdivisionScheme::Linear)
    }
}

impl Default for SubdivideOptions {
    fn default() -> Self {
        Self::new(1)
    }
}
