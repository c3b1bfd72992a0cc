//! Mesh simplification (downsampling).
//!
//! # Quadric Error Metrics (QEM)
//!
//! Each vertex accumulates a quadric: the sum of squared distances to the
//! planes of its incident triangles (Garland & Heckbert, 1997). Edges are
//! collapsed cheapest first, the survivor placed where the combined quadric
//! is smallest. Every collapse goes through
//! [`HalfEdgeMesh::collapse_edge_to`](crate::mesh::HalfEdgeMesh::collapse_edge_to),
//! so edges whose collapse would break manifoldness are skipped.
//!
//! # Example
//!
//! ```
//! use meshedit::algo::decimate::{downsample, DecimateOptions};
//! use meshedit::algo::subdivide::{upsample, SubdivideOptions};
//! use meshedit::mesh::primitives;
//!
//! let mut mesh = primitives::icosahedron(1.0).build().unwrap();
//! upsample(&mut mesh, &SubdivideOptions::new(1)).unwrap();
//!
//! let collapsed = downsample(&mut mesh, &DecimateOptions::with_target_faces(40)).unwrap();
//! assert!(collapsed > 0);
//! assert!(mesh.num_faces() <= 40);
//! ```
//!
//! # References
//!
//! - Garland, M. & Heckbert, P. (1997). "Surface Simplification Using Quadric
//!   Error Metrics." SIGGRAPH '97.

mod qem;

pub use qem::{downsample, downsample_with_progress};

/// Options for downsampling.
#[derive(Debug, Clone)]
pub struct DecimateOptions {
    /// Target number of faces after simplification.
    /// If None, uses target_ratio instead.
    pub target_faces: Option<usize>,

    /// Fraction of faces to keep (0.0 to 1.0).
    /// Only used if target_faces is None.
    pub target_ratio: f64,

    /// Stop once the cheapest remaining collapse costs more than this.
    pub max_error: Option<f64>,
}

impl DecimateOptions {
    /// Reduce to a target number of faces.
    pub fn with_target_faces(target: usize) -> Self {
        Self {
            target_faces: Some(target),
            ..Self::default()
        }
    }

    /// Reduce to a fraction of the current face count.
    pub fn with_target_ratio(ratio: f64) -> Self {
        Self {
            target_faces: None,
            target_ratio: ratio.clamp(0.0, 1.0),
            max_error: None,
        }
    }

    /// Set the maximum error for a single collapse.
    pub fn with_max_error(mut self, max_error: f64) -> Self {
        self.max_error = Some(max_error);
        self
    }

    /// Compute the target number of faces given the current count.
    pub fn compute_target(&self, original_faces: usize) -> usize {
        if let Some(target) = self.target_faces {
            target.min(original_faces)
        } else {
            ((original_faces as f64) * self.target_ratio).round() as usize
        }
    }
}

impl Default for DecimateOptions {
    /// Keep a quarter of the faces.
    fn default() -> Self {
        Self::with_target_ratio(0.25)
    }
}
