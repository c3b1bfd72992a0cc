//! Global resampling operators.
//!
//! Each operator rewrites the whole mesh by composing the local operators
//! in [`crate::edit`]:
//!
//! - **Upsample**: Loop or linear subdivision of triangle meshes, plus
//!   Catmull-Clark / linear subdivision of polygon meshes
//! - **Downsample**: quadric-error edge collapse
//! - **Resample**: isotropic remeshing by split, collapse, flip and relax
//!
//! [`MeshResampler`] drives them with an explicit idle/running state and
//! shared options. All operators check their preconditions before touching
//! the mesh; a failure leaves it as it was.

pub mod decimate;
pub mod progress;
pub mod remesh;
pub mod resampler;
pub mod subdivide;

pub use progress::Progress;
pub use resampler::{MeshResampler, ResampleOp, ResampleReport, ResamplerState};

use log::warn;

use crate::error::PrecisionError;
use crate::mesh::HalfEdgeMesh;

/// Fail with [`PrecisionError::NonTriangular`] unless every face is a triangle.
pub(crate) fn require_triangles(mesh: &HalfEdgeMesh) -> Result<(), PrecisionError> {
    match mesh.face_ids().map(|f| mesh.face_degree(f)).find(|&d| d != 3) {
        Some(degree) => {
            warn!("mesh has a face of degree {}; triangulate it first", degree);
            Err(PrecisionError::NonTriangular { degree })
        }
        None => Ok(()),
    }
}
