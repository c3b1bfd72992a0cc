//! Error types for meshedit.
//!
//! Errors are split by the stage that raises them:
//!
//! - [`TopologyError`]: the polygon soup handed to `build` is malformed, or
//!   `validate` found a broken invariant. Fatal to that load only.
//! - [`OperatorError`]: a local operator refused to run. The mesh is left
//!   untouched and the caller decides whether to surface it.
//! - [`PrecisionError`]: a global resampling pass cannot run on the current
//!   mesh.
//!
//! [`MeshError`] wraps all three for APIs that can fail in more than one way.

use thiserror::Error;

use crate::mesh::ElementKind;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors raised while building a mesh from a polygon soup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// The soup has no polygons.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A polygon references a position that does not exist.
    #[error("polygon {polygon} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The polygon index.
        polygon: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A polygon has fewer than three corners or repeats a vertex.
    #[error("polygon {polygon} is degenerate")]
    DegenerateFace {
        /// The polygon index.
        polygon: usize,
    },

    /// The oriented edge `(v0, v1)` appears in more than one polygon.
    #[error("edge ({v0}, {v1}) is shared by more than two half-edges")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// The oriented edge `(v0, v1)` has no matching `(v1, v0)`.
    #[error("edge ({v0}, {v1}) has no twin (open boundaries are unsupported)")]
    UnmatchedEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// The faces around a vertex form more than one fan.
    #[error("vertex {vertex} is non-manifold")]
    NonManifoldVertex {
        /// The vertex index.
        vertex: usize,
    },

    /// A position is not referenced by any polygon.
    #[error("vertex {vertex} is not used by any polygon")]
    IsolatedVertex {
        /// The vertex index.
        vertex: usize,
    },

    /// Two vertices are joined by more than one edge.
    #[error("vertices {v0} and {v1} are joined by more than one edge")]
    DuplicateEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// A connectivity link of a built mesh is inconsistent.
    #[error("broken connectivity: {0}")]
    BrokenLink(String),
}

/// Errors raised by local topological operators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperatorError {
    /// The operator was given the wrong kind of element.
    #[error("{operation} cannot be applied to a {found}")]
    InvalidTarget {
        /// The operator that was invoked.
        operation: &'static str,
        /// The kind of element it received.
        found: ElementKind,
    },

    /// The local configuration does not support this operator.
    #[error("invalid operation: {0}")]
    InvalidOperator(String),

    /// Applying the operator would leave the mesh non-manifold.
    #[error("operation would violate manifoldness: {0}")]
    WouldViolateManifoldness(String),

    /// The handle refers to an element that no longer exists.
    #[error("handle refers to a destroyed element")]
    StaleHandle,
}

/// Errors raised by the global resampling operators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrecisionError {
    /// The operation needs a triangle mesh; run triangulate first.
    #[error("mesh has a face of degree {degree}; triangulate the mesh first")]
    NonTriangular {
        /// Degree of the first offending face.
        degree: usize,
    },

    /// Simplification could not remove a single edge.
    #[error("no edge could be collapsed without breaking manifoldness")]
    NoSimplification,
}

/// Any error the library can produce.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// Build-time topology error.
    #[error(transparent)]
    Topology(#[from] TopologyError),

    /// Local operator error.
    #[error(transparent)]
    Operator(#[from] OperatorError),

    /// Resampler precondition error.
    #[error(transparent)]
    Precision(#[from] PrecisionError),

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

impl OperatorError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        OperatorError::InvalidOperator(reason.into())
    }

    pub(crate) fn non_manifold(reason: impl Into<String>) -> Self {
        OperatorError::WouldViolateManifoldness(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TopologyError::UnmatchedEdge { v0: 3, v1: 7 };
        assert_eq!(
            err.to_string(),
            "edge (3, 7) has no twin (open boundaries are unsupported)"
        );

        let err = OperatorError::InvalidTarget {
            operation: "flip",
            found: ElementKind::Face,
        };
        assert_eq!(err.to_string(), "flip cannot be applied to a face");
    }

    #[test]
    fn test_conversion_into_mesh_error() {
        let err: MeshError = PrecisionError::NonTriangular { degree: 4 }.into();
        assert!(matches!(
            err,
            MeshError::Precision(PrecisionError::NonTriangular { degree: 4 })
        ));

        let err = MeshError::invalid_param("iterations", 0, "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid parameter: iterations = 0 (must be positive)"
        );
    }
}
