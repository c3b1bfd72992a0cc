//! Resampler front end.
//!
//! [`MeshResampler`] owns the options of every global operator and tracks
//! whether a pass is running. A pass moves it from [`ResamplerState::Idle`]
//! to [`ResamplerState::Running`] and back, whether it succeeds or fails.
//! Failed passes leave the mesh exactly as it was.

use std::fmt;

use log::info;

use crate::algo::decimate::{downsample_with_progress, DecimateOptions};
use crate::algo::remesh::{resample_with_progress, RemeshOptions};
use crate::algo::subdivide::{
    subdivide_quad_with_progress, upsample_with_progress, SubdivideOptions,
};
use crate::algo::Progress;
use crate::error::Result;
use crate::mesh::HalfEdgeMesh;

/// A global resampling operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResampleOp {
    /// Loop or linear subdivision of a triangle mesh.
    Upsample,
    /// Quadric-error simplification.
    Downsample,
    /// Isotropic remeshing.
    Resample,
    /// Catmull-Clark or linear subdivision of a polygon mesh.
    Subdivide,
}

impl fmt::Display for ResampleOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResampleOp::Upsample => "upsample",
            ResampleOp::Downsample => "downsample",
            ResampleOp::Resample => "resample",
            ResampleOp::Subdivide => "subdivide",
        };
        f.write_str(name)
    }
}

/// Whether a pass is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResamplerState {
    /// Ready for the next pass.
    #[default]
    Idle,
    /// The operator is rewriting the mesh.
    Running(ResampleOp),
}

/// Element counts before and after a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResampleReport {
    /// The operator that ran.
    pub op: ResampleOp,
    /// `(V, E, F)` before the pass.
    pub before: (usize, usize, usize),
    /// `(V, E, F)` after the pass.
    pub after: (usize, usize, usize),
}

/// Runs global operators on a mesh with shared options.
#[derive(Debug, Clone, Default)]
pub struct MeshResampler {
    state: ResamplerState,
    subdivide: SubdivideOptions,
    decimate: DecimateOptions,
    remesh: RemeshOptions,
    last: Option<ResampleReport>,
}

impl MeshResampler {
    /// A resampler with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the options used by upsample and subdivide.
    pub fn with_subdivide_options(mut self, options: SubdivideOptions) -> Self {
        self.subdivide = options;
        self
    }

    /// Set the options used by downsample.
    pub fn with_decimate_options(mut self, options: DecimateOptions) -> Self {
        self.decimate = options;
        self
    }

    /// Set the options used by resample.
    pub fn with_remesh_options(mut self, options: RemeshOptions) -> Self {
        self.remesh = options;
        self
    }

    /// Options used by upsample and subdivide.
    pub fn subdivide_options(&self) -> &SubdivideOptions {
        &self.subdivide
    }

    /// Replace the options used by upsample and subdivide.
    pub fn set_subdivide_options(&mut self, options: SubdivideOptions) {
        self.subdivide = options;
    }

    /// Current state.
    pub fn state(&self) -> ResamplerState {
        self.state
    }

    /// The report of the last successful pass.
    pub fn last_report(&self) -> Option<&ResampleReport> {
        self.last.as_ref()
    }

    /// Subdivide a triangle mesh.
    pub fn upsample(&mut self, mesh: &mut HalfEdgeMesh) -> Result<ResampleReport> {
        self.run(ResampleOp::Upsample, mesh, &Progress::none())
    }

    /// Simplify a triangle mesh.
    pub fn downsample(&mut self, mesh: &mut HalfEdgeMesh) -> Result<ResampleReport> {
        self.run(ResampleOp::Downsample, mesh, &Progress::none())
    }

    /// Remesh a triangle mesh toward uniform edge lengths.
    pub fn resample(&mut self, mesh: &mut HalfEdgeMesh) -> Result<ResampleReport> {
        self.run(ResampleOp::Resample, mesh, &Progress::none())
    }

    /// Subdivide a polygon mesh into quads.
    pub fn subdivide(&mut self, mesh: &mut HalfEdgeMesh) -> Result<ResampleReport> {
        self.run(ResampleOp::Subdivide, mesh, &Progress::none())
    }

    /// Run one operator, reporting progress.
    pub fn run(
        &mut self,
        op: ResampleOp,
        mesh: &mut HalfEdgeMesh,
        progress: &Progress,
    ) -> Result<ResampleReport> {
        let before = counts(mesh);
        self.state = ResamplerState::Running(op);

        let outcome = match op {
            ResampleOp::Upsample => upsample_with_progress(mesh, &self.subdivide, progress),
            ResampleOp::Downsample => {
                downsample_with_progress(mesh, &self.decimate, progress).map(|_| ())
            }
            ResampleOp::Resample => resample_with_progress(mesh, &self.remesh, progress),
            ResampleOp::Subdivide => subdivide_quad_with_progress(mesh, &self.subdivide, progress),
        };
        self.state = ResamplerState::Idle;
        outcome?;

        let report = ResampleReport {
            op,
            before,
            after: counts(mesh),
        };
        info!(
            "{}: {:?} -> {:?} (V, E, F)",
            op, report.before, report.after
        );
        self.last = Some(report);
        Ok(report)
    }
}

fn counts(mesh: &HalfEdgeMesh) -> (usize, usize, usize) {
    (mesh.num_vertices(), mesh.num_edges(), mesh.num_faces())
}
