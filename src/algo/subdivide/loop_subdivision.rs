//! Loop and linear upsampling of triangle meshes.

use log::{debug, warn};
use nalgebra::{Point3, Vector3};
use slotmap::SecondaryMap;

use crate::algo::{require_triangles, Progress};
use crate::error::Result;
use crate::mesh::{EdgeId, HalfEdgeMesh, VertexId};

use super::{SubdivideOptions, SubdivisionScheme};

/// Refine a triangle mesh, quadrupling its face count per iteration.
///
/// The mesh is only replaced once every iteration has succeeded.
///
/// # Errors
///
/// [`PrecisionError::NonTriangular`](crate::error::PrecisionError::NonTriangular)
/// if any face is not a triangle.
pub fn upsample(mesh: &mut HalfEdgeMesh, options: &SubdivideOptions) -> Result<()> {
    upsample_internal(mesh, options, None)
}

/// Upsample with progress reporting.
///
/// See [`upsample`] for details.
pub fn upsample_with_progress(
    mesh: &mut HalfEdgeMesh,
    options: &SubdivideOptions,
    progress: &Progress,
) -> Result<()> {
    upsample_internal(mesh, options, Some(progress))
}

fn upsample_internal(
    mesh: &mut HalfEdgeMesh,
    options: &SubdivideOptions,
    progress: Option<&Progress>,
) -> Result<()> {
    require_triangles(mesh)?;
    if options.iterations == 0 {
        return Ok(());
    }

    let mut work = mesh.clone();
    for iter in 0..options.iterations {
        if let Some(p) = progress {
            p.report(iter, options.iterations, "Upsampling");
        }
        upsample_once(&mut work, options.scheme)?;
    }
    if let Some(p) = progress {
        p.report(options.iterations, options.iterations, "Upsampling complete");
    }

    debug!(
        "upsampled to {} vertices, {} faces",
        work.num_vertices(),
        work.num_faces()
    );
    *mesh = work;
    Ok(())
}

/// One level: split every edge at its edge point, flip old-to-new edges,
/// then move the original vertices.
fn upsample_once(mesh: &mut HalfEdgeMesh, scheme: SubdivisionScheme) -> Result<()> {
    let vertex_points: SecondaryMap<VertexId, Point3<f64>> = mesh
        .vertex_ids()
        .map(|v| (v, vertex_point(mesh, v, scheme)))
        .collect();
    let edges: Vec<(EdgeId, Point3<f64>)> = mesh
        .edge_ids()
        .map(|e| (e, edge_point(mesh, e, scheme)))
        .collect();

    let mut inserted: SecondaryMap<VertexId, ()> = SecondaryMap::new();
    let mut cross = Vec::with_capacity(2 * edges.len());
    for (e, p) in edges {
        let parts = mesh.split_edge_parts(e, p)?;
        inserted.insert(parts.vertex, ());
        cross.extend(parts.cross);
    }

    for e in cross {
        let [a, b] = mesh.edge_vertices(e);
        if inserted.contains_key(a) != inserted.contains_key(b) {
            if let Err(err) = mesh.flip_edge(e) {
                warn!("left edge {:?} unflipped: {}", e, err);
            }
        }
    }

    for (v, p) in vertex_points {
        mesh.set_position(v, p);
    }
    Ok(())
}

/// Loop weight for a vertex of valence `n`.
pub(crate) fn loop_beta(n: usize) -> f64 {
    if n == 3 {
        3.0 / 16.0
    } else {
        3.0 / (8.0 * n as f64)
    }
}

fn vertex_point(mesh: &HalfEdgeMesh, v: VertexId, scheme: SubdivisionScheme) -> Point3<f64> {
    let p = *mesh.position(v);
    if scheme == SubdivisionScheme::Linear {
        return p;
    }

    let mut sum = Vector3::zeros();
    let mut n = 0;
    for w in mesh.vertex_neighbors(v) {
        sum += mesh.position(w).coords;
        n += 1;
    }
    if n == 0 {
        return p;
    }
    let beta = loop_beta(n);
    Point3::from(p.coords * (1.0 - n as f64 * beta) + sum * beta)
}

fn edge_point(mesh: &HalfEdgeMesh, e: EdgeId, scheme: SubdivisionScheme) -> Point3<f64> {
    if scheme == SubdivisionScheme::Linear {
        return mesh.edge_midpoint(e);
    }

    let h = mesh.edge_halfedge(e);
    let t = mesh.twin(h);
    let a = mesh.position(mesh.origin(h)).coords;
    let b = mesh.position(mesh.origin(t)).coords;
    let c = mesh.position(mesh.dest(mesh.next(h))).coords;
    let d = mesh.position(mesh.dest(mesh.next(t))).coords;
    Point3::from((a + b) * (3.0 / 8.0) + (c + d) * (1.0 / 8.0))
}
