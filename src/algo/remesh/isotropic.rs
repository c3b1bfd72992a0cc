//! Isotropic remeshing passes.

use log::{debug, info};
use nalgebra::{Point3, Vector3};
use slotmap::SecondaryMap;

use crate::algo::{require_triangles, Progress};
use crate::error::{MeshError, Result};
use crate::mesh::{EdgeId, HalfEdgeMesh, VertexId};

use super::RemeshOptions;

/// Valence of an interior vertex in a regular triangle mesh.
const TARGET_VALENCE: i64 = 6;

/// Remesh a triangle mesh toward uniform edge lengths.
///
/// The mesh is only replaced once every pass has run.
///
/// # Errors
///
/// - [`PrecisionError::NonTriangular`](crate::error::PrecisionError::NonTriangular)
///   if any face is not a triangle
/// - [`MeshError::InvalidParameter`] for a non-positive target length or a
///   smoothing factor outside `[0, 1]`
pub fn resample(mesh: &mut HalfEdgeMesh, options: &RemeshOptions) -> Result<()> {
    resample_internal(mesh, options, None)
}

/// Resample with progress reporting.
///
/// See [`resample`] for details.
pub fn resample_with_progress(
    mesh: &mut HalfEdgeMesh,
    options: &RemeshOptions,
    progress: &Progress,
) -> Result<()> {
    resample_internal(mesh, options, Some(progress))
}

fn resample_internal(
    mesh: &mut HalfEdgeMesh,
    options: &RemeshOptions,
    progress: Option<&Progress>,
) -> Result<()> {
    require_triangles(mesh)?;
    let target = options
        .target_length
        .unwrap_or_else(|| mesh.average_edge_length());
    if !(target > 0.0) {
        return Err(MeshError::invalid_param("target_length", target, "must be positive"));
    }
    if !(0.0..=1.0).contains(&options.smoothing_lambda) {
        return Err(MeshError::invalid_param(
            "smoothing_lambda",
            options.smoothing_lambda,
            "must be within [0, 1]",
        ));
    }
    if options.iterations == 0 {
        return Ok(());
    }

    let high = target * 4.0 / 3.0;
    let low = target * 4.0 / 5.0;
    let total_steps = options.iterations * 4;
    let mut work = mesh.clone();

    for iter in 0..options.iterations {
        let base_step = iter * 4;
        let report = |offset: usize, message: &str| {
            if let Some(p) = progress {
                p.report(base_step + offset, total_steps, message);
            }
        };

        report(0, "Splitting edges");
        let splits = split_long_edges(&mut work, high);

        report(1, "Collapsing edges");
        let collapses = collapse_short_edges(&mut work, low, high);

        report(2, "Flipping edges");
        let flips = flip_edges_for_valence(&mut work);

        report(3, "Smoothing");
        for _ in 0..options.smoothing_iterations {
            tangential_smooth(&mut work, options.smoothing_lambda);
        }

        debug!(
            "resample pass {}: {} splits, {} collapses, {} flips",
            iter, splits, collapses, flips
        );
    }
    if let Some(p) = progress {
        p.report(total_steps, total_steps, "Resampling complete");
    }

    info!(
        "resampled {} -> {} vertices (target edge length {:.4})",
        mesh.num_vertices(),
        work.num_vertices(),
        target
    );
    *mesh = work;
    Ok(())
}

/// Split every edge longer than `high` once. Returns the number of splits.
fn split_long_edges(mesh: &mut HalfEdgeMesh, high: f64) -> usize {
    let edges: Vec<EdgeId> = mesh.edge_ids().collect();
    let mut count = 0;
    for e in edges {
        if mesh.contains_edge(e) && mesh.edge_length(e) > high && mesh.split_edge(e).is_ok() {
            count += 1;
        }
    }
    count
}

/// Collapse edges shorter than `low` unless the survivor would end up more
/// than `high` from one of its neighbours.
fn collapse_short_edges(mesh: &mut HalfEdgeMesh, low: f64, high: f64) -> usize {
    let edges: Vec<EdgeId> = mesh.edge_ids().collect();
    let mut count = 0;
    for e in edges {
        if !mesh.contains_edge(e) || mesh.edge_length(e) >= low {
            continue;
        }
        let [a, b] = mesh.edge_vertices(e);
        let mid = mesh.edge_midpoint(e);
        let too_long = mesh
            .vertex_neighbors(a)
            .chain(mesh.vertex_neighbors(b))
            .filter(|&w| w != a && w != b)
            .any(|w| (mesh.position(w) - mid).norm() > high);
        if too_long {
            continue;
        }
        if mesh.collapse_edge_to(e, mid).is_ok() {
            count += 1;
        }
    }
    count
}

/// Flip edges whose flip lowers the squared valence deviation of the four
/// vertices involved. Returns the number of flips.
fn flip_edges_for_valence(mesh: &mut HalfEdgeMesh) -> usize {
    let edges: Vec<EdgeId> = mesh.edge_ids().collect();
    let mut count = 0;
    for e in edges {
        if !mesh.contains_edge(e) {
            continue;
        }
        let h = mesh.edge_halfedge(e);
        let t = mesh.twin(h);
        let a = mesh.origin(h);
        let b = mesh.origin(t);
        let c = mesh.dest(mesh.next(h));
        let d = mesh.dest(mesh.next(t));

        let deviation = |va: usize, vb: usize, vc: usize, vd: usize| -> i64 {
            [va, vb, vc, vd]
                .iter()
                .map(|&n| (n as i64 - TARGET_VALENCE).pow(2))
                .sum()
        };
        let (va, vb, vc, vd) = (
            mesh.valence(a),
            mesh.valence(b),
            mesh.valence(c),
            mesh.valence(d),
        );
        let before = deviation(va, vb, vc, vd);
        let after = deviation(va - 1, vb - 1, vc + 1, vd + 1);
        if after >= before {
            continue;
        }
        if !is_convex_quad(mesh.position(a), mesh.position(d), mesh.position(b), mesh.position(c)) {
            continue;
        }
        if mesh.flip_edge(e).is_ok() {
            count += 1;
        }
    }
    count
}

/// True if the quad `p0 p1 p2 p3` is convex (consistent corner normals).
fn is_convex_quad(p0: &Point3<f64>, p1: &Point3<f64>, p2: &Point3<f64>, p3: &Point3<f64>) -> bool {
    let v01 = p1 - p0;
    let v12 = p2 - p1;
    let v23 = p3 - p2;
    let v30 = p0 - p3;

    let n0 = v01.cross(&(-v30));
    let n1 = v12.cross(&(-v01));
    let n2 = v23.cross(&(-v12));
    let n3 = v30.cross(&(-v23));

    n0.dot(&n1) > 0.0 && n1.dot(&n2) > 0.0 && n2.dot(&n3) > 0.0
}

/// Move every vertex `lambda` of the way toward its neighbour centroid,
/// keeping only the component in the tangent plane.
fn tangential_smooth(mesh: &mut HalfEdgeMesh, lambda: f64) {
    let targets: SecondaryMap<VertexId, Point3<f64>> = mesh
        .vertex_ids()
        .map(|v| {
            let p = *mesh.position(v);
            let mut centroid = Vector3::zeros();
            let mut n = 0usize;
            for w in mesh.vertex_neighbors(v) {
                centroid += mesh.position(w).coords;
                n += 1;
            }
            if n == 0 {
                return (v, p);
            }
            let displacement = centroid / n as f64 - p.coords;
            let normal = mesh.vertex_normal(v);
            let tangent = displacement - normal * normal.dot(&displacement);
            (v, p + tangent * lambda)
        })
        .collect();

    for (v, p) in targets {
        mesh.set_position(v, p);
    }
}
