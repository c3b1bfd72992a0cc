//! Closed primitive solids as polygon soups.
//!
//! All solids are centred on the origin with outward-facing,
//! counter-clockwise polygons, ready to pass to [`build`](super::build).

use nalgebra::Point3;

use super::builder::PolygonSoup;

/// Axis-aligned cube with the given edge length: 8 vertices, 6 quads.
pub fn cube(size: f64) -> PolygonSoup {
    let h = 0.5 * size;
    let positions = vec![
        Point3::new(-h, -h, -h),
        Point3::new(h, -h, -h),
        Point3::new(h, h, -h),
        Point3::new(-h, h, -h),
        Point3::new(-h, -h, h),
        Point3::new(h, -h, h),
        Point3::new(h, h, h),
        Point3::new(-h, h, h),
    ];
    let polygons = vec![
        vec![0, 3, 2, 1], // -z
        vec![4, 5, 6, 7], // +z
        vec![0, 1, 5, 4], // -y
        vec![2, 3, 7, 6], // +y
        vec![0, 4, 7, 3], // -x
        vec![1, 2, 6, 5], // +x
    ];
    PolygonSoup::new(polygons, positions)
}

/// Regular tetrahedron inscribed in a sphere of the given radius.
pub fn tetrahedron(radius: f64) -> PolygonSoup {
    let s = radius / 3f64.sqrt();
    let positions = vec![
        Point3::new(s, s, s),
        Point3::new(s, -s, -s),
        Point3::new(-s, s, -s),
        Point3::new(-s, -s, s),
    ];
    let polygons = vec![vec![0, 1, 2], vec![0, 3, 1], vec![0, 2, 3], vec![1, 3, 2]];
    PolygonSoup::new(polygons, positions)
}

/// Regular octahedron with vertices on the coordinate axes.
pub fn octahedron(radius: f64) -> PolygonSoup {
    let r = radius;
    let positions = vec![
        Point3::new(r, 0.0, 0.0),
        Point3::new(-r, 0.0, 0.0),
        Point3::new(0.0, r, 0.0),
        Point3::new(0.0, -r, 0.0),
        Point3::new(0.0, 0.0, r),
        Point3::new(0.0, 0.0, -r),
    ];
    let polygons = vec![
        vec![0, 2, 4],
        vec![2, 1, 4],
        vec![1, 3, 4],
        vec![3, 0, 4],
        vec![2, 0, 5],
        vec![1, 2, 5],
        vec![3, 1, 5],
        vec![0, 3, 5],
    ];
    PolygonSoup::new(polygons, positions)
}

/// Regular icosahedron inscribed in a sphere of the given radius.
pub fn icosahedron(radius: f64) -> PolygonSoup {
    let t = (1.0 + 5f64.sqrt()) / 2.0;
    let raw = [
        [-1.0, t, 0.0],
        [1.0, t, 0.0],
        [-1.0, -t, 0.0],
        [1.0, -t, 0.0],
        [0.0, -1.0, t],
        [0.0, 1.0, t],
        [0.0, -1.0, -t],
        [0.0, 1.0, -t],
        [t, 0.0, -1.0],
        [t, 0.0, 1.0],
        [-t, 0.0, -1.0],
        [-t, 0.0, 1.0],
    ];
    let scale = radius / (1.0 + t * t).sqrt();
    let positions = raw
        .iter()
        .map(|c| Point3::new(c[0] * scale, c[1] * scale, c[2] * scale))
        .collect();
    let polygons = [
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ]
    .iter()
    .map(|p| p.to_vec())
    .collect();
    PolygonSoup::new(polygons, positions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_counts() {
        let cases = [
            (cube(1.0), 8, 12, 6),
            (tetrahedron(1.0), 4, 6, 4),
            (octahedron(1.0), 6, 12, 8),
            (icosahedron(1.0), 12, 30, 20),
        ];
        for (soup, v, e, f) in cases {
            let mesh = soup.build().unwrap();
            assert_eq!(mesh.num_vertices(), v);
            assert_eq!(mesh.num_edges(), e);
            assert_eq!(mesh.num_faces(), f);
            assert!(mesh.validate().is_ok());
        }
    }

    #[test]
    fn test_primitives_face_outward() {
        for soup in [cube(2.0), tetrahedron(1.0), octahedron(1.0), icosahedron(1.0)] {
            let mesh = soup.build().unwrap();
            for f in mesh.face_ids() {
                let c = mesh.face_centroid(f);
                assert!(mesh.face_normal(f).dot(&c.coords) > 0.0);
            }
        }
    }

    #[test]
    fn test_icosahedron_radius() {
        let mesh = icosahedron(2.0).build().unwrap();
        for v in mesh.vertex_ids() {
            assert!((mesh.position(v).coords.norm() - 2.0).abs() < 1e-12);
        }
    }
}
