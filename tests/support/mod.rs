//! Test support library
//! Provides shape builders and comparison helpers shared by the integration tests.
#![allow(dead_code)]

use nalgebra::{Point3, Vector3};
use sdfmesh::float_types::Real;
use std::collections::HashMap;

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Axis-aligned cube of half edge `half` centered on the origin, 12 outward
/// wound triangles as a flat soup.
pub fn cube_soup(half: Real) -> Vec<Point3<Real>> {
    // corner i sits at (±h, ±h, ±h) with bit 0 = x, bit 1 = y, bit 2 = z
    let corner = |i: usize| {
        let c = |bit: usize| if i & bit != 0 { half } else { -half };
        Point3::new(c(1), c(2), c(4))
    };
    let quads: [[usize; 4]; 6] = [
        [0, 4, 6, 2], // -X
        [1, 3, 7, 5], // +X
        [0, 1, 5, 4], // -Y
        [2, 6, 7, 3], // +Y
        [0, 2, 3, 1], // -Z
        [4, 5, 7, 6], // +Z
    ];
    quads
        .iter()
        .flat_map(|&[a, b, c, d]| [a, b, c, a, c, d])
        .map(corner)
        .collect()
}

/// Sphere approximation: an octahedron subdivided `levels` times with every
/// vertex pushed out to `radius`. Outward wound, closed, `8 * 4^levels` triangles.
pub fn octasphere(levels: u32, radius: Real) -> Vec<Point3<Real>> {
    let px = Vector3::x();
    let nx = -Vector3::x();
    let py = Vector3::y();
    let ny = -Vector3::y();
    let pz = Vector3::z();
    let nz = -Vector3::z();

    let mut faces: Vec<[Vector3<Real>; 3]> = vec![
        [px, py, pz],
        [py, nx, pz],
        [nx, ny, pz],
        [ny, px, pz],
        [py, px, nz],
        [nx, py, nz],
        [ny, nx, nz],
        [px, ny, nz],
    ];

    for _ in 0..levels {
        let mid = |a: &Vector3<Real>, b: &Vector3<Real>| ((a + b) * 0.5).normalize();
        faces = faces
            .iter()
            .flat_map(|[a, b, c]| {
                let ab = mid(a, b);
                let bc = mid(b, c);
                let ca = mid(c, a);
                [[*a, ab, ca], [ab, *b, bc], [ca, bc, *c], [ab, bc, ca]]
            })
            .collect();
    }

    faces
        .iter()
        .flatten()
        .map(|v| Point3::from(v * radius))
        .collect()
}

#[allow(clippy::unnecessary_cast)]
fn bits(p: &Point3<Real>) -> [u64; 3] {
    [p.x.to_bits() as u64, p.y.to_bits() as u64, p.z.to_bits() as u64]
}

/// Triangles as exact bit patterns, sorted, so two soups can be compared as
/// multisets regardless of order.
pub fn sorted_triangles(positions: &[Point3<Real>]) -> Vec<[[u64; 3]; 3]> {
    let mut tris: Vec<[[u64; 3]; 3]> = positions
        .chunks_exact(3)
        .map(|t| [bits(&t[0]), bits(&t[1]), bits(&t[2])])
        .collect();
    tris.sort_unstable();
    tris
}

/// Directed edges whose reverse does not appear equally often; zero for a
/// closed, consistently wound soup.
pub fn unbalanced_edges(positions: &[Point3<Real>]) -> usize {
    let mut directed: HashMap<([u64; 3], [u64; 3]), i64> = HashMap::new();
    for t in positions.chunks_exact(3) {
        for i in 0..3 {
            let a = bits(&t[i]);
            let b = bits(&t[(i + 1) % 3]);
            *directed.entry((a, b)).or_default() += 1;
            *directed.entry((b, a)).or_default() -= 1;
        }
    }
    directed.values().filter(|count| **count != 0).count()
}

/// Volume enclosed by a closed soup (positive when wound outward).
pub fn signed_volume(positions: &[Point3<Real>]) -> Real {
    positions
        .chunks_exact(3)
        .map(|t| t[0].coords.dot(&t[1].coords.cross(&t[2].coords)) / 6.0)
        .sum()
}

/// Deterministic scatter of `n` points in the cube `[-extent, extent]^3`.
pub fn sample_points(n: usize, extent: Real) -> Vec<Point3<Real>> {
    (1..=n)
        .map(|i| {
            let t = i as Real;
            let u = |k: Real| ((t * k).fract() * 2.0 - 1.0) * extent;
            Point3::new(u(0.618_033_988_75), u(0.754_877_666_24), u(0.569_840_290_99))
        })
        .collect()
}
