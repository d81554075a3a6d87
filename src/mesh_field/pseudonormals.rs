//! Vertex welding and angle-weighted pseudonormals for triangle soups.

use crate::float_types::Real;
use crate::mesh_field::HashMap;
use crate::mesh_field::closest_point::face_normal;
use nalgebra::{Point3, Vector3};

/// Key for exact coordinate equality. `-0.0` and `0.0` compare equal, so they
/// share a key.
#[inline]
#[allow(clippy::unnecessary_cast)]
fn vertex_key(p: &Point3<Real>) -> [u64; 3] {
    p.coords
        .map(|c| {
            let c = if c == 0.0 { 0.0 } else { c as f64 };
            c.to_bits()
        })
        .into()
}

#[inline]
const fn edge_key(i: u32, j: u32) -> (u32, u32) {
    if i < j { (i, j) } else { (j, i) }
}

/// Merge positions that are exactly equal and index triangles into the merged
/// list. Vertices keep the order of their first appearance.
pub fn weld(soup: &[Point3<Real>]) -> (Vec<Point3<Real>>, Vec<[u32; 3]>) {
    let mut lookup: HashMap<[u64; 3], u32> = HashMap::with_capacity(soup.len() / 2);
    let mut vertices = Vec::with_capacity(soup.len() / 2);

    let mut index_of = |p: &Point3<Real>| {
        *lookup.entry(vertex_key(p)).or_insert_with(|| {
            vertices.push(*p);
            (vertices.len() - 1) as u32
        })
    };

    let triangles = soup
        .chunks_exact(3)
        .map(|tri| [index_of(&tri[0]), index_of(&tri[1]), index_of(&tri[2])])
        .collect();

    (vertices, triangles)
}

/// Interior angle at `apex` between the edges towards `u` and `v`.
#[inline]
fn corner_angle(apex: &Point3<Real>, u: &Point3<Real>, v: &Point3<Real>) -> Real {
    let eu = (u - apex).try_normalize(0.0).unwrap_or_else(Vector3::zeros);
    let ev = (v - apex).try_normalize(0.0).unwrap_or_else(Vector3::zeros);
    eu.dot(&ev).clamp(-1.0, 1.0).acos()
}

/// Per-vertex and per-edge pseudonormals of an indexed mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Pseudonormals {
    /// One per vertex: the angle-weighted sum of incident face normals.
    pub vertex: Vec<Vector3<Real>>,
    /// Three per triangle, in slot order `ab`, `ac`, `bc`: the sum of the face
    /// normals of every triangle sharing that undirected edge.
    pub edge: Vec<[Vector3<Real>; 3]>,
}

/// Accumulate and normalize the pseudonormals of `triangles`.
///
/// Degenerate triangles have a zero face normal and add nothing. A vertex or
/// edge touched only by degenerate triangles ends up with a zero normal.
pub fn compute(vertices: &[Point3<Real>], triangles: &[[u32; 3]]) -> Pseudonormals {
    let mut vertex = vec![Vector3::zeros(); vertices.len()];
    let mut edge_sums: HashMap<(u32, u32), Vector3<Real>> =
        HashMap::with_capacity(triangles.len() * 3 / 2);

    for &[ia, ib, ic] in triangles {
        let corners = [
            vertices[ia as usize],
            vertices[ib as usize],
            vertices[ic as usize],
        ];
        let [a, b, c] = &corners;
        let n = face_normal(&corners);

        vertex[ia as usize] += n * corner_angle(a, b, c);
        vertex[ib as usize] += n * corner_angle(b, a, c);
        vertex[ic as usize] += n * corner_angle(c, a, b);

        for key in [edge_key(ia, ib), edge_key(ia, ic), edge_key(ib, ic)] {
            *edge_sums.entry(key).or_insert_with(Vector3::zeros) += n;
        }
    }

    let unit = |v: &Vector3<Real>| v.try_normalize(0.0).unwrap_or_else(Vector3::zeros);

    vertex.iter_mut().for_each(|n| *n = unit(n));
    let edge_normals: HashMap<(u32, u32), Vector3<Real>> =
        edge_sums.iter().map(|(key, sum)| (*key, unit(sum))).collect();

    let edge = triangles
        .iter()
        .map(|&[ia, ib, ic]| {
            [edge_key(ia, ib), edge_key(ia, ic), edge_key(ib, ic)]
                .map(|key| edge_normals.get(&key).copied().unwrap_or_else(Vector3::zeros))
        })
        .collect();

    Pseudonormals { vertex, edge }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::float_types::FRAC_PI_2;
    use approx::assert_relative_eq;

    #[test]
    fn weld_merges_exact_duplicates_only() {
        let soup = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(-0.0, 0.0, 0.0),
            Point3::new(1.0 + 1e-9, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let (vertices, triangles) = weld(&soup);
        assert_eq!(vertices.len(), 5);
        assert_eq!(triangles, vec![[0, 1, 2], [1, 3, 2], [0, 4, 2]]);
    }

    #[test]
    fn corner_angles_of_right_triangle() {
        let a = Point3::origin();
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(0.0, 1.0, 0.0);
        assert_relative_eq!(corner_angle(&a, &b, &c), FRAC_PI_2);
        assert_relative_eq!(corner_angle(&b, &a, &c), FRAC_PI_2 / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn flat_patch_normals_are_face_normal() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        let triangles = vec![[0, 1, 2], [1, 3, 2]];
        let normals = compute(&vertices, &triangles);
        for n in &normals.vertex {
            assert_relative_eq!(*n, Vector3::z());
        }
        // shared edge (1, 2) is slot bc of the first triangle and slot ac of the second
        assert_eq!(normals.edge[0][2], normals.edge[1][1]);
        assert_relative_eq!(normals.edge[0][2], Vector3::z());
    }

    #[test]
    fn degenerate_triangle_contributes_nothing() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let triangles = vec![[0, 1, 2], [0, 1, 3]];
        let normals = compute(&vertices, &triangles);
        assert_relative_eq!(normals.vertex[0], Vector3::z());
        // only touched by the collinear triangle
        assert_eq!(normals.vertex[3], Vector3::zeros());
    }
}
