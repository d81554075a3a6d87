//! Exact closest point on a triangle by Voronoi region classification.
//!
//! The seven regions (three vertices, three edges, the face) are tested in a
//! fixed order and the first match wins. Which feature wins matters as much as
//! the point itself: the sign of a mesh distance comes from the pseudonormal
//! of that feature.

use crate::float_types::Real;
use nalgebra::{Point3, Vector3};

/// The part of a triangle `(a, b, c)` a query point is closest to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    VertexA,
    VertexB,
    VertexC,
    EdgeAB,
    EdgeAC,
    EdgeBC,
    Face,
}

/// Pseudonormals attached to the features of one triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureNormals {
    /// At `a`, `b`, `c`.
    pub vertex: [Vector3<Real>; 3],
    /// Along `ab`, `ac`, `bc`.
    pub edge: [Vector3<Real>; 3],
}

impl FeatureNormals {
    /// Normal that signs a point closest to `feature` of the triangle `corners`.
    ///
    /// Vertex and edge regions answer with their pseudonormal; the face region
    /// answers with the triangle's own normal.
    #[inline]
    pub fn select(&self, feature: Feature, corners: &[Point3<Real>; 3]) -> Vector3<Real> {
        match feature {
            Feature::VertexA => self.vertex[0],
            Feature::VertexB => self.vertex[1],
            Feature::VertexC => self.vertex[2],
            Feature::EdgeAB => self.edge[0],
            Feature::EdgeAC => self.edge[1],
            Feature::EdgeBC => self.edge[2],
            Feature::Face => face_normal(corners),
        }
    }
}

/// Unit normal of `(a, b, c)` following its winding; zero when degenerate.
#[inline]
pub fn face_normal(corners: &[Point3<Real>; 3]) -> Vector3<Real> {
    let [a, b, c] = corners;
    (b - a)
        .cross(&(c - a))
        .try_normalize(0.0)
        .unwrap_or_else(Vector3::zeros)
}

/// Closest point to `q` on the triangle `corners` and the feature it lies on.
pub fn project_onto_triangle(q: &Point3<Real>, corners: &[Point3<Real>; 3]) -> (Point3<Real>, Feature) {
    let [a, b, c] = *corners;
    let ab = b - a;
    let ac = c - a;

    let ap = q - a;
    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return (a, Feature::VertexA);
    }

    let bp = q - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return (b, Feature::VertexB);
    }

    let cp = q - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return (c, Feature::VertexC);
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return (a + ab * v, Feature::EdgeAB);
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return (a + ac * w, Feature::EdgeAC);
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return (b + (c - b) * w, Feature::EdgeBC);
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    (a + ab * v + ac * w, Feature::Face)
}

/// Closest point to `q` on the triangle and the normal used to sign it.
pub fn closest_point_on_triangle(
    q: &Point3<Real>,
    corners: &[Point3<Real>; 3],
    normals: &FeatureNormals,
) -> (Point3<Real>, Vector3<Real>) {
    let (point, feature) = project_onto_triangle(q, corners);
    (point, normals.select(feature, corners))
}
