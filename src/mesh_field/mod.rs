//! Signed distance to a triangle mesh.
//!
//! The soup is welded into an indexed mesh, angle-weighted pseudonormals are
//! accumulated per vertex and per edge, and a [`Bvh`] over the triangles finds
//! the nearest one. The sign comes from the pseudonormal of the feature
//! (vertex, edge or face) the nearest point lies on, which gives a correct
//! inside/outside answer for closed, consistently wound meshes.

use crate::errors::SdfError;
use crate::float_types::{Real, tolerance};
use crate::float_types::parry3d::bounding_volume::Aabb;
use crate::tracing_ext::OperationTimer;
use nalgebra::{Point3, Vector3};

pub mod bvh;
pub mod closest_point;
pub mod pseudonormals;

pub use bvh::{Bvh, PointQueryIndex};
pub use closest_point::{Feature, FeatureNormals};

#[cfg(feature = "hashmap")]
pub(crate) use hashbrown::HashMap;
#[cfg(not(feature = "hashmap"))]
pub(crate) use std::collections::HashMap;

/// Result of a nearest-point query against a [`MeshField`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestPoint {
    /// Nearest point on the surface.
    pub point: Point3<Real>,
    /// Signed distance from the query point to `point`.
    pub distance: Real,
    /// Index of the triangle `point` lies on.
    pub triangle: usize,
    /// Which part of that triangle `point` lies on.
    pub feature: Feature,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    triangle: usize,
    point: Point3<Real>,
    feature: Feature,
    normal: Vector3<Real>,
    distance: Real,
}

/// A triangle mesh prepared for signed distance queries.
///
/// Immutable once built; share it between fields (and threads) through an
/// `Arc`, see [`Sdf::shared_mesh`](crate::sdf::Sdf::shared_mesh).
#[derive(Debug, Clone)]
pub struct MeshField {
    vertices: Vec<Point3<Real>>,
    triangles: Vec<[u32; 3]>,
    vertex_normals: Vec<Vector3<Real>>,
    edge_normals: Vec<[Vector3<Real>; 3]>,
    index: Bvh,
}

impl MeshField {
    /// Build from a flat triangle soup, three positions per triangle.
    ///
    /// Exactly equal positions are welded so adjacent triangles share vertex
    /// and edge pseudonormals. Degenerate triangles are kept; they never win a
    /// sign decision over a proper triangle at the same distance.
    pub fn from_soup(positions: &[Point3<Real>]) -> Result<MeshField, SdfError> {
        if positions.len() % 3 != 0 {
            return Err(SdfError::IncompleteTriangle {
                positions: positions.len(),
            });
        }
        if positions.is_empty() {
            return Err(SdfError::EmptyMesh);
        }

        let _timer = OperationTimer::with_mesh("mesh_field_build", positions.len() / 3, positions.len());

        let (vertices, triangles) = pseudonormals::weld(positions);
        let normals = pseudonormals::compute(&vertices, &triangles);
        let index = Bvh::from_triangles(&vertices, &triangles);

        tracing::debug!(
            triangles = triangles.len(),
            soup_vertices = positions.len(),
            vertices = vertices.len(),
            weld_ratio = format!("{:.2}", positions.len() as f64 / vertices.len() as f64),
            "built mesh distance field"
        );

        Ok(MeshField {
            vertices,
            triangles,
            vertex_normals: normals.vertex,
            edge_normals: normals.edge,
            index,
        })
    }

    /// Load an STL file (binary or ASCII) and build its distance field.
    #[cfg(feature = "stl-io")]
    pub fn from_stl_file<P: AsRef<std::path::Path>>(path: P) -> Result<MeshField, SdfError> {
        let soup = crate::io::stl::read_stl_file(path)?;
        MeshField::from_soup(&soup.positions)
    }

    /// Welded vertex positions.
    pub fn vertices(&self) -> &[Point3<Real>] {
        &self.vertices
    }

    /// Triangles as indices into [`MeshField::vertices`], in input order.
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// Unit pseudonormal per vertex (zero if only degenerate triangles touch it).
    pub fn vertex_normals(&self) -> &[Vector3<Real>] {
        &self.vertex_normals
    }

    /// Unit pseudonormals per triangle edge, slot order `ab`, `ac`, `bc`.
    ///
    /// Every slot naming the same undirected edge holds the same value.
    pub fn edge_normals(&self) -> &[[Vector3<Real>; 3]] {
        &self.edge_normals
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Axis-aligned bounds of all vertices.
    pub fn bounding_box(&self) -> Aabb {
        let mut aabb = Aabb::new_invalid();
        for v in &self.vertices {
            aabb.take_point(*v);
        }
        aabb
    }

    #[inline]
    fn corners(&self, triangle: usize) -> [Point3<Real>; 3] {
        self.triangles[triangle].map(|i| self.vertices[i as usize])
    }

    #[inline]
    fn feature_normals(&self, triangle: usize) -> FeatureNormals {
        FeatureNormals {
            vertex: self.triangles[triangle].map(|i| self.vertex_normals[i as usize]),
            edge: self.edge_normals[triangle],
        }
    }

    /// Nearest point on the mesh to `q` with its signed distance.
    ///
    /// A candidate whose feature has a zero pseudonormal (one touched only by
    /// degenerate triangles) cannot be signed. It is kept aside and only
    /// used when no signable candidate lies within [`tolerance`] of it.
    ///
    /// `None` only when the search cannot rank any triangle, e.g. for a query
    /// point with a NaN coordinate.
    pub fn closest_point(&self, q: &Point3<Real>) -> Option<ClosestPoint> {
        let mut radius = Real::INFINITY;
        let mut best: Option<Candidate> = None;
        let mut unsigned: Option<Candidate> = None;

        self.index.query(q, &mut radius, &mut |triangle, radius| {
            let corners = self.corners(triangle);
            let (point, feature) = closest_point::project_onto_triangle(q, &corners);
            let d = (q - point).norm();
            if d.is_nan() || d > *radius {
                return false;
            }
            let normal = self.feature_normals(triangle).select(feature, &corners);
            let candidate = Candidate {
                triangle,
                point,
                feature,
                normal,
                distance: d,
            };
            if normal == Vector3::zeros() {
                // never shrinks the radius, so signable ties are still offered
                if unsigned.as_ref().is_none_or(|u| d < u.distance) {
                    unsigned = Some(candidate);
                }
                false
            } else if d < *radius {
                *radius = d;
                best = Some(candidate);
                true
            } else {
                false
            }
        });

        let hit = match (best, unsigned) {
            (Some(best), Some(unsigned)) if unsigned.distance + tolerance() < best.distance => unsigned,
            (Some(best), _) => best,
            (None, unsigned) => unsigned?,
        };

        let offset = q - hit.point;
        let magnitude = offset.norm();
        let distance = if offset.dot(&hit.normal) <= 0.0 {
            -magnitude
        } else {
            magnitude
        };

        Some(ClosestPoint {
            point: hit.point,
            distance,
            triangle: hit.triangle,
            feature: hit.feature,
        })
    }

    /// Signed distance from `q` to the mesh: negative inside.
    ///
    /// # Panics
    /// If no nearest triangle can be found for `q` (see
    /// [`MeshField::closest_point`]). A field that cannot be signed at a
    /// sample point would corrupt any surface extracted from it.
    pub fn distance(&self, q: &Point3<Real>) -> Real {
        match self.closest_point(q) {
            Some(hit) => hit.distance,
            None => panic!(
                "nearest-point query at {q} found no triangle among {}",
                self.triangles.len()
            ),
        }
    }
}
