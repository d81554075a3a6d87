//! Primitive signed distance fields

use crate::float_types::{Real, tolerance};
use crate::mesh_field::MeshField;
use crate::sdf::{DistanceFn, Sdf};
use nalgebra::{Point3, Unit, Vector3};
use std::sync::Arc;

impl Sdf {
    /// Sphere of `radius` around `center`.
    pub const fn sphere(radius: Real, center: Point3<Real>) -> Sdf {
        Sdf::Sphere { radius, center }
    }

    /// Infinite cylinder of `radius` whose axis is the Z axis.
    ///
    /// Rotate it to align with any other axis.
    pub const fn cylinder(radius: Real) -> Sdf {
        Sdf::Cylinder { radius }
    }

    /// Half-space bounded by the plane through `point` with `normal`.
    ///
    /// The solid is the side the normal points to: `d = (point - p) · n̂`.
    /// The normal is normalized so the field stays a true distance; a zero
    /// normal falls back to +Z.
    pub fn plane(normal: Vector3<Real>, point: Point3<Real>) -> Sdf {
        let normal = Unit::try_new(normal, tolerance()).unwrap_or_else(|| {
            tracing::warn!(?normal, "degenerate plane normal, using +Z");
            Vector3::z_axis()
        });
        Sdf::Plane { normal, point }
    }

    /// Axis-aligned box centered on the origin.
    ///
    /// Zero exactly on the faces, negative inside.
    pub const fn cuboid(half_extents: Vector3<Real>) -> Sdf {
        Sdf::Cuboid { half_extents }
    }

    /// Wrap an arbitrary distance function.
    ///
    /// Extraction skips empty space assuming the function changes by at most
    /// one unit per unit of distance; a steeper function needs
    /// `skip_empty_cells` turned off.
    ///
    /// ```rust
    /// # use sdfmesh::{Sdf, float_types::Real};
    /// # use nalgebra::Point3;
    /// let slab = Sdf::from_fn(|p: &Point3<Real>| p.z.abs() - 1.0);
    /// assert_eq!(slab.distance(&Point3::new(7.0, 7.0, 0.0)), -1.0);
    /// ```
    pub fn from_fn<F>(f: F) -> Sdf
    where
        F: Fn(&Point3<Real>) -> Real + Send + Sync + 'static,
    {
        Sdf::Func(DistanceFn(Arc::new(f)))
    }

    /// Distance field of a triangle mesh.
    pub fn mesh(field: MeshField) -> Sdf {
        Sdf::Mesh(Arc::new(field))
    }

    /// Distance field of a mesh that is already shared with other fields.
    pub const fn shared_mesh(field: Arc<MeshField>) -> Sdf {
        Sdf::Mesh(field)
    }
}
