//! Signed distance fields as composable values.
//!
//! An [`Sdf`] maps a point to its signed distance from a surface (negative
//! inside, positive outside) and optionally to a color. Values are immutable;
//! every combinator builds a new value that shares its operands through `Arc`,
//! so cloning is cheap and a single [`MeshField`] (with its spatial index) can
//! sit under any number of transforms.

use crate::color::Color;
use crate::float_types::Real;
use crate::mesh_field::MeshField;
use nalgebra::{Point3, Rotation3, Unit, Vector3};
use std::fmt::Debug;
use std::sync::Arc;

pub mod ops;
pub mod shapes;

/// An arbitrary distance function wrapped so it can live inside an [`Sdf`].
#[derive(Clone)]
pub struct DistanceFn(pub Arc<dyn Fn(&Point3<Real>) -> Real + Send + Sync>);

impl Debug for DistanceFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DistanceFn(..)")
    }
}

/// A signed distance field.
#[derive(Clone, Debug)]
pub enum Sdf {
    Sphere {
        radius: Real,
        center: Point3<Real>,
    },
    /// Infinite cylinder around the Z axis.
    Cylinder {
        radius: Real,
    },
    /// Half-space; the solid lies on the side `normal` points to.
    Plane {
        normal: Unit<Vector3<Real>>,
        point: Point3<Real>,
    },
    /// Axis-aligned box centered on the origin.
    Cuboid {
        half_extents: Vector3<Real>,
    },
    Union(Arc<Sdf>, Arc<Sdf>),
    Difference(Arc<Sdf>, Arc<Sdf>),
    Intersection(Arc<Sdf>, Arc<Sdf>),
    Translate {
        inner: Arc<Sdf>,
        offset: Vector3<Real>,
    },
    /// Uniform scale.
    Scale {
        inner: Arc<Sdf>,
        factor: Real,
    },
    Rotate {
        inner: Arc<Sdf>,
        rotation: Rotation3<Real>,
    },
    /// Constant color override; distance passes through untouched.
    Colored {
        inner: Arc<Sdf>,
        color: Color,
    },
    Mesh(Arc<MeshField>),
    Func(DistanceFn),
}

impl Sdf {
    /// Signed distance from `p` to the surface.
    ///
    /// # Panics
    /// Evaluating a [`Sdf::Mesh`] panics if the nearest-point search finds no
    /// triangle (see [`MeshField::distance`]).
    pub fn distance(&self, p: &Point3<Real>) -> Real {
        match self {
            Sdf::Sphere { radius, center } => (p - center).norm() - radius,
            Sdf::Cylinder { radius } => p.xy().coords.norm() - radius,
            Sdf::Plane { normal, point } => (point - p).dot(normal.as_ref()),
            Sdf::Cuboid { half_extents } => {
                let q = p.coords.abs() - half_extents;
                let outside = q.sup(&Vector3::zeros()).norm();
                let inside = q.max().min(0.0);
                outside + inside
            },
            Sdf::Union(a, b) => a.distance(p).min(b.distance(p)),
            Sdf::Difference(a, b) => a.distance(p).max(-b.distance(p)),
            Sdf::Intersection(a, b) => a.distance(p).max(b.distance(p)),
            Sdf::Translate { inner, offset } => inner.distance(&(p - offset)),
            Sdf::Scale { inner, factor } => inner.distance(&(p / *factor)) * factor,
            Sdf::Rotate { inner, rotation } => {
                inner.distance(&rotation.inverse_transform_point(p))
            },
            Sdf::Colored { inner, .. } => inner.distance(p),
            Sdf::Mesh(field) => field.distance(p),
            Sdf::Func(f) => (f.0)(p),
        }
    }

    /// Color of the surface nearest `p`, or `None` where no color was assigned.
    ///
    /// Boolean nodes pick the operand that decides the distance at `p`; ties go
    /// to the second operand. Transforms look the color up at the same
    /// inverse-transformed point as the distance.
    pub fn color(&self, p: &Point3<Real>) -> Option<Color> {
        match self {
            Sdf::Colored { color, .. } => Some(*color),
            Sdf::Union(a, b) => {
                if a.distance(p) < b.distance(p) {
                    a.color(p)
                } else {
                    b.color(p)
                }
            },
            Sdf::Difference(a, b) => {
                if a.distance(p) > -b.distance(p) {
                    a.color(p)
                } else {
                    b.color(p)
                }
            },
            Sdf::Intersection(a, b) => {
                if a.distance(p) > b.distance(p) {
                    a.color(p)
                } else {
                    b.color(p)
                }
            },
            Sdf::Translate { inner, offset } => inner.color(&(p - offset)),
            Sdf::Scale { inner, factor } => inner.color(&(p / *factor)),
            Sdf::Rotate { inner, rotation } => {
                inner.color(&rotation.inverse_transform_point(p))
            },
            Sdf::Sphere { .. }
            | Sdf::Cylinder { .. }
            | Sdf::Plane { .. }
            | Sdf::Cuboid { .. }
            | Sdf::Mesh(_)
            | Sdf::Func(_) => None,
        }
    }

    /// Central-difference gradient of the distance at `p` with step `eps`.
    ///
    /// For a true signed distance field this has unit length away from the
    /// medial axis.
    pub fn gradient(&self, p: &Point3<Real>, eps: Real) -> Vector3<Real> {
        let axis = |v: Vector3<Real>| {
            (self.distance(&(p + v * eps)) - self.distance(&(p - v * eps))) / (2.0 * eps)
        };
        Vector3::new(axis(Vector3::x()), axis(Vector3::y()), axis(Vector3::z()))
    }
}
