//! Boolean operations, transforms and color overrides on [`Sdf`] values,
//! plus the operator shorthands (`|`, `-`, `&`, `+ v`, `- v`, `* s`).

use crate::color::Color;
use crate::float_types::{Real, tolerance};
use crate::sdf::Sdf;
use nalgebra::{Rotation3, Unit, Vector3};
use std::ops::{
    Add, BitAnd, BitAndAssign, BitOr, BitOrAssign, Mul, Sub, SubAssign,
};
use std::sync::Arc;

impl Sdf {
    /// `min(a, b)`
    pub fn union(&self, other: &Sdf) -> Sdf {
        Sdf::Union(Arc::new(self.clone()), Arc::new(other.clone()))
    }

    /// `max(a, -b)`
    pub fn difference(&self, other: &Sdf) -> Sdf {
        Sdf::Difference(Arc::new(self.clone()), Arc::new(other.clone()))
    }

    /// `max(a, b)`
    pub fn intersection(&self, other: &Sdf) -> Sdf {
        Sdf::Intersection(Arc::new(self.clone()), Arc::new(other.clone()))
    }

    /// Move the surface by `offset`.
    pub fn translate(&self, offset: Vector3<Real>) -> Sdf {
        Sdf::Translate {
            inner: Arc::new(self.clone()),
            offset,
        }
    }

    /// Uniformly scale about the origin: `f(p / s) * s`.
    ///
    /// `factor` must be positive; only a uniform scale keeps the result a
    /// true distance.
    pub fn scale(&self, factor: Real) -> Sdf {
        Sdf::Scale {
            inner: Arc::new(self.clone()),
            factor,
        }
    }

    /// Rotate about `axis` (through the origin) by `angle` radians.
    ///
    /// A zero-length axis leaves the field unrotated.
    pub fn rotate(&self, angle: Real, axis: Vector3<Real>) -> Sdf {
        let Some(axis) = Unit::try_new(axis, tolerance()) else {
            tracing::warn!(?axis, "degenerate rotation axis, ignoring rotation");
            return self.clone();
        };
        Sdf::Rotate {
            inner: Arc::new(self.clone()),
            rotation: Rotation3::from_axis_angle(&axis, angle),
        }
    }

    /// Replace this field's color with a constant.
    pub fn with_color(&self, color: Color) -> Sdf {
        Sdf::Colored {
            inner: Arc::new(self.clone()),
            color,
        }
    }

    /// [`Sdf::with_color`] taking a packed `0xRRGGBB` color.
    pub fn with_hex_color(&self, hex: u32) -> Sdf {
        self.with_color(Color::from_hex(hex))
    }
}

impl BitOr for Sdf {
    type Output = Sdf;

    fn bitor(self, rhs: Sdf) -> Sdf {
        Sdf::Union(Arc::new(self), Arc::new(rhs))
    }
}

impl Sub for Sdf {
    type Output = Sdf;

    fn sub(self, rhs: Sdf) -> Sdf {
        Sdf::Difference(Arc::new(self), Arc::new(rhs))
    }
}

impl BitAnd for Sdf {
    type Output = Sdf;

    fn bitand(self, rhs: Sdf) -> Sdf {
        Sdf::Intersection(Arc::new(self), Arc::new(rhs))
    }
}

impl BitOrAssign for Sdf {
    fn bitor_assign(&mut self, rhs: Sdf) {
        *self = self.union(&rhs);
    }
}

impl SubAssign for Sdf {
    fn sub_assign(&mut self, rhs: Sdf) {
        *self = self.difference(&rhs);
    }
}

impl BitAndAssign for Sdf {
    fn bitand_assign(&mut self, rhs: Sdf) {
        *self = self.intersection(&rhs);
    }
}

impl Add<Vector3<Real>> for Sdf {
    type Output = Sdf;

    fn add(self, rhs: Vector3<Real>) -> Sdf {
        self.translate(rhs)
    }
}

impl Sub<Vector3<Real>> for Sdf {
    type Output = Sdf;

    fn sub(self, rhs: Vector3<Real>) -> Sdf {
        self.translate(-rhs)
    }
}

impl Mul<Real> for Sdf {
    type Output = Sdf;

    fn mul(self, rhs: Real) -> Sdf {
        self.scale(rhs)
    }
}
