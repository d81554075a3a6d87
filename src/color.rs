//! RGB colors carried by signed distance fields and written into STL attributes.

use crate::float_types::Real;

/// An RGB color with channels nominally in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: Real,
    pub g: Real,
    pub b: Real,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);

    pub const fn new(r: Real, g: Real, b: Real) -> Self {
        Color { r, g, b }
    }

    /// Build a color from a packed `0xRRGGBB` integer. Bits above 24 are ignored.
    ///
    /// ```rust
    /// # use sdfmesh::color::Color;
    /// let c = Color::from_hex(0xFF0080);
    /// assert_eq!(c.r, 1.0);
    /// assert_eq!(c.g, 0.0);
    /// ```
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xFF) as Real / 255.0;
        Color::new(channel(16), channel(8), channel(0))
    }

    /// Pack into the 15-bit STL attribute layout: bit 15 set, then 5 bits each of
    /// red, green and blue (red highest).
    pub fn to_rgb555(&self) -> u16 {
        let quantize = |c: Real| (c.clamp(0.0, 1.0) * 31.0).round() as u16;
        (1 << 15) | (quantize(self.r) << 10) | (quantize(self.g) << 5) | quantize(self.b)
    }

    /// Inverse of [`Color::to_rgb555`]; `None` when the "has color" bit is clear.
    pub fn from_rgb555(attribute: u16) -> Option<Self> {
        if attribute & (1 << 15) == 0 {
            return None;
        }
        let channel = |shift: u16| ((attribute >> shift) & 0x1F) as Real / 31.0;
        Some(Color::new(channel(10), channel(5), channel(0)))
    }
}

impl From<[Real; 3]> for Color {
    fn from([r, g, b]: [Real; 3]) -> Self {
        Color::new(r, g, b)
    }
}
