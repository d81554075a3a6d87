//! Traits defining extraction drivers for dependency inversion

use crate::errors::SdfError;
use crate::extract::{ExtractConfig, Extraction, LatticeBounds};
use crate::sdf::Sdf;

/// Core extraction operation
pub trait ExtractOps {
    /// Triangulate the iso-surface of `sdf` over every cell in `bounds`.
    ///
    /// The set of triangles produced is fixed by the field, the bounds and the
    /// iso level; drivers differ only in how they split the work and in the
    /// order of the output.
    fn extract(
        &self,
        sdf: &Sdf,
        bounds: &LatticeBounds,
        config: &ExtractConfig,
    ) -> Result<Extraction, SdfError>;
}
