//! Serial implementation of surface extraction

use crate::errors::SdfError;
use crate::extract::denormals::DenormalGuard;
use crate::extract::traits::ExtractOps;
use crate::extract::{ExtractConfig, Extraction, LatticeBounds, scan_slabs};
use crate::sdf::Sdf;

/// Scans the whole lattice on the calling thread, ignoring
/// [`ExtractConfig::workers`].
pub struct SerialExtractOps;

impl SerialExtractOps {
    pub const fn new() -> Self {
        Self
    }
}

impl Default for SerialExtractOps {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractOps for SerialExtractOps {
    fn extract(
        &self,
        sdf: &Sdf,
        bounds: &LatticeBounds,
        config: &ExtractConfig,
    ) -> Result<Extraction, SdfError> {
        let _denormals = DenormalGuard::activate();

        let mut out = Extraction::new();
        let stats = scan_slabs(sdf, bounds, config, 0, 1, &mut out);
        stats.log_summary(1);
        Ok(out)
    }
}
