//! Parallel implementation of surface extraction

use crate::errors::SdfError;
use crate::extract::denormals::DenormalGuard;
use crate::extract::traits::ExtractOps;
use crate::extract::{ExtractConfig, Extraction, LatticeBounds, ScanStats, scan_slabs};
use crate::sdf::Sdf;
use std::sync::{Mutex, PoisonError};

/// Runs [`ExtractConfig::workers`] threads, one long task each. Worker `i`
/// owns the `x` slabs with `x - min.x ≡ i (mod workers)`, fills a private
/// buffer, and appends it to the shared result under one lock when done.
///
/// A panic in any worker (such as a mesh field that cannot be evaluated)
/// propagates to the caller once the other workers have finished.
pub struct ParallelExtractOps;

impl ParallelExtractOps {
    pub const fn new() -> Self {
        Self
    }
}

impl Default for ParallelExtractOps {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractOps for ParallelExtractOps {
    fn extract(
        &self,
        sdf: &Sdf,
        bounds: &LatticeBounds,
        config: &ExtractConfig,
    ) -> Result<Extraction, SdfError> {
        if config.workers == 0 {
            return Err(SdfError::NoWorkers);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("sdfmesh-extract-{i}"))
            .build()?;

        let merged = Mutex::new((Extraction::new(), ScanStats::default()));

        pool.broadcast(|ctx| {
            let _denormals = DenormalGuard::activate();

            let mut local = Extraction::new();
            let stats = scan_slabs(sdf, bounds, config, ctx.index(), ctx.num_threads(), &mut local);

            let mut shared = merged.lock().unwrap_or_else(PoisonError::into_inner);
            shared.0.append(&mut local);
            shared.1.merge(&stats);
        });

        let (extraction, stats) = merged.into_inner().unwrap_or_else(PoisonError::into_inner);
        stats.log_summary(config.workers);
        Ok(extraction)
    }
}
