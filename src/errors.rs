//! Errors raised while building distance fields and extracting surfaces

use crate::io::IoError;

/// Everything that can stop a mesh distance field from being built or a
/// surface from being extracted.
///
/// Degenerate triangles are not an error: they contribute zero-weight
/// pseudonormal terms and are otherwise tolerated.
#[derive(Debug, thiserror::Error)]
pub enum SdfError {
    /// The triangle soup holds no triangles, so no sign can be resolved.
    #[error("(EmptyMesh) mesh has no triangles to measure distance against")]
    EmptyMesh,
    /// The flat position list does not hold whole triangles.
    #[error("(IncompleteTriangle) {positions} positions is not a multiple of 3")]
    IncompleteTriangle { positions: usize },
    /// Extraction was asked to run with no workers.
    #[error("(NoWorkers) extraction needs at least one worker")]
    NoWorkers,
    /// The worker pool could not be started.
    #[cfg(feature = "parallel")]
    #[error("(ThreadPool) {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    /// The mesh file could not be read.
    #[error(transparent)]
    Io(#[from] IoError),
}
