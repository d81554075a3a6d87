//! Timing helpers on top of `tracing`.
//!
//! Set `RUST_LOG=sdfmesh=debug` to see per-worker extraction details and
//! `RUST_LOG=sdfmesh::timing=info` for operation durations only.

use std::time::Instant;
use tracing::{Span, debug, info};

/// Logs how long an operation took when dropped.
///
/// ```rust
/// use sdfmesh::tracing_ext::OperationTimer;
///
/// let timer = OperationTimer::new("build_field");
/// assert!(timer.elapsed_ms() >= 0.0);
/// ```
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
    span: Span,
}

impl OperationTimer {
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!("sdfmesh_operation", operation = name);
        debug!(target: "sdfmesh::timing", operation = name, "starting");
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Timer for an operation over a mesh of known size.
    pub fn with_mesh(name: &'static str, triangles: usize, vertices: usize) -> Self {
        let span = tracing::info_span!(
            "sdfmesh_operation",
            operation = name,
            triangles,
            vertices
        );
        debug!(
            target: "sdfmesh::timing",
            operation = name,
            triangles,
            vertices,
            "starting"
        );
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        info!(
            target: "sdfmesh::timing",
            operation = self.name,
            elapsed_ms = format!("{:.2}", self.elapsed_ms()),
            "completed"
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn timer_measures_elapsed_time() {
        let timer = OperationTimer::new("sleep");
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(timer.elapsed_ms() >= 5.0);
    }
}
