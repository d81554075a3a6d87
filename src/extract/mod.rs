//! Iso-surface extraction over an integer lattice
//!
//! The lattice is scanned `x` outer, `y` middle, `z` inner, one unit cell at a
//! time. Where the field at a cell's center is further from the iso level than
//! half the cell's diagonal the cell cannot hold any surface, and because a
//! distance field changes by at most one unit per unit step, the scan along
//! `z` can jump ahead by the remaining distance too. Other cells are sampled
//! at their 8 corners and triangulated by [`marching_cubes::polygonise`].
//!
//! Work is split between drivers through [`ExtractOps`], with
//! [`SerialExtractOps`] and (feature `parallel`) [`ParallelExtractOps`]
//! implementing it.

pub mod denormals;
pub mod marching_cubes;
pub mod serial;
pub mod traits;

#[cfg(feature = "parallel")]
pub mod parallel;

pub use denormals::DenormalGuard;
pub use serial::SerialExtractOps;
pub use traits::ExtractOps;

#[cfg(feature = "parallel")]
pub use parallel::ParallelExtractOps;

use crate::color::Color;
use crate::errors::SdfError;
use crate::float_types::parry3d::bounding_volume::Aabb;
use crate::float_types::{HALF_CUBE_DIAGONAL, Real};
use crate::sdf::Sdf;
use crate::tracing_ext::OperationTimer;
use nalgebra::{Point3, Vector3};

/// A half-open range of unit lattice cells: cell `(x, y, z)` spans
/// `[x, x + 1] × [y, y + 1] × [z, z + 1]` and is included when
/// `min <= (x, y, z) < max` on every axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LatticeBounds {
    pub min: [i32; 3],
    pub max: [i32; 3],
}

impl LatticeBounds {
    pub const fn new(min: [i32; 3], max: [i32; 3]) -> Self {
        LatticeBounds { min, max }
    }

    /// Cells `[-h, h)` on each axis, centered on the origin.
    pub const fn symmetric(hx: i32, hy: i32, hz: i32) -> Self {
        LatticeBounds {
            min: [-hx, -hy, -hz],
            max: [hx, hy, hz],
        }
    }

    /// Smallest range of whole cells covering `aabb` grown by `margin`.
    pub fn covering(aabb: &Aabb, margin: Real) -> Self {
        let min = (aabb.mins - Vector3::repeat(margin)).map(|c| c.floor() as i32);
        let max = (aabb.maxs + Vector3::repeat(margin)).map(|c| c.ceil() as i32);
        LatticeBounds {
            min: [min.x, min.y, min.z],
            max: [max.x, max.y, max.z],
        }
    }

    /// Cells along each axis (zero for an inverted axis).
    pub fn extent(&self) -> [u64; 3] {
        std::array::from_fn(|axis| (i64::from(self.max[axis]) - i64::from(self.min[axis])).max(0) as u64)
    }

    pub fn cell_count(&self) -> u64 {
        self.extent().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.cell_count() == 0
    }
}

/// Knobs of an extraction run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractConfig {
    /// Worker threads; each takes every `workers`-th slab along `x`.
    pub workers: usize,
    /// Field value the surface is extracted at.
    pub iso_level: Real,
    /// Skip cells (and runs of cells) whose center is provably far from the
    /// surface. Only sound for fields that change by at most one unit per unit
    /// of distance; turn it off for steeper fields.
    pub skip_empty_cells: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        ExtractConfig {
            workers: std::thread::available_parallelism().map_or(1, |n| n.get()),
            iso_level: 0.0,
            skip_empty_cells: true,
        }
    }
}

impl ExtractConfig {
    pub const fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub const fn with_iso_level(mut self, iso_level: Real) -> Self {
        self.iso_level = iso_level;
        self
    }

    pub const fn with_skip_empty_cells(mut self, skip: bool) -> Self {
        self.skip_empty_cells = skip;
        self
    }
}

/// Extracted triangles as a flat soup with one color per triangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Three positions per triangle.
    pub positions: Vec<Point3<Real>>,
    /// One entry per triangle; `None` where the field has no color.
    pub colors: Vec<Option<Color>>,
}

impl Extraction {
    pub const fn new() -> Self {
        Extraction {
            positions: Vec::new(),
            colors: Vec::new(),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Triangles with their colors, in storage order.
    pub fn triangles(&self) -> impl Iterator<Item = ([Point3<Real>; 3], Option<Color>)> + '_ {
        self.positions
            .chunks_exact(3)
            .zip(&self.colors)
            .map(|(tri, color)| ([tri[0], tri[1], tri[2]], *color))
    }

    /// Move every triangle of `other` to the end of `self`, leaving `other` empty.
    pub fn append(&mut self, other: &mut Extraction) {
        self.positions.append(&mut other.positions);
        self.colors.append(&mut other.colors);
    }
}

/// Counters for one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Cells whose center distance was evaluated for the skip test.
    pub tested: u64,
    /// Cells sampled at all 8 corners.
    pub sampled: u64,
    /// Cells jumped over without any evaluation.
    pub skipped: u64,
    pub triangles: u64,
}

impl ScanStats {
    pub const fn merge(&mut self, other: &ScanStats) {
        self.tested += other.tested;
        self.sampled += other.sampled;
        self.skipped += other.skipped;
        self.triangles += other.triangles;
    }

    fn log_summary(&self, workers: usize) {
        tracing::info!(
            workers,
            triangles = self.triangles,
            sampled = self.sampled,
            tested = self.tested,
            skipped = self.skipped,
            "extraction finished"
        );
    }
}

/// Scan the share of `bounds` owned by `worker` of `workers`: every slab whose
/// `x` satisfies `x - min.x ≡ worker (mod workers)`. Triangles are appended to
/// `out`.
pub(crate) fn scan_slabs(
    sdf: &Sdf,
    bounds: &LatticeBounds,
    config: &ExtractConfig,
    worker: usize,
    workers: usize,
    out: &mut Extraction,
) -> ScanStats {
    let _span = tracing::debug_span!("extract_worker", worker, of = workers).entered();

    let iso = config.iso_level;
    let [min_x, min_y, min_z] = bounds.min.map(i64::from);
    let [max_x, max_y, max_z] = bounds.max.map(i64::from);
    let mut stats = ScanStats::default();

    let mut x0 = min_x + worker as i64;
    while x0 < max_x {
        for y0 in min_y..max_y {
            let mut z0 = min_z;
            while z0 < max_z {
                let origin = Point3::new(x0 as Real, y0 as Real, z0 as Real);
                let center = origin + Vector3::repeat(0.5);

                if config.skip_empty_cells {
                    stats.tested += 1;
                    let d = (sdf.distance(&center) - iso).abs();
                    if d > HALF_CUBE_DIAGONAL {
                        // every cell within this many further steps is still clear
                        let clear = (d - HALF_CUBE_DIAGONAL).floor();
                        let remaining = max_z - z0 - 1;
                        let jump = if clear < remaining as Real {
                            clear as i64
                        } else {
                            remaining
                        };
                        stats.skipped += jump as u64;
                        z0 += 1 + jump;
                        continue;
                    }
                }

                let corners = marching_cubes::CORNER_OFFSETS.map(|[dx, dy, dz]| {
                    origin + Vector3::new(dx as Real, dy as Real, dz as Real)
                });
                let values = corners.map(|corner| sdf.distance(&corner));
                let emitted = marching_cubes::polygonise(&corners, &values, iso, &mut out.positions);
                stats.sampled += 1;

                if emitted > 0 {
                    let color = sdf.color(&center);
                    out.colors.extend(std::iter::repeat_n(color, emitted));
                    stats.triangles += emitted as u64;
                }
                z0 += 1;
            }
        }
        x0 += workers as i64;
    }

    tracing::debug!(
        triangles = stats.triangles,
        sampled = stats.sampled,
        tested = stats.tested,
        skipped = stats.skipped,
        "worker finished"
    );
    stats
}

/// Extract the surface `sdf == config.iso_level` inside `bounds`, using the
/// parallel driver when the `parallel` feature is enabled and the serial one
/// otherwise.
///
/// ```rust
/// use sdfmesh::{ExtractConfig, LatticeBounds, Sdf};
/// use nalgebra::Point3;
///
/// let ball = Sdf::sphere(3.5, Point3::origin());
/// let mesh = sdfmesh::extract(&ball, &LatticeBounds::symmetric(5, 5, 5), &ExtractConfig::default())?;
/// assert!(mesh.triangle_count() > 0);
/// # Ok::<(), sdfmesh::SdfError>(())
/// ```
pub fn extract(sdf: &Sdf, bounds: &LatticeBounds, config: &ExtractConfig) -> Result<Extraction, SdfError> {
    let _timer = OperationTimer::new("extract");

    #[cfg(not(feature = "parallel"))]
    let ops = SerialExtractOps::new();
    #[cfg(feature = "parallel")]
    let ops = ParallelExtractOps::new();

    ops.extract(sdf, bounds, config)
}

impl Sdf {
    /// Extract this field's iso-surface; see [`extract`].
    pub fn extract(&self, bounds: &LatticeBounds, config: &ExtractConfig) -> Result<Extraction, SdfError> {
        extract(self, bounds, config)
    }
}
