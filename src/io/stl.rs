//! Binary STL triangle soup codec.
//!
//! Layout (little-endian): an 80-byte header, a `u32` triangle count, then one
//! 50-byte record per triangle holding the facet normal, three vertices (each
//! three `f32`) and a 2-byte attribute. The attribute carries a 5-5-5 RGB color
//! when its high bit is set.

use crate::color::Color;
use crate::extract::Extraction;
use crate::float_types::Real;
use crate::io::IoError;
use nalgebra::{Point3, Vector3};
use std::fs::File;
use std::io::{Cursor, Write};
use std::path::Path;

const HEADER_LEN: usize = 80;
const PREAMBLE_LEN: usize = HEADER_LEN + 4;
const RECORD_LEN: usize = 50;

/// A decoded triangle soup: three positions per triangle and one optional color
/// per triangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StlSoup {
    pub positions: Vec<Point3<Real>>,
    pub colors: Vec<Option<Color>>,
}

impl StlSoup {
    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }
}

#[inline]
fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[inline]
fn read_f32(bytes: &[u8], at: usize) -> f32 {
    f32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[inline]
fn read_point(bytes: &[u8], at: usize) -> Point3<Real> {
    Point3::new(
        read_f32(bytes, at) as Real,
        read_f32(bytes, at + 4) as Real,
        read_f32(bytes, at + 8) as Real,
    )
}

fn looks_ascii(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .skip_while(|b| b.is_ascii_whitespace())
        .take(5)
        .eq(b"solid".iter())
}

/// Decode an STL byte image into a flat triangle soup.
///
/// The number of binary records is taken from the body length. A header count
/// that disagrees with it is logged and ignored, and a body that ends inside a
/// record is rejected. Text files (starting with `solid` and not matching the
/// binary layout) are parsed with `stl_io` and come back uncolored.
pub fn decode(bytes: &[u8]) -> Result<StlSoup, IoError> {
    let declared = (bytes.len() >= PREAMBLE_LEN).then(|| read_u32(bytes, HEADER_LEN) as usize);
    let expected = declared
        .and_then(|count| count.checked_mul(RECORD_LEN))
        .and_then(|body| body.checked_add(PREAMBLE_LEN));

    if expected != Some(bytes.len()) && looks_ascii(bytes) {
        return decode_ascii(bytes);
    }

    let Some(declared) = declared else {
        return Err(IoError::MalformedInput(format!(
            "{} bytes cannot hold an STL preamble",
            bytes.len()
        )));
    };
    let body = bytes.len() - PREAMBLE_LEN;
    if body % RECORD_LEN != 0 {
        return Err(IoError::MalformedInput(format!(
            "{body} byte body is not a whole number of {RECORD_LEN} byte records"
        )));
    }
    let count = body / RECORD_LEN;
    if count != declared {
        tracing::warn!(declared, records = count, "STL header count disagrees with body, using body");
    }

    let mut soup = StlSoup {
        positions: Vec::with_capacity(count * 3),
        colors: Vec::with_capacity(count),
    };
    for record in bytes[PREAMBLE_LEN..].chunks_exact(RECORD_LEN) {
        // the stored normal (bytes 0..12) is recomputed by consumers, skip it
        soup.positions.push(read_point(record, 12));
        soup.positions.push(read_point(record, 24));
        soup.positions.push(read_point(record, 36));
        let attribute = u16::from_le_bytes([record[48], record[49]]);
        soup.colors.push(Color::from_rgb555(attribute));
    }

    tracing::debug!(triangles = count, "decoded binary STL");
    Ok(soup)
}

fn decode_ascii(bytes: &[u8]) -> Result<StlSoup, IoError> {
    let mut cursor = Cursor::new(bytes);
    let reader = stl_io::create_stl_reader(&mut cursor)?;

    let mut soup = StlSoup::default();
    for tri in reader {
        let tri = tri?;
        for v in &tri.vertices {
            soup.positions.push(Point3::new(v[0] as Real, v[1] as Real, v[2] as Real));
        }
        soup.colors.push(None);
    }

    tracing::debug!(triangles = soup.colors.len(), "decoded ASCII STL");
    Ok(soup)
}

/// Unit facet normal from the winding of `a, b, c`; zero for degenerate triangles.
pub fn facet_normal(a: &Point3<Real>, b: &Point3<Real>, c: &Point3<Real>) -> Vector3<Real> {
    (b - a)
        .cross(&(c - a))
        .try_normalize(Real::EPSILON)
        .unwrap_or_else(Vector3::zeros)
}

fn write_vector(out: &mut Vec<u8>, x: Real, y: Real, z: Real) {
    #[allow(clippy::unnecessary_cast)]
    for c in [x as f32, y as f32, z as f32] {
        out.extend_from_slice(&c.to_le_bytes());
    }
}

/// Encode a triangle soup into a binary STL byte image.
///
/// Trailing positions that do not form a whole triangle are ignored. Triangle
/// `i` takes its attribute from `colors[i]`; triangles beyond the end of
/// `colors`, or with a `None` entry, get attribute `0`.
///
/// ```rust
/// # use sdfmesh::io::stl;
/// # use nalgebra::Point3;
/// let tri = [Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)];
/// let bytes = stl::encode(&tri, &[]);
/// assert_eq!(bytes.len(), 84 + 50);
/// ```
pub fn encode(positions: &[Point3<Real>], colors: &[Option<Color>]) -> Vec<u8> {
    let triangles = positions.len() / 3;
    let mut out = Vec::with_capacity(PREAMBLE_LEN + triangles * RECORD_LEN);

    out.resize(HEADER_LEN, 0);
    out.extend_from_slice(&(triangles as u32).to_le_bytes());

    for (i, tri) in positions.chunks_exact(3).enumerate() {
        let n = facet_normal(&tri[0], &tri[1], &tri[2]);
        write_vector(&mut out, n.x, n.y, n.z);
        for p in tri {
            write_vector(&mut out, p.x, p.y, p.z);
        }
        let attribute = colors
            .get(i)
            .copied()
            .flatten()
            .map_or(0, |c| c.to_rgb555());
        out.extend_from_slice(&attribute.to_le_bytes());
    }

    out
}

/// Read and decode an STL file.
pub fn read_stl_file<P: AsRef<Path>>(path: P) -> Result<StlSoup, IoError> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(IoError::MalformedPath("empty path".to_string()));
    }
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

/// Encode and write an STL file.
///
/// The complete byte image is produced before the file is touched, and the file
/// is sized to its final length up front, so a failed run never leaves a
/// truncated mesh behind.
pub fn write_stl_file<P: AsRef<Path>>(
    path: P,
    positions: &[Point3<Real>],
    colors: &[Option<Color>],
) -> Result<(), IoError> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(IoError::MalformedPath("empty path".to_string()));
    }
    let bytes = encode(positions, colors);

    let mut file = File::create(path)?;
    file.set_len(bytes.len() as u64)?;
    file.write_all(&bytes)?;
    file.flush()?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote binary STL");
    Ok(())
}

impl Extraction {
    /// Binary STL image of the extracted triangles, colored per triangle.
    pub fn to_stl_binary(&self) -> Vec<u8> {
        encode(&self.positions, &self.colors)
    }

    /// Write the extracted triangles to `path` as a colored binary STL.
    pub fn write_stl<P: AsRef<Path>>(&self, path: P) -> Result<(), IoError> {
        write_stl_file(path, &self.positions, &self.colors)
    }
}
