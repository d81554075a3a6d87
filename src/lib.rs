//! Signed distance fields built from analytic primitives, boolean operations,
//! transforms and triangle meshes, extracted to colored triangle meshes by an
//! adaptive, optionally multithreaded marching cubes scan.
//!
//! ```rust
//! use sdfmesh::{ExtractConfig, LatticeBounds, Sdf};
//! use nalgebra::{Point3, Vector3};
//!
//! let r = 6.0;
//! let mut part = Sdf::sphere(r, Point3::origin()).with_hex_color(0x000000);
//! part &= Sdf::cuboid(Vector3::repeat(r * 0.75)).with_hex_color(0xFFFFFF);
//! part -= Sdf::cylinder(r / 2.0).with_hex_color(0x0000FF);
//!
//! let mesh = part.extract(&LatticeBounds::symmetric(7, 7, 7), &ExtractConfig::default())?;
//! assert!(mesh.triangle_count() > 0);
//! # Ok::<(), sdfmesh::SdfError>(())
//! ```
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//! - **parallel**: extract with a pool of worker threads (rayon)
//! - [**stl-io**](https://en.wikipedia.org/wiki/STL_(file_format)): binary `.stl` import/export with per-triangle color, ASCII import
//! - **hashmap**: use hashbrown for vertex welding and edge pseudonormal lookup
//!
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64

#![deny(unsafe_code)]
#![warn(unused)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod color;
pub mod errors;
pub mod extract;
pub mod float_types;
pub mod io;
pub mod mesh_field;
pub mod sdf;
pub mod tracing_ext;

#[cfg(any(all(feature = "f64", feature = "f32"), not(any(feature = "f64", feature = "f32"))))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use color::Color;
pub use errors::SdfError;
pub use extract::{ExtractConfig, Extraction, LatticeBounds, extract};
pub use mesh_field::MeshField;
pub use sdf::Sdf;
