//! Decoding PLY mesh files and re-encoding them as Wavefront OBJ.
//!
//! The interesting part of this crate is the PLY decoder: PLY headers
//! declare an arbitrary, typed record layout per element, and the body
//! follows that layout in ASCII or in binary with either byte order. The
//! decoder interprets the declared schema and funnels all of it into one
//! fixed mesh representation ([`MeshData`]): positions and optional
//! normals, colors and texture coordinates per vertex, plus triangles
//! (n-gons are fan-triangulated).
//!
//! ```no_run
//! use ply2obj::io::{obj, ply, MeshWriter};
//!
//! # fn run() -> Result<(), failure::Error> {
//! let mesh = ply::Reader::open("bunny.ply")?.read()?;
//! obj::Writer::new(&mesh).write_to_file("bunny.obj")?;
//! # Ok(())
//! # }
//! ```

pub mod io;
pub mod mesh;

pub use crate::mesh::{MeshData, MeshFlags, Triangle, Vertex};
