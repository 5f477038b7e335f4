//! The in-memory mesh produced by decoding a PLY file.

use cgmath::{Point2, Point3, Vector3};


/// One decoded vertex.
///
/// The position is always present (it stays at the origin if the file does
/// not provide one). All other attributes are optional: a vertex only
/// carries an attribute if the file actually stored it for this vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Option<Vector3<f32>>,

    /// RGB color with all channels in `[0, 1]`.
    pub color: Option<[f32; 3]>,
    pub tex_coord: Option<Point2<f32>>,
}

impl Vertex {
    /// Returns a vertex at the origin without any optional attributes.
    pub fn new() -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 0.0),
            normal: None,
            color: None,
            tex_coord: None,
        }
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self::new()
    }
}

/// A triangle, stored as three zero-based indices into the vertex
/// sequence.
///
/// The indices are taken from the file as is. In particular, they are *not*
/// checked against the vertex count: a file referencing out of range
/// vertices decodes without error and the defect is carried into the
/// output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub indices: [i32; 3],
}

/// File-level attribute summary: a flag is set if and only if at least one
/// vertex carries the corresponding attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshFlags {
    pub has_normals: bool,
    pub has_colors: bool,
    pub has_tex_coords: bool,
}

impl MeshFlags {
    /// Derives the summary flags from the vertices themselves.
    ///
    /// This is intentionally vertex-driven: what the header declares does
    /// not matter, only what was actually decoded.
    pub fn derive(vertices: &[Vertex]) -> Self {
        Self {
            has_normals: vertices.iter().any(|v| v.normal.is_some()),
            has_colors: vertices.iter().any(|v| v.color.is_some()),
            has_tex_coords: vertices.iter().any(|v| v.tex_coord.is_some()),
        }
    }
}

/// Everything decoded from one PLY file.
#[derive(Debug)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
    pub flags: MeshFlags,

    /// Diagnostics for recoverable problems (e.g. malformed ASCII number
    /// literals) that were encountered while decoding. The affected fields
    /// were left at their defaults and decoding continued.
    pub warnings: Vec<String>,
}
