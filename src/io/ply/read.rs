//! Everything related to reading a PLY file.
//!
//! # Random notes on the format
//!
//! - The header is plain text, terminated by a line `end_header`. Lines
//!   may end with `'\n'` or `'\r\n'`; files produced by Windows tools use
//!   the latter even when the body is binary.
//! - The body layout is completely header-driven: per-property types,
//!   text vs. binary encoding and the byte order all come from the
//!   `format`/`property` lines. Decoding is therefore an interpreter over
//!   the declared record layout rather than a fixed-grammar parser.
//! - Lots of files in the wild declare properties this converter has no
//!   use for (`alpha`, `confidence`, ...). Those are read and thrown away;
//!   in binary mode they *must* be skipped by their declared width or
//!   every following record would be misaligned.

use std::{
    fs::File,
    io,
    path::Path,
};

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use cgmath::{Point2, Vector3};
use smallvec::SmallVec;

use crate::{
    io::{
        parse::{self, buf::Buffer, Input, Span},
        Error,
    },
    mesh::{MeshData, MeshFlags, Triangle, Vertex},
};
use super::{
    raw::{
        ElementDef, FaceListDef, ListLenType, PropertyDef, PropertyType,
        ScalarType, ScalarValue,
    },
    Encoding,
};


/// A reader able to read ASCII and binary PLY files.
///
/// Creating a reader (via [`Reader::open`] or [`Reader::new`]) parses the
/// header, after which the encoding and the declared element counts can
/// be inspected. [`Reader::read`] then decodes the body into a
/// [`MeshData`].
#[derive(Debug)]
pub struct Reader<R: io::Read> {
    buf: Buffer<R>,
    encoding: Encoding,
    vertex: ElementDef,
    face_count: u64,
    face_list: Option<FaceListDef>,
}

impl Reader<File> {
    /// Tries to open the file specified by the given path and creates a
    /// new `Reader` from that file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        // No `BufReader` needed: all reads go through the parse buffer.
        Self::new(File::open(path)?)
    }
}

impl<R: io::Read> Reader<R> {
    /// Creates a new `Reader` from the given `io::Read` instance and
    /// parses the header of the given input.
    pub fn new(reader: R) -> Result<Self, Error> {
        /// Which element the `property` lines we are currently seeing
        /// belong to. Elements other than `vertex` and `face` are parsed
        /// but not wired into decoding.
        enum CurrentElement {
            Vertex,
            Face,
            Other,
        }

        let mut buf = Buffer::new(reader)?;

        // Files without a `format` line are treated as ASCII.
        let mut encoding = Encoding::Ascii;
        let mut vertex = ElementDef {
            name: "vertex".into(),
            count: 0,
            property_defs: Vec::new(),
        };
        let mut face_count = 0;
        let mut face_list = None;
        let mut current = CurrentElement::Other;

        loop {
            let line_start = buf.offset();
            let line = buf.take_line(|sd| sd.assert_ascii().map(|s| s.to_owned()))?
                .ok_or_else(|| parse::Error::Custom(
                    "end of input reached while looking for 'end_header'".into(),
                    Span::single(line_start),
                ))?;

            let mut tokens = line.split_whitespace();
            let keyword = match tokens.next() {
                Some(t) => t,
                // Blank lines in the header carry no information.
                None => continue,
            };

            match keyword {
                "end_header" => break,
                "ply" | "comment" => {}
                "format" => {
                    encoding = match tokens.next() {
                        Some("ascii") => Encoding::Ascii,
                        Some("binary_little_endian") => Encoding::BinaryLittleEndian,
                        Some("binary_big_endian") => Encoding::BinaryBigEndian,
                        other => {
                            return Err(header_error(
                                format!(
                                    "expected 'ascii', 'binary_little_endian' or \
                                        'binary_big_endian', found '{}'",
                                    other.unwrap_or(""),
                                ),
                                line_start,
                                buf.offset(),
                            ));
                        }
                    };
                    // The version token is not interpreted.
                }
                "element" => {
                    let name = tokens.next().unwrap_or("");
                    let count = tokens.next()
                        .ok_or_else(|| header_error(
                            "missing element count".into(),
                            line_start,
                            buf.offset(),
                        ))?
                        .parse::<u64>()
                        .map_err(|e| header_error(
                            format!("invalid integer as element count ({})", e),
                            line_start,
                            buf.offset(),
                        ))?;

                    current = match name {
                        "vertex" => {
                            vertex.count = count;
                            CurrentElement::Vertex
                        }
                        "face" => {
                            face_count = count;
                            CurrentElement::Face
                        }
                        _ => CurrentElement::Other,
                    };
                }
                "property" => {
                    let prop = parse_property(&mut tokens)
                        .map_err(|msg| header_error(msg, line_start, buf.offset()))?;

                    match current {
                        CurrentElement::Vertex => vertex.property_defs.push(prop),
                        CurrentElement::Face => {
                            // Only the index list is retained. Both names
                            // in circulation are accepted.
                            if prop.name == "vertex_indices" || prop.name == "vertex_index" {
                                if let PropertyType::List { len_type, item_type } = prop.ty {
                                    face_list = Some(FaceListDef { len_type, item_type });
                                }
                            }
                        }
                        CurrentElement::Other => {}
                    }
                }
                // Unknown header lines are ignored.
                _ => {}
            }
        }

        if face_count > 0 && face_list.is_none() {
            return Err(parse::Error::Custom(
                "face element declared, but no 'vertex_indices' or 'vertex_index' \
                    list property found".into(),
                Span::single(buf.offset()),
            ).into());
        }

        Ok(Self { buf, encoding, vertex, face_count, face_list })
    }

    /// The encoding of the file body, as declared by the header.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// The number of vertices declared by the header.
    pub fn vertex_count(&self) -> u64 {
        self.vertex.count
    }

    /// The number of faces declared by the header.
    pub fn face_count(&self) -> u64 {
        self.face_count
    }

    /// Reads the whole body and assembles the decoded mesh.
    ///
    /// Exactly `vertex_count` vertices are decoded; faces with fewer than
    /// 3 indices are consumed but dropped, and faces with more are
    /// fan-triangulated, so the number of triangles can differ from the
    /// declared face count in both directions.
    pub fn read(mut self) -> Result<MeshData, Error> {
        let buf = &mut self.buf;
        let mut warnings = Vec::new();

        let vertices = match self.encoding {
            Encoding::Ascii => {
                read_vertices_ascii(buf, &self.vertex, &mut warnings)?
            }
            Encoding::BinaryLittleEndian => {
                read_vertices_binary::<LittleEndian, _>(buf, &self.vertex)?
            }
            Encoding::BinaryBigEndian => {
                read_vertices_binary::<BigEndian, _>(buf, &self.vertex)?
            }
        };

        let triangles = match (self.face_count, self.face_list) {
            // A face count of 0 makes the list property irrelevant, even
            // an unusable one.
            (0, _) | (_, None) => Vec::new(),
            (count, Some(list)) => match self.encoding {
                Encoding::Ascii => {
                    read_faces_ascii(buf, count, &mut warnings)?
                }
                Encoding::BinaryLittleEndian => {
                    read_faces_binary::<LittleEndian, _>(buf, count, &list)?
                }
                Encoding::BinaryBigEndian => {
                    read_faces_binary::<BigEndian, _>(buf, count, &list)?
                }
            },
        };

        // The authoritative attribute flags come from the vertices that
        // were actually decoded, not from what the header declared.
        let flags = MeshFlags::derive(&vertices);

        Ok(MeshData { vertices, triangles, flags, warnings })
    }
}


// ===========================================================================
// ===== Header helpers
// ===========================================================================

fn header_error(msg: String, lo: usize, hi: usize) -> Error {
    parse::Error::Custom(msg, Span::new(lo, hi)).into()
}

/// Parses the tokens of a `property` line after the `property` keyword,
/// i.e. `<type> <name>` or `list <len type> <item type> <name>`.
fn parse_property<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
) -> Result<PropertyDef, String> {
    fn scalar_type(token: Option<&str>) -> Result<ScalarType, String> {
        token.ok_or_else(|| "missing property type".to_string())?
            .parse::<ScalarType>()
            .map_err(|e| e.to_string())
    }

    let first = tokens.next().ok_or_else(|| "missing property type".to_string())?;

    let ty = if first == "list" {
        let len_type = scalar_type(tokens.next())?;
        let item_type = scalar_type(tokens.next())?;
        PropertyType::List { len_type, item_type }
    } else {
        PropertyType::Scalar(scalar_type(Some(first))?)
    };

    let name = tokens.next().ok_or_else(|| "missing property name".to_string())?;

    Ok(PropertyDef { ty, name: name.into() })
}


// ===========================================================================
// ===== The typed field reader
// ===========================================================================

/// Reads one binary value of type `ty`, reversing the byte order if the
/// file's order `B` differs from the host's.
fn read_scalar<B: ByteOrder, I: Input>(
    buf: &mut I,
    ty: ScalarType,
) -> Result<ScalarValue, parse::Error> {
    buf.with_bytes(ty.len().as_usize(), |sd| {
        Ok(match ty {
            ScalarType::Char => ScalarValue::Char(sd.data[0] as i8),
            ScalarType::UChar => ScalarValue::UChar(sd.data[0]),
            ScalarType::Short => ScalarValue::Short(B::read_i16(sd.data)),
            ScalarType::UShort => ScalarValue::UShort(B::read_u16(sd.data)),
            ScalarType::Int => ScalarValue::Int(B::read_i32(sd.data)),
            ScalarType::UInt => ScalarValue::UInt(B::read_u32(sd.data)),
            ScalarType::Float => ScalarValue::Float(B::read_f32(sd.data)),
            ScalarType::Double => ScalarValue::Double(B::read_f64(sd.data)),
        })
    })
}

/// Consumes one binary property value without decoding it. For lists this
/// still has to decode the length, as the total width depends on it.
fn skip_property<B: ByteOrder, I: Input>(
    buf: &mut I,
    ty: PropertyType,
) -> Result<(), parse::Error> {
    match ty {
        PropertyType::Scalar(ty) => buf.skip(ty.len().as_usize()),
        PropertyType::List { len_type, item_type } => {
            let len_type = ListLenType::from_scalar_type(len_type)
                .ok_or_else(|| parse::Error::Custom(
                    format!(
                        "cannot skip list property with '{}' length",
                        len_type.ply_type_name(),
                    ),
                    Span::single(buf.offset()),
                ))?;
            let len = read_list_len::<B, _>(buf, len_type)?;

            buf.skip(len as usize * item_type.len().as_usize())
        }
    }
}

/// Reads one binary list length of the given type, widened to `u32`.
fn read_list_len<B: ByteOrder, I: Input>(
    buf: &mut I,
    ty: ListLenType,
) -> Result<u32, parse::Error> {
    match ty {
        ListLenType::UChar => buf.with_bytes(1, |sd| Ok(u32::from(sd.data[0]))),
        ListLenType::UShort => buf.with_bytes(2, |sd| Ok(u32::from(B::read_u16(sd.data)))),
        ListLenType::UInt => buf.with_bytes(4, |sd| Ok(B::read_u32(sd.data))),
    }
}

/// Parses one ASCII token as a value of the given type.
fn parse_ascii_scalar(token: &str, ty: ScalarType) -> Result<ScalarValue, String> {
    macro_rules! parse_as {
        ($variant:ident, $ty:ident) => {
            token.parse::<$ty>()
                .map(ScalarValue::$variant)
                .map_err(|e| format!(
                    concat!("invalid '", stringify!($ty), "' literal '{}': {}"),
                    token,
                    e,
                ))
        };
    }

    match ty {
        ScalarType::Char => parse_as!(Char, i8),
        ScalarType::UChar => parse_as!(UChar, u8),
        ScalarType::Short => parse_as!(Short, i16),
        ScalarType::UShort => parse_as!(UShort, u16),
        ScalarType::Int => parse_as!(Int, i32),
        ScalarType::UInt => parse_as!(UInt, u32),
        ScalarType::Float => parse_as!(Float, f32),
        ScalarType::Double => parse_as!(Double, f64),
    }
}


// ===========================================================================
// ===== Vertex decoding
// ===========================================================================

/// Semantic target of a recognized vertex property name.
#[derive(Debug, Clone, Copy)]
enum VertexChannel {
    PositionX,
    PositionY,
    PositionZ,
    NormalX,
    NormalY,
    NormalZ,
    ColorR,
    ColorG,
    ColorB,
    TexU,
    TexV,
}

impl VertexChannel {
    /// Maps a property name to the vertex field it fills. Unrecognized
    /// names (`alpha`, `confidence`, ...) map to `None` and are consumed
    /// without being stored.
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "x" => Some(VertexChannel::PositionX),
            "y" => Some(VertexChannel::PositionY),
            "z" => Some(VertexChannel::PositionZ),
            "nx" => Some(VertexChannel::NormalX),
            "ny" => Some(VertexChannel::NormalY),
            "nz" => Some(VertexChannel::NormalZ),
            "red" => Some(VertexChannel::ColorR),
            "green" => Some(VertexChannel::ColorG),
            "blue" => Some(VertexChannel::ColorB),
            "u" | "s" | "texture_u" => Some(VertexChannel::TexU),
            "v" | "t" | "texture_v" => Some(VertexChannel::TexV),
            _ => None,
        }
    }

    /// Stores `value` in the corresponding field of `vertex`, marking the
    /// owning attribute as present.
    fn store(self, vertex: &mut Vertex, value: ScalarValue) {
        let zero_vec = Vector3::new(0.0, 0.0, 0.0);
        match self {
            VertexChannel::PositionX => vertex.position.x = value.to_f32(),
            VertexChannel::PositionY => vertex.position.y = value.to_f32(),
            VertexChannel::PositionZ => vertex.position.z = value.to_f32(),
            VertexChannel::NormalX => {
                vertex.normal.get_or_insert(zero_vec).x = value.to_f32();
            }
            VertexChannel::NormalY => {
                vertex.normal.get_or_insert(zero_vec).y = value.to_f32();
            }
            VertexChannel::NormalZ => {
                vertex.normal.get_or_insert(zero_vec).z = value.to_f32();
            }
            VertexChannel::ColorR => {
                vertex.color.get_or_insert([0.0; 3])[0] = color_component(value);
            }
            VertexChannel::ColorG => {
                vertex.color.get_or_insert([0.0; 3])[1] = color_component(value);
            }
            VertexChannel::ColorB => {
                vertex.color.get_or_insert([0.0; 3])[2] = color_component(value);
            }
            VertexChannel::TexU => {
                vertex.tex_coord.get_or_insert(Point2::new(0.0, 0.0)).x = value.to_f32();
            }
            VertexChannel::TexV => {
                vertex.tex_coord.get_or_insert(Point2::new(0.0, 0.0)).y = value.to_f32();
            }
        }
    }
}

/// Converts a decoded scalar into a color channel value in `[0, 1]`.
/// Unsigned byte components are rescaled from their `0..=255` range;
/// everything else is assumed to be stored as a float already.
fn color_component(value: ScalarValue) -> f32 {
    match value {
        ScalarValue::UChar(v) => f32::from(v) / 255.0,
        other => other.to_f32(),
    }
}

fn read_vertices_ascii(
    buf: &mut impl Input,
    vertex: &ElementDef,
    warnings: &mut Vec<String>,
) -> Result<Vec<Vertex>, parse::Error> {
    let mut vertices = Vec::new();

    for i in 0..vertex.count {
        let line_start = buf.offset();
        let line = buf.take_line(|sd| sd.assert_ascii().map(|s| s.to_owned()))?
            .ok_or_else(|| parse::Error::Custom(
                format!(
                    "unexpected end of input in vertex data (vertex {} of {})",
                    i,
                    vertex.count,
                ),
                Span::single(line_start),
            ))?;

        if line.is_empty() {
            if i + 1 < vertex.count {
                return Err(parse::Error::Custom(
                    format!(
                        "empty line in vertex data (vertex {} of {})",
                        i,
                        vertex.count,
                    ),
                    Span::single(line_start),
                ));
            }

            // An empty line at the very last vertex is treated as end of
            // data; the vertex keeps its defaults.
            vertices.push(Vertex::new());
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let mut v = Vertex::new();

        for (ordinal, prop) in vertex.property_defs.iter().enumerate() {
            let token = match tokens.get(ordinal) {
                Some(t) => *t,
                // A record with too few tokens leaves the remaining
                // fields at their defaults.
                None => continue,
            };
            let ty = match prop.ty {
                PropertyType::Scalar(ty) => ty,
                // List-valued vertex properties have no fixed position in
                // the line, so there is nothing sensible to read.
                PropertyType::List { .. } => continue,
            };

            let value = match parse_ascii_scalar(token, ty) {
                Ok(value) => value,
                Err(msg) => {
                    warnings.push(format!(
                        "vertex {}: property '{}': {}", i, prop.name, msg,
                    ));
                    continue;
                }
            };

            if let Some(channel) = VertexChannel::from_name(&prop.name) {
                channel.store(&mut v, value);
            }
        }

        vertices.push(v);
    }

    Ok(vertices)
}

fn read_vertices_binary<B: ByteOrder, I: Input>(
    buf: &mut I,
    vertex: &ElementDef,
) -> Result<Vec<Vertex>, parse::Error> {
    let mut vertices = Vec::new();

    for _ in 0..vertex.count {
        let mut v = Vertex::new();

        for prop in &vertex.property_defs {
            match (VertexChannel::from_name(&prop.name), prop.ty) {
                (Some(channel), PropertyType::Scalar(ty)) => {
                    let value = read_scalar::<B, _>(buf, ty)?;
                    channel.store(&mut v, value);
                }
                // Everything else is consumed by width so the cursor
                // stays aligned for the following fields and records.
                _ => skip_property::<B, _>(buf, prop.ty)?,
            }
        }

        vertices.push(v);
    }

    Ok(vertices)
}


// ===========================================================================
// ===== Face decoding
// ===========================================================================

/// The types a face index list may hold items of. Every item is widened
/// to `i32` when read; `uint` values above `i32::MAX` wrap, exactly as a
/// plain cast does.
#[derive(Debug, Clone, Copy)]
enum IndexType {
    Char,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
}

impl IndexType {
    fn from_scalar_type(ty: ScalarType) -> Option<Self> {
        match ty {
            ScalarType::Char => Some(IndexType::Char),
            ScalarType::UChar => Some(IndexType::UChar),
            ScalarType::Short => Some(IndexType::Short),
            ScalarType::UShort => Some(IndexType::UShort),
            ScalarType::Int => Some(IndexType::Int),
            ScalarType::UInt => Some(IndexType::UInt),
            ScalarType::Float | ScalarType::Double => None,
        }
    }

    fn len(self) -> usize {
        match self {
            IndexType::Char | IndexType::UChar => 1,
            IndexType::Short | IndexType::UShort => 2,
            IndexType::Int | IndexType::UInt => 4,
        }
    }

    fn read<B: ByteOrder>(self, buf: &mut impl Input) -> Result<i32, parse::Error> {
        match self {
            IndexType::Char => buf.with_bytes(1, |sd| Ok(i32::from(sd.data[0] as i8))),
            IndexType::UChar => buf.with_bytes(1, |sd| Ok(i32::from(sd.data[0]))),
            IndexType::Short => buf.with_bytes(2, |sd| Ok(i32::from(B::read_i16(sd.data)))),
            IndexType::UShort => buf.with_bytes(2, |sd| Ok(i32::from(B::read_u16(sd.data)))),
            IndexType::Int => buf.with_bytes(4, |sd| Ok(B::read_i32(sd.data))),
            IndexType::UInt => buf.with_bytes(4, |sd| Ok(B::read_u32(sd.data) as i32)),
        }
    }
}

/// Decomposes the polygon given by `indices` (at least 3) into triangles
/// sharing `indices[0]` as pivot, appending them to `out`.
fn fan_triangulate(indices: &[i32], out: &mut Vec<Triangle>) {
    for j in 1..indices.len() - 1 {
        out.push(Triangle {
            indices: [indices[0], indices[j], indices[j + 1]],
        });
    }
}

fn read_faces_ascii(
    buf: &mut impl Input,
    count: u64,
    warnings: &mut Vec<String>,
) -> Result<Vec<Triangle>, parse::Error> {
    let mut triangles = Vec::new();

    for i in 0..count {
        let line_start = buf.offset();
        let line = buf.take_line(|sd| sd.assert_ascii().map(|s| s.to_owned()))?
            .ok_or_else(|| parse::Error::Custom(
                format!(
                    "unexpected end of input in face data (face {} of {})",
                    i,
                    count,
                ),
                Span::single(line_start),
            ))?;

        if line.is_empty() {
            if i + 1 < count {
                return Err(parse::Error::Custom(
                    format!("empty line in face data (face {} of {})", i, count),
                    Span::single(line_start),
                ));
            }
            continue;
        }

        let mut tokens = line.split_whitespace();
        let n = match tokens.next() {
            Some(t) => match t.parse::<u32>() {
                Ok(n) => n as usize,
                Err(e) => {
                    warnings.push(format!(
                        "face {}: invalid vertex count '{}': {}", i, t, e,
                    ));
                    continue;
                }
            },
            None => continue,
        };

        // Too few indices for a triangle: the line is already consumed,
        // so the record is simply dropped.
        if n < 3 {
            continue;
        }

        let mut indices = SmallVec::<[i32; 4]>::new();
        for j in 0..n {
            let token = tokens.next().ok_or_else(|| parse::Error::Custom(
                format!(
                    "face {}: expected {} vertex indices, found only {}", i, n, j,
                ),
                Span::new(line_start, buf.offset()),
            ))?;
            let index = token.parse::<i32>().map_err(|e| parse::Error::Custom(
                format!("face {}: invalid vertex index '{}': {}", i, token, e),
                Span::new(line_start, buf.offset()),
            ))?;

            indices.push(index);
        }

        fan_triangulate(&indices, &mut triangles);
    }

    Ok(triangles)
}

fn read_faces_binary<B: ByteOrder, I: Input>(
    buf: &mut I,
    count: u64,
    list: &FaceListDef,
) -> Result<Vec<Triangle>, parse::Error> {
    let len_type = ListLenType::from_scalar_type(list.len_type)
        .ok_or_else(|| parse::Error::Custom(
            format!(
                "unsupported count type '{}' for face vertex list",
                list.len_type.ply_type_name(),
            ),
            Span::single(buf.offset()),
        ))?;
    let item_type = IndexType::from_scalar_type(list.item_type)
        .ok_or_else(|| parse::Error::Custom(
            format!(
                "unsupported item type '{}' for face vertex list",
                list.item_type.ply_type_name(),
            ),
            Span::single(buf.offset()),
        ))?;

    let mut triangles = Vec::new();

    for _ in 0..count {
        let n = read_list_len::<B, _>(buf, len_type)? as usize;

        // Too few indices for a triangle. The indices still have to be
        // consumed, or the cursor for every following record would be off.
        if n < 3 {
            buf.skip(n * item_type.len())?;
            continue;
        }

        let mut indices = SmallVec::<[i32; 4]>::new();
        for _ in 0..n {
            indices.push(item_type.read::<B>(buf)?);
        }

        fan_triangulate(&indices, &mut triangles);
    }

    Ok(triangles)
}
