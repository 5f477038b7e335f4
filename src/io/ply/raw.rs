//! The schema side of the PLY format: the property and element
//! definitions a file header declares, and dynamically typed scalar
//! values decoded from the body.

use std::{
    fmt,
    str::FromStr,
};


/// A primitive PLY type. There are 8 in total: 2 floating point types, 3
/// signed and 3 unsigned integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    Char,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Float,
    Double,
}

impl ScalarType {
    /// Returns the canonical type name used in headers (e.g. `short` for
    /// `i16`). This is simply the variant name in lowercase.
    pub fn ply_type_name(&self) -> &'static str {
        match self {
            ScalarType::Char => "char",
            ScalarType::UChar => "uchar",
            ScalarType::Short => "short",
            ScalarType::UShort => "ushort",
            ScalarType::Int => "int",
            ScalarType::UInt => "uint",
            ScalarType::Float => "float",
            ScalarType::Double => "double",
        }
    }

    /// Returns the number of bytes a value of this type occupies.
    pub fn len(&self) -> ScalarLen {
        match self {
            ScalarType::Char => ScalarLen::One,
            ScalarType::UChar => ScalarLen::One,
            ScalarType::Short => ScalarLen::Two,
            ScalarType::UShort => ScalarLen::Two,
            ScalarType::Int => ScalarLen::Four,
            ScalarType::UInt => ScalarLen::Four,
            ScalarType::Float => ScalarLen::Four,
            ScalarType::Double => ScalarLen::Eight,
        }
    }
}

impl FromStr for ScalarType {
    type Err = ScalarTypeParseError;

    /// Parses a type name as it appears in a header. Both naming schemes
    /// found in the wild are accepted: the classic names (`uchar`,
    /// `float`, ...) and the sized aliases (`uint8`, `float32`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "char" | "int8" => Ok(ScalarType::Char),
            "uchar" | "uint8" => Ok(ScalarType::UChar),
            "short" | "int16" => Ok(ScalarType::Short),
            "ushort" | "uint16" => Ok(ScalarType::UShort),
            "int" | "int32" => Ok(ScalarType::Int),
            "uint" | "uint32" => Ok(ScalarType::UInt),
            "float" | "float32" => Ok(ScalarType::Float),
            "double" | "float64" => Ok(ScalarType::Double),
            other => Err(ScalarTypeParseError(other.to_string())),
        }
    }
}

/// The error emitted when the `FromStr` implementation for `ScalarType`
/// cannot parse the given string.
pub struct ScalarTypeParseError(String);

impl fmt::Display for ScalarTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\" is not a valid PLY scalar type", self.0)
    }
}

impl fmt::Debug for ScalarTypeParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Length of a PLY scalar value in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarLen {
    One = 1,
    Two = 2,
    Four = 4,
    Eight = 8,
}

impl ScalarLen {
    pub fn as_usize(&self) -> usize {
        *self as usize
    }
}

/// The types a list length can be stored in.
///
/// Float lengths make no sense and negative lengths even less, so only
/// the unsigned integer types qualify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListLenType {
    UChar,
    UShort,
    UInt,
}

impl ListLenType {
    pub fn from_scalar_type(ty: ScalarType) -> Option<Self> {
        match ty {
            ScalarType::UChar => Some(ListLenType::UChar),
            ScalarType::UShort => Some(ListLenType::UShort),
            ScalarType::UInt => Some(ListLenType::UInt),
            _ => None,
        }
    }
}

/// The type of a property as declared in the header: either a single
/// scalar or a length-prefixed list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    Scalar(ScalarType),
    List {
        len_type: ScalarType,
        item_type: ScalarType,
    },
}

/// The header definition of one property of an element.
#[derive(Debug, Clone)]
pub struct PropertyDef {
    pub ty: PropertyType,
    pub name: String,
}

/// The header definition of one element group.
///
/// The position of a property within `property_defs` is its ordinal
/// position in the record, which is how ASCII records are indexed.
#[derive(Debug, Clone)]
pub struct ElementDef {
    pub name: String,

    /// Number of elements in this group.
    pub count: u64,

    /// Definitions for all properties of elements in this group, in
    /// declared order.
    pub property_defs: Vec<PropertyDef>,
}

/// The one face property this decoder cares about: the per-face list of
/// vertex indices.
///
/// The types are kept as declared; whether they are usable is only
/// checked once faces are actually decoded.
#[derive(Debug, Clone, Copy)]
pub struct FaceListDef {
    pub len_type: ScalarType,
    pub item_type: ScalarType,
}

/// One decoded scalar value of some PLY type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarValue {
    Char(i8),
    UChar(u8),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Float(f32),
    Double(f64),
}

impl ScalarValue {
    /// Converts the value to `f32` with a plain numeric cast.
    pub fn to_f32(&self) -> f32 {
        match *self {
            ScalarValue::Char(v) => f32::from(v),
            ScalarValue::UChar(v) => f32::from(v),
            ScalarValue::Short(v) => f32::from(v),
            ScalarValue::UShort(v) => f32::from(v),
            ScalarValue::Int(v) => v as f32,
            ScalarValue::UInt(v) => v as f32,
            ScalarValue::Float(v) => v,
            ScalarValue::Double(v) => v as f32,
        }
    }
}
