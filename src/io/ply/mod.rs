//! Everything related to the PLY file format.
//!
//! PLY is self-describing: the textual header declares, per element, a
//! typed property layout which the body then follows in one of three
//! encodings. Parsing the header and decoding the body live in
//! [`Reader`]; the schema types it produces are defined in [`raw`].

use std::fmt;


pub mod raw;

mod read;



pub use self::read::Reader;


/// The encoding of a PLY file body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Ascii,
    BinaryBigEndian,
    BinaryLittleEndian,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Encoding::Ascii => "ASCII",
            Encoding::BinaryBigEndian => "binary big endian",
            Encoding::BinaryLittleEndian => "binary little endian",
        }.fmt(f)
    }
}
