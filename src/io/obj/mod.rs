//! Everything related to the OBJ (Wavefront) file format.
//!
//! Only the writing side exists, and only the small fixed-grammar subset
//! a converted mesh needs: `v`/`vt`/`vn`/`f` lines plus comments.

mod write;

#[cfg(test)]
mod tests;


pub use self::write::Writer;
