use std::{
    fmt,
    io,
    ops,
};

use failure::Fail;


pub(crate) mod buf;


/// Abstraction over a stream of input data.
///
/// Implementors offer a lookahead window into the stream (via the `Deref`
/// impl) which can be extended with `prepare` and shrunk from the front
/// with `consume`. All provided methods are built on top of these
/// primitives, so both the header/ASCII line handling and the binary body
/// reads advance one shared cursor.
pub(crate) trait Input: io::Read + ops::Deref<Target = [u8]> {
    /// Makes sure at least `num_bytes` unconsumed bytes are available.
    /// Errors with `UnexpectedEof` if the stream ends too early.
    fn prepare(&mut self, num_bytes: usize) -> Result<(), Error>;

    /// Like `prepare`, but simply stops at the end of the stream instead
    /// of returning an error.
    fn saturating_prepare(&mut self, num_bytes: usize) -> Result<(), Error>;

    /// Drops `num_bytes` bytes from the front of the lookahead window.
    /// They have to be available already.
    fn consume(&mut self, num_bytes: usize);

    /// Returns `true` if all input was consumed.
    fn is_eof(&mut self) -> Result<bool, Error>;

    /// The global offset of the cursor from the start of the stream. Used
    /// for error spans.
    fn offset(&self) -> usize;

    fn spanned_data(&self, num_bytes: usize) -> SpannedData<'_> {
        SpannedData {
            data: &self[..num_bytes],
            span: Span::new(self.offset(), self.offset() + num_bytes),
        }
    }

    /// Consumes `num_bytes` bytes without looking at them.
    fn skip(&mut self, num_bytes: usize) -> Result<(), Error> {
        self.prepare(num_bytes)?;
        self.consume(num_bytes);

        Ok(())
    }

    /// Prepares `num_bytes` bytes, passes them to `func` and consumes them
    /// afterwards.
    fn with_bytes<F, O>(&mut self, num_bytes: usize, func: F) -> Result<O, Error>
    where
        F: FnOnce(SpannedData) -> Result<O, Error>,
    {
        self.prepare(num_bytes)?;
        let out = func(self.spanned_data(num_bytes))?;
        self.consume(num_bytes);

        Ok(out)
    }

    /// Reads one line, passes it to `func` and consumes it including its
    /// terminator.
    ///
    /// A line ends at `'\n'` or at the end of the stream, whichever comes
    /// first; a trailing `'\r'` is stripped, so both `\n` and `\r\n` line
    /// endings work and the last line does not need a terminator. Returns
    /// `Ok(None)` if no bytes are left at all.
    fn take_line<F, O>(&mut self, func: F) -> Result<Option<O>, Error>
    where
        F: FnOnce(SpannedData) -> Result<O, Error>,
    {
        if self.is_eof()? {
            return Ok(None);
        }

        let mut pos = 0;
        let mut saw_newline = false;
        loop {
            if self.len() <= pos {
                self.saturating_prepare(pos + 1)?;
                if self.len() <= pos {
                    break;
                }
            }

            if self[pos] == b'\n' {
                saw_newline = true;
                break;
            }

            pos += 1;
        }

        let mut line_end = pos;
        if line_end > 0 && self[line_end - 1] == b'\r' {
            line_end -= 1;
        }

        let out = func(self.spanned_data(line_end))?;
        self.consume(pos + saw_newline as usize);

        Ok(Some(out))
    }
}

/// A slice of input data with its position in the stream attached.
#[derive(Debug)]
pub struct SpannedData<'a> {
    pub data: &'a [u8],
    pub span: Span,
}

impl<'a> SpannedData<'a> {
    pub fn assert_ascii(&self) -> Result<&'a str, Error> {
        if !self.data.is_ascii() {
            Err(Error::NotAscii(self.span))
        } else {
            Ok(std::str::from_utf8(self.data).unwrap())
        }
    }
}

/// A byte range in the input stream.
#[derive(Clone, Copy, Debug)]
pub struct Span {
    lo: usize,
    hi: usize,
}

impl Span {
    pub fn new(lo: usize, hi: usize) -> Self {
        Self { lo, hi }
    }

    pub fn single(at: usize) -> Self {
        Self {
            lo: at,
            hi: at + 1,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}..{}", self.lo, self.hi)
    }
}

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "IO error: {}", _0)]
    Io(io::Error),

    #[fail(display = "unexpected EOF while parsing (at {})", _0)]
    UnexpectedEof(usize),

    #[fail(display = "unexpected non-ASCII data at {}", _0)]
    NotAscii(Span),

    #[fail(
        display = "parsing lookahead got too big (due to a really degenerated \
            file or a parser bug)"
    )]
    LookAheadTooBig,

    #[fail(display = "{} (at {})", _0, _1)]
    Custom(String, Span),
}

impl From<io::Error> for Error {
    fn from(src: io::Error) -> Self {
        Error::Io(src)
    }
}
