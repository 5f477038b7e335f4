use std::{
    cmp::{max, min},
    fmt,
    io::{self, Read},
    ops,
};

use super::{Error, Input};


/// The initial size of the buffer in bytes.
const START_BUFFER_SIZE: usize = 8 * 1024;

/// The maximum size the internal buffer can grow to.
///
/// The buffer only needs to hold one parse entity at a time (a header
/// line, one binary value, ...), which is almost always tiny. Hitting this
/// limit means the input is degenerate or the parser has a bug, so instead
/// of growing without bounds we fail with `LookAheadTooBig`.
const MAX_BUFFER_SIZE: usize = 4 * 1024 * 1024;

static_assertions::const_assert!(MAX_BUFFER_SIZE <= u32::max_value() as usize);


/// An implementation of [`Input`] that reads from an `io::Read` through a
/// growable internal buffer.
pub(crate) struct Buffer<R: Read> {
    reader: R,

    buf: Vec<u8>,

    /// Index of the first byte in `buf` holding real data. Invariants:
    /// `start <= end` and `start < buf.len()`.
    start: usize,

    /// Index of the byte after the last byte of real data. Invariants:
    /// `start <= end <= buf.len()`.
    end: usize,

    consumed_total: usize,
}

impl<R: Read> fmt::Debug for Buffer<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Buffer {{ consumed_total: {}, .. }}", self.consumed_total)
    }
}

impl<R: Read> Buffer<R> {
    pub(crate) fn new(reader: R) -> Result<Self, Error> {
        let mut out = Self {
            buf: vec![0; START_BUFFER_SIZE],
            reader,
            start: 0,
            end: 0,
            consumed_total: 0,
        };

        // Read once to prefill the buffer.
        out.fill_buf()?;

        Ok(out)
    }

    fn len(&self) -> usize {
        self.end - self.start
    }

    fn cap(&self) -> usize {
        self.buf.len()
    }

    fn raw_buf(&self) -> &[u8] {
        &self.buf[self.start..self.end]
    }

    /// Reads some new data to the back of the buffer. `self.end` must not
    /// be equal to `self.cap()`.
    fn fill_buf(&mut self) -> Result<usize, io::Error> {
        let n = self.reader.read(&mut self.buf[self.end..])?;
        self.end += n;

        Ok(n)
    }

    /// Makes room for at least `additional` more bytes at the back of the
    /// buffer, either by moving the buffered data to the front or by
    /// growing the buffer.
    fn grow_buf(&mut self, additional: usize) -> Result<(), Error> {
        let space_after = self.cap() - self.end;
        let space_before = self.start;

        if space_after >= additional {
            return Ok(());
        }

        // Moving data to the front only pays off if it makes enough room
        // and the data to move is small compared to the buffer (otherwise
        // alternating small and large reads would copy most of the buffer
        // over and over again).
        if space_after + space_before >= additional && self.len() < self.cap() / 2 {
            // A `for` loop instead of `ptr::copy` to avoid `unsafe`.
            for i in self.start..self.end {
                self.buf[i - self.start] = self.buf[i];
            }
        } else {
            if self.len() + additional > MAX_BUFFER_SIZE {
                return Err(Error::LookAheadTooBig);
            }

            // At least the current length plus `additional`, but no less
            // than twice the current size to keep reallocations rare.
            let new_len = min(
                max(self.len() + additional, self.buf.len() * 2),
                MAX_BUFFER_SIZE,
            );

            // `Vec::resize` would copy the bytes around anyway, so we use
            // the occasion to move our data to the front at the same time.
            let mut new = Vec::with_capacity(new_len);
            new.extend_from_slice(self.raw_buf());
            new.resize(new_len, 0);
            self.buf = new;
        }

        // In both cases, the data starts at the very beginning now.
        self.end -= self.start;
        self.start = 0;

        Ok(())
    }

    /// Reads until `additional` new bytes were added to the buffer or the
    /// underlying reader is exhausted, whichever comes first.
    fn fill_buf_by(&mut self, additional: usize) -> Result<usize, Error> {
        self.grow_buf(additional)?;

        let mut bytes_read = 0;
        while bytes_read < additional {
            match self.reader.read(&mut self.buf[self.end + bytes_read..]) {
                // `grow_buf` made sure the slice we read into is not
                // empty, so 0 means the reader is exhausted.
                Ok(0) => break,
                Ok(n) => bytes_read += n,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }

        self.end += bytes_read;
        Ok(bytes_read)
    }
}

impl<R: Read> Read for Buffer<R> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, io::Error> {
        if self.len() == 0 {
            // For reads bigger than our internal buffer it's not worth
            // going through it.
            if buf.len() >= self.cap() {
                let n = self.reader.read(buf)?;
                self.consumed_total += n;
                return Ok(n);
            } else {
                self.fill_buf()?;
            }
        }

        let n = min(self.len(), buf.len());
        buf[..n].copy_from_slice(&self.raw_buf()[..n]);
        self.consume(n);

        Ok(n)
    }
}

impl<R: Read> ops::Deref for Buffer<R> {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        self.raw_buf()
    }
}

impl<R: Read> Input for Buffer<R> {
    fn prepare(&mut self, num_bytes: usize) -> Result<(), Error> {
        if self.len() < num_bytes {
            let diff = num_bytes - self.len();
            let bytes_read = self.fill_buf_by(diff)?;

            if bytes_read < diff {
                return Err(Error::UnexpectedEof(self.offset() + self.len()));
            }
        }

        Ok(())
    }

    fn saturating_prepare(&mut self, num_bytes: usize) -> Result<(), Error> {
        if self.len() < num_bytes {
            let diff = num_bytes - self.len();
            self.fill_buf_by(diff)?;
        }

        Ok(())
    }

    fn consume(&mut self, num_bytes: usize) {
        assert!(self.start + num_bytes <= self.end);

        self.start += num_bytes;
        self.consumed_total += num_bytes;

        // If everything was consumed, both indices reset to the front so
        // the next fill has the whole buffer available.
        if self.start == self.end {
            self.start = 0;
            self.end = 0;
        }
    }

    fn is_eof(&mut self) -> Result<bool, Error> {
        if self.len() == 0 {
            self.grow_buf(1)?;
            Ok(self.fill_buf()? == 0)
        } else {
            Ok(false)
        }
    }

    fn offset(&self) -> usize {
        self.consumed_total
    }
}
