//! Fixed-capacity input buffer and the scan window over it.
//!
//! A [`WikiBuffer`] holds the unconsumed tail of earlier reads followed by
//! freshly read bytes. Valid bytes always form the prefix `[0, len)`.
//!
//! Storage is one byte larger than the capacity. A pending token that fills
//! the capacity can still take one more byte, which decides whether the
//! token ends there, or a read of zero that reports end of input.

use std::io;

use crate::io::Reader;

/// Default buffer capacity in bytes.
pub const DEFAULT_BUFFER_SIZE: usize = 32768;

/// Byte storage for streaming parses.
///
/// The capacity is fixed at construction and bounds the longest single
/// token the scanner can recognize.
#[derive(Debug, Clone)]
pub struct WikiBuffer {
    data: Box<[u8]>,
    have: usize,
}

impl Default for WikiBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_SIZE)
    }
}

impl WikiBuffer {
    /// Create an empty buffer holding at most `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity + 1].into_boxed_slice(),
            have: 0,
        }
    }

    /// Longest token the buffer can hold, in bytes.
    pub fn capacity(&self) -> usize {
        self.data.len() - 1
    }

    /// Number of valid bytes.
    pub fn len(&self) -> usize {
        self.have
    }

    /// Check if no bytes are held.
    pub fn is_empty(&self) -> bool {
        self.have == 0
    }

    /// Free space after the valid prefix, lookahead byte included.
    pub fn free(&self) -> usize {
        self.data.len() - self.have
    }

    /// The valid prefix.
    pub fn filled(&self) -> &[u8] {
        &self.data[..self.have]
    }

    /// Discard every held byte.
    pub fn clear(&mut self) {
        self.have = 0;
    }

    /// Append bytes from `reader` into the free space.
    ///
    /// Returns the number of bytes read; zero means end of input. A reader
    /// claiming more bytes than it was offered is treated as failed.
    pub(crate) fn fill_from<R: Reader + ?Sized>(&mut self, reader: &mut R) -> io::Result<usize> {
        let space = self.free();
        let read = reader.read(&mut self.data[self.have..])?;
        if read > space {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("reader reported {} bytes for {} bytes of space", read, space),
            ));
        }
        self.have += read;
        Ok(read)
    }

    /// Move `[origin, len)` to the front of the buffer.
    pub(crate) fn compact(&mut self, origin: usize) {
        debug_assert!(origin <= self.have);
        self.data.copy_within(origin..self.have, 0);
        self.have -= origin;
    }
}

/// The scannable range for one scanner invocation.
///
/// `p` is the cursor, `data.len()` the limit. Rebuilt for every refill.
/// `max_token` bounds the span of any token completed in this window.
#[derive(Debug)]
pub(crate) struct Window<'a> {
    pub data: &'a [u8],
    pub p: usize,
    pub eof: bool,
    pub max_token: usize,
}

impl<'a> Window<'a> {
    pub fn new(data: &'a [u8], p: usize, eof: bool) -> Self {
        Self {
            data,
            p,
            eof,
            max_token: usize::MAX,
        }
    }

    pub fn with_max_token(mut self, max_token: usize) -> Self {
        self.max_token = max_token;
        self
    }

    /// Limit of the window.
    pub fn pe(&self) -> usize {
        self.data.len()
    }
}
