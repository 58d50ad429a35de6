//! Reader and writer interfaces.
//!
//! The scanner pulls bytes through a [`Reader`] and pushes results through a
//! [`Writer`]. Both run synchronously on the caller's stack; a failure from
//! either abandons the current parse call.

use std::io;

use wikiparse_core::Token;

/// Source of input bytes for a streaming parse.
pub trait Reader {
    /// Fill `dest` with up to `dest.len()` bytes.
    ///
    /// Returns the number of bytes written; `0` signals end of input.
    fn read(&mut self, dest: &mut [u8]) -> io::Result<usize>;
}

impl<F> Reader for F
where
    F: FnMut(&mut [u8]) -> io::Result<usize>,
{
    fn read(&mut self, dest: &mut [u8]) -> io::Result<usize> {
        self(dest)
    }
}

/// Adapts any [`io::Read`] into a [`Reader`].
///
/// Interrupted reads are retried.
#[derive(Debug)]
pub struct IoReader<R> {
    inner: R,
}

impl<R: io::Read> IoReader<R> {
    /// Wrap a reader.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Unwrap the reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: io::Read> Reader for IoReader<R> {
    fn read(&mut self, dest: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.inner.read(dest) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                other => return other,
            }
        }
    }
}

/// Serves an in-memory byte slice in chunks of at most `chunk` bytes.
#[derive(Debug, Clone)]
pub struct ChunkReader<'a> {
    data: &'a [u8],
    offset: usize,
    chunk: usize,
}

impl<'a> ChunkReader<'a> {
    /// Create a reader over `data`; a `chunk` of zero is treated as one.
    pub fn new(data: &'a [u8], chunk: usize) -> Self {
        Self {
            data,
            offset: 0,
            chunk: chunk.max(1),
        }
    }

    /// Bytes not yet handed out.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }
}

impl Reader for ChunkReader<'_> {
    fn read(&mut self, dest: &mut [u8]) -> io::Result<usize> {
        let n = self.remaining().min(self.chunk).min(dest.len());
        dest[..n].copy_from_slice(&self.data[self.offset..self.offset + n]);
        self.offset += n;
        Ok(n)
    }
}

/// Consumer of scanner output.
///
/// The writer doubles as the parser's user data: the parser owns it and
/// hands it back through its accessors.
pub trait Writer {
    /// Receive a run of literal text.
    ///
    /// The default forwards a [`TokenType::Text`](wikiparse_core::TokenType::Text)
    /// token to [`Writer::write_token`].
    fn write_text(&mut self, text: &[u8]) -> io::Result<()> {
        self.write_token(&Token::text(text))
    }

    /// Receive a typed token.
    fn write_token(&mut self, token: &Token<'_>) -> io::Result<()>;
}

impl<W: Writer + ?Sized> Writer for &mut W {
    fn write_text(&mut self, text: &[u8]) -> io::Result<()> {
        (**self).write_text(text)
    }

    fn write_token(&mut self, token: &Token<'_>) -> io::Result<()> {
        (**self).write_token(token)
    }
}

/// A [`Writer`] built from two callbacks, one for text and one for tokens.
pub struct FnWriter<T, K> {
    text: T,
    token: K,
}

impl<T, K> FnWriter<T, K>
where
    T: FnMut(&[u8]) -> io::Result<()>,
    K: FnMut(&Token<'_>) -> io::Result<()>,
{
    /// Create a writer from a text callback and a token callback.
    pub fn new(text: T, token: K) -> Self {
        Self { text, token }
    }
}

impl<T, K> Writer for FnWriter<T, K>
where
    T: FnMut(&[u8]) -> io::Result<()>,
    K: FnMut(&Token<'_>) -> io::Result<()>,
{
    fn write_text(&mut self, text: &[u8]) -> io::Result<()> {
        (self.text)(text)
    }

    fn write_token(&mut self, token: &Token<'_>) -> io::Result<()> {
        (self.token)(token)
    }
}

impl<T, K> std::fmt::Debug for FnWriter<T, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnWriter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wikiparse_core::TokenType;

    #[test]
    fn test_chunk_reader_respects_chunk_and_dest() {
        let mut reader = ChunkReader::new(b"abcdefg", 3);
        let mut dest = [0u8; 2];
        assert_eq!(Reader::read(&mut reader, &mut dest).unwrap(), 2);
        assert_eq!(&dest, b"ab");

        let mut dest = [0u8; 8];
        assert_eq!(Reader::read(&mut reader, &mut dest).unwrap(), 3);
        assert_eq!(&dest[..3], b"cde");
        assert_eq!(Reader::read(&mut reader, &mut dest).unwrap(), 2);
        assert_eq!(Reader::read(&mut reader, &mut dest).unwrap(), 0);
    }

    #[test]
    fn test_zero_chunk_is_one() {
        let mut reader = ChunkReader::new(b"xy", 0);
        let mut dest = [0u8; 4];
        assert_eq!(Reader::read(&mut reader, &mut dest).unwrap(), 1);
    }

    #[test]
    fn test_io_reader() {
        let mut reader = IoReader::new(&b"hello"[..]);
        let mut dest = [0u8; 16];
        assert_eq!(Reader::read(&mut reader, &mut dest).unwrap(), 5);
        assert_eq!(Reader::read(&mut reader, &mut dest).unwrap(), 0);
    }

    #[test]
    fn test_closure_reader() {
        let mut calls = 0;
        let mut reader = |dest: &mut [u8]| -> io::Result<usize> {
            calls += 1;
            dest[0] = b'z';
            Ok(1)
        };
        let mut dest = [0u8; 1];
        assert_eq!(Reader::read(&mut reader, &mut dest).unwrap(), 1);
        assert_eq!(dest[0], b'z');
        drop(reader);
        assert_eq!(calls, 1);
    }

    struct TokensOnly(Vec<TokenType>);

    impl Writer for TokensOnly {
        fn write_token(&mut self, token: &Token<'_>) -> io::Result<()> {
            self.0.push(token.kind);
            Ok(())
        }
    }

    #[test]
    fn test_default_write_text_forwards_token() {
        let mut writer = TokensOnly(Vec::new());
        writer.write_text(b"abc").unwrap();
        assert_eq!(writer.0, vec![TokenType::Text]);
    }

    #[test]
    fn test_fn_writer() {
        let mut text = Vec::new();
        let mut kinds = Vec::new();
        {
            let mut writer = FnWriter::new(
                |t| {
                    text.extend_from_slice(t);
                    Ok(())
                },
                |tok| {
                    kinds.push(tok.kind);
                    Ok(())
                },
            );
            writer.write_text(b"hi").unwrap();
            writer
                .write_token(&Token::new(TokenType::HorizontalRule))
                .unwrap();
        }
        assert_eq!(text, b"hi");
        assert_eq!(kinds, vec![TokenType::HorizontalRule]);
    }
}
