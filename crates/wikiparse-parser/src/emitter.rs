//! Token emitter: turns recognized spans into writer callbacks.

use std::io;

use log::{debug, trace};
use wikiparse_core::{ErrorCode, ParseStats, Token, TokenType};

use crate::io::Writer;

/// Forwards scanner output to the caller's writer and counts callbacks.
///
/// Any writer failure is reported as [`ErrorCode::Writer`]; the scanner stops
/// at the first one.
pub(crate) struct Emitter<'a, W: ?Sized> {
    writer: &'a mut W,
    stats: &'a mut ParseStats,
}

impl<'a, W: Writer + ?Sized> Emitter<'a, W> {
    pub fn new(writer: &'a mut W, stats: &'a mut ParseStats) -> Self {
        Self { writer, stats }
    }

    /// Deliver a text run. Empty runs are dropped.
    pub fn text(&mut self, text: &[u8]) -> Result<(), ErrorCode> {
        if text.is_empty() {
            return Ok(());
        }
        self.writer.write_text(text).map_err(writer_failed)?;
        self.stats.text_runs += 1;
        Ok(())
    }

    /// Deliver a typed token.
    pub fn token(&mut self, token: &Token<'_>) -> Result<(), ErrorCode> {
        trace!("emit {} state={} value={}", token.kind, token.state, token.value);
        self.writer.write_token(token).map_err(writer_failed)?;
        self.stats.tokens += 1;
        Ok(())
    }

    pub fn open(&mut self, kind: TokenType, value: u32) -> Result<(), ErrorCode> {
        self.token(&Token::new(kind).with_state(true).with_value(value))
    }

    pub fn close(&mut self, kind: TokenType, value: u32) -> Result<(), ErrorCode> {
        self.token(&Token::new(kind).with_state(false).with_value(value))
    }

    /// Deliver a token with no spans.
    pub fn leaf(&mut self, kind: TokenType) -> Result<(), ErrorCode> {
        self.token(&Token::new(kind))
    }
}

fn writer_failed(err: io::Error) -> ErrorCode {
    debug!("writer failed: {}", err);
    ErrorCode::Writer
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl Writer for Failing {
        fn write_token(&mut self, _token: &Token<'_>) -> io::Result<()> {
            Err(io::Error::other("closed"))
        }
    }

    #[derive(Default)]
    struct Collect(Vec<String>);

    impl Writer for Collect {
        fn write_text(&mut self, text: &[u8]) -> io::Result<()> {
            self.0.push(String::from_utf8_lossy(text).into_owned());
            Ok(())
        }

        fn write_token(&mut self, token: &Token<'_>) -> io::Result<()> {
            self.0.push(format!("{}:{}:{}", token.kind, token.state, token.value));
            Ok(())
        }
    }

    #[test]
    fn test_counts_callbacks() {
        let mut writer = Collect::default();
        let mut stats = ParseStats::new();
        let mut out = Emitter::new(&mut writer, &mut stats);

        out.open(TokenType::Paragraph, 0).unwrap();
        out.text(b"hi").unwrap();
        out.text(b"").unwrap();
        out.close(TokenType::Paragraph, 0).unwrap();

        assert_eq!(stats.tokens, 2);
        assert_eq!(stats.text_runs, 1);
        assert_eq!(
            writer.0,
            vec!["paragraph:true:0", "hi", "paragraph:false:0"]
        );
    }

    #[test]
    fn test_writer_failure_maps_to_code() {
        let mut writer = Failing;
        let mut stats = ParseStats::new();
        let mut out = Emitter::new(&mut writer, &mut stats);

        assert_eq!(out.leaf(TokenType::HorizontalRule), Err(ErrorCode::Writer));
        assert_eq!(out.text(b"x"), Err(ErrorCode::Writer));
        assert_eq!(stats.callbacks(), 0);
    }
}
