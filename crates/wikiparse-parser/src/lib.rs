//! Wikiparse Parser
//!
//! A streaming, bounded-buffer scanner for Wiki Creole markup. Input is pulled
//! in chunks from a [`Reader`]; recognized constructs are pushed to a
//! [`Writer`] as typed tokens and plain text runs. No tree is built.
//!
//! # Overview
//!
//! A parse runs entirely on the caller's stack:
//!
//! - the driver asks the [`WikiBuffer`] for free space and the reader fills it
//! - the scanner walks the filled window and reports tokens to the writer
//! - a token left unfinished at the end of the window is moved to the front
//!   of the buffer, together with every position the scanner remembers in it
//!
//! The longest single token must fit in the buffer; a longer one fails the
//! parse with [`ErrorCode::Buffer`].
//!
//! # Example
//!
//! ```
//! use wikiparse_parser::{ChunkReader, FnWriter, ParseMode, WikiBuffer, WikiParser};
//!
//! let mut text = Vec::new();
//! let writer = FnWriter::new(
//!     |run| {
//!         text.extend_from_slice(run);
//!         Ok(())
//!     },
//!     |_token| Ok(()),
//! );
//!
//! let mut parser = WikiParser::new(writer);
//! let mut buffer = WikiBuffer::new(64);
//! let mut reader = ChunkReader::new(b"Hello **world**", 3);
//! parser
//!     .parse_stream(&mut buffer, &mut reader, ParseMode::Block)
//!     .unwrap();
//! drop(parser);
//!
//! assert_eq!(text, b"Hello world");
//! ```

pub mod buffer;
mod driver;
mod emitter;
pub mod io;
pub mod marker;
mod scanner;

pub use buffer::{WikiBuffer, DEFAULT_BUFFER_SIZE};
pub use io::{ChunkReader, FnWriter, IoReader, Reader, Writer};
pub use marker::MARKER_SLOTS;
pub use scanner::NESTING_LIMIT;
pub use wikiparse_core::{
    ErrorCode, ParseMode, ParseStats, ParserConfig, Result, Token, TokenType, WikiError,
};

use log::debug;

use driver::{drive, StreamFeed, StringFeed};
use scanner::Scanner;

// =============================================================================
// Parser handle
// =============================================================================

/// A parser instance.
///
/// Owns its configuration, scanner state, error state, diagnostic counters,
/// and the writer `W`, which doubles as the caller's user data. One parse
/// call runs at a time; a failed call leaves the scan position abandoned but
/// the next call starts fresh.
#[derive(Debug)]
pub struct WikiParser<W> {
    config: ParserConfig,
    scanner: Scanner,
    writer: W,
    error: ErrorCode,
    stats: ParseStats,
}

impl<W: Writer> WikiParser<W> {
    /// Create a parser with the default configuration.
    pub fn new(writer: W) -> Self {
        Self::with_config(ParserConfig::default(), writer)
    }

    /// Create a parser with the given configuration.
    pub fn with_config(config: ParserConfig, writer: W) -> Self {
        Self {
            config,
            scanner: Scanner::new(MARKER_SLOTS),
            writer,
            error: ErrorCode::None,
            stats: ParseStats::new(),
        }
    }

    /// Use a marker table with `slots` entries instead of [`MARKER_SLOTS`].
    pub fn with_marker_slots(mut self, slots: usize) -> Self {
        self.scanner = Scanner::new(slots);
        self
    }

    /// Number of marker slots available to the scanner.
    pub fn marker_slots(&self) -> usize {
        self.scanner.marker_slots()
    }

    /// Set the three feature toggles.
    pub fn configure_options(&mut self, additions: bool, blog_style: bool, monospace: bool) {
        self.config = ParserConfig::new(additions, blog_style, monospace);
    }

    /// Replace the configuration used by subsequent parse calls.
    pub fn set_config(&mut self, config: ParserConfig) {
        self.config = config;
    }

    /// Current configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse input pulled from `reader` through `buffer`.
    ///
    /// Ending inside an unterminated block is not an error in this mode; more
    /// input could have completed it.
    pub fn parse_stream<R: Reader + ?Sized>(
        &mut self,
        buffer: &mut WikiBuffer,
        reader: &mut R,
        mode: ParseMode,
    ) -> Result<()> {
        self.begin(mode);
        debug!(
            "parse_stream: mode={}, buffer={} bytes",
            mode,
            buffer.capacity()
        );
        let mut feed = StreamFeed::new(buffer, reader);
        let outcome = drive(
            &mut feed,
            &mut self.scanner,
            &mut self.writer,
            &mut self.stats,
        );
        self.finish(outcome)
    }

    /// Parse a complete input in one pass.
    ///
    /// Stricter than [`WikiParser::parse_stream`]: the input must end in an
    /// accepting state. A NUL byte is rejected.
    pub fn parse_string(&mut self, text: &[u8], mode: ParseMode) -> Result<()> {
        self.begin(mode);
        debug!("parse_string: mode={}, {} bytes", mode, text.len());
        let mut feed = StringFeed::new(text);
        let outcome = drive(
            &mut feed,
            &mut self.scanner,
            &mut self.writer,
            &mut self.stats,
        );
        self.finish(outcome)
    }

    fn begin(&mut self, mode: ParseMode) {
        self.error = ErrorCode::None;
        self.stats.reset();
        self.scanner.reset(self.config, mode);
    }

    fn finish(&mut self, outcome: std::result::Result<(), ErrorCode>) -> Result<()> {
        match outcome {
            Ok(()) => {
                debug!(
                    "parse finished: {} lines, {} tokens, {} text runs, {} refills",
                    self.scanner.line(),
                    self.stats.tokens,
                    self.stats.text_runs,
                    self.stats.refills
                );
                Ok(())
            }
            Err(code) => {
                self.error = code;
                let line = self.scanner.line();
                debug!("parse failed at line {}: {}", line, code);
                Err(WikiError::Parse { code, line })
            }
        }
    }

    /// Error code of the last parse call.
    pub fn error_code(&self) -> ErrorCode {
        self.error
    }

    /// Message for [`WikiParser::error_code`].
    pub fn error_message(&self) -> &'static str {
        self.error.message()
    }

    /// 1-based input line at the failure point or the current position.
    pub fn current_line(&self) -> usize {
        self.scanner.line()
    }

    /// Counters of the last parse call.
    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    /// The writer.
    pub fn user_data(&self) -> &W {
        &self.writer
    }

    /// The writer, mutably.
    pub fn user_data_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Swap in a new writer, returning the old one.
    pub fn set_user_data(&mut self, writer: W) -> W {
        std::mem::replace(&mut self.writer, writer)
    }

    /// Consume the parser, returning the writer.
    pub fn into_user_data(self) -> W {
        self.writer
    }
}

// =============================================================================
// Tests
// =============================================================================
