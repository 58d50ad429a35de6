//! Driver loop shared by streaming and whole-input parsing.
//!
//! A [`Feed`] supplies windows to the scanner and decides what happens to the
//! buffer between windows. [`drive`] runs the scanner over every window and
//! turns the scanner's error state and error slot into an [`ErrorCode`].

use log::{debug, trace, warn};
use wikiparse_core::{ErrorCode, ParseStats};

use crate::buffer::{WikiBuffer, Window};
use crate::emitter::Emitter;
use crate::io::{Reader, Writer};
use crate::scanner::Scanner;

/// Source of scan windows.
pub(crate) trait Feed {
    /// Whether ending in a non-accepting state fails the parse.
    const STRICT: bool;

    /// Next window to scan, or `None` once input is exhausted.
    fn next_window(&mut self) -> Result<Option<Window<'_>>, ErrorCode>;

    /// Prepare the buffer for the next window after a scan.
    fn settle(&mut self, scanner: &mut Scanner, stats: &mut ParseStats);
}

/// Pulls chunks from a [`Reader`] into a [`WikiBuffer`].
pub(crate) struct StreamFeed<'a, R: ?Sized> {
    buffer: &'a mut WikiBuffer,
    reader: &'a mut R,
}

impl<'a, R: Reader + ?Sized> StreamFeed<'a, R> {
    pub fn new(buffer: &'a mut WikiBuffer, reader: &'a mut R) -> Self {
        buffer.clear();
        Self { buffer, reader }
    }
}

impl<R: Reader + ?Sized> Feed for StreamFeed<'_, R> {
    const STRICT: bool = false;

    fn next_window(&mut self) -> Result<Option<Window<'_>>, ErrorCode> {
        let space = self.buffer.free();
        if space == 0 {
            debug!(
                "pending token outgrew the buffer ({} bytes)",
                self.buffer.capacity()
            );
            return Err(ErrorCode::Buffer);
        }
        let cursor = self.buffer.len();
        let read = self.buffer.fill_from(&mut *self.reader).map_err(|err| {
            debug!("reader failed: {}", err);
            ErrorCode::Reader
        })?;
        trace!("read {} of {} free bytes", read, space);
        let window = Window::new(self.buffer.filled(), cursor, read == 0)
            .with_max_token(self.buffer.capacity());
        Ok(Some(window))
    }

    fn settle(&mut self, scanner: &mut Scanner, stats: &mut ParseStats) {
        match scanner.pending_start() {
            None => self.buffer.clear(),
            Some(origin) => {
                scanner.relocate(origin);
                if origin > 0 {
                    self.buffer.compact(origin);
                    stats.compactions += 1;
                    debug!(
                        "compacted buffer: shift {}, kept {} bytes",
                        origin,
                        self.buffer.len()
                    );
                }
            }
        }
    }
}

/// The whole input as a single, final window.
pub(crate) struct StringFeed<'a> {
    data: &'a [u8],
    done: bool,
}

impl<'a> StringFeed<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, done: false }
    }
}

impl Feed for StringFeed<'_> {
    const STRICT: bool = true;

    fn next_window(&mut self) -> Result<Option<Window<'_>>, ErrorCode> {
        if std::mem::replace(&mut self.done, true) {
            return Ok(None);
        }
        Ok(Some(Window::new(self.data, 0, true)))
    }

    fn settle(&mut self, _scanner: &mut Scanner, _stats: &mut ParseStats) {}
}

/// Run `scanner` over every window of `feed`, delivering output to `writer`.
pub(crate) fn drive<F, W>(
    feed: &mut F,
    scanner: &mut Scanner,
    writer: &mut W,
    stats: &mut ParseStats,
) -> Result<(), ErrorCode>
where
    F: Feed,
    W: Writer + ?Sized,
{
    loop {
        let Some(window) = feed.next_window()? else {
            return Ok(());
        };
        let eof = window.eof;
        stats.refills += 1;
        scanner.exec(&window, &mut Emitter::new(writer, stats));

        if scanner.in_error_state() {
            return Err(ErrorCode::Parser);
        }
        if let Some(code) = scanner.error() {
            return Err(code);
        }
        if eof {
            if !scanner.is_accepting() {
                if F::STRICT {
                    return Err(ErrorCode::Parser);
                }
                warn!(
                    "input ended inside an unterminated block at line {}",
                    scanner.line()
                );
            }
            return Ok(());
        }
        feed.settle(scanner, stats);
    }
}
