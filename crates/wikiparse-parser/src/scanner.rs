//! Resumable scan engine.
//!
//! The [`Scanner`] consumes one [`Window`] at a time and keeps everything it
//! needs to resume in its own fields: the current state, the start of a
//! pending token (`ts`), the start of an unflushed text run, and the marker
//! table. All remembered positions are buffer offsets; the driver rebases
//! them through [`Scanner::relocate`] whenever it compacts the buffer.
//!
//! # Invariants
//!
//! - While a token is pending (`ts` is set) no text run is open, so the
//!   pending token start is always the oldest byte the scanner still needs.
//! - Markers are only pushed at or after `ts`.
//! - Every window is scanned to its end unless the error state is reached or
//!   a writer fails.
//! - Only newlines that are consumed for good advance the line counter; bytes
//!   re-scanned after a fallback never contained one.
//! - A completed token spans at most the window's `max_token` bytes. The
//!   byte after it may lie past that bound when it only confirms the end.

use wikiparse_core::{ErrorCode, ParseMode, ParserConfig, Token, TokenType};

use crate::buffer::Window;
use crate::emitter::Emitter;
use crate::io::Writer;
use crate::marker::{MarkerTable, Slot};

/// Deepest list nesting the scanner tracks.
pub const NESTING_LIMIT: usize = 32;

const MAX_HEADING: u8 = 6;
const RULE_DASHES: u8 = 4;

/// Content start of the pending token.
const CONTENT: Slot = 0;
/// Second remembered position: a link or image `|`, or a preformatted close line.
const SPLIT: Slot = 1;

// =============================================================================
// States
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Start of a line in block mode; leading blanks are skipped.
    LineStart,
    Heading { level: u8 },
    HeadingText { level: u8 },
    Rule { dashes: u8 },
    RuleTail,
    Bullet { kind: TokenType, count: u8 },
    PreOpen { braces: u8 },
    PreOpenTail,
    PreBody { line_start: bool },
    PreClose { braces: u8 },
    PreCloseTail,
    /// Inline content.
    Inline,
    /// First byte of a doubled marker such as `**`.
    Pair(u8),
    Escape,
    LinkOpen,
    Link { piped: bool },
    LinkClose { piped: bool },
    BraceOpen(u8),
    Image { piped: bool },
    ImageClose { piped: bool },
    NoWiki { run: u8 },
    AngleOpen(u8),
    Angle { placeholder: bool, run: u8 },
    CellPipe,
    CellPipeTail { header: bool },
    /// Blanks opening a definition term or description.
    PartBlanks,
    /// Dead end; the parse is rejected.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    None,
    Paragraph,
    List,
    Table,
    DefList,
}

fn is_blank(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\r')
}

fn list_kind(bullet: u8) -> TokenType {
    if bullet == b'#' {
        TokenType::OrderedList
    } else {
        TokenType::UnorderedList
    }
}

/// Token reported for a completed doubled marker.
fn pair_kind(marker: u8) -> TokenType {
    match marker {
        b'*' => TokenType::Bold,
        b'/' => TokenType::Italic,
        b'#' => TokenType::Code,
        b'_' => TokenType::Underline,
        b'^' => TokenType::Superscript,
        b',' => TokenType::Subscript,
        b'@' => TokenType::Keyboard,
        b'$' => TokenType::SampleCode,
        b'%' => TokenType::Variable,
        _ => TokenType::LineBreak,
    }
}

fn trim_blanks_end(text: &[u8]) -> &[u8] {
    let end = text.iter().rposition(|&c| !is_blank(c)).map_or(0, |i| i + 1);
    &text[..end]
}

fn heading_text(raw: &[u8]) -> &[u8] {
    let text = raw.trim_ascii();
    let end = text.iter().rposition(|&c| c != b'=').map_or(0, |i| i + 1);
    text[..end].trim_ascii_end()
}

// =============================================================================
// Scanner
// =============================================================================

/// The resumable recognizer.
#[derive(Debug)]
pub(crate) struct Scanner {
    config: ParserConfig,
    mode: ParseMode,
    cs: State,
    /// Cursor, valid during [`Scanner::exec`].
    p: usize,
    /// Start of the pending token.
    ts: Option<usize>,
    /// End of the pending token, once seen.
    te: Option<usize>,
    /// Longest token the current window may complete.
    max_token: usize,
    /// Start of the text run not yet delivered.
    text_start: Option<usize>,
    markers: MarkerTable,
    /// Byte logically preceding buffer offset zero.
    carry: u8,
    line: usize,
    /// Failure reported by an action, distinct from the error state.
    error: Option<ErrorCode>,
    block: Block,
    lists: Vec<TokenType>,
    toggles: Vec<TokenType>,
    rows: u32,
    cols: u32,
    cell: Option<TokenType>,
    row_open: bool,
    def: Option<TokenType>,
    pending_break: bool,
}

impl Scanner {
    pub fn new(marker_slots: usize) -> Self {
        Self {
            config: ParserConfig::default(),
            mode: ParseMode::Block,
            cs: State::LineStart,
            p: 0,
            ts: None,
            te: None,
            max_token: usize::MAX,
            text_start: None,
            markers: MarkerTable::new(marker_slots),
            carry: b'\n',
            line: 1,
            error: None,
            block: Block::None,
            lists: Vec::new(),
            toggles: Vec::new(),
            rows: 0,
            cols: 0,
            cell: None,
            row_open: false,
            def: None,
            pending_break: false,
        }
    }

    /// Prepare for a fresh parse call.
    pub fn reset(&mut self, config: ParserConfig, mode: ParseMode) {
        let slots = self.markers.capacity();
        *self = Self::new(slots);
        self.config = config;
        self.mode = mode;
        self.cs = match mode {
            ParseMode::Block => State::LineStart,
            ParseMode::Inline => State::Inline,
        };
    }

    pub fn marker_slots(&self) -> usize {
        self.markers.capacity()
    }

    /// 1-based line of the cursor.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn error(&self) -> Option<ErrorCode> {
        self.error
    }

    pub fn in_error_state(&self) -> bool {
        self.cs == State::Error
    }

    /// Whether input may validly end in the current state.
    pub fn is_accepting(&self) -> bool {
        !matches!(
            self.cs,
            State::PreBody { .. } | State::PreClose { .. } | State::Error
        )
    }

    /// Oldest buffer offset still needed: a pending token, or blanks held
    /// back at the end of a table cell or definition part.
    pub fn pending_start(&self) -> Option<usize> {
        self.ts.or(self.text_start)
    }

    /// Rebase every remembered offset onto `origin`.
    pub fn relocate(&mut self, origin: usize) {
        for at in [&mut self.ts, &mut self.te, &mut self.text_start]
            .into_iter()
            .flatten()
        {
            *at -= origin;
        }
        self.markers.relocate(origin);
    }

    /// Scan `window` to its end, resolving pending states when it is the last.
    ///
    /// Failures raised by actions land in the error slot; reaching the error
    /// state is reported through [`Scanner::in_error_state`].
    pub fn exec<W: Writer + ?Sized>(&mut self, window: &Window<'_>, out: &mut Emitter<'_, W>) {
        if let Err(code) = self.run(window, out) {
            if self.error.is_none() {
                self.error = Some(code);
            }
        }
    }

    fn run<W: Writer + ?Sized>(
        &mut self,
        window: &Window<'_>,
        out: &mut Emitter<'_, W>,
    ) -> Result<(), ErrorCode> {
        let data = window.data;
        let pe = window.pe();
        self.p = window.p;
        self.max_token = window.max_token;
        loop {
            while self.p < pe {
                if data[self.p] == 0 {
                    self.cs = State::Error;
                    return Ok(());
                }
                self.step(data, out)?;
            }
            if !window.eof || !self.finish(data, out)? {
                break;
            }
        }
        if self.ts.is_none() {
            self.flush_window(data, pe, out)?;
        }
        let origin = self.pending_start().unwrap_or(pe);
        if origin > 0 {
            self.carry = data[origin - 1];
        }
        Ok(())
    }

    /// Handle the byte under the cursor.
    fn step<W: Writer + ?Sized>(
        &mut self,
        data: &[u8],
        out: &mut Emitter<'_, W>,
    ) -> Result<(), ErrorCode> {
        let p = self.p;
        let c = data[p];
        match self.cs {
            State::LineStart => self.line_start(c, out)?,
            State::Heading { level } => {
                if c == b'=' {
                    self.cs = State::Heading {
                        level: level.saturating_add(1),
                    };
                    self.p += 1;
                } else if level > MAX_HEADING {
                    self.fallback_line(out)?;
                } else {
                    self.mark(p)?;
                    self.cs = State::HeadingText { level };
                }
            }
            State::HeadingText { level } => {
                if c == b'\n' {
                    self.emit_heading(level, data, p, out)?;
                    self.newline();
                    self.cs = State::LineStart;
                } else {
                    self.p += 1;
                }
            }
            State::Rule { dashes } => match c {
                b'-' => {
                    self.cs = State::Rule {
                        dashes: dashes.saturating_add(1),
                    };
                    self.p += 1;
                }
                b'\n' if dashes >= RULE_DASHES => self.rule_line(out)?,
                _ if dashes >= RULE_DASHES && is_blank(c) => {
                    self.cs = State::RuleTail;
                    self.p += 1;
                }
                _ => self.fallback_line(out)?,
            },
            State::RuleTail => match c {
                b'\n' => self.rule_line(out)?,
                _ if is_blank(c) => self.p += 1,
                _ => self.fallback_line(out)?,
            },
            State::Bullet { kind, count } => match c {
                b'*' | b'#' => {
                    self.cs = State::Bullet {
                        kind: list_kind(c),
                        count: count.saturating_add(1),
                    };
                    self.p += 1;
                }
                b' ' | b'\t' if self.accepts_bullet(count) => {
                    self.release(p + 1)?;
                    self.open_item(kind, count as usize, out)?;
                    self.p += 1;
                    self.cs = State::Inline;
                }
                _ => self.fallback_line(out)?,
            },
            State::PreOpen { braces } => match c {
                b'{' if braces < 3 => {
                    self.cs = State::PreOpen { braces: braces + 1 };
                    self.p += 1;
                }
                _ if braces == 3 => self.cs = State::PreOpenTail,
                _ => self.fallback_line(out)?,
            },
            State::PreOpenTail => match c {
                b'\n' => {
                    self.close_blocks(out)?;
                    self.newline();
                    let content = self.p;
                    self.mark(content)?;
                    self.cs = State::PreBody { line_start: true };
                }
                _ if is_blank(c) => self.p += 1,
                _ => self.fallback_line(out)?,
            },
            State::PreBody { line_start } => match c {
                b'}' if line_start => {
                    self.mark(p)?;
                    self.cs = State::PreClose { braces: 0 };
                }
                b'\n' => {
                    self.newline();
                    self.cs = State::PreBody { line_start: true };
                }
                _ => {
                    self.p += 1;
                    self.cs = State::PreBody { line_start: false };
                }
            },
            State::PreClose { braces } => match c {
                b'}' if braces < 3 => {
                    self.cs = State::PreClose { braces: braces + 1 };
                    self.p += 1;
                }
                _ if braces == 3 => self.cs = State::PreCloseTail,
                _ => self.reopen_pre(),
            },
            State::PreCloseTail => match c {
                b'\n' => {
                    self.emit_pre(data, out)?;
                    self.newline();
                    self.cs = State::LineStart;
                }
                _ if is_blank(c) => self.p += 1,
                _ => self.reopen_pre(),
            },
            State::Inline => self.inline(c, data, out)?,
            State::Pair(first) => {
                if c == first {
                    self.release(p + 1)?;
                    self.p += 1;
                    self.cs = State::Inline;
                    match pair_kind(first) {
                        TokenType::LineBreak => out.leaf(TokenType::LineBreak)?,
                        kind => self.toggle(kind, out)?,
                    }
                } else {
                    self.fallback(1);
                }
            }
            State::Escape => {
                if is_blank(c) || c == b'\n' {
                    self.fallback(1);
                } else {
                    self.release(p + 1)?;
                    self.text_start = Some(p);
                    self.p += 1;
                    self.cs = State::Inline;
                }
            }
            State::LinkOpen => {
                if c == b'[' {
                    self.p += 1;
                    self.mark(p + 1)?;
                    self.cs = State::Link { piped: false };
                } else {
                    self.fallback(1);
                }
            }
            State::Link { piped } => match c {
                b'|' if !piped => {
                    self.mark(p)?;
                    self.cs = State::Link { piped: true };
                    self.p += 1;
                }
                b']' => {
                    self.te = Some(p);
                    self.cs = State::LinkClose { piped };
                    self.p += 1;
                }
                b'\n' => self.fallback(2),
                _ => self.p += 1,
            },
            State::LinkClose { piped } => {
                if c == b']' {
                    self.emit_ref(TokenType::Link, piped, data, out)?;
                    self.p += 1;
                    self.cs = State::Inline;
                } else {
                    self.te = None;
                    self.cs = State::Link { piped };
                }
            }
            State::BraceOpen(braces) => match c {
                b'{' if braces == 1 => {
                    self.cs = State::BraceOpen(2);
                    self.p += 1;
                }
                b'{' => {
                    self.p += 1;
                    self.mark(p + 1)?;
                    self.cs = State::NoWiki { run: 0 };
                }
                _ if braces == 1 => self.fallback(1),
                _ => {
                    self.mark(p)?;
                    self.cs = State::Image { piped: false };
                }
            },
            State::Image { piped } => match c {
                b'|' if !piped => {
                    self.mark(p)?;
                    self.cs = State::Image { piped: true };
                    self.p += 1;
                }
                b'}' => {
                    self.te = Some(p);
                    self.cs = State::ImageClose { piped };
                    self.p += 1;
                }
                b'\n' => self.fallback(2),
                _ => self.p += 1,
            },
            State::ImageClose { piped } => {
                if c == b'}' {
                    self.emit_ref(TokenType::Image, piped, data, out)?;
                    self.p += 1;
                    self.cs = State::Inline;
                } else {
                    self.te = None;
                    self.cs = State::Image { piped };
                }
            }
            State::NoWiki { run } => match c {
                b'}' => {
                    self.cs = State::NoWiki {
                        run: run.saturating_add(1),
                    };
                    self.p += 1;
                }
                _ if run >= 3 => {
                    self.emit_span(TokenType::NoWiki, 3, data, p, out)?;
                    self.cs = State::Inline;
                }
                b'\n' => self.fallback(3),
                _ => {
                    self.cs = State::NoWiki { run: 0 };
                    self.p += 1;
                }
            },
            State::AngleOpen(angles) => match c {
                b'<' if angles == 1 => {
                    self.cs = State::AngleOpen(2);
                    self.p += 1;
                }
                b'<' => {
                    self.p += 1;
                    self.mark(p + 1)?;
                    self.cs = State::Angle {
                        placeholder: true,
                        run: 0,
                    };
                }
                _ if angles == 1 => self.fallback(1),
                _ => {
                    self.mark(p)?;
                    self.cs = State::Angle {
                        placeholder: false,
                        run: 0,
                    };
                }
            },
            State::Angle { placeholder, run } => {
                let (kind, need) = angle_kind(placeholder);
                match c {
                    b'>' => {
                        self.cs = State::Angle {
                            placeholder,
                            run: run.saturating_add(1),
                        };
                        self.p += 1;
                    }
                    _ if run >= need => {
                        self.emit_span(kind, need as usize, data, p, out)?;
                        self.cs = State::Inline;
                    }
                    b'\n' => self.fallback(need as usize),
                    _ => {
                        self.cs = State::Angle { placeholder, run: 0 };
                        self.p += 1;
                    }
                }
            }
            State::CellPipe => {
                if c == b'=' {
                    self.p += 1;
                    self.cs = State::CellPipeTail { header: true };
                } else {
                    self.cs = State::CellPipeTail { header: false };
                }
            }
            State::CellPipeTail { header } => match c {
                b'\n' => {
                    // trailing separator: the newline closes the row
                    self.release(p)?;
                    self.cs = State::Inline;
                }
                _ if is_blank(c) => self.p += 1,
                _ => {
                    self.release(p)?;
                    self.open_cell(header, out)?;
                    self.cs = State::Inline;
                }
            },
            State::PartBlanks => {
                if is_blank(c) {
                    self.p += 1;
                } else {
                    self.cs = State::Inline;
                }
            }
            State::Error => self.p = data.len(),
        }
        Ok(())
    }

    /// Resolve the current state at end of input.
    ///
    /// Returns `true` when scanning must continue because a fallback rewound
    /// the cursor or a pending token completed.
    fn finish<W: Writer + ?Sized>(
        &mut self,
        data: &[u8],
        out: &mut Emitter<'_, W>,
    ) -> Result<bool, ErrorCode> {
        let pe = data.len();
        match self.cs {
            State::LineStart | State::Inline => {
                self.flush_part(data, pe, out)?;
                self.close_blocks(out)?;
                return Ok(false);
            }
            State::PreClose { braces: 3 } | State::PreCloseTail => {
                self.emit_pre(data, out)?;
                self.cs = State::LineStart;
            }
            State::PreBody { .. } | State::PreClose { .. } | State::Error => return Ok(false),
            State::Heading { level } if level <= MAX_HEADING => {
                self.mark(pe)?;
                self.emit_heading(level, data, pe, out)?;
                self.cs = State::LineStart;
            }
            State::HeadingText { level } => {
                self.emit_heading(level, data, pe, out)?;
                self.cs = State::LineStart;
            }
            State::Rule { dashes } if dashes >= RULE_DASHES => {
                self.emit_rule(out)?;
                self.cs = State::LineStart;
            }
            State::RuleTail => {
                self.emit_rule(out)?;
                self.cs = State::LineStart;
            }
            State::Heading { .. }
            | State::Rule { .. }
            | State::Bullet { .. }
            | State::PreOpen { .. }
            | State::PreOpenTail => self.fallback_line(out)?,
            State::Pair(_) | State::Escape | State::LinkOpen => self.fallback(1),
            State::Link { .. }
            | State::LinkClose { .. }
            | State::Image { .. }
            | State::ImageClose { .. } => self.fallback(2),
            State::BraceOpen(n) | State::AngleOpen(n) => self.fallback(n as usize),
            State::NoWiki { run } if run >= 3 => {
                self.emit_span(TokenType::NoWiki, 3, data, pe, out)?;
                self.cs = State::Inline;
            }
            State::NoWiki { .. } => self.fallback(3),
            State::Angle { placeholder, run } => {
                let (kind, need) = angle_kind(placeholder);
                if run >= need {
                    self.emit_span(kind, need as usize, data, pe, out)?;
                    self.cs = State::Inline;
                } else {
                    self.fallback(need as usize);
                }
            }
            State::CellPipe | State::CellPipeTail { .. } => {
                self.release(pe)?;
                self.cs = State::Inline;
            }
            State::PartBlanks => self.cs = State::Inline,
        }
        Ok(true)
    }

    // =========================================================================
    // Line level
    // =========================================================================

    fn line_start<W: Writer + ?Sized>(
        &mut self,
        c: u8,
        out: &mut Emitter<'_, W>,
    ) -> Result<(), ErrorCode> {
        match c {
            b'\n' => {
                self.close_blocks(out)?;
                self.newline();
            }
            _ if is_blank(c) => self.p += 1,
            b'=' => self.begin_line(State::Heading { level: 0 }),
            b'-' => self.begin_line(State::Rule { dashes: 0 }),
            b'{' => self.begin_line(State::PreOpen { braces: 0 }),
            b'*' | b'#' => self.begin_line(State::Bullet {
                kind: list_kind(c),
                count: 0,
            }),
            b'|' => {
                self.open_row(out)?;
                self.begin_line(State::CellPipe);
                self.p += 1;
            }
            b';' if self.config.additions => {
                if self.block == Block::DefList {
                    self.close_toggles(out)?;
                    self.close_part(out)?;
                } else {
                    self.close_blocks(out)?;
                    out.open(TokenType::DefinitionList, 0)?;
                    self.block = Block::DefList;
                }
                self.open_part(TokenType::DefinitionTerm, out)?;
                self.p += 1;
                self.cs = State::PartBlanks;
            }
            b':' if self.config.additions && self.block == Block::DefList => {
                self.close_toggles(out)?;
                self.close_part(out)?;
                self.open_part(TokenType::DefinitionDesc, out)?;
                self.p += 1;
                self.cs = State::PartBlanks;
            }
            _ => {
                self.enter_text_line(out)?;
                self.cs = State::Inline;
            }
        }
        Ok(())
    }

    fn begin_line(&mut self, state: State) {
        self.ts = Some(self.p);
        self.cs = state;
    }

    /// Consume a newline.
    fn newline(&mut self) {
        self.line += 1;
        self.p += 1;
    }

    /// The line holds ordinary content: continue or open a text block.
    fn enter_text_line<W: Writer + ?Sized>(
        &mut self,
        out: &mut Emitter<'_, W>,
    ) -> Result<(), ErrorCode> {
        match self.block {
            Block::Paragraph | Block::List => {
                if std::mem::take(&mut self.pending_break) {
                    if self.config.blog_style {
                        out.leaf(TokenType::LineBreak)?;
                    } else {
                        out.text(b"\n")?;
                    }
                }
            }
            _ => {
                self.close_blocks(out)?;
                out.open(TokenType::Paragraph, 0)?;
                self.block = Block::Paragraph;
            }
        }
        Ok(())
    }

    /// A line-level construct did not match: rescan the line as content.
    fn fallback_line<W: Writer + ?Sized>(
        &mut self,
        out: &mut Emitter<'_, W>,
    ) -> Result<(), ErrorCode> {
        self.enter_text_line(out)?;
        self.fallback(0);
        Ok(())
    }

    fn rule_line<W: Writer + ?Sized>(
        &mut self,
        out: &mut Emitter<'_, W>,
    ) -> Result<(), ErrorCode> {
        self.emit_rule(out)?;
        self.newline();
        self.cs = State::LineStart;
        Ok(())
    }

    fn emit_rule<W: Writer + ?Sized>(
        &mut self,
        out: &mut Emitter<'_, W>,
    ) -> Result<(), ErrorCode> {
        self.release(self.p)?;
        self.close_blocks(out)?;
        out.leaf(TokenType::HorizontalRule)
    }

    fn emit_heading<W: Writer + ?Sized>(
        &mut self,
        level: u8,
        data: &[u8],
        end: usize,
        out: &mut Emitter<'_, W>,
    ) -> Result<(), ErrorCode> {
        let content = self.marker(CONTENT)?;
        let kind = TokenType::heading(level as usize).ok_or(ErrorCode::Unknown)?;
        self.release(end)?;
        self.close_blocks(out)?;
        let token = Token::new(kind)
            .with_value(level as u32)
            .with_text(heading_text(&data[content..end]));
        out.token(&token)
    }

    /// A `}}}` line turned out not to close the block.
    fn reopen_pre(&mut self) {
        self.markers.truncate(SPLIT);
        self.cs = State::PreBody { line_start: false };
    }

    fn emit_pre<W: Writer + ?Sized>(
        &mut self,
        data: &[u8],
        out: &mut Emitter<'_, W>,
    ) -> Result<(), ErrorCode> {
        let content = self.marker(CONTENT)?;
        let close = self.marker(SPLIT)?;
        // drop the newline ending the last body line
        let text = if close > content {
            &data[content..close - 1]
        } else {
            &[][..]
        };
        self.release(self.p)?;
        out.token(&Token::new(TokenType::Preformatted).with_text(text))
    }

    fn accepts_bullet(&self, count: u8) -> bool {
        let depth = if self.block == Block::List {
            self.lists.len()
        } else {
            0
        };
        count == 1 || (count as usize) <= depth + 1
    }

    /// Open a list item at `depth`, closing or opening containers around it.
    fn open_item<W: Writer + ?Sized>(
        &mut self,
        kind: TokenType,
        depth: usize,
        out: &mut Emitter<'_, W>,
    ) -> Result<(), ErrorCode> {
        if depth > NESTING_LIMIT {
            return Err(ErrorCode::MarkerStack);
        }
        if self.block == Block::List {
            self.close_toggles(out)?;
            self.pending_break = false;
        } else {
            self.close_blocks(out)?;
            self.block = Block::List;
        }
        while self.lists.len() > depth {
            self.close_level(out)?;
        }
        let value = depth as u32;
        if self.lists.len() == depth {
            out.close(TokenType::ListItem, value)?;
            if let Some(top) = self.lists.last_mut() {
                if *top != kind {
                    out.close(*top, value)?;
                    out.open(kind, value)?;
                    *top = kind;
                }
            }
        } else {
            out.open(kind, value)?;
            self.lists.push(kind);
        }
        out.open(TokenType::ListItem, value)
    }

    fn close_level<W: Writer + ?Sized>(
        &mut self,
        out: &mut Emitter<'_, W>,
    ) -> Result<(), ErrorCode> {
        let value = self.lists.len() as u32;
        if let Some(kind) = self.lists.pop() {
            out.close(TokenType::ListItem, value)?;
            out.close(kind, value)?;
        }
        Ok(())
    }

    fn open_row<W: Writer + ?Sized>(
        &mut self,
        out: &mut Emitter<'_, W>,
    ) -> Result<(), ErrorCode> {
        if self.block != Block::Table {
            self.close_blocks(out)?;
            out.open(TokenType::Table, 0)?;
            self.block = Block::Table;
        }
        self.rows += 1;
        self.cols = 0;
        out.open(TokenType::TableRow, self.rows)?;
        self.row_open = true;
        Ok(())
    }

    fn open_cell<W: Writer + ?Sized>(
        &mut self,
        header: bool,
        out: &mut Emitter<'_, W>,
    ) -> Result<(), ErrorCode> {
        self.close_toggles(out)?;
        self.close_cell(out)?;
        let kind = if header {
            TokenType::TableHeader
        } else {
            TokenType::TableData
        };
        self.cols += 1;
        out.open(kind, self.cols)?;
        self.cell = Some(kind);
        Ok(())
    }

    fn close_cell<W: Writer + ?Sized>(
        &mut self,
        out: &mut Emitter<'_, W>,
    ) -> Result<(), ErrorCode> {
        match self.cell.take() {
            Some(kind) => out.close(kind, self.cols),
            None => Ok(()),
        }
    }

    fn close_row<W: Writer + ?Sized>(
        &mut self,
        out: &mut Emitter<'_, W>,
    ) -> Result<(), ErrorCode> {
        self.close_cell(out)?;
        if std::mem::take(&mut self.row_open) {
            out.close(TokenType::TableRow, self.rows)?;
        }
        Ok(())
    }

    fn open_part<W: Writer + ?Sized>(
        &mut self,
        kind: TokenType,
        out: &mut Emitter<'_, W>,
    ) -> Result<(), ErrorCode> {
        out.open(kind, 0)?;
        self.def = Some(kind);
        Ok(())
    }

    fn close_part<W: Writer + ?Sized>(
        &mut self,
        out: &mut Emitter<'_, W>,
    ) -> Result<(), ErrorCode> {
        match self.def.take() {
            Some(kind) => out.close(kind, 0),
            None => Ok(()),
        }
    }

    /// Close every open block, innermost first.
    fn close_blocks<W: Writer + ?Sized>(
        &mut self,
        out: &mut Emitter<'_, W>,
    ) -> Result<(), ErrorCode> {
        self.close_toggles(out)?;
        self.pending_break = false;
        match std::mem::replace(&mut self.block, Block::None) {
            Block::None => {}
            Block::Paragraph => out.close(TokenType::Paragraph, 0)?,
            Block::List => {
                while !self.lists.is_empty() {
                    self.close_level(out)?;
                }
            }
            Block::Table => {
                self.close_row(out)?;
                out.close(TokenType::Table, 0)?;
                self.rows = 0;
            }
            Block::DefList => {
                self.close_part(out)?;
                out.close(TokenType::DefinitionList, 0)?;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Inline level
    // =========================================================================

    fn inline<W: Writer + ?Sized>(
        &mut self,
        c: u8,
        data: &[u8],
        out: &mut Emitter<'_, W>,
    ) -> Result<(), ErrorCode> {
        let additions = self.config.additions;
        let pending = match c {
            b'\n' => return self.inline_newline(data, out),
            b'/' if self.prev(data) == b':' => None,
            b'*' | b'/' | b'\\' => Some(State::Pair(c)),
            b'#' | b'_' | b'^' | b',' | b'@' | b'$' | b'%' if additions => Some(State::Pair(c)),
            b'[' => Some(State::LinkOpen),
            b'{' => Some(State::BraceOpen(1)),
            b'<' => Some(State::AngleOpen(1)),
            b'~' => Some(State::Escape),
            b'|' if self.block == Block::Table => Some(State::CellPipe),
            b':' if additions && self.def == Some(TokenType::DefinitionTerm) => {
                self.flush_part(data, self.p, out)?;
                self.close_toggles(out)?;
                self.close_part(out)?;
                self.open_part(TokenType::DefinitionDesc, out)?;
                self.p += 1;
                self.cs = State::PartBlanks;
                return Ok(());
            }
            _ => None,
        };
        match pending {
            Some(State::CellPipe) => {
                self.flush_part(data, self.p, out)?;
                self.ts = Some(self.p);
                self.cs = State::CellPipe;
            }
            Some(state) => {
                self.flush(data, self.p, out)?;
                self.ts = Some(self.p);
                self.cs = state;
            }
            None => {
                if self.text_start.is_none() {
                    self.text_start = Some(self.p);
                }
            }
        }
        self.p += 1;
        Ok(())
    }

    fn inline_newline<W: Writer + ?Sized>(
        &mut self,
        data: &[u8],
        out: &mut Emitter<'_, W>,
    ) -> Result<(), ErrorCode> {
        if self.mode == ParseMode::Inline {
            if self.config.blog_style {
                self.flush(data, self.p, out)?;
                out.leaf(TokenType::LineBreak)?;
            } else if self.text_start.is_none() {
                self.text_start = Some(self.p);
            }
            self.newline();
            return Ok(());
        }
        self.flush_part(data, self.p, out)?;
        match self.block {
            Block::Table => {
                self.close_toggles(out)?;
                self.close_row(out)?;
            }
            Block::DefList => {
                self.close_toggles(out)?;
                self.close_part(out)?;
            }
            Block::Paragraph | Block::List => self.pending_break = true,
            Block::None => {}
        }
        self.newline();
        self.cs = State::LineStart;
        Ok(())
    }

    /// Byte before the cursor.
    fn prev(&self, data: &[u8]) -> u8 {
        match self.p.checked_sub(1) {
            Some(at) => data[at],
            None => self.carry,
        }
    }

    /// Open `kind`, or close it if it is already open.
    ///
    /// Toggles opened after `kind` are closed before it and reopened after,
    /// keeping open and close tokens properly nested.
    fn toggle<W: Writer + ?Sized>(
        &mut self,
        kind: TokenType,
        out: &mut Emitter<'_, W>,
    ) -> Result<(), ErrorCode> {
        let Some(at) = self.toggles.iter().rposition(|&k| k == kind) else {
            out.open(kind, 0)?;
            self.toggles.push(kind);
            return Ok(());
        };
        let inner = self.toggles.split_off(at + 1);
        for &k in inner.iter().rev() {
            out.close(k, 0)?;
        }
        self.toggles.pop();
        out.close(kind, 0)?;
        for &k in &inner {
            out.open(k, 0)?;
        }
        self.toggles.extend(inner);
        Ok(())
    }

    fn close_toggles<W: Writer + ?Sized>(
        &mut self,
        out: &mut Emitter<'_, W>,
    ) -> Result<(), ErrorCode> {
        while let Some(kind) = self.toggles.pop() {
            out.close(kind, 0)?;
        }
        Ok(())
    }

    /// Emit a link or image from the pending `[[..]]` or `{{..}}`.
    fn emit_ref<W: Writer + ?Sized>(
        &mut self,
        kind: TokenType,
        piped: bool,
        data: &[u8],
        out: &mut Emitter<'_, W>,
    ) -> Result<(), ErrorCode> {
        let content = self.marker(CONTENT)?;
        let end = self.te.ok_or(ErrorCode::Unknown)?;
        let (first, label) = if piped {
            let pipe = self.marker(SPLIT)?;
            (&data[content..pipe], Some(&data[pipe + 1..end]))
        } else {
            (&data[content..end], None)
        };
        // the closing byte is under the cursor
        self.release(self.p + 1)?;
        let mut token = Token::new(kind);
        token = if kind == TokenType::Image {
            token.with_source(first)
        } else {
            token.with_target(first)
        };
        if let Some(label) = label {
            token = token.with_text(label);
        }
        out.token(&token)
    }

    /// Emit a delimited span whose closing run ends at `end`.
    fn emit_span<W: Writer + ?Sized>(
        &mut self,
        kind: TokenType,
        close_len: usize,
        data: &[u8],
        end: usize,
        out: &mut Emitter<'_, W>,
    ) -> Result<(), ErrorCode> {
        let content = self.marker(CONTENT)?;
        self.release(end)?;
        let token = Token::new(kind)
            .with_state(kind == TokenType::NoWiki && self.config.monospace)
            .with_text(&data[content..end - close_len]);
        out.token(&token)
    }

    // =========================================================================
    // Positions
    // =========================================================================

    fn flush<W: Writer + ?Sized>(
        &mut self,
        data: &[u8],
        end: usize,
        out: &mut Emitter<'_, W>,
    ) -> Result<(), ErrorCode> {
        match self.text_start.take() {
            Some(start) => out.text(&data[start..end]),
            None => Ok(()),
        }
    }

    fn in_part(&self) -> bool {
        self.cell.is_some() || self.def.is_some()
    }

    /// Deliver the text run ending a table cell or definition part without
    /// its trailing blanks.
    fn flush_part<W: Writer + ?Sized>(
        &mut self,
        data: &[u8],
        end: usize,
        out: &mut Emitter<'_, W>,
    ) -> Result<(), ErrorCode> {
        if !self.in_part() {
            return self.flush(data, end, out);
        }
        match self.text_start.take() {
            Some(start) => out.text(trim_blanks_end(&data[start..end])),
            None => Ok(()),
        }
    }

    /// Deliver text at the end of a window.
    ///
    /// Inside a table cell or definition part, trailing blanks stay in the
    /// buffer until the next byte shows whether the part ends after them.
    fn flush_window<W: Writer + ?Sized>(
        &mut self,
        data: &[u8],
        end: usize,
        out: &mut Emitter<'_, W>,
    ) -> Result<(), ErrorCode> {
        let Some(start) = self.text_start else {
            return Ok(());
        };
        if !self.in_part() {
            return self.flush(data, end, out);
        }
        let kept = start + trim_blanks_end(&data[start..end]).len();
        self.text_start = None;
        out.text(&data[start..kept])?;
        if kept < end {
            self.text_start = Some(kept);
        }
        Ok(())
    }

    fn mark(&mut self, at: usize) -> Result<Slot, ErrorCode> {
        self.markers.push(at)
    }

    fn marker(&self, slot: Slot) -> Result<usize, ErrorCode> {
        self.markers.get(slot).ok_or(ErrorCode::Unknown)
    }

    /// The pending token completed just before `end`.
    ///
    /// Fails with [`ErrorCode::Buffer`] when the token is longer than the
    /// window allows.
    fn release(&mut self, end: usize) -> Result<(), ErrorCode> {
        if let Some(start) = self.ts {
            if end - start > self.max_token {
                return Err(ErrorCode::Buffer);
            }
        }
        self.ts = None;
        self.te = None;
        self.markers.clear();
        Ok(())
    }

    /// The pending token did not match: its first `skip` bytes become text
    /// and scanning resumes right after them.
    fn fallback(&mut self, skip: usize) {
        if let Some(start) = self.ts.take() {
            if skip > 0 {
                self.text_start = Some(start);
            }
            self.p = start + skip;
        }
        self.te = None;
        self.markers.clear();
        self.cs = State::Inline;
    }
}

/// Token kind and closing run length for `<<..>>` and `<<<..>>>`.
fn angle_kind(placeholder: bool) -> (TokenType, u8) {
    if placeholder {
        (TokenType::Placeholder, 3)
    } else {
        (TokenType::Plugin, 2)
    }
}
