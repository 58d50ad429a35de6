//! Core types for wikiparse

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::enums::TokenType;

/// A recognized markup construct.
///
/// Tokens are transient. The byte spans borrow the scanner's buffer and are
/// only valid for the duration of the writer callback that receives them;
/// a writer that needs the data later must copy it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Token kind
    pub kind: TokenType,
    /// Open (`true`) or close (`false`) for paired tokens; a flag otherwise
    pub state: bool,
    /// Heading level, nesting depth, row or column number
    pub value: u32,
    /// Image source
    pub source: Option<&'a [u8]>,
    /// Link target
    pub target: Option<&'a [u8]>,
    /// Text payload
    pub text: Option<&'a [u8]>,
}

impl<'a> Token<'a> {
    /// Create a token with no flag, value, or spans.
    pub fn new(kind: TokenType) -> Self {
        Self {
            kind,
            state: false,
            value: 0,
            source: None,
            target: None,
            text: None,
        }
    }

    /// Create a plain text token.
    pub fn text(text: &'a [u8]) -> Self {
        Self::new(TokenType::Text).with_text(text)
    }

    /// Set the open/close flag.
    pub fn with_state(mut self, state: bool) -> Self {
        self.state = state;
        self
    }

    /// Set the numeric value.
    pub fn with_value(mut self, value: u32) -> Self {
        self.value = value;
        self
    }

    /// Set the source span.
    pub fn with_source(mut self, source: &'a [u8]) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the target span.
    pub fn with_target(mut self, target: &'a [u8]) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the text span.
    pub fn with_text(mut self, text: &'a [u8]) -> Self {
        self.text = Some(text);
        self
    }

    /// Whether this is the opening half of a paired token.
    pub fn is_open(&self) -> bool {
        self.kind.is_paired() && self.state
    }

    /// Text span decoded as UTF-8, replacing invalid sequences.
    pub fn text_lossy(&self) -> Option<Cow<'a, str>> {
        self.text.map(String::from_utf8_lossy)
    }

    /// Target span decoded as UTF-8, replacing invalid sequences.
    pub fn target_lossy(&self) -> Option<Cow<'a, str>> {
        self.target.map(String::from_utf8_lossy)
    }

    /// Source span decoded as UTF-8, replacing invalid sequences.
    pub fn source_lossy(&self) -> Option<Cow<'a, str>> {
        self.source.map(String::from_utf8_lossy)
    }
}

/// Options read by the scanner for one parse call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Enable the markup additions (definition lists, code, keyboard, ...)
    pub additions: bool,
    /// Treat single line breaks as rendered line breaks
    pub blog_style: bool,
    /// Report inline nowiki spans as monospaced
    pub monospace: bool,
}

impl ParserConfig {
    /// Create a config from the three feature toggles.
    pub fn new(additions: bool, blog_style: bool, monospace: bool) -> Self {
        Self {
            additions,
            blog_style,
            monospace,
        }
    }
}
