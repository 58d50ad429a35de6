//! Closed enumerations shared by the scanner, the emitter, and writers.
//!
//! These enums name every token kind the scanner can report, every error
//! a parse call can end with, and the two grammar entry points.

use serde::{Deserialize, Serialize};

/// The kind of a reported token.
///
/// Variants are ordered alphabetically after the heading levels, matching the
/// order writers usually switch on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenType {
    /// `= Heading =`
    Heading1,
    /// `== Heading ==`
    Heading2,
    /// `=== Heading ===`
    Heading3,
    /// `==== Heading ====`
    Heading4,
    /// `===== Heading =====`
    Heading5,
    /// `====== Heading ======`
    Heading6,
    /// `**bold**` toggle
    Bold,
    /// `##code##` toggle (additions)
    Code,
    /// `: description` inside a definition list (additions)
    DefinitionDesc,
    /// Definition list container (additions)
    DefinitionList,
    /// `; term` inside a definition list (additions)
    DefinitionTerm,
    /// `----`
    HorizontalRule,
    /// `{{source|text}}`
    Image,
    /// `//italic//` toggle
    Italic,
    /// `@@keyboard@@` toggle (additions)
    Keyboard,
    /// `\\` or a blog-style single newline
    LineBreak,
    /// `[[target|text]]`
    Link,
    /// `*` / `#` list item
    ListItem,
    /// Ordered list container
    OrderedList,
    /// Paragraph container
    Paragraph,
    /// `{{{` block `}}}`
    Preformatted,
    /// `$$sample$$` toggle (additions)
    SampleCode,
    /// `,,subscript,,` toggle (additions)
    Subscript,
    /// `^^superscript^^` toggle (additions)
    Superscript,
    /// Table container
    Table,
    /// `|` data cell
    TableData,
    /// `|=` header cell
    TableHeader,
    /// Table row
    TableRow,
    /// Plain text routed through the token writer
    Text,
    /// `__underline__` toggle (additions)
    Underline,
    /// Unordered list container
    UnorderedList,
    /// `%%variable%%` toggle (additions)
    Variable,
    /// `{{{inline literal}}}`
    NoWiki,
    /// `<<<placeholder>>>`
    Placeholder,
    /// `<<plugin>>`
    Plugin,
}

impl TokenType {
    /// Heading token for a level in `1..=6`.
    pub fn heading(level: usize) -> Option<Self> {
        match level {
            1 => Some(TokenType::Heading1),
            2 => Some(TokenType::Heading2),
            3 => Some(TokenType::Heading3),
            4 => Some(TokenType::Heading4),
            5 => Some(TokenType::Heading5),
            6 => Some(TokenType::Heading6),
            _ => None,
        }
    }

    /// Heading level, if this is a heading.
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            TokenType::Heading1 => Some(1),
            TokenType::Heading2 => Some(2),
            TokenType::Heading3 => Some(3),
            TokenType::Heading4 => Some(4),
            TokenType::Heading5 => Some(5),
            TokenType::Heading6 => Some(6),
            _ => None,
        }
    }

    /// Check if this token opens and closes around other content.
    ///
    /// Containers and inline toggles are reported twice, once with
    /// `state == true` and once with `state == false`.
    pub fn is_paired(&self) -> bool {
        matches!(
            self,
            TokenType::Bold
                | TokenType::Code
                | TokenType::DefinitionDesc
                | TokenType::DefinitionList
                | TokenType::DefinitionTerm
                | TokenType::Italic
                | TokenType::Keyboard
                | TokenType::ListItem
                | TokenType::OrderedList
                | TokenType::Paragraph
                | TokenType::SampleCode
                | TokenType::Subscript
                | TokenType::Superscript
                | TokenType::Table
                | TokenType::TableData
                | TokenType::TableHeader
                | TokenType::TableRow
                | TokenType::Underline
                | TokenType::UnorderedList
                | TokenType::Variable
        )
    }

    /// Check if this is a block-level token.
    pub fn is_block(&self) -> bool {
        self.heading_level().is_some()
            || matches!(
                self,
                TokenType::DefinitionDesc
                    | TokenType::DefinitionList
                    | TokenType::DefinitionTerm
                    | TokenType::HorizontalRule
                    | TokenType::ListItem
                    | TokenType::OrderedList
                    | TokenType::Paragraph
                    | TokenType::Preformatted
                    | TokenType::Table
                    | TokenType::TableData
                    | TokenType::TableHeader
                    | TokenType::TableRow
                    | TokenType::UnorderedList
            )
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(level) = self.heading_level() {
            return write!(f, "heading{}", level);
        }
        let name = match self {
            TokenType::Bold => "bold",
            TokenType::Code => "code",
            TokenType::DefinitionDesc => "definitiondesc",
            TokenType::DefinitionList => "definitionlist",
            TokenType::DefinitionTerm => "definitionterm",
            TokenType::HorizontalRule => "horizontalrule",
            TokenType::Image => "image",
            TokenType::Italic => "italic",
            TokenType::Keyboard => "keyboard",
            TokenType::LineBreak => "linebreak",
            TokenType::Link => "link",
            TokenType::ListItem => "listitem",
            TokenType::OrderedList => "orderedlist",
            TokenType::Paragraph => "paragraph",
            TokenType::Preformatted => "preformatted",
            TokenType::SampleCode => "samplecode",
            TokenType::Subscript => "subscript",
            TokenType::Superscript => "superscript",
            TokenType::Table => "table",
            TokenType::TableData => "tabledata",
            TokenType::TableHeader => "tableheader",
            TokenType::TableRow => "tablerow",
            TokenType::Text => "text",
            TokenType::Underline => "underline",
            TokenType::UnorderedList => "unorderedlist",
            TokenType::Variable => "variable",
            TokenType::NoWiki => "nowiki",
            TokenType::Placeholder => "placeholder",
            TokenType::Plugin => "plugin",
            _ => "heading",
        };
        write!(f, "{}", name)
    }
}

/// Why a parse call failed.
///
/// Set at most once per parse call. [`ErrorCode::None`] means the last call
/// completed cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ErrorCode {
    /// No error
    #[default]
    None,
    /// A single pending token does not fit in the buffer
    Buffer,
    /// Allocation failure
    Memory,
    /// The scanner reached its error state
    Parser,
    /// The marker table or nesting stack is full
    MarkerStack,
    /// The reader reported a failure
    Reader,
    /// A writer reported a failure
    Writer,
    /// Anything else
    Unknown,
}

impl ErrorCode {
    /// Human-readable message for this code.
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::None => "no error",
            ErrorCode::Buffer => "buffer exhausted",
            ErrorCode::Memory => "out of memory",
            ErrorCode::Parser => "parser rejected input",
            ErrorCode::MarkerStack => "marker stack exhausted",
            ErrorCode::Reader => "reader failed",
            ErrorCode::Writer => "writer failed",
            ErrorCode::Unknown => "unknown error",
        }
    }

    /// Check if this code reports a failure.
    pub fn is_error(&self) -> bool {
        *self != ErrorCode::None
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Grammar entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ParseMode {
    /// Document-level markup: headings, lists, tables, paragraphs
    #[default]
    Block,
    /// Inline-only markup; no block tokens are reported
    Inline,
}

impl std::fmt::Display for ParseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseMode::Block => write!(f, "block"),
            ParseMode::Inline => write!(f, "inline"),
        }
    }
}
