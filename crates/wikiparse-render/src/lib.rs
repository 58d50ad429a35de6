//! Wikiparse Render
//!
//! This crate turns the token stream of a wikiparse parser into HTML.
//!
//! # Overview
//!
//! [`HtmlRenderer`] is a [`Writer`]: hand it to a [`WikiParser`] and every
//! token is serialized onto the wrapped [`std::io::Write`] as it arrives.
//! Nothing is buffered beyond what the underlying writer buffers itself.
//!
//! - Text and attribute values are escaped (`& < > "`)
//! - Paired tokens become HTML5 elements (`strong`, `ul`, `td`, ...)
//! - Block elements are followed by a newline
//!
//! # Example
//!
//! ```
//! use wikiparse_parser::{ParseMode, WikiParser};
//! use wikiparse_render::HtmlRenderer;
//!
//! let mut parser = WikiParser::new(HtmlRenderer::new(Vec::new()));
//! parser.parse_string(b"Hello **world**", ParseMode::Block).unwrap();
//!
//! let html = parser.into_user_data().into_inner();
//! assert_eq!(html, b"<p>Hello <strong>world</strong></p>\n");
//! ```

pub mod escape;
pub mod tags;

pub use escape::{escape_html, write_escaped};

use std::io::{self, Write};

use log::trace;
use wikiparse_core::{ParseMode, ParserConfig, Result, Token, TokenType};
use wikiparse_parser::{WikiParser, Writer};

use tags::{breaks_after, paired_element};

/// HTML serializer for wikiparse tokens.
#[derive(Debug)]
pub struct HtmlRenderer<W: Write> {
    /// Output writer
    writer: W,
}

impl<W: Write> HtmlRenderer<W> {
    /// Create a renderer writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Borrow the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Mutably borrow the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Consume the renderer, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn escaped(&mut self, bytes: &[u8]) -> io::Result<()> {
        write_escaped(&mut self.writer, bytes)
    }

    fn paired(&mut self, tag: &str, token: &Token<'_>) -> io::Result<()> {
        if token.state {
            write!(self.writer, "<{}>", tag)?;
        } else {
            write!(self.writer, "</{}>", tag)?;
        }
        if breaks_after(token.kind, token.state) {
            self.writer.write_all(b"\n")?;
        }
        Ok(())
    }

    /// `<tag>text</tag>` around an escaped span.
    fn wrapped(&mut self, open: &str, close: &str, text: &[u8]) -> io::Result<()> {
        self.writer.write_all(open.as_bytes())?;
        self.escaped(text)?;
        self.writer.write_all(close.as_bytes())
    }

    fn link(&mut self, token: &Token<'_>) -> io::Result<()> {
        let target = token.target.unwrap_or_default();
        self.writer.write_all(b"<a href=\"")?;
        self.escaped(target)?;
        self.writer.write_all(b"\">")?;
        self.escaped(token.text.unwrap_or(target))?;
        self.writer.write_all(b"</a>")
    }

    fn image(&mut self, token: &Token<'_>) -> io::Result<()> {
        self.writer.write_all(b"<img src=\"")?;
        self.escaped(token.source.unwrap_or_default())?;
        self.writer.write_all(b"\" alt=\"")?;
        self.escaped(token.text.unwrap_or_default())?;
        self.writer.write_all(b"\">")
    }
}

impl<W: Write> Writer for HtmlRenderer<W> {
    fn write_text(&mut self, text: &[u8]) -> io::Result<()> {
        self.escaped(text)
    }

    fn write_token(&mut self, token: &Token<'_>) -> io::Result<()> {
        trace!("render {} state={} value={}", token.kind, token.state, token.value);

        if let Some(tag) = paired_element(token.kind) {
            return self.paired(tag, token);
        }

        let text = token.text.unwrap_or_default();
        if let Some(level) = token.kind.heading_level() {
            let open = format!("<h{}>", level);
            let close = format!("</h{}>\n", level);
            return self.wrapped(&open, &close, text);
        }

        match token.kind {
            TokenType::Text => self.escaped(text),
            TokenType::LineBreak => self.writer.write_all(b"<br>"),
            TokenType::HorizontalRule => self.writer.write_all(b"<hr>\n"),
            TokenType::Preformatted => self.wrapped("<pre>", "</pre>\n", text),
            TokenType::Link => self.link(token),
            TokenType::Image => self.image(token),
            TokenType::NoWiki if token.state => self.wrapped("<tt>", "</tt>", text),
            TokenType::NoWiki => self.escaped(text),
            TokenType::Placeholder => {
                self.wrapped("<span class=\"placeholder\">", "</span>", text)
            }
            TokenType::Plugin => self.wrapped("<span class=\"plugin\">", "</span>", text),
            _ => Ok(()),
        }
    }
}

/// Parse a complete input and return it as HTML.
///
/// # Example
///
/// ```
/// use wikiparse_core::{ParseMode, ParserConfig};
/// use wikiparse_render::render_html;
///
/// let html = render_html(b"= Title", ParserConfig::default(), ParseMode::Block).unwrap();
/// assert_eq!(html, "<h1>Title</h1>\n");
/// ```
pub fn render_html(input: &[u8], config: ParserConfig, mode: ParseMode) -> Result<String> {
    let mut parser = WikiParser::with_config(config, HtmlRenderer::new(Vec::new()));
    parser.parse_string(input, mode)?;
    let html = parser.into_user_data().into_inner();
    Ok(String::from_utf8_lossy(&html).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html(input: &str) -> String {
        render_html(input.as_bytes(), ParserConfig::default(), ParseMode::Block).unwrap()
    }

    fn render_token(token: Token<'_>) -> String {
        let mut renderer = HtmlRenderer::new(Vec::new());
        renderer.write_token(&token).unwrap();
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn test_heading_and_paragraph() {
        assert_eq!(html("== Title ==\ntext"), "<h2>Title</h2>\n<p>text</p>\n");
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!(html("a < b & c"), "<p>a &lt; b &amp; c</p>\n");
    }

    #[test]
    fn test_nested_list() {
        assert_eq!(
            html("* a\n** b"),
            "<ul>\n<li>a<ul>\n<li>b</li>\n</ul>\n</li>\n</ul>\n"
        );
    }

    #[test]
    fn test_link_attributes_are_escaped() {
        let token = Token::new(TokenType::Link).with_target(b"/q?a=1&b=\"2\"");
        assert_eq!(
            render_token(token),
            "<a href=\"/q?a=1&amp;b=&quot;2&quot;\">/q?a=1&amp;b=&quot;2&quot;</a>"
        );
    }

    #[test]
    fn test_image() {
        let token = Token::new(TokenType::Image)
            .with_source(b"cat.png")
            .with_text(b"A cat");
        assert_eq!(render_token(token), "<img src=\"cat.png\" alt=\"A cat\">");

        let token = Token::new(TokenType::Image).with_source(b"cat.png");
        assert_eq!(render_token(token), "<img src=\"cat.png\" alt=\"\">");
    }

    #[test]
    fn test_nowiki_flag() {
        let token = Token::new(TokenType::NoWiki).with_text(b"**x**");
        assert_eq!(render_token(token), "**x**");
        assert_eq!(render_token(token.with_state(true)), "<tt>**x**</tt>");
    }

    #[test]
    fn test_spans() {
        let token = Token::new(TokenType::Placeholder).with_text(b"ph");
        assert_eq!(render_token(token), "<span class=\"placeholder\">ph</span>");
        let token = Token::new(TokenType::Plugin).with_text(b"<x>");
        assert_eq!(render_token(token), "<span class=\"plugin\">&lt;x&gt;</span>");
    }

    #[test]
    fn test_text_token_matches_write_text() {
        assert_eq!(render_token(Token::text(b"a&b")), "a&amp;b");
    }

    #[test]
    fn test_writer_failure_propagates() {
        struct Full;

        impl Write for Full {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::WriteZero, "full"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut parser = WikiParser::new(HtmlRenderer::new(Full));
        let err = parser.parse_string(b"text", ParseMode::Block).unwrap_err();
        assert_eq!(err.code(), Some(wikiparse_core::ErrorCode::Writer));
    }
}
