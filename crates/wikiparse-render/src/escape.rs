//! HTML escaping.
//!
//! Replaces `&`, `<`, `>` and `"` with their entities. Every other byte is
//! copied through unchanged, so invalid UTF-8 in the input stays invalid in
//! the output rather than being replaced.

use std::io::{self, Write};

/// Entity for a byte that must not appear raw in HTML text or attributes.
fn entity(byte: u8) -> Option<&'static [u8]> {
    match byte {
        b'&' => Some(b"&amp;"),
        b'<' => Some(b"&lt;"),
        b'>' => Some(b"&gt;"),
        b'"' => Some(b"&quot;"),
        _ => None,
    }
}

/// Write `bytes` to `out`, escaping HTML metacharacters.
pub fn write_escaped<W: Write + ?Sized>(out: &mut W, bytes: &[u8]) -> io::Result<()> {
    let mut start = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        if let Some(entity) = entity(byte) {
            out.write_all(&bytes[start..i])?;
            out.write_all(entity)?;
            start = i + 1;
        }
    }
    out.write_all(&bytes[start..])
}

/// Escape `text` into a new string.
///
/// # Example
///
/// ```
/// use wikiparse_render::escape_html;
/// assert_eq!(escape_html("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
/// ```
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
