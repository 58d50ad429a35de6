//! Property-based tests for wikiparse.
//!
//! These tests use proptest to generate random markup and verify that
//! streaming and whole-input parsing agree, that the parser never panics,
//! and that reparsing is deterministic.

use std::io;

use proptest::prelude::*;

use wikiparse_core::{ErrorCode, ParseMode, ParserConfig, Token, TokenType};
use wikiparse_parser::{ChunkReader, WikiBuffer, WikiParser, Writer};
use wikiparse_render::HtmlRenderer;

/// Token triples and the concatenated text, in order.
#[derive(Debug, Default, PartialEq, Eq)]
struct Outline {
    tokens: Vec<(TokenType, bool, u32, Option<Vec<u8>>)>,
    text: Vec<u8>,
}

impl Writer for Outline {
    fn write_text(&mut self, text: &[u8]) -> io::Result<()> {
        self.text.extend_from_slice(text);
        Ok(())
    }

    fn write_token(&mut self, token: &Token<'_>) -> io::Result<()> {
        let span = token.text.or(token.target).map(<[u8]>::to_vec);
        self.tokens.push((token.kind, token.state, token.value, span));
        Ok(())
    }
}

/// Generate a line of markup-heavy text.
fn markup_line() -> impl Strategy<Value = String> {
    prop::string::string_regex(r"[ a-z=*#/|\[\]{}<>~:;\\_^,@$%-]{0,40}").unwrap()
}

/// Generate a document of markup lines.
fn document() -> impl Strategy<Value = String> {
    prop::collection::vec(markup_line(), 0..12).prop_map(|lines| lines.join("\n"))
}

fn config() -> impl Strategy<Value = ParserConfig> {
    (any::<bool>(), any::<bool>(), any::<bool>())
        .prop_map(|(additions, blog, mono)| ParserConfig::new(additions, blog, mono))
}

fn mode() -> impl Strategy<Value = ParseMode> {
    prop_oneof![Just(ParseMode::Block), Just(ParseMode::Inline)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Streaming in any chunk size matches a whole-input parse, or reports
    /// that a token outgrew a small buffer.
    #[test]
    fn stream_matches_string(
        input in document(),
        config in config(),
        mode in mode(),
        chunk in 1usize..32,
        capacity in 1usize..96,
    ) {
        let mut whole = WikiParser::with_config(config, Outline::default());
        if whole.parse_string(input.as_bytes(), mode).is_ok() {
            let expected = whole.into_user_data();

            let mut streamed = WikiParser::with_config(config, Outline::default());
            let mut buffer = WikiBuffer::new(capacity);
            let mut reader = ChunkReader::new(input.as_bytes(), chunk);
            match streamed.parse_stream(&mut buffer, &mut reader, mode) {
                Ok(()) => prop_assert_eq!(&streamed.into_user_data(), &expected),
                Err(err) => {
                    prop_assert!(capacity < input.len(), "{}", err);
                    prop_assert_eq!(err.code(), Some(ErrorCode::Buffer));
                }
            }

            // a buffer as large as the input always suffices
            let mut streamed = WikiParser::with_config(config, Outline::default());
            let mut buffer = WikiBuffer::new(input.len().max(1));
            let mut reader = ChunkReader::new(input.as_bytes(), chunk);
            let result = streamed.parse_stream(&mut buffer, &mut reader, mode);
            prop_assert!(result.is_ok(), "{:?}", result);
            prop_assert_eq!(streamed.into_user_data(), expected);
        }
    }

    /// Arbitrary bytes never panic, in either parse mode or buffer size.
    #[test]
    fn never_panics(
        input in prop::collection::vec(any::<u8>(), 0..512),
        config in config(),
        mode in mode(),
        capacity in 1usize..64,
        chunk in 1usize..16,
    ) {
        let mut parser = WikiParser::with_config(config, HtmlRenderer::new(Vec::new()));
        let _ = parser.parse_string(&input, mode);

        let mut buffer = WikiBuffer::new(capacity);
        let mut reader = ChunkReader::new(&input, chunk);
        let _ = parser.parse_stream(&mut buffer, &mut reader, mode);
    }

    /// Two fresh parsers produce identical output for the same bytes.
    #[test]
    fn reparse_is_identical(input in document(), config in config()) {
        let mut first = WikiParser::with_config(config, Outline::default());
        let mut second = WikiParser::with_config(config, Outline::default());
        let a = first.parse_string(input.as_bytes(), ParseMode::Block).map_err(|e| e.to_string());
        let b = second.parse_string(input.as_bytes(), ParseMode::Block).map_err(|e| e.to_string());
        prop_assert_eq!(a, b);
        prop_assert_eq!(first.into_user_data(), second.into_user_data());
    }

    /// Paired tokens always come back balanced after a successful parse.
    #[test]
    fn paired_tokens_balance(input in document(), config in config()) {
        let mut parser = WikiParser::with_config(config, Outline::default());
        if parser.parse_string(input.as_bytes(), ParseMode::Block).is_ok() {
            let mut stack = Vec::new();
            for (kind, state, value, _) in &parser.user_data().tokens {
                if !kind.is_paired() {
                    continue;
                }
                if *state {
                    stack.push((*kind, *value));
                } else {
                    prop_assert_eq!(stack.pop(), Some((*kind, *value)));
                }
            }
            prop_assert!(stack.is_empty());
        }
    }
}
