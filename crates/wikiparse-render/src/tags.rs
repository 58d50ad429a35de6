//! Token kind to HTML element mapping.

use wikiparse_core::TokenType;

/// Element written for the open and close halves of a paired token.
pub fn paired_element(kind: TokenType) -> Option<&'static str> {
    let tag = match kind {
        TokenType::Bold => "strong",
        TokenType::Italic => "em",
        TokenType::Underline => "u",
        TokenType::Code => "code",
        TokenType::Keyboard => "kbd",
        TokenType::SampleCode => "samp",
        TokenType::Variable => "var",
        TokenType::Subscript => "sub",
        TokenType::Superscript => "sup",
        TokenType::Paragraph => "p",
        TokenType::UnorderedList => "ul",
        TokenType::OrderedList => "ol",
        TokenType::ListItem => "li",
        TokenType::DefinitionList => "dl",
        TokenType::DefinitionTerm => "dt",
        TokenType::DefinitionDesc => "dd",
        TokenType::Table => "table",
        TokenType::TableRow => "tr",
        TokenType::TableHeader => "th",
        TokenType::TableData => "td",
        _ => return None,
    };
    Some(tag)
}

/// Whether a newline follows this half of a paired token.
///
/// Containers whose children are blocks break after opening; every block
/// element breaks after closing.
pub fn breaks_after(kind: TokenType, open: bool) -> bool {
    if open {
        matches!(
            kind,
            TokenType::UnorderedList
                | TokenType::OrderedList
                | TokenType::DefinitionList
                | TokenType::Table
                | TokenType::TableRow
        )
    } else {
        kind.is_block()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_paired_kind_has_an_element() {
        let kinds = [
            TokenType::Bold,
            TokenType::Code,
            TokenType::DefinitionDesc,
            TokenType::DefinitionList,
            TokenType::DefinitionTerm,
            TokenType::Italic,
            TokenType::Keyboard,
            TokenType::ListItem,
            TokenType::OrderedList,
            TokenType::Paragraph,
            TokenType::SampleCode,
            TokenType::Subscript,
            TokenType::Superscript,
            TokenType::Table,
            TokenType::TableData,
            TokenType::TableHeader,
            TokenType::TableRow,
            TokenType::Underline,
            TokenType::UnorderedList,
            TokenType::Variable,
        ];
        for kind in kinds {
            assert!(kind.is_paired());
            assert!(paired_element(kind).is_some(), "{}", kind);
        }
        assert_eq!(paired_element(TokenType::Link), None);
    }

    #[test]
    fn test_breaks() {
        assert!(breaks_after(TokenType::UnorderedList, true));
        assert!(!breaks_after(TokenType::ListItem, true));
        assert!(breaks_after(TokenType::ListItem, false));
        assert!(!breaks_after(TokenType::Bold, false));
        assert!(breaks_after(TokenType::TableData, false));
    }
}
