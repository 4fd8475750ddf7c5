//! Trivia attached to values

use serde::{Serialize, Serializer};

use crate::deck::token::{ToDeckString, Token};

/// Whitespace, comments and continuation markers following a value
///
/// Padding never takes part in equality of two trees.
#[derive(Debug, Clone, Default)]
pub struct PaddingNode {
    tokens: Vec<Token>,
}

impl PaddingNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only the trivia tokens of `tokens`
    pub fn from_tokens(tokens: impl IntoIterator<Item = Token>) -> Self {
        PaddingNode {
            tokens: tokens.into_iter().filter(Token::is_trivia).collect(),
        }
    }

    /// A single blank
    pub fn space() -> Self {
        PaddingNode {
            tokens: vec![Token::Space(" ".to_string())],
        }
    }

    pub fn push(&mut self, token: Token) {
        if token.is_trivia() {
            self.tokens.push(token);
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// True when the last token is a `$` comment
    pub fn ends_in_comment(&self) -> bool {
        matches!(self.tokens.last(), Some(Token::DollarComment(_)))
    }

    /// A line break followed by the five-blank continuation indent
    pub fn push_continuation(&mut self) {
        self.tokens.push(Token::Newline);
        self.tokens.push(Token::Space("     ".to_string()));
    }

    pub fn has_newline(&self) -> bool {
        self.tokens
            .iter()
            .any(|t| matches!(t, Token::Newline | Token::CommentLine(_)))
    }

    /// Text of the `$` comments, without the `$`
    pub fn comments(&self) -> Vec<&str> {
        self.tokens
            .iter()
            .filter_map(|t| match t {
                Token::DollarComment(text) => Some(text[1..].trim()),
                _ => None,
            })
            .collect()
    }

    pub fn format(&self) -> String {
        self.tokens.iter().map(ToDeckString::to_deck_string).collect()
    }
}

impl PartialEq for PaddingNode {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Serialize for PaddingNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.format())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::lexing::tokenize;

    fn padding(source: &str) -> PaddingNode {
        PaddingNode::from_tokens(tokenize(source).into_iter().map(|(t, _)| t))
    }

    #[test]
    fn test_format_keeps_every_byte() {
        let pad = padding("  $ outer\n     ");
        assert_eq!(pad.format(), "  $ outer\n     ");
        assert!(pad.has_newline());
        assert_eq!(pad.comments(), vec!["outer"]);
    }

    #[test]
    fn test_non_trivia_is_dropped() {
        let pad = padding(" 1 ");
        assert_eq!(pad.format(), "  ");
    }

    #[test]
    fn test_padding_does_not_affect_equality() {
        assert_eq!(padding(" "), padding("   $ differs"));
    }
}
