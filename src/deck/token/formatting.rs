//! Detokenizer for deck records
//!
//! Converts a token stream back into source text. Every source token carries its
//! exact spelling, so `detokenize(tokenize(s)) == s` for any input. Generated
//! tokens render as the shortcut that produced them, once per shortcut group,
//! which keeps the round trip exact after expansion too.

use super::core::Token;

/// Trait for converting a token to its string representation
pub trait ToDeckString {
    fn to_deck_string(&self) -> String;
}

impl ToDeckString for Token {
    fn to_deck_string(&self) -> String {
        match self {
            Token::Number(s)
            | Token::Shortcut(s)
            | Token::Zaid(s)
            | Token::Text(s)
            | Token::Separator(s)
            | Token::Space(s)
            | Token::CommentLine(s)
            | Token::DollarComment(s)
            | Token::Continuation(s)
            | Token::Error(s) => s.clone(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
            Token::Equals => "=".to_string(),
            Token::Newline => "\n".to_string(),
            Token::Generated(generated) if generated.mark.is_first() => {
                generated.mark.raw.clone()
            }
            Token::Generated(_) => String::new(),
        }
    }
}

/// Detokenize a stream of tokens into a string
pub fn detokenize(tokens: &[Token]) -> String {
    tokens.iter().map(ToDeckString::to_deck_string).collect()
}
