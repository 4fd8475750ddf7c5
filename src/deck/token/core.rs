//! Token definitions for deck records
//!
//! Lexing happens in two layers. [`RawToken`] is the logos enum: it only names the
//! kind of each byte run. [`Token`] is what the grammar consumes; it owns the text
//! of the run so that shortcut expansion can splice in generated values that never
//! existed in the source.
//!
//! Every byte of a record belongs to exactly one token. Whitespace, newlines,
//! comment lines, `$` comments and `&` continuations are trivia tokens rather than
//! skipped input, so the parser can attach them to the values they follow.
use logos::Logos;

/// Byte-run classification produced by logos
#[derive(Logos, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum RawToken {
    /// `r`, `3r`, `2i`, `1.5m`, `j`, `4j`, `ilog`, `2log`
    #[regex(
        r"[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)?([rRiImMjJ]|[iI]?[lL][oO][gG])",
        priority = 10
    )]
    Shortcut,

    /// Isotope identifier with a library suffix, `1001.80c`. At least four digits
    /// before the dot keeps `1.5m` a shortcut while `1001.50m` stays an isotope.
    #[regex(r"[0-9]{4,6}\.[0-9]+[a-zA-Z]+", priority = 11)]
    Zaid,

    #[regex(
        r"[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?",
        priority = 8
    )]
    Number,

    /// Words such as `imp:n`, `F4:n`, `*1`, `plib`, `80p`
    #[regex(r"[0-9]+[a-zA-Z][a-zA-Z0-9]*", priority = 7)]
    #[regex(r"[a-zA-Z*+][^ \t\r\n=$&()]*", priority = 6)]
    Text,

    /// Geometry operators
    #[regex(r"[:#]")]
    Separator,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("=")]
    Equals,

    #[regex(r"[ \t\r]+")]
    Space,

    #[token("\n")]
    Newline,

    /// A `c` comment line inside a multi-line record, including its leading newline
    #[regex(r"\n {0,4}[cC]([ \t][^\n]*)?", priority = 5)]
    CommentLine,

    #[regex(r"\$[^\n]*")]
    DollarComment,

    /// `&` ends the data of a physical line; the rest of that line is ignored
    #[regex(r"&[^\n]*")]
    Continuation,
}

/// Where a generated value came from
///
/// All values produced by one shortcut share the `group` (the byte offset of the
/// shortcut in its record) and the `raw` spelling of the shortcut.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShortcutMark {
    pub group: usize,
    pub raw: String,
    pub index: usize,
    pub len: usize,
}

impl ShortcutMark {
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.len
    }
}

/// A value spliced in by shortcut expansion. `text` is `None` for jumps.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Generated {
    pub text: Option<String>,
    pub mark: ShortcutMark,
}

/// Tokens as seen by the grammar
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    Number(String),
    Shortcut(String),
    Zaid(String),
    Text(String),
    Separator(String),
    LParen,
    RParen,
    Equals,
    Space(String),
    Newline,
    CommentLine(String),
    DollarComment(String),
    Continuation(String),
    Generated(Generated),
    /// Unrecognized input; the parser reports it as malformed
    Error(String),
}

impl Token {
    pub(crate) fn from_raw(raw: RawToken, text: &str) -> Self {
        let text = text.to_string();
        match raw {
            RawToken::Shortcut => Token::Shortcut(text),
            RawToken::Zaid => Token::Zaid(text),
            RawToken::Number => Token::Number(text),
            RawToken::Text => Token::Text(text),
            RawToken::Separator => Token::Separator(text),
            RawToken::LParen => Token::LParen,
            RawToken::RParen => Token::RParen,
            RawToken::Equals => Token::Equals,
            RawToken::Space => Token::Space(text),
            RawToken::Newline => Token::Newline,
            RawToken::CommentLine => Token::CommentLine(text),
            RawToken::DollarComment => Token::DollarComment(text),
            RawToken::Continuation => Token::Continuation(text),
        }
    }

    /// Whitespace, comments and continuation markers
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            Token::Space(_)
                | Token::Newline
                | Token::CommentLine(_)
                | Token::DollarComment(_)
                | Token::Continuation(_)
        )
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Token::Error(_))
    }

    /// The text of a word token, `None` for trivia and generated values
    pub fn word(&self) -> Option<&str> {
        match self {
            Token::Number(s)
            | Token::Shortcut(s)
            | Token::Zaid(s)
            | Token::Text(s)
            | Token::Separator(s)
            | Token::Error(s) => Some(s),
            Token::LParen => Some("("),
            Token::RParen => Some(")"),
            Token::Equals => Some("="),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<RawToken> {
        RawToken::lexer(source).filter_map(|r| r.ok()).collect()
    }

    #[test]
    fn test_numbers() {
        assert_eq!(kinds("1"), vec![RawToken::Number]);
        assert_eq!(kinds("-0.5"), vec![RawToken::Number]);
        assert_eq!(kinds("1.5e-3"), vec![RawToken::Number]);
        assert_eq!(kinds("+.25E+2"), vec![RawToken::Number]);
    }

    #[test]
    fn test_shortcuts_take_priority_over_words() {
        assert_eq!(kinds("3r"), vec![RawToken::Shortcut]);
        assert_eq!(kinds("R"), vec![RawToken::Shortcut]);
        assert_eq!(kinds("2ilog"), vec![RawToken::Shortcut]);
        assert_eq!(kinds("log"), vec![RawToken::Shortcut]);
        assert_eq!(kinds("1.5m"), vec![RawToken::Shortcut]);
        assert_eq!(kinds("J"), vec![RawToken::Shortcut]);
    }

    #[test]
    fn test_words() {
        assert_eq!(kinds("imp:n"), vec![RawToken::Text]);
        assert_eq!(kinds("F4:n,p"), vec![RawToken::Text]);
        assert_eq!(kinds("*1"), vec![RawToken::Text]);
        assert_eq!(kinds("80p"), vec![RawToken::Text]);
        assert_eq!(kinds("mt1"), vec![RawToken::Text]);
        assert_eq!(kinds("T"), vec![RawToken::Text]);
    }

    #[test]
    fn test_zaid() {
        assert_eq!(kinds("1001.80c"), vec![RawToken::Zaid]);
        assert_eq!(kinds("92235.50m"), vec![RawToken::Zaid]);
        assert_eq!(kinds("1.5m"), vec![RawToken::Shortcut]);
    }

    #[test]
    fn test_trivia() {
        assert_eq!(
            kinds("1 $ note\n     2"),
            vec![
                RawToken::Number,
                RawToken::Space,
                RawToken::DollarComment,
                RawToken::Newline,
                RawToken::Space,
                RawToken::Number
            ]
        );
        assert_eq!(
            kinds("1 &\nc comment\n     2"),
            vec![
                RawToken::Number,
                RawToken::Space,
                RawToken::Continuation,
                RawToken::CommentLine,
                RawToken::Newline,
                RawToken::Space,
                RawToken::Number
            ]
        );
    }

    #[test]
    fn test_parameters() {
        assert_eq!(
            kinds("imp:n=1"),
            vec![RawToken::Text, RawToken::Equals, RawToken::Number]
        );
    }

    #[test]
    fn test_geometry() {
        assert_eq!(
            kinds("(-1:2) #3"),
            vec![
                RawToken::LParen,
                RawToken::Number,
                RawToken::Separator,
                RawToken::Number,
                RawToken::RParen,
                RawToken::Space,
                RawToken::Separator,
                RawToken::Number
            ]
        );
    }
}
