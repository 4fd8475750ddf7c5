//! Lexing for deck records
//!
//! A record reaches the lexer as one string: its physical lines joined with `\n`.
//! [`tokenize`] runs the logos lexer over it and keeps every byte, mapping runs
//! logos does not recognize to [`Token::Error`] instead of stopping. Splitting a
//! whole deck into records is the job of [`records`].

pub mod records;

use std::ops::Range;

use logos::Logos;

use crate::deck::error::LexicalError;
use crate::deck::token::{RawToken, Token};

pub use records::{read_deck, BlockType, RawInput};

/// A token with its byte range in the record source
pub type TokenSpan = (Token, Range<usize>);

/// Tokenize a record, covering every byte exactly once
pub fn tokenize(source: &str) -> Vec<TokenSpan> {
    let mut tokens: Vec<TokenSpan> = Vec::new();
    let mut offset = 0;
    while let Some(resume) = tokenize_from(source, offset, &mut tokens) {
        offset = resume;
    }
    tokens
}

/// Lex `source[offset..]` onto `tokens`
///
/// Returns the offset to start over from when a bare `c` turned out to begin a
/// data word on the next line (`cond=1`), which is not a comment line.
fn tokenize_from(source: &str, offset: usize, tokens: &mut Vec<TokenSpan>) -> Option<usize> {
    let mut lexer = RawToken::lexer(&source[offset..]);

    while let Some(result) = lexer.next() {
        let local = lexer.span();
        let span = local.start + offset..local.end + offset;
        let text = lexer.slice();
        match result {
            Ok(RawToken::CommentLine) if starts_data_word(text, lexer.remainder()) => {
                // "\n", the indent, then the `c` that is re-lexed as a word
                let word = span.end - 1;
                tokens.push((Token::Newline, span.start..span.start + 1));
                if word > span.start + 1 {
                    let indent = span.start + 1..word;
                    tokens.push((Token::Space(source[indent.clone()].to_string()), indent));
                }
                return Some(word);
            }
            Ok(raw) => tokens.push((Token::from_raw(raw, text), span)),
            Err(()) => match tokens.last_mut() {
                // merge adjacent unrecognized bytes into one error token
                Some((Token::Error(prev), prev_span)) if prev_span.end == span.start => {
                    prev.push_str(text);
                    prev_span.end = span.end;
                }
                _ => tokens.push((Token::Error(text.to_string()), span)),
            },
        }
    }

    None
}

/// A comment line is `c` alone or `c` and a blank; `c` glued to more text is data
fn starts_data_word(comment: &str, rest: &str) -> bool {
    let bare = comment.trim_start_matches(['\n', ' ']).len() == 1;
    bare && !rest.is_empty() && !rest.starts_with(['\n', '\r'])
}

/// Join physical lines into the single source string the lexer works on
pub fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Tokenize and fail on the first unrecognized byte run
pub fn lex(source: &str) -> Result<Vec<TokenSpan>, LexicalError> {
    let tokens = tokenize(source);
    if let Some((Token::Error(text), span)) = tokens.iter().find(|(t, _)| t.is_error()) {
        return Err(LexicalError {
            text: text.clone(),
            span: span.clone(),
        });
    }
    Ok(tokens)
}
