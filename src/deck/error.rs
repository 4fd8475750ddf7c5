//! Error types for deck parsing, collections and link resolution
//!
//! Parse-time failures (`LexicalError`, `ShortcutError`, syntax errors) are always
//! wrapped into a [`MalformedInputError`] that carries the lines of the record that
//! failed, so a message can be traced back to the deck without re-reading it.
//! Link-phase failures are plain values ([`BrokenObjectLink`]) collected into a
//! report; they only become a [`DeckError`] when the caller asks for strict linking.

use std::fmt;
use std::ops::Range;

use thiserror::Error;

use crate::deck::numbered::EntityKind;

pub type Result<T> = std::result::Result<T, DeckError>;

/// A byte sequence the lexer could not assign to any token
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized input `{text}` at byte {}", .span.start)]
pub struct LexicalError {
    pub text: String,
    pub span: Range<usize>,
}

/// Failures of the numeric shortcut expander
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShortcutError {
    #[error("the repeat shortcut `{word}` must come after a value")]
    NoPreviousValue { word: String },
    #[error("the interpolate shortcut `{word}` must come between two values")]
    MissingBound { word: String },
    #[error("the shortcut `{word}` cannot use the shortcut `{next}` as its upper bound")]
    ShortcutBound { word: String, next: String },
    #[error("the multiply shortcut `{word}` must have a multiplying value")]
    MissingMultiplier { word: String },
    #[error("the multiply shortcut `{word}` must come after a value")]
    NoPreviousNumber { word: String },
    #[error("the log interpolation shortcut `{word}` needs two positive bounds")]
    NonPositiveLogBound { word: String },
    #[error("the shortcut `{word}` stands for more than {limit} values")]
    CountTooLarge { word: String, limit: usize },
}

/// Why a record could not be turned into a syntax tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedKind {
    #[error(transparent)]
    Lexical(#[from] LexicalError),
    #[error(transparent)]
    Shortcut(#[from] ShortcutError),
    #[error("{0}")]
    Syntax(String),
    #[error("{0}")]
    Value(String),
}

/// A record that failed to parse; nothing of it was kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct MalformedInputError {
    pub lines: Vec<String>,
    pub kind: MalformedKind,
}

impl MalformedInputError {
    pub fn new<S: AsRef<str>>(lines: &[S], kind: impl Into<MalformedKind>) -> Self {
        MalformedInputError {
            lines: lines.iter().map(|l| l.as_ref().to_string()).collect(),
            kind: kind.into(),
        }
    }

    pub fn syntax<S: AsRef<str>>(lines: &[S], message: impl Into<String>) -> Self {
        Self::new(lines, MalformedKind::Syntax(message.into()))
    }

    pub fn value<S: AsRef<str>>(lines: &[S], message: impl Into<String>) -> Self {
        Self::new(lines, MalformedKind::Value(message.into()))
    }
}

impl fmt::Display for MalformedInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "malformed input: {}", self.kind)?;
        for line in &self.lines {
            writeln!(f, "    {}", line)?;
        }
        Ok(())
    }
}

/// A stored number that names no live entity of the expected kind
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{source_kind} {source_number} references {target_kind} {target_number}, which does not exist")]
pub struct BrokenObjectLink {
    pub source_kind: EntityKind,
    pub source_number: i64,
    pub target_kind: EntityKind,
    pub target_number: i64,
}

#[derive(Debug, Error)]
pub enum DeckError {
    #[error(transparent)]
    Malformed(#[from] MalformedInputError),
    #[error("{kind} number {number} is already in use")]
    DuplicateNumber { kind: EntityKind, number: i64 },
    #[error("{kind} number {number} was not found")]
    NotFound { kind: EntityKind, number: i64 },
    #[error("{}", summarize_links(.0))]
    BrokenLinks(Vec<BrokenObjectLink>),
    #[error("illegal state: {0}")]
    IllegalState(String),
    #[error("invalid {kind} {number}: {reason}")]
    Validation {
        kind: EntityKind,
        number: i64,
        reason: String,
    },
    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

fn summarize_links(links: &[BrokenObjectLink]) -> String {
    match links.first() {
        Some(first) => format!("{} broken object link(s), first: {}", links.len(), first),
        None => "no broken object links".to_string(),
    }
}

impl DeckError {
    pub fn validation(kind: EntityKind, number: i64, reason: impl Into<String>) -> Self {
        DeckError::Validation {
            kind,
            number,
            reason: reason.into(),
        }
    }
}
