//! Core token types and helpers shared across the lexer, the shortcut expander and the parser.

pub mod core;
pub mod formatting;

pub use self::core::{Generated, RawToken, ShortcutMark, Token};
pub use formatting::{detokenize, ToDeckString};
