//! Main module for deck parsing, editing and output

pub mod ast;
pub mod config;
pub mod error;
pub mod formats;
pub mod lexing;
pub mod linking;
pub mod numbered;
pub mod objects;
pub mod parsing;
pub mod problem;
pub mod shortcuts;
pub mod testing;
pub mod token;

pub use config::{load_defaults, DeckConfig, LinkPolicy, Loader};
pub use error::{BrokenObjectLink, DeckError, MalformedInputError, Result};
pub use formats::OutputVersion;
pub use linking::{resolve_references, Collections};
pub use numbered::{EntityKind, Handle, NumberedCollection, NumberedEntity, Reference};
pub use parsing::{parse_record, Grammar};
pub use problem::{Deck, DeckItem};
pub use shortcuts::expand_shortcuts;
