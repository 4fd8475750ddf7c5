//! # mcdeck
//!
//! Reads MCNP input decks into editable objects and writes them back out with
//! their original formatting.
//!
//! Records keep a lossless syntax tree. A deck that is read and written without
//! edits comes back byte for byte; an edited record changes only where it was
//! touched, and shortcuts such as `3r` or `8i` survive as long as their group is
//! left alone.
//!
//! ## Testing
//!
//! See the [testing module](deck::testing) for the sample decks and tree
//! assertions tests are written against.

pub mod deck;

pub use deck::{Deck, DeckConfig, DeckError, OutputVersion};
