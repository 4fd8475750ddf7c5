//! Testing utilities for decks and syntax trees
//!
//! # Deck Testing Guidelines
//!
//! 1. **[DeckSources]** - For verified deck content
//! 2. **[assert_tree]** - For syntax tree verification
//!
//! ## Rule 1: Use DeckSources for whole decks
//!
//! Deck layout has many small rules (the 5-column continuation, `c` comment
//! lines, the blank lines between blocks). A deck typed inline into a test is
//! easy to get subtly wrong. Whole-deck tests read the curated files in
//! `samples/` through [`DeckSources`]:
//!
//! ```rust-example
//! use mcdeck::deck::testing::DeckSources;
//! use mcdeck::deck::Deck;
//!
//! let source = DeckSources::get("010-simple.mcnp").unwrap();
//! let deck = Deck::parse(source)?;
//! ```
//!
//! Single records are fine inline.
//!
//! ## Rule 2: Assert the tree, not the counts
//!
//! ```rust-example
//! use mcdeck::deck::testing::assert_tree;
//!
//! assert_tree(&tree)
//!     .named("tally")
//!     .has("classifier")
//!     .value_text("keyword", None)
//!     .list_len("bins", 3)
//!     .formats_as("f4 1 2 3");
//! ```

use crate::deck::ast::{Node, SyntaxNode};
use crate::deck::config::{LinkPolicy, Loader};
use crate::deck::problem::Deck;

static SAMPLES: &[(&str, &str)] = &[
    ("010-simple.mcnp", include_str!("../../samples/010-simple.mcnp")),
    (
        "020-shortcuts.mcnp",
        include_str!("../../samples/020-shortcuts.mcnp"),
    ),
    (
        "030-comments-continuations.mcnp",
        include_str!("../../samples/030-comments-continuations.mcnp"),
    ),
    ("040-tallies.mcnp", include_str!("../../samples/040-tallies.mcnp")),
    (
        "050-broken-link.mcnp",
        include_str!("../../samples/050-broken-link.mcnp"),
    ),
];

/// Verified sample decks
pub struct DeckSources;

impl DeckSources {
    pub fn names() -> impl Iterator<Item = &'static str> {
        SAMPLES.iter().map(|(name, _)| *name)
    }

    pub fn get(name: &str) -> Option<&'static str> {
        SAMPLES
            .iter()
            .find(|(sample, _)| *sample == name)
            .map(|(_, text)| *text)
    }

    /// Like [`DeckSources::get`], with an error naming the missing sample
    pub fn get_string(name: &str) -> Result<String, String> {
        Self::get(name)
            .map(str::to_string)
            .ok_or_else(|| format!("no sample deck named `{name}`"))
    }

    /// Every sample that links cleanly
    pub fn linked() -> impl Iterator<Item = (&'static str, &'static str)> {
        SAMPLES
            .iter()
            .copied()
            .filter(|(name, _)| !name.contains("broken"))
    }
}

/// Parse `text` leniently, panicking with the error on failure
pub fn parse_lenient(text: &str) -> Deck {
    let mut config = match Loader::new().build() {
        Ok(config) => config,
        Err(err) => panic!("default configuration failed to load: {err}"),
    };
    config.linking.policy = LinkPolicy::Lenient;
    match Deck::from_text(text, &config) {
        Ok(deck) => deck,
        Err(err) => panic!("deck failed to parse: {err}"),
    }
}

/// An unchanged deck prints back byte for byte
pub fn assert_round_trip(text: &str) {
    let deck = parse_lenient(text);
    let output = deck.to_text();
    assert_eq!(output, text, "deck did not round trip");
}

pub fn assert_tree(tree: &SyntaxNode) -> TreeAssertion<'_> {
    TreeAssertion { tree }
}

/// Fluent assertions over one [`SyntaxNode`]
pub struct TreeAssertion<'a> {
    tree: &'a SyntaxNode,
}

impl<'a> TreeAssertion<'a> {
    pub fn named(self, expected: &str) -> Self {
        assert_eq!(self.tree.name(), expected, "tree name");
        self
    }

    pub fn has(self, field: &str) -> Self {
        assert!(
            self.tree.contains(field),
            "`{}` has no `{field}`: {:?}",
            self.tree.name(),
            self.fields()
        );
        self
    }

    pub fn lacks(self, field: &str) -> Self {
        assert!(
            !self.tree.contains(field),
            "`{}` should not have `{field}`",
            self.tree.name()
        );
        self
    }

    /// Source text of a value field, `None` for an absent field
    pub fn value_text(self, field: &str, expected: Option<&str>) -> Self {
        let actual = self.tree.value(field).map(|v| v.text());
        assert_eq!(actual.as_deref(), expected, "value `{field}`");
        self
    }

    pub fn list_len(self, field: &str, expected: usize) -> Self {
        let list = self
            .tree
            .get(field)
            .and_then(Node::as_list)
            .unwrap_or_else(|| panic!("`{field}` is not a list"));
        assert_eq!(list.len(), expected, "length of `{field}`");
        self
    }

    pub fn formats_as(self, expected: &str) -> Self {
        assert_eq!(self.tree.format(), expected);
        self
    }

    /// Assert on a nested tree
    pub fn child(self, field: &str, check: impl FnOnce(TreeAssertion<'_>)) -> Self {
        let child = self
            .tree
            .get(field)
            .and_then(Node::as_syntax)
            .unwrap_or_else(|| panic!("`{field}` is not a syntax node"));
        check(TreeAssertion { tree: child });
        self
    }

    fn fields(&self) -> Vec<&str> {
        self.tree.children().map(|(name, _)| name).collect()
    }
}
