//! Numbered entities and the collections that keep their numbers unique
//!
//! Cells, surfaces, materials and tallies are all identified by an integer that is
//! unique within their kind. Objects are shared through [`Handle`]s: the deck owns
//! them, collections and resolved [`Reference`]s only point at them.

pub mod collection;
pub mod reference;

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::deck::error::Result;

pub use collection::NumberedCollection;
pub use reference::Reference;

/// Shared, lockable pointer to a deck object
pub type Handle<T> = Arc<RwLock<T>>;

pub fn handle<T>(value: T) -> Handle<T> {
    Arc::new(RwLock::new(value))
}

/// The categories of numbered objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Cell,
    Surface,
    Material,
    Tally,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Cell => "cell",
            EntityKind::Surface => "surface",
            EntityKind::Material => "material",
            EntityKind::Tally => "tally",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An object with a stable integer identity
///
/// `old_number` is the number the object was read with and never changes, so
/// diagnostics can name it the way the source did even after renumbering.
pub trait NumberedEntity: Send + Sync + sealed::Renumber {
    const KIND: EntityKind;

    fn number(&self) -> i64;

    fn old_number(&self) -> i64;

    /// Check a candidate number against the object's own constraints
    fn validate_number(&self, number: i64) -> Result<()>;
}

mod sealed {
    use crate::deck::error::Result;

    /// Number assignment
    ///
    /// Only the crate can name this trait, so a number changes through
    /// [`NumberedCollection::renumber`](super::NumberedCollection::renumber),
    /// which checks uniqueness, and never through a bare handle.
    pub trait Renumber {
        /// Validate and assign
        fn set_number(&mut self, number: i64) -> Result<()>;
    }
}

pub(crate) use sealed::Renumber;
