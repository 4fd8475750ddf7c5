//! Ordered collections with unique numbers

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::deck::error::{DeckError, Result};
use crate::deck::numbered::{handle, Handle, NumberedEntity, Renumber};

/// Insertion-ordered set of numbered objects
///
/// The collection holds no iteration state; [`iter`](Self::iter) hands out a fresh
/// cursor each call, so any number of iterations may run side by side. Mutation
/// takes `&mut self` and iteration borrows `&self`, which keeps the two apart.
pub struct NumberedCollection<T: NumberedEntity> {
    items: Vec<Handle<T>>,
}

impl<T: NumberedEntity> NumberedCollection<T> {
    pub fn new() -> Self {
        NumberedCollection { items: Vec::new() }
    }

    /// Build from an initial sequence, rejecting the first repeated number
    pub fn from_entities(entities: impl IntoIterator<Item = T>) -> Result<Self> {
        let mut collection = Self::new();
        for entity in entities {
            collection.append(entity)?;
        }
        Ok(collection)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Take ownership of an entity and add it
    pub fn append(&mut self, entity: T) -> Result<Handle<T>> {
        let shared = handle(entity);
        self.append_handle(shared.clone())?;
        Ok(shared)
    }

    /// Add an object that is already shared elsewhere
    pub fn append_handle(&mut self, entity: Handle<T>) -> Result<()> {
        let number = entity.read().number();
        if self.contains_number(number) {
            return Err(DeckError::DuplicateNumber {
                kind: T::KIND,
                number,
            });
        }
        self.items.push(entity);
        Ok(())
    }

    /// Remove the member with `number`
    pub fn remove(&mut self, number: i64) -> Result<Handle<T>> {
        let position = self
            .position(number)
            .ok_or(DeckError::NotFound {
                kind: T::KIND,
                number,
            })?;
        Ok(self.items.remove(position))
    }

    /// Remove this exact object, returning false if it is not a member
    pub fn remove_handle(&mut self, entity: &Handle<T>) -> bool {
        let before = self.items.len();
        self.items.retain(|item| !Arc::ptr_eq(item, entity));
        self.items.len() != before
    }

    /// True if this exact object is a member
    pub fn contains_handle(&self, entity: &Handle<T>) -> bool {
        self.items.iter().any(|item| Arc::ptr_eq(item, entity))
    }

    pub fn contains_number(&self, number: i64) -> bool {
        self.position(number).is_some()
    }

    pub fn get(&self, number: i64) -> Result<Handle<T>> {
        self.position(number)
            .map(|i| self.items[i].clone())
            .ok_or(DeckError::NotFound {
                kind: T::KIND,
                number,
            })
    }

    /// True if two live members share a number.
    ///
    /// Numbers can be changed through a handle after insertion, so this can become
    /// true even though [`append`](Self::append) never admits a duplicate.
    pub fn check_redundant_numbers(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.items.len());
        self.items
            .iter()
            .any(|item| !seen.insert(item.read().number()))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Handle<T>> {
        self.items.iter()
    }

    pub fn numbers(&self) -> Vec<i64> {
        self.items.iter().map(|item| item.read().number()).collect()
    }

    /// Change a member's number, checking the entity's rules and uniqueness
    pub fn renumber(&mut self, old: i64, new: i64) -> Result<()> {
        let entity = self.get(old)?;
        if old == new {
            return Ok(());
        }
        if self.contains_number(new) {
            return Err(DeckError::DuplicateNumber {
                kind: T::KIND,
                number: new,
            });
        }
        let mut entity = entity.write();
        entity.set_number(new)
    }

    /// First number not in use, trying `start`, `start + step`, ...
    pub fn request_number(&self, start: i64, step: i64) -> Result<i64> {
        if step <= 0 {
            return Err(DeckError::validation(
                T::KIND,
                start,
                format!("number step must be positive, got {}", step),
            ));
        }
        let used: HashSet<i64> = self.numbers().into_iter().collect();
        let mut candidate = start;
        while used.contains(&candidate) {
            candidate = candidate.checked_add(step).ok_or_else(|| {
                DeckError::IllegalState(format!("no free {} number above {}", T::KIND, start))
            })?;
        }
        Ok(candidate)
    }

    fn position(&self, number: i64) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.read().number() == number)
    }
}

impl<T: NumberedEntity> Default for NumberedCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: NumberedEntity> fmt::Debug for NumberedCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumberedCollection")
            .field("kind", &T::KIND)
            .field("numbers", &self.numbers())
            .finish()
    }
}

impl<'a, T: NumberedEntity> IntoIterator for &'a NumberedCollection<T> {
    type Item = &'a Handle<T>;
    type IntoIter = std::slice::Iter<'a, Handle<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
