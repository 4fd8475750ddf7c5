//! Cross references between numbered objects

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::deck::numbered::{Handle, NumberedCollection, NumberedEntity};

/// A number read from a record, possibly linked to the object it names
///
/// The raw number is kept after resolution so a reference to an object that has
/// since been dropped still formats as it was read.
pub enum Reference<T> {
    Unresolved(i64),
    Resolved { handle: Weak<RwLock<T>>, raw: i64 },
}

impl<T: NumberedEntity> Reference<T> {
    pub fn new(raw: i64) -> Self {
        Reference::Unresolved(raw)
    }

    /// A reference that is linked from the start
    pub fn to(target: &Handle<T>) -> Self {
        let raw = target.read().number();
        Reference::Resolved {
            handle: Arc::downgrade(target),
            raw,
        }
    }

    /// The number as it was read
    pub fn raw(&self) -> i64 {
        match self {
            Reference::Unresolved(raw) | Reference::Resolved { raw, .. } => *raw,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Reference::Resolved { .. })
    }

    /// Link to the object this reference names. Returns false if it is not there.
    ///
    /// A link whose target is still a member of `collection` is kept, so renumbering
    /// never breaks it. Otherwise the number the reference currently prints is
    /// looked up. A reference that finds nothing goes back to unresolved with that
    /// number.
    pub fn resolve(&mut self, collection: &NumberedCollection<T>) -> bool {
        if let Some(target) = self.target() {
            if collection.contains_handle(&target) {
                return true;
            }
        }
        let number = self.number();
        match collection.get(number) {
            Ok(target) => {
                *self = Reference::Resolved {
                    handle: Arc::downgrade(&target),
                    raw: self.raw(),
                };
                true
            }
            Err(_) => {
                *self = Reference::Unresolved(number);
                false
            }
        }
    }

    pub fn target(&self) -> Option<Handle<T>> {
        match self {
            Reference::Unresolved(_) => None,
            Reference::Resolved { handle, .. } => handle.upgrade(),
        }
    }

    /// The number to print: the target's current number once linked
    pub fn number(&self) -> i64 {
        match self.target() {
            Some(target) => {
                let number = target.read().number();
                number
            }
            None => self.raw(),
        }
    }
}

impl<T> Clone for Reference<T> {
    fn clone(&self) -> Self {
        match self {
            Reference::Unresolved(raw) => Reference::Unresolved(*raw),
            Reference::Resolved { handle, raw } => Reference::Resolved {
                handle: handle.clone(),
                raw: *raw,
            },
        }
    }
}

impl<T> fmt::Debug for Reference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Unresolved(raw) => f.debug_tuple("Unresolved").field(raw).finish(),
            Reference::Resolved { raw, .. } => f.debug_tuple("Resolved").field(raw).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::numbered::collection::tests::Numbered;

    #[test]
    fn test_resolve_follows_renumbering() {
        let mut items = NumberedCollection::new();
        items.append(Numbered::new(3)).unwrap();

        let mut reference = Reference::<Numbered>::new(3);
        assert!(!reference.is_resolved());
        assert!(reference.resolve(&items));
        assert_eq!(reference.number(), 3);

        items.renumber(3, 30).unwrap();
        assert_eq!(reference.number(), 30);
        assert_eq!(reference.raw(), 3);
    }

    #[test]
    fn test_relinking_keeps_renumbered_target() {
        let mut items = NumberedCollection::new();
        let first = items.append(Numbered::new(1)).unwrap();
        let mut reference = Reference::<Numbered>::new(1);
        assert!(reference.resolve(&items));

        items.renumber(1, 100).unwrap();
        items.append(Numbered::new(1)).unwrap();
        assert!(reference.resolve(&items));
        assert_eq!(reference.number(), 100);
        assert!(Arc::ptr_eq(&reference.target().unwrap(), &first));
    }

    #[test]
    fn test_target_leaving_collection_unlinks() {
        let mut items = NumberedCollection::new();
        items.append(Numbered::new(2)).unwrap();
        let mut reference = Reference::<Numbered>::new(2);
        assert!(reference.resolve(&items));
        items.renumber(2, 20).unwrap();

        let removed = items.remove(20).unwrap();
        assert!(!reference.resolve(&items));
        assert!(!reference.is_resolved());
        assert_eq!(reference.number(), 20);
        drop(removed);
    }

    #[test]
    fn test_dangling_reference_keeps_raw_number() {
        let items = NumberedCollection::<Numbered>::new();
        let mut reference = Reference::<Numbered>::new(8);
        assert!(!reference.resolve(&items));
        assert_eq!(reference.number(), 8);
    }

    #[test]
    fn test_dropped_target_falls_back_to_raw() {
        let target = crate::deck::numbered::handle(Numbered::new(4));
        let reference = Reference::to(&target);
        target.write().number = 40;
        assert_eq!(reference.number(), 40);
        drop(target);
        assert_eq!(reference.number(), 4);
    }
}
