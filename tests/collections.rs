//! Numbered collections of deck objects

use mcdeck::deck::numbered::{NumberedCollection, NumberedEntity};
use mcdeck::deck::objects::{DeckObject, Surface};
use mcdeck::deck::DeckError;

fn surfaces(lines: &[&str]) -> NumberedCollection<Surface> {
    NumberedCollection::from_entities(lines.iter().map(|line| Surface::parse(&[*line]).unwrap()))
        .unwrap()
}

#[test]
fn test_numbers_are_unique() {
    let mut collection = surfaces(&["1 px 0", "2 px 1"]);
    let err = collection
        .append(Surface::parse(&["2 py 3"]).unwrap())
        .unwrap_err();
    assert!(matches!(err, DeckError::DuplicateNumber { number: 2, .. }));
    assert_eq!(collection.numbers(), vec![1, 2]);
    assert!(!collection.check_redundant_numbers());
}

#[test]
fn test_iteration_is_reentrant() {
    let collection = surfaces(&["1 px 0", "2 px 1", "3 px 2"]);
    let mut pairs = Vec::new();
    for outer in &collection {
        for inner in &collection {
            pairs.push((outer.read().number(), inner.read().number()));
        }
    }
    assert_eq!(pairs.len(), 9);
    assert_eq!(pairs[4], (2, 2));
}

#[test]
fn test_renumber_checks_uniqueness() {
    let mut collection = surfaces(&["1 px 0", "2 px 1"]);
    assert!(collection.renumber(1, 2).is_err());
    collection.renumber(1, 10).unwrap();
    let surface = collection.get(10).unwrap();
    let surface = surface.read();
    assert_eq!(surface.old_number(), 1);
    assert_eq!(surface.tree().format(), "10 px 0");
}

#[test]
fn test_request_number_skips_used() {
    let collection = surfaces(&["1 px 0", "2 px 1", "4 px 2"]);
    assert_eq!(collection.request_number(1, 1).unwrap(), 3);
    assert_eq!(collection.request_number(2, 2).unwrap(), 6);
    assert!(collection.request_number(1, 0).is_err());
}

#[test]
fn test_remove_by_number() {
    let mut collection = surfaces(&["1 px 0", "2 px 1"]);
    let removed = collection.remove(1).unwrap();
    assert_eq!(removed.read().number(), 1);
    assert!(!collection.contains_number(1));
    assert!(matches!(
        collection.remove(1),
        Err(DeckError::NotFound { number: 1, .. })
    ));
}

#[test]
fn test_membership_is_by_identity() {
    let mut collection = surfaces(&["1 px 0"]);
    let member = collection.get(1).unwrap();
    let twin = mcdeck::deck::numbered::handle(Surface::parse(&["1 px 0"]).unwrap());
    assert!(collection.contains_handle(&member));
    assert!(!collection.contains_handle(&twin));

    assert!(collection.renumber(1, 1).is_ok());
    collection.append(Surface::parse(&["2 px 1"]).unwrap()).unwrap();
    assert!(collection.renumber(2, 1).is_err());
    assert!(!collection.check_redundant_numbers());
}
