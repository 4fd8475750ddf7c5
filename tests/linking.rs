//! Cross-reference resolution between cells, materials, surfaces and tallies

use mcdeck::deck::linking::{resolve_references, Collections};
use mcdeck::deck::objects::{Cell, Material, Surface, Tally};
use mcdeck::deck::{BrokenObjectLink, Deck, DeckError, EntityKind, NumberedEntity};
use rstest::rstest;

const SMALL_DECK: &str = "\
t
1 0 -1
2 0 1

1 so 5

f4:n 1
nps 1
";

#[test]
fn test_reference_before_target_resolves() {
    let mut collections = Collections::default();
    collections
        .tallies
        .append(Tally::parse(&["f2:n 7"]).unwrap())
        .unwrap();
    collections
        .cells
        .append(Cell::parse(&["1 3 0.05 -7"]).unwrap())
        .unwrap();
    collections
        .surfaces
        .append(Surface::parse(&["7 so 4"]).unwrap())
        .unwrap();
    collections
        .materials
        .append(Material::parse(&["m3 6000 1"]).unwrap())
        .unwrap();

    assert!(resolve_references(&collections).is_empty());

    let tally = collections.tallies.get(2).unwrap();
    let surfaces = tally.read().groups()[0].surfaces();
    assert_eq!(surfaces.len(), 1);
    assert_eq!(surfaces[0].read().number(), 7);
}

#[test]
fn test_every_broken_link_is_reported() {
    let mut collections = Collections::default();
    collections
        .cells
        .append(Cell::parse(&["1 8 -2.7 -1"]).unwrap())
        .unwrap();
    collections
        .tallies
        .append(Tally::parse(&["f4:n 1 2 3"]).unwrap())
        .unwrap();

    let broken = resolve_references(&collections);
    let targets: Vec<(EntityKind, i64)> = broken
        .iter()
        .map(|link| (link.target_kind, link.target_number))
        .collect();
    assert_eq!(
        targets,
        vec![
            (EntityKind::Material, 8),
            (EntityKind::Cell, 2),
            (EntityKind::Cell, 3)
        ]
    );
    assert_eq!(
        broken[0],
        BrokenObjectLink {
            source_kind: EntityKind::Cell,
            source_number: 1,
            target_kind: EntityKind::Material,
            target_number: 8,
        }
    );
}

#[test]
fn test_renumbered_target_is_seen_through_reference() {
    let mut collections = Collections::default();
    collections
        .cells
        .append(Cell::parse(&["1 3 -1.0 -1"]).unwrap())
        .unwrap();
    collections
        .materials
        .append(Material::parse(&["m3 1001 1"]).unwrap())
        .unwrap();
    assert!(resolve_references(&collections).is_empty());

    collections.materials.renumber(3, 30).unwrap();
    let cell = collections.cells.get(1).unwrap();
    assert_eq!(cell.read().material_number(), Some(30));
}

#[test]
fn test_relinking_after_renumber_keeps_links() {
    let mut deck = Deck::parse(SMALL_DECK).unwrap();
    deck.renumber::<Cell>(1, 100).unwrap();

    deck.add(Surface::parse(&["9 px 0"]).unwrap()).unwrap();
    assert!(deck.broken_links().is_empty());

    deck.add(Cell::parse(&["1 0 -9"]).unwrap()).unwrap();
    assert!(deck.broken_links().is_empty());
    let tally = deck.get::<Tally>(4).unwrap();
    assert_eq!(tally.read().groups()[0].numbers(), vec![100]);
    assert!(deck.to_text().contains("\nf4:n 100\n"));
}

#[test]
fn test_renumbered_material_survives_relink() {
    let mut collections = Collections::default();
    collections
        .cells
        .append(Cell::parse(&["1 3 -1.0 -1"]).unwrap())
        .unwrap();
    collections
        .materials
        .append(Material::parse(&["m3 1001 1"]).unwrap())
        .unwrap();
    assert!(resolve_references(&collections).is_empty());

    collections.materials.renumber(3, 30).unwrap();
    collections
        .materials
        .append(Material::parse(&["m3 8016 1"]).unwrap())
        .unwrap();
    assert!(resolve_references(&collections).is_empty());
    let cell = collections.cells.get(1).unwrap();
    assert_eq!(cell.read().material_number(), Some(30));
}

#[rstest]
#[case(2, 1)]
#[case(1, 2)]
fn test_renumber_into_a_used_number_fails(#[case] from: i64, #[case] to: i64) {
    let mut deck = Deck::parse(SMALL_DECK).unwrap();
    let err = deck.renumber::<Cell>(from, to).unwrap_err();
    assert!(matches!(
        err,
        DeckError::DuplicateNumber {
            kind: EntityKind::Cell,
            number,
        } if number == to
    ));
    assert!(!deck.has_redundant_numbers());
    assert_eq!(deck.cells().numbers(), vec![1, 2]);
}
