//! A tally's type is fixed by the last digit of its number

use mcdeck::deck::objects::{Tally, TallyType};
use mcdeck::deck::{DeckError, EntityKind, NumberedCollection, NumberedEntity};
use rstest::rstest;

#[rstest]
#[case("f1:n 1", TallyType::Current)]
#[case("f12:p 1", TallyType::SurfaceFlux)]
#[case("f104 1", TallyType::CellFlux)]
#[case("f6 1", TallyType::EnergyDeposition)]
#[case("f7:n 1", TallyType::FissionEnergy)]
#[case("f18:e 1", TallyType::PulseHeight)]
fn test_type_from_number(#[case] line: &str, #[case] expected: TallyType) {
    assert_eq!(Tally::parse(&[line]).unwrap().tally_type(), expected);
}

#[test]
fn test_renumber_keeps_type() {
    let mut tallies = NumberedCollection::new();
    let tally = tallies.append(Tally::parse(&["f4:n 1"]).unwrap()).unwrap();
    tallies.renumber(4, 14).unwrap();
    assert_eq!(tally.read().number(), 14);
    assert_eq!(tally.read().old_number(), 4);

    let err = tallies.renumber(14, 12).unwrap_err();
    assert!(matches!(
        err,
        DeckError::Validation {
            kind: EntityKind::Tally,
            number: 12,
            ..
        }
    ));
    assert_eq!(tally.read().number(), 14);
    assert_eq!(tallies.numbers(), vec![14]);
}

#[rstest]
#[case(4, 24)]
#[case(1, 31)]
#[case(8, 108)]
fn test_same_type_is_accepted(#[case] from: i64, #[case] to: i64) {
    let tally = Tally::parse(&[format!("f{from} 1")]).unwrap();
    assert!(tally.validate_number(to).is_ok());
    assert!(tally.validate_number(to + 1).is_err());
}

#[test]
fn test_unknown_type_is_rejected() {
    assert!(Tally::parse(&["f3:n 1"]).is_err());
    assert!(Tally::parse(&["f9 1"]).is_err());
}
