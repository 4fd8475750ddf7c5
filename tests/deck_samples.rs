//! Whole-deck tests over the curated samples

use mcdeck::deck::objects::{Cell, DataKind, Material, Tally};
use mcdeck::deck::testing::{assert_round_trip, parse_lenient, DeckSources};
use mcdeck::deck::{Deck, DeckError, NumberedEntity, OutputVersion};

fn sample(name: &str) -> &'static str {
    DeckSources::get(name).unwrap_or_else(|| panic!("missing sample {name}"))
}

#[test]
fn test_samples_round_trip() {
    for name in DeckSources::names() {
        assert_round_trip(sample(name));
    }
}

#[test]
fn test_simple_deck_contents() {
    let deck = Deck::parse(sample("010-simple.mcnp")).unwrap();
    assert_eq!(deck.title(), Some("Simple sphere in a void"));
    assert_eq!(deck.cells().numbers(), vec![1, 2]);
    assert_eq!(deck.surfaces().numbers(), vec![1]);
    assert_eq!(deck.materials().numbers(), vec![1]);
    assert_eq!(deck.tallies().numbers(), vec![4]);

    let kinds: Vec<DataKind> = deck.data_records().map(|r| r.kind()).collect();
    assert_eq!(kinds, vec![DataKind::Mode, DataKind::Source, DataKind::Other]);
}

#[test]
fn test_tally_groups() {
    let deck = Deck::parse(sample("040-tallies.mcnp")).unwrap();
    let summary: Vec<String> = deck
        .tallies()
        .iter()
        .map(|tally| {
            let tally = tally.read();
            let groups: Vec<String> = tally
                .groups()
                .iter()
                .map(|group| {
                    let numbers: Vec<String> =
                        group.numbers().iter().map(i64::to_string).collect();
                    if group.is_grouped() {
                        format!("({})", numbers.join(" "))
                    } else {
                        numbers.join(" ")
                    }
                })
                .collect();
            format!(
                "f{} {:?} total={} {}",
                tally.number(),
                tally.tally_type(),
                tally.include_total(),
                groups.join(", ")
            )
        })
        .collect();
    insta::assert_snapshot!(summary.join("\n"), @r"
    f1 Current total=false 1, 2
    f4 CellFlux total=true 1, (1 2)
    f14 CellFlux total=false (1 2 3)
    f6 EnergyDeposition total=false 3
    f2 SurfaceFlux total=false 2
    ");
}

#[test]
fn test_comments_and_message_are_kept() {
    let deck = Deck::parse(sample("030-comments-continuations.mcnp")).unwrap();
    assert_eq!(
        deck.message(),
        Some(&["message: datapath=/opt/data".to_string()][..])
    );
    let cell = deck.get::<Cell>(1).unwrap();
    assert_eq!(cell.read().geometry_text(), "-1 2 -3");
    let material = deck.get::<Material>(1).unwrap();
    let zaids: Vec<String> = material
        .read()
        .components()
        .into_iter()
        .map(|(zaid, _)| zaid)
        .collect();
    assert_eq!(zaids, vec!["1001.80c", "8016.80c"]);
}

#[test]
fn test_broken_link_policy() {
    let text = sample("050-broken-link.mcnp");
    assert!(matches!(Deck::parse(text), Err(DeckError::BrokenLinks(links)) if links.len() == 1));

    let deck = parse_lenient(text);
    assert_eq!(deck.broken_links().len(), 1);
    assert_eq!(deck.broken_links()[0].target_number, 99);
    assert_eq!(deck.to_text(), text);
}

#[test]
fn test_edits_show_up_in_output() {
    let mut deck = Deck::parse(sample("010-simple.mcnp")).unwrap();
    deck.renumber::<Cell>(1, 10).unwrap();
    {
        let tally = deck.get::<Tally>(4).unwrap();
        assert_eq!(tally.read().numbers(), vec![10]);
    }
    let cell = deck.get::<Cell>(10).unwrap();
    cell.write().set_density(-18.9).unwrap();

    let text = deck.to_text();
    insta::assert_snapshot!(text.trim_end(), @r"
    Simple sphere in a void
    10 1 -18.9 -1 imp:n=1
    2 0 1 imp:n=0

    1 so 10.0

    m1 92235.80c 1.0
    mode n
    sdef pos=0 0 0 erg=14.1
    f4:n 10
    nps 10000
    ");
}

#[test]
fn test_modified_lines_wrap_per_version() {
    let text = "\
long cell
1 0 -1 2 -3 4 -5 6 -7 8 -9 10 -11 12 -13 14 -15 16 -17 18 -19 20 -21 22 -23 24 imp:n=1

1 so 1

nps 10
";
    let deck = Deck::parse(text).unwrap();
    let old = OutputVersion::new(5, 1, 60);
    let new = OutputVersion::new(6, 2, 0);

    // untouched lines are never wrapped
    assert_eq!(deck.format_lines(old).len(), 6);

    deck.get::<Cell>(1).unwrap().write().set_parameter("imp:n", 0);
    let wrapped = deck.format_lines(old);
    assert_eq!(wrapped.len(), 7);
    assert!(wrapped.iter().all(|line| line.len() <= 80));
    assert_eq!(wrapped[2], "     imp:n=0");

    let wide = deck.format_lines(new);
    assert_eq!(wide.len(), 6);
    assert!(wide[1].ends_with("24 imp:n=0"));
}
