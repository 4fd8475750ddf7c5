//! A whole deck
//!
//! [`Deck::from_text`] runs the full pipeline:
//!
//! ```text
//! read_deck -> build_object per record (rayon) -> register -> resolve_references
//! ```
//!
//! Records parse independently, so they may parse in parallel. Registration and
//! linking are sequential and linking starts only after every record is
//! registered. Inserts and removals go through the deck so its item list and its
//! collections never disagree.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::deck::config::{load_defaults, DeckConfig, LinkPolicy};
use crate::deck::error::{BrokenObjectLink, DeckError, Result};
use crate::deck::formats::{self, OutputVersion};
use crate::deck::lexing::{read_deck, BlockType, RawInput};
use crate::deck::linking::{resolve_references, Collections};
use crate::deck::numbered::{handle, Handle, NumberedCollection, NumberedEntity};
use crate::deck::objects::{
    build_object, Cell, DataRecord, DeckObject, Material, RecordObject, Surface, Tally,
};

/// One unit of a deck, in file order
#[derive(Debug)]
pub enum DeckItem {
    Message(Vec<String>),
    Title(String),
    Comment { block: BlockType, lines: Vec<String> },
    /// The blank line closing a block
    BlockEnd(String),
    Trailing(Vec<String>),
    Cell(Handle<Cell>),
    Surface(Handle<Surface>),
    Material(Handle<Material>),
    Tally(Handle<Tally>),
    Data(DataRecord),
}

impl DeckItem {
    fn block(&self) -> Option<BlockType> {
        match self {
            DeckItem::Comment { block, .. } => Some(*block),
            DeckItem::Cell(_) => Some(BlockType::Cell),
            DeckItem::Surface(_) => Some(BlockType::Surface),
            DeckItem::Material(_) | DeckItem::Tally(_) | DeckItem::Data(_) => Some(BlockType::Data),
            DeckItem::Message(_) | DeckItem::Title(_) | DeckItem::BlockEnd(_) | DeckItem::Trailing(_) => {
                None
            }
        }
    }

    fn format_lines(&self, version: OutputVersion) -> Vec<String> {
        match self {
            DeckItem::Message(lines) | DeckItem::Comment { lines, .. } | DeckItem::Trailing(lines) => {
                lines.clone()
            }
            DeckItem::Title(line) | DeckItem::BlockEnd(line) => vec![line.clone()],
            DeckItem::Cell(cell) => cell.write().format_lines(version),
            DeckItem::Surface(surface) => surface.write().format_lines(version),
            DeckItem::Material(material) => material.write().format_lines(version),
            DeckItem::Tally(tally) => tally.write().format_lines(version),
            DeckItem::Data(record) => formats::format_lines(record.tree(), version),
        }
    }
}

impl From<RecordObject> for DeckItem {
    fn from(object: RecordObject) -> Self {
        match object {
            RecordObject::Cell(cell) => DeckItem::Cell(handle(cell)),
            RecordObject::Surface(surface) => DeckItem::Surface(handle(surface)),
            RecordObject::Material(material) => DeckItem::Material(handle(material)),
            RecordObject::Tally(tally) => DeckItem::Tally(handle(tally)),
            RecordObject::Data(record) => DeckItem::Data(record),
        }
    }
}

/// Numbered objects the deck keeps a collection of
pub trait DeckEntity: NumberedEntity + DeckObject + Sized {
    const BLOCK: BlockType;

    fn collection(collections: &Collections) -> &NumberedCollection<Self>;

    fn collection_mut(collections: &mut Collections) -> &mut NumberedCollection<Self>;

    fn item(handle: Handle<Self>) -> DeckItem;

    fn handle_of(item: &DeckItem) -> Option<&Handle<Self>>;
}

macro_rules! deck_entity {
    ($ty:ident, $field:ident, $block:expr) => {
        impl DeckEntity for $ty {
            const BLOCK: BlockType = $block;

            fn collection(collections: &Collections) -> &NumberedCollection<Self> {
                &collections.$field
            }

            fn collection_mut(collections: &mut Collections) -> &mut NumberedCollection<Self> {
                &mut collections.$field
            }

            fn item(handle: Handle<Self>) -> DeckItem {
                DeckItem::$ty(handle)
            }

            fn handle_of(item: &DeckItem) -> Option<&Handle<Self>> {
                match item {
                    DeckItem::$ty(handle) => Some(handle),
                    _ => None,
                }
            }
        }
    };
}

deck_entity!(Cell, cells, BlockType::Cell);
deck_entity!(Surface, surfaces, BlockType::Surface);
deck_entity!(Material, materials, BlockType::Data);
deck_entity!(Tally, tallies, BlockType::Data);

fn parse_input(input: RawInput) -> Result<DeckItem> {
    let item = match input {
        RawInput::Message { lines } => DeckItem::Message(lines),
        RawInput::Title { line } => DeckItem::Title(line),
        RawInput::Comment { block, lines } => DeckItem::Comment { block, lines },
        RawInput::BlockEnd { line } => DeckItem::BlockEnd(line),
        RawInput::Trailing { lines } => DeckItem::Trailing(lines),
        RawInput::Record {
            block,
            lines,
            line_number,
        } => {
            trace!(line_number, ?block, "parsing record");
            build_object(block, &lines)?.into()
        }
    };
    Ok(item)
}

/// A parsed deck: its items in file order plus the numbered collections
pub struct Deck {
    items: Vec<DeckItem>,
    collections: Collections,
    broken_links: Vec<BrokenObjectLink>,
    version: OutputVersion,
    trailing_newline: bool,
}

impl Deck {
    /// Parse with the configuration in `defaults/mcdeck.default.toml`
    pub fn parse(text: &str) -> Result<Self> {
        Self::from_text(text, &load_defaults()?)
    }

    pub fn from_text(text: &str, config: &DeckConfig) -> Result<Self> {
        let version = config.output_version()?;
        let inputs = read_deck(text);
        debug!(
            inputs = inputs.len(),
            parallel = config.parsing.parallel,
            "read deck"
        );

        let items: Vec<DeckItem> = if config.parsing.parallel {
            inputs
                .into_par_iter()
                .map(parse_input)
                .collect::<Result<_>>()?
        } else {
            inputs.into_iter().map(parse_input).collect::<Result<_>>()?
        };

        let mut deck = Deck {
            items: Vec::with_capacity(items.len()),
            collections: Collections::default(),
            broken_links: Vec::new(),
            version,
            trailing_newline: text.ends_with('\n'),
        };
        for item in items {
            deck.register(&item)?;
            deck.items.push(item);
        }
        debug!(
            cells = deck.collections.cells.len(),
            surfaces = deck.collections.surfaces.len(),
            materials = deck.collections.materials.len(),
            tallies = deck.collections.tallies.len(),
            "registered deck objects"
        );

        let broken = resolve_references(&deck.collections);
        match config.linking.policy {
            LinkPolicy::Strict if !broken.is_empty() => return Err(DeckError::BrokenLinks(broken)),
            LinkPolicy::Strict => {}
            LinkPolicy::Lenient => {
                for link in &broken {
                    warn!(%link, "broken object link");
                }
            }
        }
        deck.broken_links = broken;
        Ok(deck)
    }

    fn register(&mut self, item: &DeckItem) -> Result<()> {
        match item {
            DeckItem::Cell(cell) => self.collections.cells.append_handle(cell.clone()),
            DeckItem::Surface(surface) => self.collections.surfaces.append_handle(surface.clone()),
            DeckItem::Material(material) => {
                self.collections.materials.append_handle(material.clone())
            }
            DeckItem::Tally(tally) => self.collections.tallies.append_handle(tally.clone()),
            _ => Ok(()),
        }
    }

    pub fn items(&self) -> &[DeckItem] {
        &self.items
    }

    pub fn title(&self) -> Option<&str> {
        self.items.iter().find_map(|item| match item {
            DeckItem::Title(line) => Some(line.as_str()),
            _ => None,
        })
    }

    pub fn message(&self) -> Option<&[String]> {
        self.items.iter().find_map(|item| match item {
            DeckItem::Message(lines) => Some(lines.as_slice()),
            _ => None,
        })
    }

    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    pub fn cells(&self) -> &NumberedCollection<Cell> {
        &self.collections.cells
    }

    pub fn surfaces(&self) -> &NumberedCollection<Surface> {
        &self.collections.surfaces
    }

    pub fn materials(&self) -> &NumberedCollection<Material> {
        &self.collections.materials
    }

    pub fn tallies(&self) -> &NumberedCollection<Tally> {
        &self.collections.tallies
    }

    pub fn data_records(&self) -> impl Iterator<Item = &DataRecord> {
        self.items.iter().filter_map(|item| match item {
            DeckItem::Data(record) => Some(record),
            _ => None,
        })
    }

    pub fn data_records_mut(&mut self) -> impl Iterator<Item = &mut DataRecord> {
        self.items.iter_mut().filter_map(|item| match item {
            DeckItem::Data(record) => Some(record),
            _ => None,
        })
    }

    /// Links that did not resolve at the last link pass
    pub fn broken_links(&self) -> &[BrokenObjectLink] {
        &self.broken_links
    }

    /// Run the link pass again, e.g. after adding objects
    pub fn relink(&mut self) -> &[BrokenObjectLink] {
        self.broken_links = resolve_references(&self.collections);
        &self.broken_links
    }

    /// True if any collection holds two objects with one number
    pub fn has_redundant_numbers(&self) -> bool {
        self.collections.cells.check_redundant_numbers()
            || self.collections.surfaces.check_redundant_numbers()
            || self.collections.materials.check_redundant_numbers()
            || self.collections.tallies.check_redundant_numbers()
    }

    /// Add an object at the end of its block and link the deck again
    pub fn add<T: DeckEntity>(&mut self, entity: T) -> Result<Handle<T>> {
        let added = T::collection_mut(&mut self.collections).append(entity)?;
        let position = self
            .items
            .iter()
            .rposition(|item| item.block() == Some(T::BLOCK))
            .map(|i| i + 1)
            .unwrap_or(self.items.len());
        self.items.insert(position, T::item(added.clone()));
        self.relink();
        Ok(added)
    }

    /// Remove the object numbered `number` and link the deck again
    ///
    /// References to the removed object become unresolved and print the number it
    /// had; they show up in [`broken_links`](Self::broken_links).
    pub fn remove<T: DeckEntity>(&mut self, number: i64) -> Result<Handle<T>> {
        let removed = T::collection_mut(&mut self.collections).remove(number)?;
        self.items
            .retain(|item| T::handle_of(item).map_or(true, |h| !Arc::ptr_eq(h, &removed)));
        self.relink();
        Ok(removed)
    }

    pub fn get<T: DeckEntity>(&self, number: i64) -> Result<Handle<T>> {
        T::collection(&self.collections).get(number)
    }

    /// Renumber an object; everything linked to it prints the new number
    pub fn renumber<T: DeckEntity>(&mut self, old: i64, new: i64) -> Result<()> {
        T::collection_mut(&mut self.collections).renumber(old, new)
    }

    pub fn version(&self) -> OutputVersion {
        self.version
    }

    pub fn set_version(&mut self, version: OutputVersion) {
        self.version = version;
    }

    /// Output lines for `version`, in file order
    pub fn format_lines(&self, version: OutputVersion) -> Vec<String> {
        self.items
            .iter()
            .flat_map(|item| item.format_lines(version))
            .collect()
    }

    /// The deck as text for its configured version
    pub fn to_text(&self) -> String {
        let mut text = self.format_lines(self.version).join("\n");
        if self.trailing_newline {
            text.push('\n');
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::config::LinkingConfig;

    const DECK: &str = "\
small problem
1 1 -1.0 -1 imp:n=1
2 0 1 imp:n=0

1 so 5

m1 1001.80c 2 8016.80c 1
f4:n 1
nps 1000
";

    #[test]
    fn test_unchanged_deck_round_trips() {
        let deck = Deck::parse(DECK).unwrap();
        assert_eq!(deck.to_text(), DECK);
        assert_eq!(deck.title(), Some("small problem"));
        assert_eq!(deck.cells().numbers(), vec![1, 2]);
        assert_eq!(deck.data_records().count(), 1);
    }

    #[test]
    fn test_sequential_parse_matches_parallel() {
        let mut config = load_defaults().unwrap();
        config.parsing.parallel = false;
        let deck = Deck::from_text(DECK, &config).unwrap();
        assert_eq!(deck.to_text(), DECK);
    }

    #[test]
    fn test_duplicate_numbers_are_fatal() {
        let text = "t\n1 0 -1\n1 0 1\n\n1 so 5\n\nnps 1\n";
        assert!(matches!(
            Deck::parse(text),
            Err(DeckError::DuplicateNumber { number: 1, .. })
        ));
    }

    #[test]
    fn test_link_policies() {
        let text = "t\n1 9 -1.0 -1\n\n1 so 5\n\nnps 1\n";
        assert!(matches!(Deck::parse(text), Err(DeckError::BrokenLinks(_))));

        let mut config = load_defaults().unwrap();
        config.linking = LinkingConfig {
            policy: LinkPolicy::Lenient,
        };
        let deck = Deck::from_text(text, &config).unwrap();
        assert_eq!(deck.broken_links().len(), 1);
        assert_eq!(deck.to_text(), text);
    }

    #[test]
    fn test_renumbering_material_updates_cells() {
        let mut deck = Deck::parse(DECK).unwrap();
        deck.renumber::<Material>(1, 10).unwrap();
        let text = deck.to_text();
        assert!(text.contains("\n1 10 -1.0 -1 imp:n=1\n"));
        assert!(text.contains("\nm10 1001.80c 2 8016.80c 1\n"));
    }

    #[test]
    fn test_add_and_remove() {
        let mut deck = Deck::parse(DECK).unwrap();
        deck.add(Cell::parse(&["3 0 -1 imp:n=1"]).unwrap()).unwrap();
        assert!(deck.add(Cell::parse(&["3 0 -1"]).unwrap()).is_err());
        let text = deck.to_text();
        assert!(text.contains("2 0 1 imp:n=0\n3 0 -1 imp:n=1\n\n"));

        deck.remove::<Cell>(2).unwrap();
        assert!(!deck.to_text().contains("2 0 1"));
        assert!(deck.remove::<Cell>(2).is_err());
        assert!(!deck.has_redundant_numbers());
    }

    #[test]
    fn test_removing_a_linked_object_reports_it() {
        let mut deck = Deck::parse(DECK).unwrap();
        deck.renumber::<Cell>(1, 5).unwrap();
        let removed = deck.remove::<Cell>(5).unwrap();
        assert_eq!(deck.broken_links().len(), 1);
        assert_eq!(deck.broken_links()[0].target_number, 5);
        assert!(deck.to_text().contains("\nf4:n 5\n"));
        drop(removed);
    }
}
