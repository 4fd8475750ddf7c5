//! Link phase: turn stored numbers into live references
//!
//! References are always read as raw numbers first. Only when every record of a
//! deck is registered does [`resolve_references`] run, so a tally may name a cell
//! that appears later in the file. A missing target does not stop the pass; each
//! one is reported as a [`BrokenObjectLink`] and the caller decides what to do.

use tracing::debug;

use crate::deck::error::BrokenObjectLink;
use crate::deck::numbered::{NumberedCollection, NumberedEntity};
use crate::deck::objects::{Cell, Material, Surface, Tally};

/// Every numbered collection of a deck
#[derive(Default)]
pub struct Collections {
    pub cells: NumberedCollection<Cell>,
    pub surfaces: NumberedCollection<Surface>,
    pub materials: NumberedCollection<Material>,
    pub tallies: NumberedCollection<Tally>,
}

/// An object holding references into [`Collections`]
pub trait Linkable {
    /// Resolve every stored reference, returning the ones that name nothing
    fn link(&mut self, collections: &Collections) -> Vec<BrokenObjectLink>;
}

fn link_all<T: Linkable + NumberedEntity>(
    collection: &NumberedCollection<T>,
    collections: &Collections,
    broken: &mut Vec<BrokenObjectLink>,
) {
    for entity in collection {
        let mut entity = entity.write();
        broken.extend(entity.link(collections));
    }
}

/// Link cells to materials and tallies to cells or surfaces
pub fn resolve_references(collections: &Collections) -> Vec<BrokenObjectLink> {
    let mut broken = Vec::new();
    link_all(&collections.cells, collections, &mut broken);
    link_all(&collections.tallies, collections, &mut broken);
    debug!(broken = broken.len(), "resolved references");
    broken
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::numbered::EntityKind;

    #[test]
    fn test_forward_and_dangling_references() {
        let mut collections = Collections::default();
        collections
            .tallies
            .append(Tally::parse(&["f4 1 2 99"]).unwrap())
            .unwrap();
        collections.cells.append(Cell::parse(&["1 5 -1.0 -1"]).unwrap()).unwrap();
        collections.cells.append(Cell::parse(&["2 0 1"]).unwrap()).unwrap();
        collections
            .materials
            .append(Material::parse(&["m5 1001 1"]).unwrap())
            .unwrap();

        let broken = resolve_references(&collections);
        assert_eq!(
            broken,
            vec![BrokenObjectLink {
                source_kind: EntityKind::Tally,
                source_number: 4,
                target_kind: EntityKind::Cell,
                target_number: 99,
            }]
        );
        let cell = collections.cells.get(1).unwrap();
        let material = cell.read().material().unwrap();
        assert_eq!(material.read().number(), 5);
        let tally = collections.tallies.get(4).unwrap();
        assert_eq!(tally.read().groups()[1].cells().len(), 1);
    }
}
