//! Tallies and their bins
//!
//! A tally's type is the last digit of its number. The type is fixed when the
//! tally is read: renumbering may change the number only within the same type,
//! so `f4` can become `f14` but never `f2`.
//!
//! The bins after the classifier become [`TallyGroup`]s. A bare number is a
//! group of one; a parenthesized list is one group whose members are
//! flattened, nested parentheses included. `t` asks for the total over all
//! bins and is not a group.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::deck::ast::{ListNode, Node, SyntaxNode, Value, ValueNode};
use crate::deck::error::{BrokenObjectLink, DeckError, Result};
use crate::deck::linking::{Collections, Linkable};
use crate::deck::numbered::{
    EntityKind, Handle, NumberedCollection, NumberedEntity, Reference, Renumber,
};
use crate::deck::objects::{classifier, set_tree_number, tree_number, Cell, DeckObject, Surface};
use crate::deck::parsing::{is_total, parse_record, Grammar};

const TALLY_TYPE_MODULUS: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TallyType {
    Current = 1,
    SurfaceFlux = 2,
    CellFlux = 4,
    Detector = 5,
    EnergyDeposition = 6,
    FissionEnergy = 7,
    PulseHeight = 8,
}

impl TallyType {
    pub fn from_number(number: i64) -> Option<TallyType> {
        match number.rem_euclid(TALLY_TYPE_MODULUS) {
            1 => Some(TallyType::Current),
            2 => Some(TallyType::SurfaceFlux),
            4 => Some(TallyType::CellFlux),
            5 => Some(TallyType::Detector),
            6 => Some(TallyType::EnergyDeposition),
            7 => Some(TallyType::FissionEnergy),
            8 => Some(TallyType::PulseHeight),
            _ => None,
        }
    }

    pub fn discriminant(&self) -> i64 {
        *self as i64
    }

    /// What the bins of this type name; detectors name nothing
    pub fn target_kind(&self) -> Option<EntityKind> {
        match self {
            TallyType::Current | TallyType::SurfaceFlux => Some(EntityKind::Surface),
            TallyType::CellFlux
            | TallyType::EnergyDeposition
            | TallyType::FissionEnergy
            | TallyType::PulseHeight => Some(EntityKind::Cell),
            TallyType::Detector => None,
        }
    }
}

/// The objects one group names
#[derive(Debug, Clone)]
pub enum TallyTargets {
    Cells(Vec<Reference<Cell>>),
    Surfaces(Vec<Reference<Surface>>),
}

impl TallyTargets {
    fn new(kind: EntityKind, numbers: Vec<i64>) -> Self {
        match kind {
            EntityKind::Surface => {
                TallyTargets::Surfaces(numbers.into_iter().map(Reference::new).collect())
            }
            _ => TallyTargets::Cells(numbers.into_iter().map(Reference::new).collect()),
        }
    }
}

/// One tally bin: a single object or a parenthesized union of objects
#[derive(Debug, Clone)]
pub struct TallyGroup {
    targets: TallyTargets,
    grouped: bool,
}

fn resolve_all<T: NumberedEntity>(
    references: &mut [Reference<T>],
    collection: &NumberedCollection<T>,
    source_number: i64,
) -> Vec<BrokenObjectLink> {
    let mut broken = Vec::new();
    for reference in references.iter_mut() {
        if !reference.resolve(collection) {
            broken.push(BrokenObjectLink {
                source_kind: EntityKind::Tally,
                source_number,
                target_kind: T::KIND,
                target_number: reference.raw(),
            });
        }
    }
    broken
}

impl TallyGroup {
    pub fn kind(&self) -> EntityKind {
        match self.targets {
            TallyTargets::Cells(_) => EntityKind::Cell,
            TallyTargets::Surfaces(_) => EntityKind::Surface,
        }
    }

    pub fn targets(&self) -> &TallyTargets {
        &self.targets
    }

    /// True for a parenthesized group
    pub fn is_grouped(&self) -> bool {
        self.grouped
    }

    pub fn len(&self) -> usize {
        match &self.targets {
            TallyTargets::Cells(refs) => refs.len(),
            TallyTargets::Surfaces(refs) => refs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current numbers of the members
    pub fn numbers(&self) -> Vec<i64> {
        match &self.targets {
            TallyTargets::Cells(refs) => refs.iter().map(Reference::number).collect(),
            TallyTargets::Surfaces(refs) => refs.iter().map(Reference::number).collect(),
        }
    }

    /// Numbers as they were read
    pub fn old_numbers(&self) -> Vec<i64> {
        match &self.targets {
            TallyTargets::Cells(refs) => refs.iter().map(Reference::raw).collect(),
            TallyTargets::Surfaces(refs) => refs.iter().map(Reference::raw).collect(),
        }
    }

    /// The linked cells of a cell group
    pub fn cells(&self) -> Vec<Handle<Cell>> {
        match &self.targets {
            TallyTargets::Cells(refs) => refs.iter().filter_map(Reference::target).collect(),
            TallyTargets::Surfaces(_) => Vec::new(),
        }
    }

    pub fn surfaces(&self) -> Vec<Handle<Surface>> {
        match &self.targets {
            TallyTargets::Surfaces(refs) => refs.iter().filter_map(Reference::target).collect(),
            TallyTargets::Cells(_) => Vec::new(),
        }
    }

    fn resolve(&mut self, collections: &Collections, source_number: i64) -> Vec<BrokenObjectLink> {
        match &mut self.targets {
            TallyTargets::Cells(refs) => resolve_all(refs, &collections.cells, source_number),
            TallyTargets::Surfaces(refs) => {
                resolve_all(refs, &collections.surfaces, source_number)
            }
        }
    }
}

/// Integer values of a bin, in source order
fn bin_numbers(node: &Node, tally: i64) -> Result<Vec<i64>> {
    let mut numbers = Vec::new();
    let mut invalid = None;
    node.visit_values(&mut |value: &ValueNode| match value.value() {
        Value::Int(n) => numbers.push(*n),
        Value::Str(_) => {}
        _ => {
            invalid.get_or_insert_with(|| value.text());
        }
    });
    match invalid {
        Some(text) => Err(DeckError::validation(
            EntityKind::Tally,
            tally,
            format!("`{}` is not an object number", text),
        )),
        None => Ok(numbers),
    }
}

/// An `f` record
pub struct Tally {
    tree: SyntaxNode,
    number: i64,
    old_number: i64,
    tally_type: TallyType,
    groups: Vec<TallyGroup>,
    include_total: bool,
}

impl Tally {
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        Self::from_tree(parse_record(lines, Grammar::Tally)?)
    }

    pub fn from_tree(tree: SyntaxNode) -> Result<Self> {
        let number = tree_number(&tree, EntityKind::Tally)?;
        if number <= 0 {
            return Err(DeckError::validation(EntityKind::Tally, number, "number must be > 0"));
        }
        let tally_type = TallyType::from_number(number).ok_or_else(|| {
            DeckError::validation(
                EntityKind::Tally,
                number,
                format!("{} is not a tally type", number % TALLY_TYPE_MODULUS),
            )
        })?;

        let mut groups = Vec::new();
        let mut include_total = false;
        if let Some(kind) = tally_type.target_kind() {
            let bins = tree.get("bins").and_then(Node::as_list);
            for bin in bins.map(ListNode::items).unwrap_or_default() {
                match bin {
                    Node::Value(value) if value.as_str().is_some_and(is_total) => {
                        include_total = true;
                    }
                    Node::Syntax(_) => groups.push(TallyGroup {
                        targets: TallyTargets::new(kind, bin_numbers(bin, number)?),
                        grouped: true,
                    }),
                    _ => groups.push(TallyGroup {
                        targets: TallyTargets::new(kind, bin_numbers(bin, number)?),
                        grouped: false,
                    }),
                }
            }
        }
        Ok(Tally {
            tree,
            number,
            old_number: number,
            tally_type,
            groups,
            include_total,
        })
    }

    pub fn tally_type(&self) -> TallyType {
        self.tally_type
    }

    pub fn groups(&self) -> &[TallyGroup] {
        &self.groups
    }

    pub fn include_total(&self) -> bool {
        self.include_total
    }

    /// Particle designators after the colon
    pub fn particles(&self) -> Vec<String> {
        classifier(&self.tree)
            .map(|c| c.particles())
            .unwrap_or_default()
    }

    /// `*` or `+` in front of the `f`
    pub fn modifier(&self) -> Option<&str> {
        classifier(&self.tree).and_then(|c| c.modifier())
    }

    /// Current numbers of every referenced object, bin by bin
    pub fn numbers(&self) -> Vec<i64> {
        self.groups.iter().flat_map(TallyGroup::numbers).collect()
    }

    fn check_target(&self, kind: EntityKind) -> Result<()> {
        match self.tally_type.target_kind() {
            Some(expected) if expected == kind => Ok(()),
            _ => Err(DeckError::validation(
                EntityKind::Tally,
                self.number,
                format!("a type {} tally cannot bin {}s", self.tally_type.discriminant(), kind),
            )),
        }
    }

    fn bins_mut(&mut self) -> Result<&mut ListNode> {
        self.tree
            .get_mut("bins")
            .and_then(Node::as_list_mut)
            .ok_or_else(|| DeckError::IllegalState("tally record has no bin list".to_string()))
    }

    fn push_bin(&mut self, numbers: &[i64], grouped: bool) -> Result<()> {
        let empty = self.bins_mut()?.is_empty();
        if empty {
            self.tree.ensure_separated();
        }
        let bin = if grouped {
            let mut members = ListNode::new();
            for number in numbers {
                members.push(ValueNode::new(*number));
            }
            Node::Syntax(
                SyntaxNode::new("tally group")
                    .with("open", ValueNode::new("("))
                    .with("members", members)
                    .with("close", ValueNode::new(")")),
            )
        } else {
            ValueNode::new(numbers[0]).into()
        };
        self.bins_mut()?.push(bin);
        Ok(())
    }

    /// Bin a single cell
    pub fn append_cell(&mut self, cell: &Handle<Cell>) -> Result<()> {
        self.append_cells(std::slice::from_ref(cell), false)
    }

    pub fn append_surface(&mut self, surface: &Handle<Surface>) -> Result<()> {
        self.append_surfaces(std::slice::from_ref(surface), false)
    }

    /// Bin cells, either one bin each or as one parenthesized group
    pub fn append_cells(&mut self, cells: &[Handle<Cell>], grouped: bool) -> Result<()> {
        self.check_target(EntityKind::Cell)?;
        let references: Vec<Reference<Cell>> = cells.iter().map(Reference::to).collect();
        self.append_references(TallyTargets::Cells(references), grouped)
    }

    pub fn append_surfaces(&mut self, surfaces: &[Handle<Surface>], grouped: bool) -> Result<()> {
        self.check_target(EntityKind::Surface)?;
        let references: Vec<Reference<Surface>> = surfaces.iter().map(Reference::to).collect();
        self.append_references(TallyTargets::Surfaces(references), grouped)
    }

    fn append_references(&mut self, targets: TallyTargets, grouped: bool) -> Result<()> {
        let group = TallyGroup { targets, grouped };
        if group.is_empty() {
            return Ok(());
        }
        let numbers = group.numbers();
        if grouped {
            self.push_bin(&numbers, true)?;
            self.groups.push(group);
            return Ok(());
        }
        let singles: Vec<TallyTargets> = match group.targets {
            TallyTargets::Cells(refs) => refs.into_iter().map(|r| TallyTargets::Cells(vec![r])).collect(),
            TallyTargets::Surfaces(refs) => {
                refs.into_iter().map(|r| TallyTargets::Surfaces(vec![r])).collect()
            }
        };
        for (targets, number) in singles.into_iter().zip(numbers) {
            self.push_bin(&[number], false)?;
            self.groups.push(TallyGroup {
                targets,
                grouped: false,
            });
        }
        Ok(())
    }
}

impl NumberedEntity for Tally {
    const KIND: EntityKind = EntityKind::Tally;

    fn number(&self) -> i64 {
        self.number
    }

    fn old_number(&self) -> i64 {
        self.old_number
    }

    fn validate_number(&self, number: i64) -> Result<()> {
        if number <= 0 {
            return Err(DeckError::validation(Self::KIND, number, "number must be > 0"));
        }
        if number.rem_euclid(TALLY_TYPE_MODULUS) != self.tally_type.discriminant() {
            return Err(DeckError::validation(
                Self::KIND,
                number,
                format!(
                    "tally type cannot be changed from {}",
                    self.tally_type.discriminant()
                ),
            ));
        }
        Ok(())
    }
}

impl Renumber for Tally {
    fn set_number(&mut self, number: i64) -> Result<()> {
        self.validate_number(number)?;
        self.number = number;
        set_tree_number(&mut self.tree, number);
        Ok(())
    }
}

impl Linkable for Tally {
    fn link(&mut self, collections: &Collections) -> Vec<BrokenObjectLink> {
        let number = self.number;
        self.groups
            .iter_mut()
            .flat_map(|group| group.resolve(collections, number))
            .collect()
    }
}

impl DeckObject for Tally {
    fn tree(&self) -> &SyntaxNode {
        &self.tree
    }

    /// Write the current numbers of linked objects over the bin values
    fn update_tree(&mut self) {
        if self.tally_type.target_kind().is_none() {
            return;
        }
        let mut numbers = self.numbers().into_iter();
        if let Some(bins) = self.tree.get_mut("bins") {
            bins.visit_values_mut(&mut |value: &mut ValueNode| {
                if matches!(value.value(), Value::Int(_)) {
                    if let Some(number) = numbers.next() {
                        value.set_value(number);
                    }
                }
            });
        }
    }
}

impl fmt::Debug for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tally")
            .field("number", &self.number)
            .field("type", &self.tally_type)
            .field("groups", &self.groups)
            .field("include_total", &self.include_total)
            .finish()
    }
}
