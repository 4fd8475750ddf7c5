//! Cells

use std::fmt;

use crate::deck::ast::{ListNode, Node, ParametersNode, SyntaxNode, Value};
use crate::deck::error::{BrokenObjectLink, DeckError, Result};
use crate::deck::linking::{Collections, Linkable};
use crate::deck::numbered::{EntityKind, Handle, NumberedEntity, Reference, Renumber};
use crate::deck::objects::{
    parameter_values, parameters, require_positive, set_parameter, set_tree_number, tree_number,
    DeckObject, Material,
};
use crate::deck::parsing::{parse_record, Grammar};

/// A cell record: `number material [density] geometry [parameters]`
///
/// Material `0` is a void cell, which has no density. Any other material is held
/// as a [`Reference`] until the deck links it.
pub struct Cell {
    tree: SyntaxNode,
    number: i64,
    old_number: i64,
    material: Option<Reference<Material>>,
    density: Option<f64>,
}

impl Cell {
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        Self::from_tree(parse_record(lines, Grammar::Cell)?)
    }

    pub fn from_tree(tree: SyntaxNode) -> Result<Self> {
        let number = tree_number(&tree, EntityKind::Cell)?;
        require_positive(EntityKind::Cell, number)?;
        let material = match tree.value("material").and_then(|m| m.as_int()) {
            Some(0) => None,
            Some(m) => Some(Reference::new(m)),
            None => return Err(DeckError::validation(EntityKind::Cell, number, "material is not a number")),
        };
        let density = tree.value("density").and_then(|d| d.as_float());
        if density == Some(0.0) {
            return Err(DeckError::validation(EntityKind::Cell, number, "density must not be 0"));
        }
        Ok(Cell {
            tree,
            number,
            old_number: number,
            material,
            density,
        })
    }

    pub fn is_void(&self) -> bool {
        self.material.is_none()
    }

    /// Number of the material, following renumbering once linked
    pub fn material_number(&self) -> Option<i64> {
        self.material.as_ref().map(Reference::number)
    }

    /// The linked material, `None` for void or unlinked cells
    pub fn material(&self) -> Option<Handle<Material>> {
        self.material.as_ref().and_then(Reference::target)
    }

    /// Fill a non-void cell with another material
    pub fn set_material(&mut self, material: &Handle<Material>) -> Result<()> {
        if self.is_void() {
            return Err(DeckError::IllegalState(format!(
                "cell {} is void; give it a density before a material",
                self.number
            )));
        }
        self.material = Some(Reference::to(material));
        self.update_tree();
        Ok(())
    }

    /// Positive for atom density, negative for mass density
    pub fn density(&self) -> Option<f64> {
        self.density
    }

    pub fn set_density(&mut self, density: f64) -> Result<()> {
        if self.is_void() {
            return Err(DeckError::IllegalState(format!(
                "cell {} is void and has no density",
                self.number
            )));
        }
        if density == 0.0 {
            return Err(DeckError::validation(EntityKind::Cell, self.number, "density must not be 0"));
        }
        if let Some(node) = self.tree.value_mut("density") {
            node.set_value(density);
        }
        self.density = Some(density);
        Ok(())
    }

    pub fn geometry(&self) -> Option<&ListNode> {
        self.tree.get("geometry").and_then(Node::as_list)
    }

    /// Geometry as written, on one line
    pub fn geometry_text(&self) -> String {
        let Some(geometry) = self.geometry() else {
            return String::new();
        };
        let text = Node::List(geometry.clone()).format();
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    pub fn parameters(&self) -> Option<&ParametersNode> {
        parameters(&self.tree)
    }

    pub fn parameter(&self, key: &str) -> Option<Vec<Value>> {
        parameter_values(&self.tree, key)
    }

    pub fn set_parameter(&mut self, key: &str, value: impl Into<Value>) {
        set_parameter(&mut self.tree, key, value.into());
    }
}

impl NumberedEntity for Cell {
    const KIND: EntityKind = EntityKind::Cell;

    fn number(&self) -> i64 {
        self.number
    }

    fn old_number(&self) -> i64 {
        self.old_number
    }

    fn validate_number(&self, number: i64) -> Result<()> {
        require_positive(Self::KIND, number)
    }
}

impl Renumber for Cell {
    fn set_number(&mut self, number: i64) -> Result<()> {
        self.validate_number(number)?;
        self.number = number;
        set_tree_number(&mut self.tree, number);
        Ok(())
    }
}

impl Linkable for Cell {
    fn link(&mut self, collections: &Collections) -> Vec<BrokenObjectLink> {
        let Some(material) = self.material.as_mut() else {
            return Vec::new();
        };
        if material.resolve(&collections.materials) {
            return Vec::new();
        }
        vec![BrokenObjectLink {
            source_kind: EntityKind::Cell,
            source_number: self.number,
            target_kind: EntityKind::Material,
            target_number: material.raw(),
        }]
    }
}

impl DeckObject for Cell {
    fn tree(&self) -> &SyntaxNode {
        &self.tree
    }

    fn update_tree(&mut self) {
        if let Some(number) = self.material_number() {
            if let Some(node) = self.tree.value_mut("material") {
                node.set_value(number);
            }
        }
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("number", &self.number)
            .field("material", &self.material)
            .field("density", &self.density)
            .finish()
    }
}
