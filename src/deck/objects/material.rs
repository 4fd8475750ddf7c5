//! Materials

use std::fmt;

use crate::deck::ast::{IsotopesNode, Node, ParametersNode, SyntaxNode, Value};
use crate::deck::error::{DeckError, Result};
use crate::deck::numbered::{EntityKind, NumberedEntity, Renumber};
use crate::deck::objects::{
    parameter_values, parameters, require_positive, set_parameter, set_tree_number, tree_number,
    DeckObject,
};
use crate::deck::parsing::{parse_record, Grammar};

/// An `m` record: isotope and fraction pairs, then library parameters
///
/// Positive fractions are atom fractions, negative ones weight fractions.
pub struct Material {
    tree: SyntaxNode,
    number: i64,
    old_number: i64,
}

impl Material {
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        Self::from_tree(parse_record(lines, Grammar::Material)?)
    }

    pub fn from_tree(tree: SyntaxNode) -> Result<Self> {
        let number = tree_number(&tree, EntityKind::Material)?;
        require_positive(EntityKind::Material, number)?;
        let material = Material {
            tree,
            number,
            old_number: number,
        };
        if material.components().iter().any(|(_, fraction)| *fraction == 0.0) {
            return Err(DeckError::validation(
                EntityKind::Material,
                number,
                "isotope fractions must not be 0",
            ));
        }
        Ok(material)
    }

    fn isotopes(&self) -> Option<&IsotopesNode> {
        self.tree.get("isotopes").and_then(Node::as_isotopes)
    }

    fn isotopes_mut(&mut self) -> Option<&mut IsotopesNode> {
        self.tree.get_mut("isotopes").and_then(Node::as_isotopes_mut)
    }

    /// `(zaid, fraction)` pairs in source order
    pub fn components(&self) -> Vec<(String, f64)> {
        self.isotopes().map(IsotopesNode::components).unwrap_or_default()
    }

    /// True when the fractions are weight fractions
    pub fn is_weight_fraction(&self) -> bool {
        self.components().first().is_some_and(|(_, f)| *f < 0.0)
    }

    fn check_fraction(&self, fraction: f64) -> Result<()> {
        if fraction == 0.0 || !fraction.is_finite() {
            return Err(DeckError::validation(
                EntityKind::Material,
                self.number,
                format!("invalid isotope fraction {}", fraction),
            ));
        }
        Ok(())
    }

    /// Append an isotope after the existing ones
    pub fn add_isotope(&mut self, zaid: &str, fraction: f64) -> Result<()> {
        self.check_fraction(fraction)?;
        let followed = self.tree.contains("parameters");
        let isotopes = self.isotopes_mut().ok_or_else(|| {
            DeckError::IllegalState("material record has no isotope list".to_string())
        })?;
        isotopes.append(zaid, fraction);
        if followed {
            if let Some(node) = isotopes.fraction_mut(isotopes.len() - 1) {
                node.ensure_separated();
            }
        }
        Ok(())
    }

    pub fn set_fraction(&mut self, index: usize, fraction: f64) -> Result<()> {
        self.check_fraction(fraction)?;
        let number = self.number;
        let node = self
            .isotopes_mut()
            .and_then(|isotopes| isotopes.fraction_mut(index))
            .ok_or_else(|| {
                DeckError::validation(
                    EntityKind::Material,
                    number,
                    format!("no isotope at position {}", index),
                )
            })?;
        node.set_value(fraction);
        Ok(())
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

impl NumberedEntity for Material {
    const KIND: EntityKind = EntityKind::Material;

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

impl Renumber for Material {
    fn set_number(&mut self, number: i64) -> Result<()> {
        self.validate_number(number)?;
        self.number = number;
        set_tree_number(&mut self.tree, number);
        Ok(())
    }
}

impl DeckObject for Material {
    fn tree(&self) -> &SyntaxNode {
        &self.tree
    }
}

impl fmt::Debug for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Material")
            .field("number", &self.number)
            .field("components", &self.components())
            .finish()
    }
}
