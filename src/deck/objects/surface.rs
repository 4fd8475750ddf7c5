//! Surfaces

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::deck::ast::{Node, SyntaxNode};
use crate::deck::error::{DeckError, Result};
use crate::deck::numbered::{EntityKind, NumberedEntity, Renumber};
use crate::deck::objects::{classifier, require_positive, set_tree_number, tree_number, DeckObject};
use crate::deck::parsing::{parse_record, Grammar};

/// Boundary condition marker in front of the surface number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceModifier {
    /// `*`
    Reflecting,
    /// `+`
    WhiteBoundary,
}

impl SurfaceModifier {
    fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "*" => Some(SurfaceModifier::Reflecting),
            "+" => Some(SurfaceModifier::WhiteBoundary),
            _ => None,
        }
    }
}

/// A surface record: `[*|+]number [transform] mnemonic coefficients`
pub struct Surface {
    tree: SyntaxNode,
    number: i64,
    old_number: i64,
    modifier: Option<SurfaceModifier>,
}

impl Surface {
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        Self::from_tree(parse_record(lines, Grammar::Surface)?)
    }

    pub fn from_tree(tree: SyntaxNode) -> Result<Self> {
        let number = tree_number(&tree, EntityKind::Surface)?;
        require_positive(EntityKind::Surface, number)?;
        let modifier = classifier(&tree)
            .and_then(|c| c.modifier())
            .and_then(SurfaceModifier::from_marker);
        Ok(Surface {
            tree,
            number,
            old_number: number,
            modifier,
        })
    }

    pub fn modifier(&self) -> Option<SurfaceModifier> {
        self.modifier
    }

    pub fn is_reflecting(&self) -> bool {
        self.modifier == Some(SurfaceModifier::Reflecting)
    }

    /// Transform number, as written
    pub fn transform(&self) -> Option<i64> {
        self.tree.value("transform").and_then(|t| t.as_int())
    }

    /// Equation mnemonic, lowercased
    pub fn mnemonic(&self) -> String {
        self.tree
            .value("mnemonic")
            .and_then(|m| m.as_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default()
    }

    pub fn coefficients(&self) -> Vec<f64> {
        self.tree
            .get("coefficients")
            .and_then(Node::as_list)
            .map(|list| list.values().filter_map(|v| v.as_float()).collect())
            .unwrap_or_default()
    }

    pub fn set_coefficient(&mut self, index: usize, value: f64) -> Result<()> {
        let number = self.number;
        let node = self
            .tree
            .get_mut("coefficients")
            .and_then(Node::as_list_mut)
            .and_then(|list| list.values_mut().nth(index))
            .ok_or_else(|| {
                DeckError::validation(
                    EntityKind::Surface,
                    number,
                    format!("no coefficient at position {}", index),
                )
            })?;
        node.set_value(value);
        Ok(())
    }
}

impl NumberedEntity for Surface {
    const KIND: EntityKind = EntityKind::Surface;

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

impl Renumber for Surface {
    fn set_number(&mut self, number: i64) -> Result<()> {
        self.validate_number(number)?;
        self.number = number;
        set_tree_number(&mut self.tree, number);
        Ok(())
    }
}

impl DeckObject for Surface {
    fn tree(&self) -> &SyntaxNode {
        &self.tree
    }
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("number", &self.number)
            .field("mnemonic", &self.mnemonic())
            .field("coefficients", &self.coefficients())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflecting_plane() {
        let surface = Surface::parse(&["*5 PX 1.5"]).unwrap();
        assert_eq!(surface.number(), 5);
        assert!(surface.is_reflecting());
        assert_eq!(surface.mnemonic(), "px");
        assert_eq!(surface.coefficients(), vec![1.5]);
        assert_eq!(surface.transform(), None);
    }

    #[test]
    fn test_transformed_surface() {
        let surface = Surface::parse(&["+2 3 cz 0.4"]).unwrap();
        assert_eq!(surface.modifier(), Some(SurfaceModifier::WhiteBoundary));
        assert_eq!(surface.transform(), Some(3));
    }

    #[test]
    fn test_edit_keeps_modifier_spelling() {
        let mut surface = Surface::parse(&["*5 px 1.5 $ mirror"]).unwrap();
        surface.set_number(15).unwrap();
        surface.set_coefficient(0, 2.0).unwrap();
        assert!(surface.set_coefficient(3, 2.0).is_err());
        assert_eq!(surface.format_lines(Default::default()), vec!["*15 px 2.0 $ mirror"]);
        assert_eq!(surface.old_number(), 5);
    }
}
