//! Domain objects built on syntax trees
//!
//! Each object owns the one tree it was parsed from and keeps a few typed fields
//! next to it. Setters write through to the tree, so formatting an object is
//! formatting its tree. Values that depend on other objects (the number of a
//! linked material, the cells of a tally) are pushed into the tree by
//! [`DeckObject::update_tree`] just before output.

pub mod cell;
pub mod data;
pub mod material;
pub mod registry;
pub mod surface;
pub mod tally;

use crate::deck::ast::{ClassifierNode, Node, ParametersNode, SyntaxNode, Value};
use crate::deck::error::{DeckError, Result};
use crate::deck::formats::{self, OutputVersion};
use crate::deck::numbered::EntityKind;

pub use cell::Cell;
pub use data::DataRecord;
pub use material::Material;
pub use registry::{build_object, DataKind, RecordObject};
pub use surface::{Surface, SurfaceModifier};
pub use tally::{Tally, TallyGroup, TallyTargets, TallyType};

/// Anything that is written back as deck text
pub trait DeckObject {
    fn tree(&self) -> &SyntaxNode;

    /// Write state that lives outside the tree into it
    fn update_tree(&mut self) {}

    fn format_lines(&mut self, version: OutputVersion) -> Vec<String> {
        self.update_tree();
        formats::format_lines(self.tree(), version)
    }
}

pub(crate) fn classifier(tree: &SyntaxNode) -> Option<&ClassifierNode> {
    tree.get("classifier").and_then(Node::as_classifier)
}

/// The classifier number of a numbered record
pub(crate) fn tree_number(tree: &SyntaxNode, kind: EntityKind) -> Result<i64> {
    classifier(tree)
        .and_then(ClassifierNode::number)
        .ok_or_else(|| DeckError::IllegalState(format!("{} record has no number", kind)))
}

pub(crate) fn set_tree_number(tree: &mut SyntaxNode, number: i64) {
    if let Some(classifier) = tree.get_mut("classifier").and_then(Node::as_classifier_mut) {
        classifier.set_number(number);
    }
}

pub(crate) fn require_positive(kind: EntityKind, number: i64) -> Result<()> {
    if number <= 0 {
        return Err(DeckError::validation(kind, number, "number must be > 0"));
    }
    Ok(())
}

pub(crate) fn parameters(tree: &SyntaxNode) -> Option<&ParametersNode> {
    tree.get("parameters").and_then(Node::as_parameters)
}

/// Values of the first parameter named `key`
pub(crate) fn parameter_values(tree: &SyntaxNode, key: &str) -> Option<Vec<Value>> {
    let values = parameters(tree)?.values(key)?;
    Some(values.values().map(|v| v.value().clone()).collect())
}

/// Set the first value of `key`, appending a `key=value` entry if there is none
pub(crate) fn set_parameter(tree: &mut SyntaxNode, key: &str, value: Value) {
    let existing = tree
        .get_mut("parameters")
        .and_then(Node::as_parameters_mut)
        .and_then(|params| params.values_mut(key))
        .and_then(|values| values.values_mut().next());
    if let Some(node) = existing {
        node.set_value(value);
        return;
    }
    match tree.get_mut("parameters").and_then(Node::as_parameters_mut) {
        Some(params) => params.append(key, value),
        None => {
            tree.ensure_separated();
            let mut params = ParametersNode::new();
            params.append(key, value);
            tree.insert("parameters", params);
        }
    }
}
