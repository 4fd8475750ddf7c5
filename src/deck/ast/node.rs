//! The node sum type and tree formatting
//!
//! Formatting walks children in order and concatenates their text. Values read
//! from source print their original spelling until mutated. Values generated by
//! one shortcut form a group: while no member of the group is mutated the group
//! prints the shortcut once (`3r`); as soon as any member changes, every member
//! of the group prints its own value so the edit is not lost.

use std::collections::HashSet;

use serde::Serialize;

use crate::deck::ast::classifier::ClassifierNode;
use crate::deck::ast::lists::{IsotopesNode, ParametersNode};
use crate::deck::ast::padding::PaddingNode;
use crate::deck::ast::syntax::{ListNode, SyntaxNode};
use crate::deck::ast::value::ValueNode;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Node {
    Value(ValueNode),
    Padding(PaddingNode),
    Syntax(SyntaxNode),
    Classifier(ClassifierNode),
    List(ListNode),
    Parameters(ParametersNode),
    Isotopes(IsotopesNode),
}

impl Node {
    pub fn as_value(&self) -> Option<&ValueNode> {
        match self {
            Node::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_value_mut(&mut self) -> Option<&mut ValueNode> {
        match self {
            Node::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_syntax(&self) -> Option<&SyntaxNode> {
        match self {
            Node::Syntax(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_syntax_mut(&mut self) -> Option<&mut SyntaxNode> {
        match self {
            Node::Syntax(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_classifier(&self) -> Option<&ClassifierNode> {
        match self {
            Node::Classifier(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_classifier_mut(&mut self) -> Option<&mut ClassifierNode> {
        match self {
            Node::Classifier(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListNode> {
        match self {
            Node::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut ListNode> {
        match self {
            Node::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_parameters(&self) -> Option<&ParametersNode> {
        match self {
            Node::Parameters(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_parameters_mut(&mut self) -> Option<&mut ParametersNode> {
        match self {
            Node::Parameters(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_isotopes(&self) -> Option<&IsotopesNode> {
        match self {
            Node::Isotopes(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_isotopes_mut(&mut self) -> Option<&mut IsotopesNode> {
        match self {
            Node::Isotopes(i) => Some(i),
            _ => None,
        }
    }

    pub fn is_mutated(&self) -> bool {
        match self {
            Node::Value(v) => v.is_mutated(),
            Node::Padding(_) => false,
            Node::Syntax(s) => s.is_mutated(),
            Node::Classifier(c) => c.is_mutated(),
            Node::List(l) => l.is_mutated(),
            Node::Parameters(p) => p.is_mutated(),
            Node::Isotopes(i) => i.is_mutated(),
        }
    }

    /// Every value in source order, classifier parts included
    pub fn visit_values(&self, f: &mut dyn FnMut(&ValueNode)) {
        match self {
            Node::Value(v) => f(v),
            Node::Padding(_) => {}
            Node::Syntax(s) => s.children().for_each(|(_, n)| n.visit_values(f)),
            Node::Classifier(c) => c.parts().for_each(|v| f(v)),
            Node::List(l) => l.items().iter().for_each(|n| n.visit_values(f)),
            Node::Parameters(p) => p
                .iter()
                .for_each(|s| s.children().for_each(|(_, n)| n.visit_values(f))),
            Node::Isotopes(i) => i
                .iter()
                .for_each(|s| s.children().for_each(|(_, n)| n.visit_values(f))),
        }
    }

    /// Mutable walk over values outside classifiers, in source order
    pub fn visit_values_mut(&mut self, f: &mut dyn FnMut(&mut ValueNode)) {
        match self {
            Node::Value(v) => f(v),
            Node::Syntax(s) => s.children_mut().for_each(|n| n.visit_values_mut(f)),
            Node::List(l) => l.items_mut().iter_mut().for_each(|n| n.visit_values_mut(f)),
            Node::Padding(_) | Node::Classifier(_) | Node::Parameters(_) | Node::Isotopes(_) => {}
        }
    }

    /// The value that ends this node, if it ends in one
    pub fn last_value_mut(&mut self) -> Option<&mut ValueNode> {
        match self {
            Node::Value(v) => Some(v),
            Node::Syntax(s) => s.children_mut().last()?.last_value_mut(),
            Node::List(l) => l.items_mut().last_mut()?.last_value_mut(),
            Node::Parameters(p) => p.last_mut()?.children_mut().last()?.last_value_mut(),
            Node::Isotopes(i) => i.last_mut()?.children_mut().last()?.last_value_mut(),
            Node::Padding(_) | Node::Classifier(_) => None,
        }
    }

    pub fn format(&self) -> String {
        let context = FormatContext::new(|f| self.visit_values(f));
        let mut out = String::new();
        context.write(self, &mut out);
        out
    }

    pub(crate) fn format_tree(tree: &SyntaxNode) -> String {
        let context =
            FormatContext::new(|f| tree.children().for_each(|(_, n)| n.visit_values(f)));
        let mut out = String::new();
        context.write_syntax(tree, &mut out);
        out
    }
}

/// Which shortcut groups of a tree have a mutated member
struct FormatContext {
    dirty_groups: HashSet<usize>,
}

impl FormatContext {
    fn new(visit: impl FnOnce(&mut dyn FnMut(&ValueNode))) -> Self {
        let mut dirty_groups = HashSet::new();
        visit(&mut |value: &ValueNode| {
            if let Some(mark) = value.shortcut() {
                if value.is_mutated() {
                    dirty_groups.insert(mark.group);
                }
            }
        });
        FormatContext { dirty_groups }
    }

    fn write(&self, node: &Node, out: &mut String) {
        match node {
            Node::Value(v) => self.write_value(v, out),
            Node::Padding(p) => out.push_str(&p.format()),
            Node::Syntax(s) => self.write_syntax(s, out),
            Node::Classifier(c) => c.write(out),
            Node::List(l) => l.items().iter().for_each(|n| self.write(n, out)),
            Node::Parameters(p) => p.iter().for_each(|s| self.write_syntax(s, out)),
            Node::Isotopes(i) => i.iter().for_each(|s| self.write_syntax(s, out)),
        }
    }

    fn write_syntax(&self, node: &SyntaxNode, out: &mut String) {
        node.children().for_each(|(_, n)| self.write(n, out));
    }

    fn write_value(&self, value: &ValueNode, out: &mut String) {
        let padding = value.padding().map(PaddingNode::format);
        match value.shortcut() {
            Some(mark) if !self.dirty_groups.contains(&mark.group) => {
                if mark.is_first() {
                    out.push_str(&mark.raw);
                }
            }
            Some(mark) => {
                out.push_str(&value.value().canonical());
                if padding.is_none() && !mark.is_last() {
                    out.push(' ');
                }
            }
            None => out.push_str(&value.text()),
        }
        if let Some(padding) = padding {
            out.push_str(&padding);
        }
    }
}
