//! The leading word of a record
//!
//! `*F14:n,p` splits into a modifier (`*`), a prefix (`F`), a number (`14`) and
//! particle designators (`n,p`). Each part is its own value node so the number can
//! be changed without touching the rest of the spelling.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::deck::ast::padding::PaddingNode;
use crate::deck::ast::value::{ValueNode, ValueType};

static CLASSIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<modifier>[*+]?)(?P<prefix>[a-zA-Z]*)(?P<number>\d*)(?::(?P<particles>[a-zA-Z,]+))?$")
        .unwrap()
});

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifierNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    modifier: Option<ValueNode>,
    prefix: ValueNode,
    #[serde(skip_serializing_if = "Option::is_none")]
    number: Option<ValueNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    particles: Option<ValueNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    padding: Option<PaddingNode>,
}

impl ClassifierNode {
    /// Split a classifier word; `None` if it has no recognizable shape
    pub fn parse(word: &str) -> Option<Self> {
        let captures = CLASSIFIER.captures(word)?;
        let part = |name: &str, kind: ValueType| {
            captures
                .name(name)
                .filter(|m| !m.as_str().is_empty())
                .and_then(|m| ValueNode::parse(m.as_str(), kind))
        };
        let prefix = captures.name("prefix").map(|m| m.as_str()).unwrap_or("");
        let number = part("number", ValueType::Int);
        if prefix.is_empty() && number.is_none() {
            return None;
        }
        Some(ClassifierNode {
            modifier: part("modifier", ValueType::Str),
            prefix: ValueNode::parse(prefix, ValueType::Str)?,
            number,
            particles: part("particles", ValueType::Str),
            padding: None,
        })
    }

    pub fn with_padding(mut self, padding: Option<PaddingNode>) -> Self {
        self.padding = padding.filter(|p| !p.is_empty());
        self
    }

    pub fn padding(&self) -> Option<&PaddingNode> {
        self.padding.as_ref()
    }

    /// Same rule as [`ValueNode::ensure_separated`]
    pub fn ensure_separated(&mut self) {
        match self.padding.as_mut() {
            None => self.padding = Some(PaddingNode::space()),
            Some(padding) if padding.ends_in_comment() => padding.push_continuation(),
            Some(_) => {}
        }
    }

    /// `*` or `+`, if present
    pub fn modifier(&self) -> Option<&str> {
        self.modifier.as_ref().and_then(ValueNode::as_str)
    }

    pub fn prefix(&self) -> &str {
        self.prefix.as_str().unwrap_or("")
    }

    pub fn number(&self) -> Option<i64> {
        self.number.as_ref().and_then(ValueNode::as_int)
    }

    pub fn number_node_mut(&mut self) -> Option<&mut ValueNode> {
        self.number.as_mut()
    }

    /// Change the number; a classifier without one gains it
    pub fn set_number(&mut self, number: i64) {
        match self.number.as_mut() {
            Some(node) => node.set_value(number),
            None => self.number = Some(ValueNode::new(number)),
        }
    }

    /// Particle designators, lowercased
    pub fn particles(&self) -> Vec<String> {
        self.particles
            .as_ref()
            .and_then(ValueNode::as_str)
            .map(|p| {
                p.split(',')
                    .filter(|s| !s.is_empty())
                    .map(str::to_ascii_lowercase)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The parts in source order
    pub fn parts(&self) -> impl Iterator<Item = &ValueNode> {
        self.modifier
            .iter()
            .chain(std::iter::once(&self.prefix))
            .chain(self.number.iter())
            .chain(self.particles.iter())
    }

    pub fn is_mutated(&self) -> bool {
        self.parts().any(ValueNode::is_mutated)
    }

    /// Format into `out`: parts are written back to back, then the padding
    pub fn write(&self, out: &mut String) {
        if let Some(modifier) = &self.modifier {
            out.push_str(&modifier.text());
        }
        out.push_str(&self.prefix.text());
        if let Some(number) = &self.number {
            out.push_str(&number.text());
        }
        if let Some(particles) = &self.particles {
            out.push(':');
            out.push_str(&particles.text());
        }
        if let Some(padding) = &self.padding {
            out.push_str(&padding.format());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(node: &ClassifierNode) -> String {
        let mut out = String::new();
        node.write(&mut out);
        out
    }

    #[test]
    fn test_split_tally_classifier() {
        let node = ClassifierNode::parse("*F14:n,P").unwrap();
        assert_eq!(node.modifier(), Some("*"));
        assert_eq!(node.prefix(), "F");
        assert_eq!(node.number(), Some(14));
        assert_eq!(node.particles(), vec!["n", "p"]);
        assert_eq!(format(&node), "*F14:n,P");
    }

    #[test]
    fn test_plain_classifiers() {
        let cell = ClassifierNode::parse("10").unwrap();
        assert_eq!(cell.prefix(), "");
        assert_eq!(cell.number(), Some(10));

        let mode = ClassifierNode::parse("mode").unwrap();
        assert_eq!(mode.prefix(), "mode");
        assert_eq!(mode.number(), None);

        let surface = ClassifierNode::parse("+3").unwrap();
        assert_eq!(surface.modifier(), Some("+"));
        assert_eq!(surface.number(), Some(3));
    }

    #[test]
    fn test_rejects_other_shapes() {
        assert!(ClassifierNode::parse("imp:n=1").is_none());
        assert!(ClassifierNode::parse("1001.80c").is_none());
        assert!(ClassifierNode::parse("*").is_none());
    }

    #[test]
    fn test_renumber_keeps_other_parts() {
        let mut node = ClassifierNode::parse("f4:n")
            .unwrap()
            .with_padding(Some(PaddingNode::space()));
        node.set_number(14);
        assert!(node.is_mutated());
        assert_eq!(format(&node), "f14:n ");
    }
}
