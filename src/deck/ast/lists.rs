//! Append-only lists of parameters and isotopes

use serde::Serialize;

use crate::deck::ast::node::Node;
use crate::deck::ast::syntax::{ListNode, SyntaxNode};
use crate::deck::ast::value::{Value, ValueNode};

/// `key=value` or `key value` entries in source order
///
/// Each entry is a `parameter` node with a `key`, an optional `separator` (the `=`
/// as written) and a `value` list. Keys are not required to be unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParametersNode {
    params: Vec<SyntaxNode>,
}

impl ParametersNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Add a parsed entry as is
    pub fn push(&mut self, param: SyntaxNode) {
        self.params.push(param);
    }

    /// Append a new `key=value` entry, separated from the previous one
    pub fn append(&mut self, key: &str, value: impl Into<Value>) {
        if let Some(last) = self.params.last_mut() {
            separate_last(last);
        }
        let values = ListNode::from_nodes(vec![Node::Value(ValueNode::new(value))]);
        self.push(parameter(ValueNode::new(key), Some(ValueNode::new("=")), values));
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SyntaxNode> {
        self.params.iter()
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut SyntaxNode> {
        self.params.last_mut()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.params.iter().filter_map(key_of).collect()
    }

    /// First entry whose key matches, ignoring case
    pub fn get(&self, key: &str) -> Option<&SyntaxNode> {
        self.params
            .iter()
            .find(|p| key_of(p).is_some_and(|k| k.eq_ignore_ascii_case(key)))
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut SyntaxNode> {
        self.params
            .iter_mut()
            .find(|p| key_of(p).is_some_and(|k| k.eq_ignore_ascii_case(key)))
    }

    /// The values of an entry
    pub fn values(&self, key: &str) -> Option<&ListNode> {
        self.get(key)?.get("value")?.as_list()
    }

    pub fn values_mut(&mut self, key: &str) -> Option<&mut ListNode> {
        self.get_mut(key)?.get_mut("value")?.as_list_mut()
    }

    pub fn is_mutated(&self) -> bool {
        self.params.iter().any(SyntaxNode::is_mutated)
    }
}

/// Build one parameter entry
pub fn parameter(key: ValueNode, separator: Option<ValueNode>, values: ListNode) -> SyntaxNode {
    SyntaxNode::new("parameter")
        .with("key", key)
        .with_opt("separator", separator)
        .with("value", values)
}

fn key_of(param: &SyntaxNode) -> Option<&str> {
    param.value("key").and_then(ValueNode::as_str)
}

fn separate_last(node: &mut SyntaxNode) {
    if let Some(value) = node.children_mut().last().and_then(Node::last_value_mut) {
        value.ensure_separated();
    }
}

/// Isotope and fraction pairs of a material
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IsotopesNode {
    entries: Vec<SyntaxNode>,
}

impl IsotopesNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a parsed pair as is
    pub fn push(&mut self, zaid: ValueNode, fraction: ValueNode) {
        self.entries.push(
            SyntaxNode::new("isotope")
                .with("zaid", zaid)
                .with("fraction", fraction),
        );
    }

    /// Append a new pair, separated from the previous one
    pub fn append(&mut self, zaid: &str, fraction: f64) {
        if let Some(last) = self.entries.last_mut() {
            separate_last(last);
        }
        let mut zaid = ValueNode::new(zaid);
        zaid.ensure_separated();
        self.push(zaid, ValueNode::new(fraction));
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SyntaxNode> {
        self.entries.iter()
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut SyntaxNode> {
        self.entries.last_mut()
    }

    /// `(zaid, fraction)` for every entry
    pub fn components(&self) -> Vec<(String, f64)> {
        self.entries
            .iter()
            .filter_map(|entry| {
                let zaid = entry.value("zaid")?.text();
                let fraction = entry.value("fraction")?.as_float()?;
                Some((zaid, fraction))
            })
            .collect()
    }

    pub fn fraction_mut(&mut self, index: usize) -> Option<&mut ValueNode> {
        self.entries.get_mut(index)?.value_mut("fraction")
    }

    pub fn is_mutated(&self) -> bool {
        self.entries.iter().any(SyntaxNode::is_mutated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::ast::value::ValueType;
    use crate::deck::ast::PaddingNode;

    fn word(text: &str, kind: ValueType) -> ValueNode {
        ValueNode::parse(text, kind).unwrap()
    }

    #[test]
    fn test_parameters_lookup_is_case_insensitive() {
        let mut params = ParametersNode::new();
        let values = ListNode::from_nodes(vec![Node::Value(word("1", ValueType::Int))]);
        params.push(parameter(
            word("IMP:N", ValueType::Str),
            Some(word("=", ValueType::Str)),
            values,
        ));
        assert_eq!(params.keys(), vec!["IMP:N"]);
        let value = params.values("imp:n").unwrap().values().next().unwrap();
        assert_eq!(value.as_int(), Some(1));
    }

    #[test]
    fn test_append_parameter_formats_canonically() {
        let mut params = ParametersNode::new();
        let values = ListNode::from_nodes(vec![Node::Value(word("1", ValueType::Int))]);
        params.push(parameter(
            word("imp:n", ValueType::Str),
            Some(word("=", ValueType::Str)),
            values,
        ));
        params.append("vol", 2.5);
        assert!(params.is_mutated());
        assert_eq!(Node::Parameters(params).format(), "imp:n=1 vol=2.5");
    }

    #[test]
    fn test_isotopes() {
        let mut isotopes = IsotopesNode::new();
        isotopes.push(
            word("1001.80c", ValueType::Str).with_padding(Some(PaddingNode::space())),
            word("2", ValueType::Float),
        );
        isotopes.append("8016.80c", 1.0);
        assert_eq!(
            isotopes.components(),
            vec![("1001.80c".to_string(), 2.0), ("8016.80c".to_string(), 1.0)]
        );
        assert_eq!(Node::Isotopes(isotopes).format(), "1001.80c 2 8016.80c 1.0");
    }
}
