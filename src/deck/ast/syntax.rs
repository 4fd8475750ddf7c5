//! Composite nodes: named fields and ordered sequences

use serde::Serialize;

use crate::deck::ast::node::Node;
use crate::deck::ast::value::ValueNode;

/// The result of one grammar production: named children in source order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyntaxNode {
    name: String,
    children: Vec<(String, Node)>,
}

impl SyntaxNode {
    pub fn new(name: impl Into<String>) -> Self {
        SyntaxNode {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a child at the end, replacing an existing child of that name in place
    pub fn insert(&mut self, name: impl Into<String>, node: impl Into<Node>) {
        let name = name.into();
        let node = node.into();
        match self.children.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = node,
            None => self.children.push((name, node)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, node: impl Into<Node>) -> Self {
        self.insert(name, node);
        self
    }

    /// Like [`with`](Self::with) but skips `None`
    pub fn with_opt<N: Into<Node>>(mut self, name: impl Into<String>, node: Option<N>) -> Self {
        if let Some(node) = node {
            self.insert(name, node);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.children
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.children
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn value(&self, name: &str) -> Option<&ValueNode> {
        self.get(name).and_then(Node::as_value)
    }

    pub fn value_mut(&mut self, name: &str) -> Option<&mut ValueNode> {
        self.get_mut(name).and_then(Node::as_value_mut)
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.children.iter().map(|(n, node)| (n.as_str(), node))
    }

    pub fn children_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.children.iter_mut().map(|(_, node)| node)
    }

    /// Make sure a word appended after the last child stays a separate word
    pub fn ensure_separated(&mut self) {
        for (_, node) in self.children.iter_mut().rev() {
            match node {
                Node::Classifier(classifier) => return classifier.ensure_separated(),
                Node::Padding(_) => {}
                other => {
                    if let Some(value) = other.last_value_mut() {
                        return value.ensure_separated();
                    }
                }
            }
        }
    }

    pub fn is_mutated(&self) -> bool {
        self.children.iter().any(|(_, node)| node.is_mutated())
    }

    /// The record text this node stands for
    pub fn format(&self) -> String {
        Node::format_tree(self)
    }
}

/// An ordered run of nodes, such as a number sequence or a cell's geometry
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListNode {
    items: Vec<Node>,
}

impl ListNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_nodes(items: Vec<Node>) -> Self {
        ListNode { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Node] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [Node] {
        &mut self.items
    }

    pub fn push(&mut self, node: impl Into<Node>) {
        if let Some(last) = self.items.last_mut().and_then(Node::last_value_mut) {
            last.ensure_separated();
        }
        self.items.push(node.into());
    }

    /// The direct value children
    pub fn values(&self) -> impl Iterator<Item = &ValueNode> {
        self.items.iter().filter_map(Node::as_value)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut ValueNode> {
        self.items.iter_mut().filter_map(Node::as_value_mut)
    }

    pub fn is_mutated(&self) -> bool {
        self.items.iter().any(Node::is_mutated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::ast::value::ValueType;

    fn number(text: &str, pad: bool) -> ValueNode {
        let node = ValueNode::parse(text, ValueType::Int).unwrap();
        if pad {
            node.with_padding(Some(crate::deck::ast::PaddingNode::space()))
        } else {
            node
        }
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let node = SyntaxNode::new("record")
            .with("b", number("2", true))
            .with("a", number("1", false));
        let names: Vec<&str> = node.children().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(node.format(), "2 1");
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut node = SyntaxNode::new("record")
            .with("a", number("1", true))
            .with("b", number("2", false));
        node.insert("a", number("5", true));
        assert_eq!(node.format(), "5 2");
        assert!(!node.is_mutated());
    }

    #[test]
    fn test_mutation_is_visible_from_parent() {
        let mut node = SyntaxNode::new("record").with("a", number("1", false));
        node.value_mut("a").unwrap().set_value(3);
        assert!(node.is_mutated());
        assert_eq!(node.format(), "3");
    }

    #[test]
    fn test_list_push_separates_values() {
        let mut list = ListNode::new();
        list.push(number("1", false));
        list.push(ValueNode::new(2));
        assert_eq!(Node::List(list).format(), "1 2");
    }
}
