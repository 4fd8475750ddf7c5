//! Data records without a dedicated object

use crate::deck::ast::{ClassifierNode, ListNode, Node, ParametersNode, SyntaxNode, Value};
use crate::deck::objects::{classifier, parameter_values, parameters, set_parameter, DeckObject, DataKind};

/// Any data record kept as its tree: `sdef`, `mode`, `kcode`, `fc4`, ...
#[derive(Debug, Clone)]
pub struct DataRecord {
    kind: DataKind,
    tree: SyntaxNode,
}

impl DataRecord {
    pub fn new(kind: DataKind, tree: SyntaxNode) -> Self {
        DataRecord { kind, tree }
    }

    pub fn kind(&self) -> DataKind {
        self.kind
    }

    pub fn classifier(&self) -> Option<&ClassifierNode> {
        classifier(&self.tree)
    }

    /// Lowercased classifier prefix, `sdef` for `SDEF`
    pub fn prefix(&self) -> String {
        self.classifier()
            .map(|c| c.prefix().to_ascii_lowercase())
            .unwrap_or_default()
    }

    pub fn number(&self) -> Option<i64> {
        self.classifier().and_then(ClassifierNode::number)
    }

    pub fn keyword(&self) -> Option<&str> {
        self.tree.value("keyword").and_then(|k| k.as_str())
    }

    pub fn data(&self) -> Option<&ListNode> {
        self.tree.get("data").and_then(Node::as_list)
    }

    /// Values of the data list
    pub fn values(&self) -> Vec<Value> {
        self.data()
            .map(|list| list.values().map(|v| v.value().clone()).collect())
            .unwrap_or_default()
    }

    pub fn data_mut(&mut self) -> Option<&mut ListNode> {
        self.tree.get_mut("data").and_then(Node::as_list_mut)
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

impl DeckObject for DataRecord {
    fn tree(&self) -> &SyntaxNode {
        &self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::objects::{build_object, RecordObject};
    use crate::deck::lexing::BlockType;

    fn record(line: &str) -> DataRecord {
        match build_object(BlockType::Data, &[line]).unwrap() {
            RecordObject::Data(record) => record,
            other => panic!("expected a data record, got {other:?}"),
        }
    }

    #[test]
    fn test_source_record() {
        let mut sdef = record("SDEF pos=0 0 0 erg=14.1");
        assert_eq!(sdef.kind(), DataKind::Source);
        assert_eq!(sdef.prefix(), "sdef");
        assert_eq!(sdef.parameter("erg"), Some(vec![Value::Float(14.1)]));
        sdef.set_parameter("erg", 2.0);
        assert_eq!(sdef.tree().format(), "SDEF pos=0 0 0 erg=2.0");
    }

    #[test]
    fn test_numbered_data_with_shortcuts() {
        let record = record("si1 1 3i 5");
        assert_eq!(record.number(), Some(1));
        assert_eq!(record.values().len(), 5);
        assert_eq!(record.tree().format(), "si1 1 3i 5");
    }

    #[test]
    fn test_keyword_record() {
        let mode = record("mode n p");
        assert_eq!(mode.kind(), DataKind::Mode);
        assert_eq!(mode.keyword(), Some("n"));
        assert_eq!(mode.values(), vec![Value::Str("p".to_string())]);
    }
}
