//! Which grammar and which object a record gets
//!
//! Cell and surface blocks have one record type each. In the data block the
//! classifier prefix decides, by exact case-insensitive match against
//! [`PREFIXES`]; unknown prefixes fall back to the generic data grammar.

use serde::{Deserialize, Serialize};

use crate::deck::ast::ClassifierNode;
use crate::deck::error::{MalformedInputError, Result};
use crate::deck::lexing::BlockType;
use crate::deck::objects::{Cell, DataRecord, Material, Surface, Tally};
use crate::deck::parsing::{parse_record, Grammar};

const DETECTOR_TYPE: i64 = 5;

/// Data record families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    Material,
    Thermal,
    Transform,
    Tally,
    /// Point detector tallies hold coordinates, not references
    Detector,
    TallyModifier,
    Source,
    Mode,
    Importance,
    Other,
}

pub static PREFIXES: &[(&str, DataKind)] = &[
    ("m", DataKind::Material),
    ("mt", DataKind::Thermal),
    ("tr", DataKind::Transform),
    ("f", DataKind::Tally),
    ("fc", DataKind::TallyModifier),
    ("fm", DataKind::TallyModifier),
    ("fs", DataKind::TallyModifier),
    ("fq", DataKind::TallyModifier),
    ("e", DataKind::TallyModifier),
    ("t", DataKind::TallyModifier),
    ("c", DataKind::TallyModifier),
    ("sd", DataKind::TallyModifier),
    ("sdef", DataKind::Source),
    ("si", DataKind::Source),
    ("sp", DataKind::Source),
    ("sb", DataKind::Source),
    ("ds", DataKind::Source),
    ("kcode", DataKind::Source),
    ("ksrc", DataKind::Source),
    ("mode", DataKind::Mode),
    ("imp", DataKind::Importance),
];

impl DataKind {
    pub fn from_prefix(prefix: &str) -> DataKind {
        PREFIXES
            .iter()
            .find(|(p, _)| p.eq_ignore_ascii_case(prefix))
            .map(|(_, kind)| *kind)
            .unwrap_or(DataKind::Other)
    }

    /// Classify a data record by its classifier
    pub fn of(classifier: &ClassifierNode) -> DataKind {
        match DataKind::from_prefix(classifier.prefix()) {
            DataKind::Tally if classifier.number().map(|n| n % 10) == Some(DETECTOR_TYPE) => {
                DataKind::Detector
            }
            kind => kind,
        }
    }

    pub fn grammar(&self) -> Grammar {
        match self {
            DataKind::Material => Grammar::Material,
            DataKind::Tally => Grammar::Tally,
            _ => Grammar::Data,
        }
    }
}

/// A record turned into its object
#[derive(Debug)]
pub enum RecordObject {
    Cell(Cell),
    Surface(Surface),
    Material(Material),
    Tally(Tally),
    Data(DataRecord),
}

fn first_word<S: AsRef<str>>(lines: &[S]) -> Option<&str> {
    lines.first()?.as_ref().split_whitespace().next()
}

/// Parse a record read from `block` into the object it describes
pub fn build_object<S: AsRef<str>>(block: BlockType, lines: &[S]) -> Result<RecordObject> {
    match block {
        BlockType::Cell => Ok(RecordObject::Cell(Cell::parse(lines)?)),
        BlockType::Surface => Ok(RecordObject::Surface(Surface::parse(lines)?)),
        BlockType::Data => {
            let classifier = first_word(lines)
                .and_then(ClassifierNode::parse)
                .ok_or_else(|| MalformedInputError::syntax(lines, "record has no classifier"))?;
            let kind = DataKind::of(&classifier);
            let tree = parse_record(lines, kind.grammar())?;
            match kind {
                DataKind::Material => Ok(RecordObject::Material(Material::from_tree(tree)?)),
                DataKind::Tally => Ok(RecordObject::Tally(Tally::from_tree(tree)?)),
                kind => Ok(RecordObject::Data(DataRecord::new(kind, tree))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("m", DataKind::Material)]
    #[case("MT", DataKind::Thermal)]
    #[case("f", DataKind::Tally)]
    #[case("Fc", DataKind::TallyModifier)]
    #[case("sdef", DataKind::Source)]
    #[case("nps", DataKind::Other)]
    #[case("mx", DataKind::Other)]
    fn test_exact_prefix_lookup(#[case] prefix: &str, #[case] expected: DataKind) {
        assert_eq!(DataKind::from_prefix(prefix), expected);
    }

    #[test]
    fn test_detector_tallies_are_generic_records() {
        let classifier = ClassifierNode::parse("f15:n").unwrap();
        assert_eq!(DataKind::of(&classifier), DataKind::Detector);
        assert_eq!(DataKind::Detector.grammar(), Grammar::Data);
        let classifier = ClassifierNode::parse("*f14:n").unwrap();
        assert_eq!(DataKind::of(&classifier), DataKind::Tally);
    }

    #[test]
    fn test_build_dispatches_on_prefix() {
        let object = build_object(BlockType::Data, &["m1 1001.80c 1"]).unwrap();
        assert!(matches!(object, RecordObject::Material(_)));
        let object = build_object(BlockType::Data, &["f4:n 1 2"]).unwrap();
        assert!(matches!(object, RecordObject::Tally(_)));
        let object = build_object(BlockType::Data, &["f5:n 0 0 0 0.5 nd"]).unwrap();
        assert!(matches!(object, RecordObject::Data(_)));
        let object = build_object(BlockType::Data, &["nps 1e6"]).unwrap();
        assert!(matches!(object, RecordObject::Data(_)));
        let object = build_object(BlockType::Cell, &["1 0 -1"]).unwrap();
        assert!(matches!(object, RecordObject::Cell(_)));
        let object = build_object(BlockType::Surface, &["1 so 5"]).unwrap();
        assert!(matches!(object, RecordObject::Surface(_)));
    }
}
