//! Scalar value nodes
//!
//! A [`ValueNode`] remembers the exact spelling it was read with. Until its value
//! changes it formats as that spelling; afterwards it formats the new value in a
//! canonical form. Values that came out of a shortcut remember the shortcut
//! instead, see [`crate::deck::ast::node`] for how such groups are re-emitted.

use std::fmt;

use serde::Serialize;

use crate::deck::ast::padding::PaddingNode;
use crate::deck::token::{Generated, ShortcutMark};

/// The declared type of a value slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Int,
    Float,
    Str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    /// Left unset by a jump
    Null,
}

impl Value {
    /// Interpret `text` as the given type
    pub fn parse(text: &str, kind: ValueType) -> Option<Value> {
        match kind {
            ValueType::Int => text.parse::<i64>().ok().map(Value::Int),
            ValueType::Float => parse_float(text).map(Value::Float),
            ValueType::Str => Some(Value::Str(text.to_string())),
        }
    }

    /// Integer if the text is one, float otherwise
    pub fn parse_number(text: &str) -> Option<Value> {
        Value::parse(text, ValueType::Int).or_else(|| Value::parse(text, ValueType::Float))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The spelling used when a value has no source text to fall back on
    pub fn canonical(&self) -> String {
        match self {
            Value::Int(n) => n.to_string(),
            // shortest round-trip form, exponent outside [1e-5, 1e16)
            Value::Float(f) => format!("{:?}", f),
            Value::Str(s) => s.clone(),
            Value::Null => "J".to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

fn parse_float(text: &str) -> Option<f64> {
    let value: f64 = text.parse().ok()?;
    // reject inf/nan spellings
    value.is_finite().then_some(value)
}

/// A typed scalar with its trailing trivia
#[derive(Debug, Clone, Serialize)]
pub struct ValueNode {
    value: Value,
    kind: ValueType,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw: Option<String>,
    #[serde(skip)]
    shortcut: Option<ShortcutMark>,
    #[serde(skip_serializing_if = "Option::is_none")]
    padding: Option<PaddingNode>,
    #[serde(skip)]
    mutated: bool,
}

impl ValueNode {
    /// A value read from source text
    pub fn parse(text: &str, kind: ValueType) -> Option<Self> {
        let value = Value::parse(text, kind)?;
        Some(ValueNode {
            value,
            kind,
            raw: Some(text.to_string()),
            shortcut: None,
            padding: None,
            mutated: false,
        })
    }

    /// A number read from source, typed by its spelling
    pub fn parse_number(text: &str) -> Option<Self> {
        let value = Value::parse_number(text)?;
        let kind = match value {
            Value::Int(_) => ValueType::Int,
            _ => ValueType::Float,
        };
        Some(ValueNode {
            value,
            kind,
            raw: Some(text.to_string()),
            shortcut: None,
            padding: None,
            mutated: false,
        })
    }

    /// A value produced by shortcut expansion. Jumps become [`Value::Null`].
    pub fn generated(generated: &Generated, kind: Option<ValueType>) -> Option<Self> {
        let (value, kind) = match (&generated.text, kind) {
            (None, kind) => (Value::Null, kind.unwrap_or(ValueType::Float)),
            (Some(text), Some(kind)) => (Value::parse(text, kind)?, kind),
            (Some(text), None) => {
                let value = Value::parse_number(text)?;
                let kind = match value {
                    Value::Int(_) => ValueType::Int,
                    _ => ValueType::Float,
                };
                (value, kind)
            }
        };
        Some(ValueNode {
            value,
            kind,
            raw: None,
            shortcut: Some(generated.mark.clone()),
            padding: None,
            mutated: false,
        })
    }

    /// A value created in code; it formats canonically
    pub fn new(value: impl Into<Value>) -> Self {
        let value = value.into();
        let kind = match value {
            Value::Int(_) => ValueType::Int,
            Value::Str(_) => ValueType::Str,
            Value::Float(_) | Value::Null => ValueType::Float,
        };
        ValueNode {
            value,
            kind,
            raw: None,
            shortcut: None,
            padding: None,
            mutated: true,
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn kind(&self) -> ValueType {
        self.kind
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    pub fn shortcut(&self) -> Option<&ShortcutMark> {
        self.shortcut.as_ref()
    }

    pub fn padding(&self) -> Option<&PaddingNode> {
        self.padding.as_ref()
    }

    pub fn set_padding(&mut self, padding: Option<PaddingNode>) {
        self.padding = padding.filter(|p| !p.is_empty());
    }

    pub fn with_padding(mut self, padding: Option<PaddingNode>) -> Self {
        self.set_padding(padding);
        self
    }

    /// Make sure another value can follow this one
    ///
    /// A node without trivia gains a blank. Trivia ending in a `$` comment gains a
    /// line break and a continuation indent, or the next value would be commented out.
    pub fn ensure_separated(&mut self) {
        match self.padding.as_mut() {
            None => self.padding = Some(PaddingNode::space()),
            Some(padding) if padding.ends_in_comment() => padding.push_continuation(),
            Some(_) => {}
        }
    }

    /// Replace the value. Only a different value marks the node as mutated.
    pub fn set_value(&mut self, value: impl Into<Value>) {
        let value = value.into();
        if value != self.value {
            self.value = value;
            self.mutated = true;
        }
    }

    pub fn is_mutated(&self) -> bool {
        self.mutated
    }

    pub fn as_int(&self) -> Option<i64> {
        self.value.as_int()
    }

    pub fn as_float(&self) -> Option<f64> {
        self.value.as_float()
    }

    pub fn as_str(&self) -> Option<&str> {
        self.value.as_str()
    }

    /// Text of the value alone, without padding
    ///
    /// Shortcut members that were never touched have no text of their own; they
    /// print canonically here. Group-aware output lives in the formatter.
    pub fn text(&self) -> String {
        match (&self.raw, self.mutated) {
            (Some(raw), false) => raw.clone(),
            _ => self.value.canonical(),
        }
    }
}

impl PartialEq for ValueNode {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmodified_value_keeps_spelling() {
        let node = ValueNode::parse("1.50E+00", ValueType::Float).unwrap();
        assert_eq!(node.as_float(), Some(1.5));
        assert_eq!(node.text(), "1.50E+00");
        assert!(!node.is_mutated());
    }

    #[test]
    fn test_setting_same_value_is_not_a_mutation() {
        let mut node = ValueNode::parse("1.50E+00", ValueType::Float).unwrap();
        node.set_value(1.5);
        assert!(!node.is_mutated());
        node.set_value(2.25);
        assert!(node.is_mutated());
        assert_eq!(node.text(), "2.25");
    }

    #[test]
    fn test_canonical_forms() {
        assert_eq!(Value::Int(-4).canonical(), "-4");
        assert_eq!(Value::Float(2.0).canonical(), "2.0");
        assert_eq!(Value::Float(1e-7).canonical(), "1e-7");
        assert_eq!(Value::Float(0.001).canonical(), "0.001");
        assert_eq!(Value::Null.canonical(), "J");
    }

    #[test]
    fn test_parse_number_infers_type() {
        assert_eq!(ValueNode::parse_number("7").unwrap().kind(), ValueType::Int);
        assert_eq!(
            ValueNode::parse_number("-0.7").unwrap().kind(),
            ValueType::Float
        );
        assert!(ValueNode::parse_number("inf").is_none());
        assert!(ValueNode::parse("1.5", ValueType::Int).is_none());
    }

    #[test]
    fn test_equality_ignores_spelling_and_padding() {
        let a = ValueNode::parse("1.0", ValueType::Float).unwrap();
        let b = ValueNode::parse("1.000", ValueType::Float)
            .unwrap()
            .with_padding(Some(PaddingNode::space()));
        assert_eq!(a, b);
    }

    #[test]
    fn test_separation_after_comment_starts_a_continuation() {
        let mut padding = PaddingNode::space();
        padding.push(crate::deck::token::Token::DollarComment("$ note".to_string()));
        let mut node = ValueNode::parse("1", ValueType::Int)
            .unwrap()
            .with_padding(Some(padding));
        node.ensure_separated();
        assert_eq!(node.padding().unwrap().format(), " $ note\n     ");

        let mut bare = ValueNode::parse("2", ValueType::Int).unwrap();
        bare.ensure_separated();
        assert_eq!(bare.padding().unwrap().format(), " ");
    }

    #[test]
    fn test_fresh_node_is_mutated() {
        let node = ValueNode::new(3);
        assert!(node.is_mutated());
        assert_eq!(node.text(), "3");
    }
}
