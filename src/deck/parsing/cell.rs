//! Cell and surface grammars
//!
//! ```text
//! cell    = padding? number material density? geometry parameters?
//! surface = padding? [*+]?number transform? mnemonic coefficient*
//! ```
//!
//! A cell has a density exactly when its material is not `0`. Geometry is kept
//! as read: surface numbers plus the `(`, `)`, `:` and `#` operators.

use chumsky::prelude::*;

use crate::deck::ast::{ClassifierNode, ListNode, Node, PaddingNode, SyntaxNode, Value, ValueNode};
use crate::deck::lexing::TokenSpan;
use crate::deck::parsing::common::{
    assemble_parameters, classifier, integer, is_key, number, start_padding, text_where, word,
    ParserError,
};

type Cell = (((Option<PaddingNode>, ClassifierNode), ValueNode), Vec<ValueNode>);

pub(crate) fn cell() -> impl Parser<TokenSpan, Cell, Error = ParserError> + Clone {
    start_padding()
        .then(classifier())
        .then(integer())
        .then(word().repeated())
        .then_ignore(end())
}

fn is_geometry(value: &ValueNode) -> bool {
    match value.value() {
        Value::Int(_) | Value::Float(_) => true,
        Value::Str(s) => matches!(s.as_str(), "(" | ")" | ":" | "#"),
        Value::Null => false,
    }
}

fn classifier_number(classifier: &ClassifierNode, what: &str) -> Result<i64, String> {
    match (classifier.prefix(), classifier.number()) {
        ("", Some(number)) => Ok(number),
        _ => Err(format!("{} must start with its number", what)),
    }
}

pub(crate) fn assemble_cell(
    (((start, classifier), material), items): Cell,
) -> Result<SyntaxNode, String> {
    classifier_number(&classifier, "a cell")?;
    let mut items = items.into_iter().peekable();

    let density = match material.as_int() {
        Some(0) => None,
        _ => match items.next() {
            Some(density) if density.as_float().is_some() => Some(density),
            _ => return Err("a cell with a material needs a density".to_string()),
        },
    };

    let mut geometry = Vec::new();
    while let Some(item) = items.next_if(|item| !is_key(item)) {
        if !is_geometry(&item) {
            return Err(format!("`{}` is not part of a cell geometry", item.text()));
        }
        geometry.push(Node::Value(item));
    }
    if geometry.is_empty() {
        return Err("a cell needs a geometry".to_string());
    }

    let tail: Vec<ValueNode> = items.collect();
    let parameters = if tail.is_empty() {
        None
    } else {
        Some(assemble_parameters(tail)?)
    };
    Ok(SyntaxNode::new("cell")
        .with_opt("start_pad", start)
        .with("classifier", classifier)
        .with("material", material)
        .with_opt("density", density)
        .with("geometry", ListNode::from_nodes(geometry))
        .with_opt("parameters", parameters))
}

type Surface = (
    (((Option<PaddingNode>, ClassifierNode), Option<ValueNode>), ValueNode),
    Vec<ValueNode>,
);

fn is_mnemonic(word: &str) -> bool {
    word.starts_with(|c: char| c.is_ascii_alphabetic())
}

pub(crate) fn surface() -> impl Parser<TokenSpan, Surface, Error = ParserError> + Clone {
    start_padding()
        .then(classifier())
        .then(integer().or_not())
        .then(text_where(is_mnemonic))
        .then(number().repeated())
        .then_ignore(end())
}

pub(crate) fn assemble_surface(
    ((((start, classifier), transform), mnemonic), coefficients): Surface,
) -> Result<SyntaxNode, String> {
    classifier_number(&classifier, "a surface")?;
    if let Some(value) = coefficients.iter().find(|c| c.value().is_null()) {
        return Err(format!(
            "surface coefficients cannot be jumped (`{}`)",
            value.shortcut().map(|m| m.raw.as_str()).unwrap_or("j")
        ));
    }
    let coefficients = coefficients.into_iter().map(Node::Value).collect();
    Ok(SyntaxNode::new("surface")
        .with_opt("start_pad", start)
        .with("classifier", classifier)
        .with_opt("transform", transform)
        .with("mnemonic", mnemonic)
        .with("coefficients", ListNode::from_nodes(coefficients)))
}

#[cfg(test)]
mod tests {
    use crate::deck::parsing::{parse_record, Grammar};

    #[test]
    fn test_cell_with_material() {
        let lines = ["10 1 -0.5 -1 2 #3 (4:-5) $ fuel", "     imp:n=1 vol=2"];
        let tree = parse_record(&lines, Grammar::Cell).unwrap();
        assert_eq!(tree.value("material").unwrap().as_int(), Some(1));
        assert_eq!(tree.value("density").unwrap().as_float(), Some(-0.5));
        let geometry = tree.get("geometry").unwrap().as_list().unwrap();
        assert_eq!(geometry.len(), 9);
        let params = tree.get("parameters").unwrap().as_parameters().unwrap();
        assert_eq!(params.keys(), vec!["imp:n", "vol"]);
        assert_eq!(tree.format(), lines.join("\n"));
    }

    #[test]
    fn test_void_cell() {
        let tree = parse_record(&["2 0 1 imp:n=0"], Grammar::Cell).unwrap();
        assert!(tree.get("density").is_none());
        assert_eq!(tree.get("geometry").unwrap().as_list().unwrap().len(), 1);
    }

    #[test]
    fn test_cell_errors() {
        assert!(parse_record(&["1 1 -1.0"], Grammar::Cell).is_err());
        assert!(parse_record(&["1 1 lat=1"], Grammar::Cell).is_err());
        assert!(parse_record(&["c1 0 -1"], Grammar::Cell).is_err());
    }

    #[test]
    fn test_surfaces() {
        let tree = parse_record(&["*1 2 px 5.0"], Grammar::Surface).unwrap();
        assert_eq!(tree.value("transform").unwrap().as_int(), Some(2));
        assert_eq!(tree.value("mnemonic").unwrap().as_str(), Some("px"));
        assert_eq!(tree.format(), "*1 2 px 5.0");

        let tree = parse_record(&["3 so 2r"], Grammar::Surface);
        assert!(tree.is_err());

        let tree = parse_record(&["4 rpp -1 1 -1 1 -1 1"], Grammar::Surface).unwrap();
        assert!(tree.get("transform").is_none());
        assert_eq!(tree.get("coefficients").unwrap().as_list().unwrap().len(), 6);
    }
}
