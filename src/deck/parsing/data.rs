//! Data block grammars: the generic data record and the material record
//!
//! Generic grammar:
//!
//! ```text
//! data_input = padding? classifier keyword? data? parameters?
//! ```
//!
//! The words after the classifier are parsed flat and then split: a leading
//! letter word is the keyword, the parameter tail starts where
//! [`parameters_start`] says, and everything between is the data list.

use chumsky::prelude::*;

use crate::deck::ast::{
    ClassifierNode, IsotopesNode, ListNode, Node, PaddingNode, SyntaxNode, ValueNode, ValueType,
};
use crate::deck::lexing::TokenSpan;
use crate::deck::parsing::common::{
    assemble_parameters, classifier, is_key, number, padded, parameters_start, start_padding,
    word, ParserError,
};
use crate::deck::token::Token;

type Flat = ((Option<PaddingNode>, ClassifierNode), Vec<ValueNode>);

pub(crate) fn data_input() -> impl Parser<TokenSpan, Flat, Error = ParserError> + Clone {
    start_padding()
        .then(classifier())
        .then(word().repeated())
        .then_ignore(end())
}

pub(crate) fn assemble_data(
    ((start, classifier), mut items): Flat,
) -> Result<SyntaxNode, String> {
    let tail = items.split_off(parameters_start(&items));
    let mut data = items.into_iter().peekable();
    let keyword = data.next_if(is_key);
    let data: Vec<Node> = data.map(Node::Value).collect();

    let parameters = if tail.is_empty() {
        None
    } else {
        Some(assemble_parameters(tail)?)
    };
    Ok(SyntaxNode::new("data input")
        .with_opt("start_pad", start)
        .with("classifier", classifier)
        .with_opt("keyword", keyword)
        .with_opt("data", (!data.is_empty()).then(|| ListNode::from_nodes(data)))
        .with_opt("parameters", parameters))
}

type Isotopes = (((Option<PaddingNode>, ClassifierNode), Vec<(ValueNode, ValueNode)>), Vec<ValueNode>);

fn zaid() -> impl Parser<TokenSpan, ValueNode, Error = ParserError> + Clone {
    padded(filter_map(|span, found: TokenSpan| {
        let node = match &found.0 {
            Token::Zaid(text) => ValueNode::parse(text, ValueType::Str),
            Token::Number(text) if text.parse::<u64>().is_ok() => {
                ValueNode::parse(text, ValueType::Str)
            }
            _ => None,
        };
        node.ok_or_else(|| {
            Simple::expected_input_found(span, Vec::<Option<TokenSpan>>::new(), Some(found))
        })
    }))
}

/// `padding? classifier (zaid fraction)+ parameters?`
pub(crate) fn material() -> impl Parser<TokenSpan, Isotopes, Error = ParserError> + Clone {
    start_padding()
        .then(classifier())
        .then(zaid().then(number()).repeated().at_least(1))
        .then(word().repeated())
        .then_ignore(end())
}

pub(crate) fn assemble_material(
    (((start, classifier), pairs), tail): Isotopes,
) -> Result<SyntaxNode, String> {
    let mut isotopes = IsotopesNode::new();
    for (zaid, fraction) in pairs {
        if fraction.value().is_null() {
            return Err(format!("isotope `{}` has no fraction", zaid.text()));
        }
        isotopes.push(zaid, fraction);
    }
    let parameters = if tail.is_empty() {
        None
    } else {
        Some(assemble_parameters(tail)?)
    };
    Ok(SyntaxNode::new("material")
        .with_opt("start_pad", start)
        .with("classifier", classifier)
        .with("isotopes", isotopes)
        .with_opt("parameters", parameters))
}
