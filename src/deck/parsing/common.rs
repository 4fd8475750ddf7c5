//! Combinators shared by every record grammar
//!
//! Each value parser consumes one word token and then any trivia after it, which
//! becomes the value's padding. Nothing is skipped, so the nodes produced by a
//! successful parse cover the whole record.

use chumsky::prelude::*;

use crate::deck::ast::{
    parameter, ClassifierNode, ListNode, Node, PaddingNode, ParametersNode, Value, ValueNode,
    ValueType,
};
use crate::deck::lexing::TokenSpan;
use crate::deck::token::Token;

/// Type alias for parser error
pub(crate) type ParserError = Simple<TokenSpan>;

fn unexpected(span: std::ops::Range<usize>, found: TokenSpan) -> ParserError {
    Simple::expected_input_found(span, Vec::<Option<TokenSpan>>::new(), Some(found))
}

/// One or more trivia tokens
pub(crate) fn padding() -> impl Parser<TokenSpan, PaddingNode, Error = ParserError> + Clone {
    filter(|(t, _): &TokenSpan| t.is_trivia())
        .repeated()
        .at_least(1)
        .map(|tokens: Vec<TokenSpan>| PaddingNode::from_tokens(tokens.into_iter().map(|(t, _)| t)))
}

/// Attach the trivia following a value to it
pub(crate) fn padded(
    value: impl Parser<TokenSpan, ValueNode, Error = ParserError> + Clone,
) -> impl Parser<TokenSpan, ValueNode, Error = ParserError> + Clone {
    value
        .then(padding().or_not())
        .map(|(value, padding)| value.with_padding(padding))
}

/// A literal or generated number; jumps are allowed and become null values
pub(crate) fn number() -> impl Parser<TokenSpan, ValueNode, Error = ParserError> + Clone {
    padded(filter_map(|span, found: TokenSpan| {
        let node = match &found.0 {
            Token::Number(text) => ValueNode::parse_number(text),
            Token::Generated(generated) => ValueNode::generated(generated, None),
            _ => None,
        };
        node.ok_or_else(|| unexpected(span, found))
    }))
}

/// An integer, literal or generated
pub(crate) fn integer() -> impl Parser<TokenSpan, ValueNode, Error = ParserError> + Clone {
    padded(filter_map(|span, found: TokenSpan| {
        let node = match &found.0 {
            Token::Number(text) => ValueNode::parse(text, ValueType::Int),
            Token::Generated(generated) if generated.text.is_some() => {
                ValueNode::generated(generated, Some(ValueType::Int))
            }
            _ => None,
        };
        node.ok_or_else(|| unexpected(span, found))
    }))
}

/// A text word accepted by `accept`
pub(crate) fn text_where(
    accept: impl Fn(&str) -> bool + Clone,
) -> impl Parser<TokenSpan, ValueNode, Error = ParserError> + Clone {
    padded(filter_map(move |span, found: TokenSpan| {
        let node = match &found.0 {
            Token::Text(text) if accept(text) => ValueNode::parse(text, ValueType::Str),
            _ => None,
        };
        node.ok_or_else(|| unexpected(span, found))
    }))
}

/// A specific punctuation token as a string value
pub(crate) fn punctuation(
    expected: Token,
) -> impl Parser<TokenSpan, ValueNode, Error = ParserError> + Clone {
    padded(filter_map(move |span, found: TokenSpan| {
        if found.0 == expected {
            if let Some(node) = found.0.word().and_then(|w| ValueNode::parse(w, ValueType::Str)) {
                return Ok(node);
            }
        }
        Err(unexpected(span, found))
    }))
}

/// Any word: numbers are typed, everything else is a string
pub(crate) fn word() -> impl Parser<TokenSpan, ValueNode, Error = ParserError> + Clone {
    padded(filter_map(|span, found: TokenSpan| {
        let node = match &found.0 {
            Token::Number(text) => ValueNode::parse_number(text),
            Token::Generated(generated) => ValueNode::generated(generated, None)
                .or_else(|| ValueNode::generated(generated, Some(ValueType::Str))),
            Token::Error(_) => None,
            token => token.word().and_then(|w| ValueNode::parse(w, ValueType::Str)),
        };
        node.ok_or_else(|| unexpected(span, found))
    }))
}

/// The leading word of a record
pub(crate) fn classifier() -> impl Parser<TokenSpan, ClassifierNode, Error = ParserError> + Clone {
    filter_map(|span, found: TokenSpan| {
        let node = match &found.0 {
            Token::Text(text) | Token::Number(text) => ClassifierNode::parse(text),
            _ => None,
        };
        node.ok_or_else(|| unexpected(span, found))
    })
    .then(padding().or_not())
    .map(|(classifier, padding)| classifier.with_padding(padding))
}

/// Leading trivia of a record, if any
pub(crate) fn start_padding() -> impl Parser<TokenSpan, Option<PaddingNode>, Error = ParserError> + Clone
{
    padding().or_not()
}

/// Words that may name a parameter: they start with a letter or `*`
pub(crate) fn is_key(value: &ValueNode) -> bool {
    matches!(value.value(), Value::Str(s) if s.starts_with(|c: char| c.is_ascii_alphabetic() || c == '*'))
}

fn is_equals(value: &ValueNode) -> bool {
    value.as_str() == Some("=")
}

/// Numbers, jumps and digit-led words such as `80p` or `1001.80c`
pub(crate) fn is_number_like(value: &ValueNode) -> bool {
    match value.value() {
        Value::Int(_) | Value::Float(_) | Value::Null => true,
        Value::Str(s) => s.starts_with(|c: char| c.is_ascii_digit() || c == '.'),
    }
}

/// True if `items[i]` begins a new parameter
fn starts_parameter(items: &[ValueNode], i: usize) -> bool {
    items.get(i).is_some_and(is_key)
        && items
            .get(i + 1)
            .is_some_and(|next| is_equals(next) || is_number_like(next))
}

/// Where the parameter tail of a flat word list begins
///
/// A key followed by `=` always starts it. A key followed by a number starts it
/// only after some data, so that a leading keyword (`sdef erg 14`) stays data.
pub(crate) fn parameters_start(items: &[ValueNode]) -> usize {
    for i in 0..items.len() {
        if !is_key(&items[i]) {
            continue;
        }
        let followed_by_equals = items.get(i + 1).is_some_and(is_equals);
        let after_data = i > 0 && is_number_like(&items[i - 1]);
        if followed_by_equals || (after_data && starts_parameter(items, i)) {
            return i;
        }
    }
    items.len()
}

/// Group a flat parameter tail into `parameter` entries
pub(crate) fn assemble_parameters(items: Vec<ValueNode>) -> Result<ParametersNode, String> {
    // (value count, has separator) per entry
    let mut shapes = Vec::new();
    let mut i = 0;
    while i < items.len() {
        let key = &items[i];
        if !is_key(key) {
            return Err(format!("expected a parameter name, found `{}`", key.text()));
        }
        let no_value = || format!("parameter `{}` has no value", key.text());
        let has_separator = items.get(i + 1).is_some_and(is_equals);
        let first_value = i + 1 + usize::from(has_separator);
        let mut end = first_value;
        if has_separator {
            match items.get(end) {
                Some(value) if !is_equals(value) => end += 1,
                _ => return Err(no_value()),
            }
        }
        while end < items.len() && !starts_parameter(&items, end) {
            if is_equals(&items[end]) {
                return Err(format!("unexpected `=` in parameter `{}`", key.text()));
            }
            end += 1;
        }
        if end == first_value {
            return Err(no_value());
        }
        shapes.push((end - first_value, has_separator));
        i = end;
    }

    let mut params = ParametersNode::new();
    let mut items = items.into_iter();
    for (count, has_separator) in shapes {
        let Some(key) = items.next() else { break };
        let separator = if has_separator { items.next() } else { None };
        let values: Vec<Node> = items.by_ref().take(count).map(Node::Value).collect();
        params.push(parameter(key, separator, ListNode::from_nodes(values)));
    }
    Ok(params)
}

/// Turn a chumsky error into a single readable message
pub(crate) fn describe(errors: &[ParserError]) -> String {
    match errors.first() {
        Some(error) => match error.found() {
            Some((token, span)) => format!(
                "unexpected `{}` at byte {}",
                token.word().unwrap_or_else(|| token_kind(token)),
                span.start
            ),
            None => "unexpected end of record".to_string(),
        },
        None => "unparseable record".to_string(),
    }
}

fn token_kind(token: &Token) -> &'static str {
    match token {
        Token::Generated(_) => "generated value",
        Token::Newline => "end of line",
        _ => "trivia",
    }
}
