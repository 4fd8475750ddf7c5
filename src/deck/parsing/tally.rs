//! Tally grammar
//!
//! ```text
//! tally = padding? classifier bin*
//! bin   = number | total | "(" bin+ ")"
//! total = "t"
//! ```
//!
//! Parenthesized bins become `tally group` nodes with `open`, `members` and
//! `close` children. The `t` marker stays a plain value in the bin list.

use chumsky::prelude::*;

use crate::deck::ast::{ClassifierNode, ListNode, Node, PaddingNode, SyntaxNode};
use crate::deck::lexing::TokenSpan;
use crate::deck::parsing::common::{
    classifier, number, punctuation, start_padding, text_where, ParserError,
};
use crate::deck::token::Token;

type Tally = ((Option<PaddingNode>, ClassifierNode), Vec<Node>);

/// The `t` bin that asks for a total
pub fn is_total(word: &str) -> bool {
    word.eq_ignore_ascii_case("t")
}

fn bin() -> impl Parser<TokenSpan, Node, Error = ParserError> + Clone {
    recursive(|bin| {
        let group = punctuation(Token::LParen)
            .then(bin.repeated().at_least(1))
            .then(punctuation(Token::RParen))
            .map(|((open, members), close)| {
                Node::Syntax(
                    SyntaxNode::new("tally group")
                        .with("open", open)
                        .with("members", ListNode::from_nodes(members))
                        .with("close", close),
                )
            });
        choice((
            group,
            text_where(is_total).map(Node::Value),
            number().map(Node::Value),
        ))
    })
}

pub(crate) fn tally() -> impl Parser<TokenSpan, Tally, Error = ParserError> + Clone {
    start_padding()
        .then(classifier())
        .then(bin().repeated())
        .then_ignore(end())
}

pub(crate) fn assemble_tally(((start, classifier), bins): Tally) -> Result<SyntaxNode, String> {
    if classifier.number().is_none() {
        return Err(format!("tally `{}` has no number", classifier.prefix()));
    }
    Ok(SyntaxNode::new("tally")
        .with_opt("start_pad", start)
        .with("classifier", classifier)
        .with("bins", ListNode::from_nodes(bins)))
}

#[cfg(test)]
mod tests {
    use crate::deck::parsing::{parse_record, Grammar};

    #[test]
    fn test_groups_and_total() {
        let source = "f4:n 1 (2 3) ( 4 (5 6) ) T";
        let tree = parse_record(&[source], Grammar::Tally).unwrap();
        let bins = tree.get("bins").unwrap().as_list().unwrap();
        assert_eq!(bins.len(), 4);
        let group = bins.items()[1].as_syntax().unwrap();
        assert_eq!(group.name(), "tally group");
        assert_eq!(group.get("members").unwrap().as_list().unwrap().len(), 2);
        assert_eq!(bins.items()[3].as_value().unwrap().as_str(), Some("T"));
        assert_eq!(tree.format(), source);
    }

    #[test]
    fn test_expanded_bins() {
        let tree = parse_record(&["f2 1 3i 5"], Grammar::Tally).unwrap();
        assert_eq!(tree.get("bins").unwrap().as_list().unwrap().len(), 5);
        assert_eq!(tree.format(), "f2 1 3i 5");
    }

    #[test]
    fn test_unbalanced_group_fails() {
        let err = parse_record(&["f4 (1 2"], Grammar::Tally).unwrap_err();
        assert_eq!(err.lines, vec!["f4 (1 2".to_string()]);
        assert!(parse_record(&["f4 1 2)"], Grammar::Tally).is_err());
    }

    #[test]
    fn test_tally_needs_number() {
        assert!(parse_record(&["f 1 2"], Grammar::Tally).is_err());
    }
}
