//! Record parsing
//!
//! [`parse_record`] runs the whole pipeline for one record:
//!
//! ```text
//! lines -> join -> lex -> expand shortcuts -> grammar -> SyntaxNode
//! ```
//!
//! A record parses completely or not at all; every failure is a
//! [`MalformedInputError`] carrying the record's lines.

pub(crate) mod cell;
pub(crate) mod common;
pub(crate) mod data;
pub(crate) mod tally;

use chumsky::Parser;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::deck::ast::SyntaxNode;
use crate::deck::error::MalformedInputError;
use crate::deck::lexing::{join_lines, lex};
use crate::deck::shortcuts::expand_tokens;

pub use tally::is_total;

/// Which record grammar to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grammar {
    /// Classifier, keyword, data list and parameters
    Data,
    /// Classifier, isotope-fraction pairs and parameters
    Material,
    /// Classifier and possibly grouped bins
    Tally,
    Cell,
    Surface,
}

/// Parse one record into a syntax tree
pub fn parse_record<S: AsRef<str>>(
    lines: &[S],
    grammar: Grammar,
) -> Result<SyntaxNode, MalformedInputError> {
    let source = join_lines(lines);
    let tokens = lex(&source).map_err(|err| MalformedInputError::new(lines, err))?;
    let tokens = expand_tokens(tokens).map_err(|err| MalformedInputError::new(lines, err))?;
    trace!(?grammar, tokens = tokens.len(), "parsing record");

    let syntax = |errors: Vec<common::ParserError>| {
        MalformedInputError::syntax(lines, common::describe(&errors))
    };
    let assembled = match grammar {
        Grammar::Data => data::data_input()
            .parse(tokens)
            .map_err(syntax)
            .map(data::assemble_data)?,
        Grammar::Material => data::material()
            .parse(tokens)
            .map_err(syntax)
            .map(data::assemble_material)?,
        Grammar::Tally => tally::tally()
            .parse(tokens)
            .map_err(syntax)
            .map(tally::assemble_tally)?,
        Grammar::Cell => cell::cell()
            .parse(tokens)
            .map_err(syntax)
            .map(cell::assemble_cell)?,
        Grammar::Surface => cell::surface()
            .parse(tokens)
            .map_err(syntax)
            .map(cell::assemble_surface)?,
    };
    assembled.map_err(|reason| MalformedInputError::value(lines, reason))
}
