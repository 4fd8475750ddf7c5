//! Output formats for syntax trees
//!
//! Deck text is a function of the tree and the [`OutputVersion`] it is written
//! for. The version only decides the line length: 80 columns before 6.2, 128
//! from 6.2 on. Trees that were never mutated print their source lines unchanged
//! whatever the version.

pub mod wrapping;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::deck::ast::SyntaxNode;

pub use wrapping::{wrap_line, CONTINUATION_INDENT};

/// A code version, `major.minor.patch`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutputVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl OutputVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        OutputVersion {
            major,
            minor,
            patch,
        }
    }

    /// Maximum line length, in columns
    pub fn line_length(&self) -> usize {
        if (self.major, self.minor) >= (6, 2) {
            128
        } else {
            80
        }
    }
}

impl Default for OutputVersion {
    fn default() -> Self {
        OutputVersion::new(6, 2, 0)
    }
}

impl fmt::Display for OutputVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for OutputVersion {
    type Err = String;

    /// Accepts `6`, `6.2` and `6.2.0`; missing parts are zero
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = [0u32; 3];
        let mut count = 0;
        for (i, part) in s.trim().split('.').enumerate() {
            if i >= parts.len() {
                return Err(format!("invalid output version `{}`", s));
            }
            parts[i] = part
                .parse()
                .map_err(|_| format!("invalid output version `{}`", s))?;
            count += 1;
        }
        if count == 0 {
            return Err(format!("invalid output version `{}`", s));
        }
        Ok(OutputVersion::new(parts[0], parts[1], parts[2]))
    }
}

/// Lines of a record as they should be written for `version`
pub fn format_lines(tree: &SyntaxNode, version: OutputVersion) -> Vec<String> {
    let text = tree.format();
    if !tree.is_mutated() {
        return text.split('\n').map(str::to_string).collect();
    }
    let limit = version.line_length();
    text.split('\n')
        .flat_map(|line| wrap_line(line, limit))
        .collect()
}

/// Pretty JSON of a tree, for inspection
pub fn to_json(tree: &SyntaxNode) -> serde_json::Result<String> {
    serde_json::to_string_pretty(tree)
}
