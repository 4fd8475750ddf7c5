//! Splitting a deck into blocks and records
//!
//! A deck is an optional `message:` block, a title line, then the cell, surface and
//! data blocks, each ended by a blank line. Inside a block a record continues onto
//! the next physical line when the previous line carries `&` (outside a `$`
//! comment) or when the next line is indented by at least five columns.
//!
//! Comment lines (`c` in columns 1-5 followed by a blank) are ambiguous until the
//! next data line is seen: if it continues the open record they belong to it,
//! otherwise they form a standalone comment block between records.
//!
//! Every physical line ends up in exactly one [`RawInput`], so joining all of them
//! in order reproduces the deck.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static COMMENT_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ {0,4}[cC]([ \t].*)?$").unwrap());
static MESSAGE_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*message:").unwrap());

/// Number of leading blanks that marks a continuation line
pub const BLANK_SPACE_CONTINUE: usize = 5;

/// The block of the deck a record was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockType {
    Cell,
    Surface,
    Data,
}

impl BlockType {
    fn next(self) -> Option<BlockType> {
        match self {
            BlockType::Cell => Some(BlockType::Surface),
            BlockType::Surface => Some(BlockType::Data),
            BlockType::Data => None,
        }
    }
}

/// One unit of a deck as read from text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInput {
    Message { lines: Vec<String> },
    Title { line: String },
    Comment { block: BlockType, lines: Vec<String> },
    Record {
        block: BlockType,
        lines: Vec<String>,
        /// 1-based line of the record's first physical line
        line_number: usize,
    },
    /// The blank line that closes a block (or the message)
    BlockEnd { line: String },
    /// Anything after the data block, kept verbatim
    Trailing { lines: Vec<String> },
}

impl RawInput {
    /// The physical lines this input covers
    pub fn lines(&self) -> Vec<String> {
        match self {
            RawInput::Message { lines }
            | RawInput::Comment { lines, .. }
            | RawInput::Record { lines, .. }
            | RawInput::Trailing { lines } => lines.clone(),
            RawInput::Title { line } | RawInput::BlockEnd { line } => vec![line.clone()],
        }
    }
}

pub fn is_comment_line(line: &str) -> bool {
    COMMENT_LINE.is_match(line)
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// True when `line` continues a record whose last data line was `previous`
pub fn continues(previous: &str, line: &str) -> bool {
    let data = previous.split('$').next().unwrap_or(previous);
    if data.contains('&') {
        return true;
    }
    line.len() >= BLANK_SPACE_CONTINUE
        && line.bytes().take(BLANK_SPACE_CONTINUE).all(|b| b == b' ')
}

struct RecordBuffer {
    lines: Vec<String>,
    last_data_line: String,
    line_number: usize,
}

struct BlockReader {
    block: BlockType,
    current: Option<RecordBuffer>,
    pending_comments: Vec<String>,
    out: Vec<RawInput>,
}

impl BlockReader {
    fn new(block: BlockType) -> Self {
        BlockReader {
            block,
            current: None,
            pending_comments: Vec::new(),
            out: Vec::new(),
        }
    }

    fn push(&mut self, line: &str, line_number: usize) {
        if is_comment_line(line) {
            self.pending_comments.push(line.to_string());
            return;
        }
        if let Some(record) = self.current.as_mut() {
            if continues(&record.last_data_line, line) {
                record.lines.append(&mut self.pending_comments);
                record.lines.push(line.to_string());
                record.last_data_line = line.to_string();
                return;
            }
        }
        self.flush();
        self.current = Some(RecordBuffer {
            lines: vec![line.to_string()],
            last_data_line: line.to_string(),
            line_number,
        });
    }

    fn flush(&mut self) {
        if let Some(record) = self.current.take() {
            self.out.push(RawInput::Record {
                block: self.block,
                lines: record.lines,
                line_number: record.line_number,
            });
        }
        if !self.pending_comments.is_empty() {
            self.out.push(RawInput::Comment {
                block: self.block,
                lines: std::mem::take(&mut self.pending_comments),
            });
        }
    }

    fn finish(mut self) -> Vec<RawInput> {
        self.flush();
        self.out
    }
}

/// Split deck text into inputs. A final newline does not produce an empty line.
pub fn read_deck(text: &str) -> Vec<RawInput> {
    let body = text.strip_suffix('\n').unwrap_or(text);
    let lines: Vec<&str> = if body.is_empty() && text.is_empty() {
        Vec::new()
    } else {
        body.split('\n').collect()
    };

    let mut inputs = Vec::new();
    let mut cursor = 0;

    if lines.first().is_some_and(|l| MESSAGE_START.is_match(l)) {
        let mut message = Vec::new();
        while cursor < lines.len() && !is_blank(lines[cursor]) {
            message.push(lines[cursor].to_string());
            cursor += 1;
        }
        inputs.push(RawInput::Message { lines: message });
        if cursor < lines.len() {
            inputs.push(RawInput::BlockEnd {
                line: lines[cursor].to_string(),
            });
            cursor += 1;
        }
    }

    if cursor < lines.len() {
        inputs.push(RawInput::Title {
            line: lines[cursor].to_string(),
        });
        cursor += 1;
    }

    let mut block = Some(BlockType::Cell);
    while let Some(current) = block {
        if cursor >= lines.len() {
            break;
        }
        let mut reader = BlockReader::new(current);
        while cursor < lines.len() && !is_blank(lines[cursor]) {
            reader.push(lines[cursor], cursor + 1);
            cursor += 1;
        }
        inputs.extend(reader.finish());
        if cursor < lines.len() {
            inputs.push(RawInput::BlockEnd {
                line: lines[cursor].to_string(),
            });
            cursor += 1;
        }
        block = current.next();
    }

    if cursor < lines.len() {
        inputs.push(RawInput::Trailing {
            lines: lines[cursor..].iter().map(|l| l.to_string()).collect(),
        });
    }

    inputs
}
