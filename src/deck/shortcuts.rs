//! Numeric shortcut expansion
//!
//! Decks abbreviate number sequences with five macros, written as an optional
//! leading number and a suffix:
//!
//! | suffix        | expands to                                              |
//! |---------------|---------------------------------------------------------|
//! | `nR`          | `n` copies of the previous value (default 1)            |
//! | `nI`          | `n` values linearly spaced between previous and next    |
//! | `xM`          | `x` times the previous value (`x` is required)          |
//! | `nJ`          | `n` jumps, values left at their default                 |
//! | `nILOG`/`nLOG`| `n` values spaced evenly in log10 between the neighbours|
//!
//! Expansion runs left to right over the already expanded output, so a shortcut
//! sees the values generated by the one before it. The first word of a record is
//! its identifier: it is never expanded and is never used as a previous value.
//!
//! Generated numbers are printed in the legacy `%g` form ([`format_general`]).

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::deck::error::{MalformedInputError, ShortcutError};
use crate::deck::lexing::TokenSpan;
use crate::deck::token::{Generated, ShortcutMark, Token};

static SHORTCUT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^([+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+))?(r|i|m|j|ilog|log)$").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutKind {
    Repeat,
    Interpolate,
    Multiply,
    Jump,
    LogInterpolate,
}

/// A parsed shortcut word
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shortcut {
    pub kind: ShortcutKind,
    pub number: Option<f64>,
}

/// Most values a single shortcut may stand for
pub const MAX_SHORTCUT_COUNT: usize = 100_000;

impl Shortcut {
    /// Repeat/insert count; absent or zero means one
    fn count(&self, word: &str) -> Result<usize, ShortcutError> {
        match self.number {
            Some(n) if n.abs() > MAX_SHORTCUT_COUNT as f64 => {
                Err(ShortcutError::CountTooLarge {
                    word: word.to_string(),
                    limit: MAX_SHORTCUT_COUNT,
                })
            }
            Some(n) if n.abs() >= 1.0 => Ok(n.abs().trunc() as usize),
            _ => Ok(1),
        }
    }
}

/// Recognize a shortcut word such as `3r`, `2ilog` or `J`
pub fn parse_shortcut(word: &str) -> Option<Shortcut> {
    let captures = SHORTCUT.captures(word)?;
    let number = match captures.get(1) {
        Some(m) => Some(m.as_str().parse::<f64>().ok()?),
        None => None,
    };
    let kind = match captures.get(2)?.as_str().to_ascii_lowercase().as_str() {
        "r" => ShortcutKind::Repeat,
        "i" => ShortcutKind::Interpolate,
        "m" => ShortcutKind::Multiply,
        "j" => ShortcutKind::Jump,
        _ => ShortcutKind::LogInterpolate,
    };
    Some(Shortcut { kind, number })
}

/// One word of expanded output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expanded {
    Value(String),
    /// A jump placeholder; the value is left unset
    Jump,
}

impl Expanded {
    pub fn text(&self) -> Option<&str> {
        match self {
            Expanded::Value(s) => Some(s),
            Expanded::Jump => None,
        }
    }
}

impl fmt::Display for Expanded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expanded::Value(s) => write!(f, "{}", s),
            Expanded::Jump => write!(f, "J"),
        }
    }
}

/// Format like C's `%g`: six significant digits, trailing zeros removed
pub fn format_general(value: f64) -> String {
    const PRECISION: i32 = 6;
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }
    let scientific = format!("{:.*e}", (PRECISION - 1) as usize, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some(parts) => parts,
        None => return scientific,
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    if exponent < -4 || exponent >= PRECISION {
        let mantissa = trim_fraction(mantissa);
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    } else {
        let decimals = (PRECISION - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// Running state of an expansion: everything emitted after the identifier
#[derive(Debug, Default)]
struct Expander {
    values: Vec<Expanded>,
}

impl Expander {
    fn push_literal(&mut self, word: &str) {
        self.values.push(Expanded::Value(word.to_string()));
    }

    fn previous_number(&self) -> Option<f64> {
        self.values.last()?.text()?.parse::<f64>().ok()
    }

    fn upper_bound(word: &str, next: Option<&str>) -> Result<f64, ShortcutError> {
        let next = next.ok_or_else(|| ShortcutError::MissingBound {
            word: word.to_string(),
        })?;
        if parse_shortcut(next).is_some() {
            return Err(ShortcutError::ShortcutBound {
                word: word.to_string(),
                next: next.to_string(),
            });
        }
        next.parse::<f64>().map_err(|_| ShortcutError::MissingBound {
            word: word.to_string(),
        })
    }

    /// Expand one shortcut, append the result and return the generated words
    fn expand(
        &mut self,
        word: &str,
        shortcut: Shortcut,
        next: Option<&str>,
    ) -> Result<Vec<Expanded>, ShortcutError> {
        let generated = match shortcut.kind {
            ShortcutKind::Repeat => {
                let last = match self.values.last() {
                    Some(last @ Expanded::Value(_)) => last.clone(),
                    _ => {
                        return Err(ShortcutError::NoPreviousValue {
                            word: word.to_string(),
                        })
                    }
                };
                vec![last; shortcut.count(word)?]
            }
            ShortcutKind::Interpolate => {
                let begin = self.previous_number().ok_or_else(|| ShortcutError::MissingBound {
                    word: word.to_string(),
                })?;
                let end = Self::upper_bound(word, next)?;
                let count = shortcut.count(word)?;
                let spacing = (end - begin) / (count + 1) as f64;
                (1..=count)
                    .map(|k| Expanded::Value(format_general(begin + spacing * k as f64)))
                    .collect()
            }
            ShortcutKind::Multiply => {
                let previous =
                    self.previous_number()
                        .ok_or_else(|| ShortcutError::NoPreviousNumber {
                            word: word.to_string(),
                        })?;
                let factor = shortcut
                    .number
                    .ok_or_else(|| ShortcutError::MissingMultiplier {
                        word: word.to_string(),
                    })?;
                vec![Expanded::Value(format_general(factor * previous))]
            }
            ShortcutKind::Jump => vec![Expanded::Jump; shortcut.count(word)?],
            ShortcutKind::LogInterpolate => {
                let non_positive = || ShortcutError::NonPositiveLogBound {
                    word: word.to_string(),
                };
                let begin = self.previous_number().ok_or_else(|| ShortcutError::MissingBound {
                    word: word.to_string(),
                })?;
                let end = Self::upper_bound(word, next)?;
                if begin <= 0.0 || end <= 0.0 {
                    return Err(non_positive());
                }
                let (begin, end) = (begin.log10(), end.log10());
                let count = shortcut.count(word)?;
                let spacing = (end - begin) / (count + 1) as f64;
                (1..=count)
                    .map(|k| {
                        Expanded::Value(format_general(10f64.powf(begin + spacing * k as f64)))
                    })
                    .collect()
            }
        };
        self.values.extend(generated.iter().cloned());
        Ok(generated)
    }
}

/// Expand all shortcuts in a record's word list. The first word is returned as is.
pub fn expand_shortcuts<S: AsRef<str>>(words: &[S]) -> Result<Vec<Expanded>, MalformedInputError> {
    let fail = |err: ShortcutError| {
        let line = words
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ");
        MalformedInputError::new(&[line], err)
    };

    let mut out = Vec::with_capacity(words.len());
    let mut expander = Expander::default();
    for (i, word) in words.iter().map(AsRef::as_ref).enumerate() {
        if i == 0 {
            out.push(Expanded::Value(word.to_string()));
            continue;
        }
        match parse_shortcut(word) {
            Some(shortcut) => {
                let next = words.get(i + 1).map(AsRef::as_ref);
                out.extend(expander.expand(word, shortcut, next).map_err(fail)?);
            }
            None => {
                expander.push_literal(word);
                out.push(Expanded::Value(word.to_string()));
            }
        }
    }
    Ok(out)
}

/// Replace shortcut tokens with the generated values they stand for
///
/// Trivia passes through untouched. Each generated token keeps the span of its
/// shortcut and a [`ShortcutMark`] so the original spelling can be re-emitted.
pub fn expand_tokens(tokens: Vec<TokenSpan>) -> Result<Vec<TokenSpan>, ShortcutError> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut expander = Expander::default();
    let mut seen_identifier = false;

    for (pos, (token, span)) in tokens.iter().enumerate() {
        if token.is_trivia() {
            out.push((token.clone(), span.clone()));
            continue;
        }
        if !seen_identifier {
            seen_identifier = true;
            let token = match token {
                Token::Shortcut(text) => Token::Text(text.clone()),
                other => other.clone(),
            };
            out.push((token, span.clone()));
            continue;
        }
        let shortcut = match token {
            Token::Shortcut(text) => parse_shortcut(text).map(|s| (text, s)),
            _ => None,
        };
        match shortcut {
            Some((text, shortcut)) => {
                let next = tokens[pos + 1..].iter().find_map(|(t, _)| t.word());
                let generated = expander.expand(text, shortcut, next)?;
                let len = generated.len();
                for (index, value) in generated.into_iter().enumerate() {
                    let mark = ShortcutMark {
                        group: span.start,
                        raw: text.clone(),
                        index,
                        len,
                    };
                    let text = value.text().map(str::to_string);
                    out.push((Token::Generated(Generated { text, mark }), span.clone()));
                }
            }
            None => {
                if let Some(word) = token.word() {
                    expander.push_literal(word);
                }
                out.push((token.clone(), span.clone()));
            }
        }
    }

    Ok(out)
}

/// Fold runs of equal values into `nR`, the inverse of the repeat shortcut
pub fn compress_repeats(values: &[f64], tolerance: f64) -> Vec<String> {
    let mut out = Vec::new();
    let mut last: Option<f64> = None;
    let mut repeats = 0usize;

    let flush = |out: &mut Vec<String>, repeats: usize, last: Option<f64>| match (repeats, last) {
        (0, _) | (_, None) => {}
        (1, Some(value)) => out.push(format_general(value)),
        (n, _) => out.push(format!("{}R", n)),
    };

    for &value in values {
        match last {
            Some(previous) if (value - previous).abs() <= tolerance => repeats += 1,
            _ => {
                flush(&mut out, repeats, last);
                out.push(format_general(value));
                last = Some(value);
                repeats = 0;
            }
        }
    }
    flush(&mut out, repeats, last);
    out
}

/// Fold runs of jumps into `nJ`
pub fn compress_jumps(words: &[Expanded]) -> Vec<String> {
    let mut out = Vec::new();
    let mut jumps = 0usize;

    let flush = |out: &mut Vec<String>, jumps: &mut usize| {
        match *jumps {
            0 => {}
            1 => out.push("J".to_string()),
            n => out.push(format!("{}J", n)),
        }
        *jumps = 0;
    };

    for word in words {
        match word {
            Expanded::Jump => jumps += 1,
            Expanded::Value(text) => {
                flush(&mut out, &mut jumps);
                out.push(text.clone());
            }
        }
    }
    flush(&mut out, &mut jumps);
    out
}
