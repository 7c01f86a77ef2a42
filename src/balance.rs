//! Bracket and quote balance checks for corrected text.
//!
//! OCR frequently drops or flips one half of a bracket pair, including the
//! ornate Quranic brackets; these checks flag such lines for review.

use serde::Serialize;
use thiserror::Error;

const PAIRS: [(char, char); 5] = [('(', ')'), ('[', ']'), ('{', '}'), ('«', '»'), ('﴾', '﴿')];

/// One balance problem; `index` is a char offset into the checked text.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BalanceError {
    #[error("closing '{ch}' at {index} has no opening bracket")]
    Unmatched { ch: char, index: usize },
    #[error("'{open}' closed by '{close}' at {index}")]
    Mismatched { open: char, close: char, index: usize },
    #[error("'{ch}' opened at {index} is never closed")]
    Unclosed { ch: char, index: usize },
    #[error("unpaired double quote at {index}")]
    UnpairedQuote { index: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BalanceReport {
    pub errors: Vec<BalanceError>,
}

impl BalanceReport {
    pub fn is_balanced(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check brackets with a stack and straight double quotes by parity.
///
/// Errors are reported in text order, with unclosed brackets last.
pub fn check_balance(text: &str) -> BalanceReport {
    let mut errors = Vec::new();
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut last_quote: Option<usize> = None;
    let mut quote_count = 0usize;

    for (index, c) in text.chars().enumerate() {
        if c == '"' {
            quote_count += 1;
            last_quote = Some(index);
            continue;
        }
        if closing_for(c).is_some() {
            stack.push((c, index));
            continue;
        }
        if let Some(expected_open) = opening_for(c) {
            match stack.pop() {
                None => errors.push(BalanceError::Unmatched { ch: c, index }),
                Some((open, _)) if open != expected_open => {
                    errors.push(BalanceError::Mismatched { open, close: c, index })
                }
                Some(_) => {}
            }
        }
    }

    if quote_count % 2 == 1 {
        if let Some(index) = last_quote {
            errors.push(BalanceError::UnpairedQuote { index });
        }
    }
    errors.extend(stack.into_iter().map(|(ch, index)| BalanceError::Unclosed { ch, index }));

    BalanceReport { errors }
}

/// Whether every bracket is closed by its partner; quotes are ignored.
pub fn are_brackets_balanced(text: &str) -> bool {
    check_balance(text)
        .errors
        .iter()
        .all(|e| matches!(e, BalanceError::UnpairedQuote { .. }))
}

fn closing_for(open: char) -> Option<char> {
    PAIRS.iter().find(|(o, _)| *o == open).map(|(_, c)| *c)
}

fn opening_for(close: char) -> Option<char> {
    PAIRS.iter().find(|(_, c)| *c == close).map(|(o, _)| *o)
}
