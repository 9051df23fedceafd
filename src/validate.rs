//! Optional pre-filter for notation strings.
//!
//! The parser accepts some sloppy input (unknown trailing characters in a
//! pitch, for instance). [`validate_notation`] is stricter and is meant to
//! run on user-supplied text before it reaches the parser.

use crate::error::{Error, Result};

fn is_valid_char(c: u8) -> bool {
    matches!(
        c,
        b' ' | b'-' | b'.' | b'^' | b'/' | b'_' | b'(' | b')' | b'A'..=b'G' | b'0'..=b'9' | b'#' | b'b'
    )
}

fn reject(position: usize, reason: &'static str) -> Result<()> {
    Err(Error::InvalidNotation { position, reason })
}

/// Checks a notation string against the strict grammar.
///
/// # Errors
///
/// Returns [`Error::InvalidNotation`] with the byte offset of the first
/// problem found.
pub fn validate_notation(input: &str) -> Result<()> {
    let bytes = input.as_bytes();
    let Some(&first) = bytes.first() else {
        return reject(0, "input is empty");
    };
    if !(first.is_ascii_digit() || (b'A'..=b'G').contains(&first)) {
        return reject(0, "input must start with a digit or a note A-G");
    }

    let mut open_at: Option<usize> = None;
    for (i, &c) in bytes.iter().enumerate() {
        let prev = i.checked_sub(1).map(|p| bytes[p]);
        let next = bytes.get(i + 1).copied();

        if !is_valid_char(c) {
            return reject(i, "illegal character");
        }
        match c {
            b'(' => {
                if open_at.is_some() {
                    return reject(i, "nested parentheses");
                }
                if !prev.is_some_and(|p| p.is_ascii_digit()) || next != Some(b' ') {
                    return reject(i, "'(' must follow a digit and precede a space");
                }
                open_at = Some(i);
            }
            b')' => {
                if open_at.take().is_none() {
                    return reject(i, "unbalanced parentheses");
                }
                if prev != Some(b' ') || next.is_some_and(|n| n != b' ') {
                    return reject(i, "')' must be surrounded by spaces");
                }
            }
            b'/' => {
                if !next.is_some_and(|n| (b'A'..=b'G').contains(&n)) {
                    return reject(i, "'/' must be followed by a note A-G");
                }
            }
            b'.' | b'-' => {
                if next.is_some_and(|n| n != b' ') {
                    return reject(i, "tokens must be separated by spaces");
                }
            }
            b'0'..=b'9' => {
                if next.is_some_and(|n| n != b' ' && n != b'(') {
                    return reject(i, "digits must be followed by a space or '('");
                }
            }
            _ => {}
        }
    }

    if let Some(position) = open_at {
        return reject(position, "unclosed parenthesis");
    }
    Ok(())
}
