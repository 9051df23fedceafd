//! Notation parser.
//!
//! A score is a whitespace-separated token stream:
//!
//! - `8(` ... `)` sets the active length to `4 / 8` quarter notes until the
//!   closing `)`, after which it falls back to one quarter note
//! - `.` is a rest of the active length
//! - `-` extends the previous chord by the active length
//! - anything else is a chord token: `C/E/G` or `CEG`, each piece a pitch
//!
//! ```
//! use notecraft::music::parse_chords;
//!
//! let chords = parse_chords("4( C E G ) 1( . ) C").unwrap();
//! let lengths: Vec<f64> = chords.iter().map(|c| c.length()).collect();
//! assert_eq!(lengths, vec![1.0, 1.0, 1.0, 4.0, 1.0]);
//! ```

use super::chord::Chord;
use super::pitch::{is_base_pitch, Pitch};
use super::{DEFAULT_LENGTH, WHOLE_LENGTH};

use crate::error::{Error, Result};

pub const REST: &str = ".";
pub const EXTEND: &str = "-";
pub const CLOSE_DURATION: &str = ")";

/// Splits a chord token into pitch tokens.
///
/// A token containing `/` is split on it. Otherwise a new pitch starts at
/// every uppercase letter `A`-`G` after the first character, so `B_1` stays
/// one pitch and `CEG` becomes three.
pub fn tokenize_chord(token: &str) -> Vec<&str> {
    if token.contains('/') {
        return token.split('/').filter(|s| !s.is_empty()).collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (i, c) in token.char_indices().skip(1) {
        if is_base_pitch(c) {
            pieces.push(&token[start..i]);
            start = i;
        }
    }
    if start < token.len() {
        pieces.push(&token[start..]);
    }
    pieces
}

/// Parses a chord token such as `C/E/G` or `B_1DF` into pitches.
///
/// A token made only of `/` holds no pitch and is rejected with
/// [`Error::EmptyPitchConversion`] rather than read as a rest.
pub fn parse_pitches(token: &str) -> Result<Vec<Pitch>> {
    let pieces = tokenize_chord(token);
    if pieces.is_empty() {
        return Err(Error::EmptyPitchConversion);
    }
    pieces.into_iter().map(str::parse::<Pitch>).collect()
}

/// Reads the subdivision of a `<digits>(` token.
fn parse_subdivision(token: &str) -> Result<f64> {
    let digits = &token[..token.len() - 1];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::malformed(token, "duration must be digits followed by '('"));
    }
    let subdivision: u32 = digits
        .parse()
        .map_err(|_| Error::malformed(token, "subdivision out of range"))?;
    if subdivision == 0 {
        return Err(Error::malformed(token, "subdivision must be non-zero"));
    }
    Ok(WHOLE_LENGTH / subdivision as f64)
}

/// Parses a notation string into chords, in written order.
///
/// # Errors
///
/// - [`Error::MalformedToken`] for bad pitch or duration tokens
/// - [`Error::EmptyPitchConversion`] for an empty pitch piece
/// - [`Error::DanglingExtend`] for a `-` before the first chord
pub fn parse_chords(input: &str) -> Result<Vec<Chord>> {
    let mut chords: Vec<Chord> = Vec::new();
    let mut active = DEFAULT_LENGTH;
    let mut count = 0;

    for (position, token) in input.split_whitespace().enumerate() {
        count += 1;
        if token.ends_with('(') {
            active = parse_subdivision(token)?;
        } else if token == CLOSE_DURATION {
            active = DEFAULT_LENGTH;
        } else if token == EXTEND {
            let prev = chords
                .last_mut()
                .ok_or(Error::DanglingExtend { position })?;
            prev.set_length(prev.length() + active);
        } else if token == REST {
            chords.push(Chord::rest(active));
        } else {
            chords.push(Chord::new(parse_pitches(token)?, active));
        }
    }

    tracing::debug!("parsed {} tokens into {} chords", count, chords.len());
    Ok(chords)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(chord: &Chord) -> Vec<i64> {
        chord.pitches().iter().map(Pitch::value).collect()
    }

    #[test]
    fn test_tokenize_chord() {
        assert_eq!(tokenize_chord("CEG"), vec!["C", "E", "G"]);
        assert_eq!(tokenize_chord("C/E/G"), vec!["C", "E", "G"]);
        assert_eq!(tokenize_chord("B_1D#F"), vec!["B_1", "D#", "F"]);
        assert_eq!(tokenize_chord("Bb^1"), vec!["Bb^1"]);
        assert_eq!(tokenize_chord("A/A^1"), vec!["A", "A^1"]);
        assert_eq!(tokenize_chord("C//E"), vec!["C", "E"]);
    }

    #[test]
    fn test_duration_groups() {
        let chords = parse_chords("4( CEG ) 1( . ) C").unwrap();
        let lengths: Vec<f64> = chords.iter().map(Chord::length).collect();
        assert_eq!(lengths, vec![1.0, 4.0, 1.0]);
        assert_eq!(ints(&chords[0]), vec![0, 4, 7]);
        assert!(chords[1].is_rest());
        assert_eq!(ints(&chords[2]), vec![0]);
    }

    #[test]
    fn test_separate_tokens_are_separate_chords() {
        let chords = parse_chords("4( C E G ) 1( . ) C").unwrap();
        assert_eq!(chords.len(), 5);
        assert!(chords[..3].iter().all(Chord::is_note));
        assert_eq!(chords[3].length(), 4.0);
        assert_eq!(chords[4].length(), 1.0);
    }

    #[test]
    fn test_subdivisions() {
        let chords = parse_chords("8( C ) 16( D ) 2( E ) 3( F )").unwrap();
        assert_eq!(chords[0].length(), 0.5);
        assert_eq!(chords[1].length(), 0.25);
        assert_eq!(chords[2].length(), 2.0);
        assert!((chords[3].length() - 4.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_extend() {
        let chords = parse_chords("C - -").unwrap();
        assert_eq!(chords.len(), 1);
        assert_eq!(ints(&chords[0]), vec![0]);
        assert_eq!(chords[0].length(), 3.0);
    }

    #[test]
    fn test_extend_uses_active_length() {
        let chords = parse_chords("8( E/G/B - - ) -").unwrap();
        assert_eq!(chords.len(), 1);
        assert_eq!(chords[0].length(), 0.5 * 3.0 + 1.0);

        let chords = parse_chords("C . - D").unwrap();
        assert_eq!(chords.len(), 3);
        assert!(chords[1].is_rest());
        assert_eq!(chords[1].length(), 2.0);
    }

    #[test]
    fn test_dangling_extend() {
        assert!(matches!(
            parse_chords("- C"),
            Err(Error::DanglingExtend { position: 0 })
        ));
        assert!(matches!(
            parse_chords("4( - )"),
            Err(Error::DanglingExtend { position: 1 })
        ));
    }

    #[test]
    fn test_malformed_tokens() {
        assert!(matches!(parse_chords("C H"), Err(Error::MalformedToken { .. })));
        assert!(matches!(parse_chords("0( C )"), Err(Error::MalformedToken { .. })));
        assert!(matches!(parse_chords("x( C )"), Err(Error::MalformedToken { .. })));
        assert!(matches!(parse_chords("( C )"), Err(Error::MalformedToken { .. })));
        assert!(matches!(parse_chords("4(C )"), Err(Error::MalformedToken { .. })));
    }

    #[test]
    fn test_slash_only_token_is_not_a_rest() {
        for input in ["C /", "C //", "/ C"] {
            assert!(matches!(
                parse_chords(input),
                Err(Error::EmptyPitchConversion)
            ));
        }
        assert!(matches!(parse_pitches(""), Err(Error::EmptyPitchConversion)));
    }

    #[test]
    fn test_out_of_range_octave_is_malformed() {
        assert!(matches!(
            parse_chords("C^999999999"),
            Err(Error::MalformedToken { .. })
        ));
        assert!(matches!(
            parse_chords("C E/G_4294967296"),
            Err(Error::MalformedToken { .. })
        ));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_chords("").unwrap().is_empty());
        assert!(parse_chords("   ").unwrap().is_empty());
        assert!(parse_chords("4( )").unwrap().is_empty());
    }

    #[test]
    fn test_octave_markers_in_chords() {
        let chords = parse_chords("CEG - B_1/D/G -").unwrap();
        assert_eq!(chords.len(), 2);
        assert_eq!(ints(&chords[1]), vec![-1, 2, 7]);
        assert_eq!(chords[1].length(), 2.0);
    }
}
