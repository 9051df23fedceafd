//! Musical model: pitches, scales, chords and tracks, plus the notation
//! parser that produces them.
//!
//! Lengths are measured in quarter notes and pitches in semitones, with `0`
//! being C in octave 0. The octave offset of a [`Track`] is applied only when
//! the track is turned into MIDI events.

mod chord;
mod parser;
mod pitch;
mod scale;
mod track;

pub use chord::Chord;
pub use parser::{parse_chords, parse_pitches, tokenize_chord, EXTEND, REST};
pub use pitch::{accidental_delta, is_base_pitch, BasePitch, Pitch, PitchMap, MAX_OCTAVE};
pub use scale::{Scale, HARMONIC_MINOR, MAJOR, MINOR, NATURAL_MINOR};
pub use track::{Track, DEFAULT_OCTAVE, DEFAULT_VELOCITY};

/// Semitones per octave.
pub const OCTAVE_WIDTH: i32 = 12;

pub const WHOLE_LENGTH: f64 = 4.0;
pub const HALF_LENGTH: f64 = 2.0;
pub const QUARTER_LENGTH: f64 = 1.0;
pub const EIGHTH_LENGTH: f64 = 0.5;
pub const SIXTEENTH_LENGTH: f64 = 0.25;

/// Length used outside any `N(` group.
pub const DEFAULT_LENGTH: f64 = QUARTER_LENGTH;

/// Looks up the interval pattern for a mode name.
///
/// Accepts `major`, `minor`, `harmonic_minor` and `natural_minor`
/// (case-insensitive, `-` or `_` as separator).
pub fn mode_intervals(name: &str) -> Option<&'static [i32]> {
    match name.to_ascii_lowercase().replace('-', "_").as_str() {
        "major" => Some(&MAJOR),
        "minor" => Some(&MINOR),
        "harmonic_minor" => Some(&HARMONIC_MINOR),
        "natural_minor" => Some(&NATURAL_MINOR),
        _ => None,
    }
}
