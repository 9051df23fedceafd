//! notecraft - compile a compact melody/chord notation into MIDI files.
//!
//! The library parses notation such as `"8( C E G ) C/E/G - ."` into
//! [`Track`]s, transforms them (transpose, modulate between keys, resize,
//! repeat, concatenate) and writes [`Song`]s as Standard MIDI Files.

pub mod error;
pub mod midi;
pub mod music;
pub mod score;
pub mod validate;

// Re-export commonly used types
pub use error::{Error, Result};
pub use midi::{Song, DEFAULT_TICKS_PER_QUARTER};
pub use music::{parse_chords, Chord, Pitch, Scale, Track};
pub use score::Score;
pub use validate::validate_notation;
