//! MIDI output: event emission, Standard MIDI File framing and inspection.
//!
//! The pipeline is `Song` → [`emit`] → sorted [`TimedEvent`]s →
//! [`EventSink`] (normally an [`SmfWriter`]) → bytes.

mod emit;
mod smf_export;
mod smf_inspect;
mod song;

pub use emit::{emit, MidiEvent, TimedEvent};
pub use smf_export::{write_vlq, EventSink, SmfWriter};
pub use smf_inspect::{read_events, read_file, Inspection};
pub use song::Song;

/// Standard MIDI note names for display purposes.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Ticks per quarter note used unless a song asks for another resolution.
pub const DEFAULT_TICKS_PER_QUARTER: u16 = 120;

/// Default tempo in beats per minute.
pub const DEFAULT_TEMPO: u32 = 120;

pub const META_MSG: u8 = 0xFF;
pub const TEMPO_CHANGE: u8 = 0x51;
pub const END_OF_TRACK: u8 = 0x2F;
pub const NOTE_ON: u8 = 0x90;
pub const NOTE_OFF: u8 = 0x80;

/// Largest value a tempo meta event can hold (24 bits).
pub const MAX_TEMPO_MICROS: u32 = 0x00FF_FFFF;

/// Converts a MIDI note number to a name with octave, e.g. `60` to `"C4"`.
pub fn note_to_name(note: u8) -> String {
    let octave = (note / 12) as i8 - 1; // MIDI octave convention
    let note_index = (note % 12) as usize;
    format!("{}{}", NOTE_NAMES[note_index], octave)
}

/// Microseconds per quarter note for a tempo, rounded to nearest.
///
/// # Returns
///
/// `None` for a zero tempo or one too slow to fit in 24 bits.
pub fn bpm_to_micros(bpm: u32) -> Option<u32> {
    if bpm == 0 {
        return None;
    }
    let micros = (60_000_000.0 / bpm as f64).round() as u32;
    (micros <= MAX_TEMPO_MICROS).then_some(micros)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_to_name() {
        assert_eq!(note_to_name(60), "C4");
        assert_eq!(note_to_name(69), "A4");
        assert_eq!(note_to_name(0), "C-1");
        assert_eq!(note_to_name(127), "G9");
    }

    #[test]
    fn test_bpm_to_micros() {
        assert_eq!(bpm_to_micros(120), Some(500_000));
        assert_eq!(bpm_to_micros(80), Some(750_000));
        assert_eq!(bpm_to_micros(7), Some(8_571_429));
        assert_eq!(bpm_to_micros(3), None);
        assert_eq!(bpm_to_micros(0), None);
    }
}
