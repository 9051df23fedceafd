//! Turns tracks into absolute-time MIDI events.
//!
//! Every song produces one tempo event at tick 0 on container track 0; music
//! track `i` is written to container track `i + 1`. Each track keeps its own
//! cursor in quarter notes that advances by the length of every chord, rests
//! included. Ticks are rounded from the cursor, never accumulated, so tracks
//! of equal length end on the same tick.

use super::{bpm_to_micros, Song, META_MSG, NOTE_OFF, NOTE_ON, TEMPO_CHANGE};
use crate::error::{Error, Result};
use crate::music::{Track, OCTAVE_WIDTH};

/// MIDI events the emitter produces. Notes always go out on channel 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    /// Meta event `FF 51 03 tt tt tt`.
    SetTempo { micros_per_quarter: u32 },
    NoteOn { pitch: u8, velocity: u8 },
    NoteOff { pitch: u8, velocity: u8 },
}

impl MidiEvent {
    /// Raw status and data bytes, without a delta time.
    pub fn to_bytes(&self) -> Vec<u8> {
        match *self {
            MidiEvent::SetTempo { micros_per_quarter } => vec![
                META_MSG,
                TEMPO_CHANGE,
                0x03,
                (micros_per_quarter >> 16) as u8,
                (micros_per_quarter >> 8) as u8,
                micros_per_quarter as u8,
            ],
            MidiEvent::NoteOn { pitch, velocity } => vec![NOTE_ON, pitch, velocity],
            MidiEvent::NoteOff { pitch, velocity } => vec![NOTE_OFF, pitch, velocity],
        }
    }

    /// Order among events sharing a tick and track.
    fn rank(&self) -> u8 {
        match self {
            MidiEvent::SetTempo { .. } => 0,
            MidiEvent::NoteOn { .. } => 1,
            MidiEvent::NoteOff { .. } => 2,
        }
    }
}

/// An event placed on a container track at an absolute tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedEvent {
    pub track: usize,
    pub tick: u32,
    pub event: MidiEvent,
}

impl TimedEvent {
    pub fn new(track: usize, tick: u32, event: MidiEvent) -> Self {
        Self { track, tick, event }
    }
}

fn to_byte(what: &'static str, value: i64) -> Result<u8> {
    u8::try_from(value).map_err(|_| Error::ByteRangeOverflow { what, value })
}

/// Tick of a position given in quarter notes, rounded to the nearest tick.
fn tick_at(position: f64, ticks_per_quarter: u16) -> Result<u32> {
    let ticks = (ticks_per_quarter as f64 * position).round();
    if !(0.0..=u32::MAX as f64).contains(&ticks) {
        return Err(Error::TickOverflow);
    }
    Ok(ticks as u32)
}

fn emit_track(
    track: &Track,
    container_track: usize,
    ticks_per_quarter: u16,
    events: &mut Vec<TimedEvent>,
) -> Result<()> {
    let velocity = to_byte("velocity", track.velocity() as i64)?;
    let offset = OCTAVE_WIDTH as i64 * track.octave() as i64;
    let mut position = 0.0;

    for chord in track.chords() {
        let length = chord.length();
        if !length.is_finite() || length < 0.0 {
            return Err(Error::InvalidDuration(length));
        }
        let start = tick_at(position, ticks_per_quarter)?;
        position += length;
        let end = tick_at(position, ticks_per_quarter)?;

        for p in chord.pitches() {
            let pitch = to_byte("pitch", p.value() + offset)?;
            events.push(TimedEvent::new(
                container_track,
                start,
                MidiEvent::NoteOn { pitch, velocity },
            ));
            events.push(TimedEvent::new(
                container_track,
                end,
                MidiEvent::NoteOff { pitch, velocity },
            ));
        }
    }
    Ok(())
}

/// Produces the complete, ordered event list for a song.
///
/// Events are stably sorted by tick, then container track, then note-on
/// before note-off.
///
/// # Errors
///
/// - [`Error::InvalidTempo`] if the tempo cannot be encoded
/// - [`Error::ByteRangeOverflow`] if a pitch (after the octave offset) or a
///   velocity falls outside `0..=255`
/// - [`Error::InvalidDuration`] for a negative or non-finite chord length
/// - [`Error::TickOverflow`] if a track runs past `u32::MAX` ticks
pub fn emit(song: &Song) -> Result<Vec<TimedEvent>> {
    let micros_per_quarter =
        bpm_to_micros(song.tempo()).ok_or(Error::InvalidTempo(song.tempo()))?;

    let mut events = vec![TimedEvent::new(
        0,
        0,
        MidiEvent::SetTempo { micros_per_quarter },
    )];
    for (index, track) in song.tracks().iter().enumerate() {
        emit_track(track, index + 1, song.ticks_per_quarter(), &mut events)?;
    }

    events.sort_by_key(|e| (e.tick, e.track, e.event.rank()));
    tracing::debug!(
        "emitted {} events for {} tracks",
        events.len(),
        song.track_count()
    );
    Ok(events)
}
