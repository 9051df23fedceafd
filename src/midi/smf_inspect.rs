//! Reads Standard MIDI Files back into timed events.
//!
//! Only the events this crate writes are recovered: tempo, note-on and
//! note-off. Everything else (end-of-track, names, controllers) is skipped.

use super::{MidiEvent, TimedEvent};
use crate::error::{Error, Result};
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use std::fs;
use std::path::Path;

/// The recoverable contents of a MIDI file.
#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    pub ticks_per_quarter: u16,
    pub track_count: usize,
    /// Events in file order, each track's events in tick order.
    pub events: Vec<TimedEvent>,
}

/// Parses SMF bytes.
///
/// # Errors
///
/// Returns [`Error::SmfParse`] for malformed data or SMPTE timing.
pub fn read_events(data: &[u8]) -> Result<Inspection> {
    let smf = Smf::parse(data).map_err(|e| Error::SmfParse(e.to_string()))?;

    let ticks_per_quarter = match smf.header.timing {
        Timing::Metrical(tpq) => tpq.as_int(),
        Timing::Timecode(_, _) => {
            return Err(Error::SmfParse(
                "SMPTE timecode timing not supported".to_string(),
            ))
        }
    };

    let mut events = Vec::new();
    for (track_idx, track) in smf.tracks.iter().enumerate() {
        let mut tick: u32 = 0;
        for event in track {
            tick = tick.saturating_add(event.delta.as_int());
            let parsed = match event.kind {
                TrackEventKind::Meta(MetaMessage::Tempo(micros)) => Some(MidiEvent::SetTempo {
                    micros_per_quarter: micros.as_int(),
                }),
                TrackEventKind::Midi { message, .. } => match message {
                    MidiMessage::NoteOn { key, vel } => Some(MidiEvent::NoteOn {
                        pitch: key.as_int(),
                        velocity: vel.as_int(),
                    }),
                    MidiMessage::NoteOff { key, vel } => Some(MidiEvent::NoteOff {
                        pitch: key.as_int(),
                        velocity: vel.as_int(),
                    }),
                    _ => None,
                },
                _ => None,
            };
            if let Some(parsed) = parsed {
                events.push(TimedEvent::new(track_idx, tick, parsed));
            }
        }
    }

    Ok(Inspection {
        ticks_per_quarter,
        track_count: smf.tracks.len(),
        events,
    })
}

/// Reads and parses a `.mid` file.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Inspection> {
    let data = fs::read(path)?;
    read_events(&data)
}
