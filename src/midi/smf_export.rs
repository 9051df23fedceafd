//! Standard MIDI File (SMF) framing.
//!
//! [`SmfWriter`] collects `(track, tick, bytes)` triples and frames them as a
//! Format 1 file:
//! - MThd header with the ticks-per-quarter division
//! - one MTrk chunk per container track, events as VLQ delta times
//! - an end-of-track meta event closing every chunk
//!
//! The writer does not interpret event bytes; validation happens upstream in
//! the emitter.

use super::{END_OF_TRACK, META_MSG};
use std::io::{self, Write};

/// Receiver for emitted events.
pub trait EventSink {
    /// Records raw event bytes at an absolute tick on a container track.
    fn add_event(&mut self, track: usize, tick: u32, bytes: &[u8]);
}

/// Appends `value` as a variable-length quantity: big-endian groups of seven
/// bits, every group but the last flagged with the high bit.
pub fn write_vlq(value: u32, buffer: &mut Vec<u8>) {
    let mut shift = 28;
    while shift > 0 && value >> shift == 0 {
        shift -= 7;
    }
    while shift > 0 {
        buffer.push(0x80 | ((value >> shift) as u8 & 0x7F));
        shift -= 7;
    }
    buffer.push(value as u8 & 0x7F);
}

/// In-memory Format 1 SMF builder.
#[derive(Debug, Clone)]
pub struct SmfWriter {
    ticks_per_quarter: u16,
    tracks: Vec<Vec<(u32, Vec<u8>)>>,
}

impl SmfWriter {
    /// Creates a writer with `track_count` empty container tracks.
    ///
    /// Events for higher track indices grow the track list.
    pub fn new(track_count: usize, ticks_per_quarter: u16) -> Self {
        Self {
            ticks_per_quarter,
            tracks: vec![Vec::new(); track_count],
        }
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Builds the track chunk body: delta-timed events plus end-of-track.
    fn build_track_data(events: &[(u32, Vec<u8>)]) -> Vec<u8> {
        let mut order: Vec<&(u32, Vec<u8>)> = events.iter().collect();
        order.sort_by_key(|(tick, _)| *tick);

        let mut buffer = Vec::new();
        let mut last_tick = 0u32;
        for (tick, bytes) in order {
            write_vlq(tick - last_tick, &mut buffer);
            buffer.extend_from_slice(bytes);
            last_tick = *tick;
        }

        // Meta event: FF 2F 00
        write_vlq(0, &mut buffer);
        buffer.extend_from_slice(&[META_MSG, END_OF_TRACK, 0x00]);
        buffer
    }

    /// Writes the complete file to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an IO error if writing fails or there are more tracks than
    /// the header can count.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let num_tracks = u16::try_from(self.tracks.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "too many tracks"))?;

        writer.write_all(b"MThd")?;
        writer.write_all(&6u32.to_be_bytes())?; // Header length (always 6)
        writer.write_all(&1u16.to_be_bytes())?; // Format 1 (multi-track)
        writer.write_all(&num_tracks.to_be_bytes())?;
        writer.write_all(&self.ticks_per_quarter.to_be_bytes())?;

        for events in &self.tracks {
            let data = Self::build_track_data(events);
            writer.write_all(b"MTrk")?;
            writer.write_all(&(data.len() as u32).to_be_bytes())?;
            writer.write_all(&data)?;
        }
        Ok(())
    }

    /// Returns the complete file as bytes.
    pub fn finish(&self) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write_to(&mut out)?;
        Ok(out)
    }
}

impl EventSink for SmfWriter {
    fn add_event(&mut self, track: usize, tick: u32, bytes: &[u8]) {
        if track >= self.tracks.len() {
            self.tracks.resize(track + 1, Vec::new());
        }
        self.tracks[track].push((tick, bytes.to_vec()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vlq_group_boundaries() {
        let cases: [(u32, &[u8]); 6] = [
            (0, &[0x00]),
            (0x7F, &[0x7F]),
            (0x80, &[0x81, 0x00]),
            (480, &[0x83, 0x60]),
            (0x20_0000, &[0x81, 0x80, 0x80, 0x00]),
            (u32::MAX, &[0x8F, 0xFF, 0xFF, 0xFF, 0x7F]),
        ];
        for (value, expected) in cases {
            let mut buffer = vec![0xAA];
            write_vlq(value, &mut buffer);
            assert_eq!(&buffer[1..], expected, "value {:#x}", value);
        }
    }

    #[test]
    fn test_empty_file_layout() {
        let bytes = SmfWriter::new(1, 96).finish().unwrap();
        assert_eq!(
            bytes,
            vec![
                b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 1, 0, 1, 0, 96, //
                b'M', b'T', b'r', b'k', 0, 0, 0, 4, 0x00, 0xFF, 0x2F, 0x00,
            ]
        );
    }

    #[test]
    fn test_delta_times() {
        let mut writer = SmfWriter::new(1, 120);
        writer.add_event(0, 0, &[0x90, 60, 64]);
        writer.add_event(0, 200, &[0x80, 60, 64]);
        let data = SmfWriter::build_track_data(&writer.tracks[0]);
        assert_eq!(
            data,
            vec![0x00, 0x90, 60, 64, 0x81, 0x48, 0x80, 60, 64, 0x00, 0xFF, 0x2F, 0x00]
        );
    }

    #[test]
    fn test_sink_grows_tracks() {
        let mut writer = SmfWriter::new(1, 120);
        writer.add_event(3, 0, &[0x90, 60, 64]);
        assert_eq!(writer.track_count(), 4);
        let bytes = writer.finish().unwrap();
        assert_eq!(&bytes[10..12], &[0, 4]);
    }
}
