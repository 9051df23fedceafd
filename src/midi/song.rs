//! Song container.
//!
//! A song is the unit that becomes one MIDI file: a fixed tempo, a tick
//! resolution and any number of parallel tracks.

use super::emit::{emit, TimedEvent};
use super::smf_export::{EventSink, SmfWriter};
use super::{DEFAULT_TEMPO, DEFAULT_TICKS_PER_QUARTER};
use crate::error::Result;
use crate::music::{Scale, Track};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tracks plus the global settings needed to write them out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    /// Song name, used only for logging and saved documents.
    pub name: String,

    /// Tempo in beats per minute.
    tempo: u32,

    /// MIDI time resolution.
    ticks_per_quarter: u16,

    tracks: Vec<Track>,
}

impl Song {
    /// Creates an empty song.
    ///
    /// # Arguments
    ///
    /// * `tempo` - Beats per minute
    /// * `ticks_per_quarter` - Ticks per quarter note in the output file
    pub fn new(tempo: u32, ticks_per_quarter: u16) -> Self {
        Self {
            name: "Untitled".to_string(),
            tempo,
            ticks_per_quarter,
            tracks: Vec::new(),
        }
    }

    /// Creates a song from existing tracks at the given tempo.
    pub fn with_tracks(tracks: Vec<Track>, tempo: u32) -> Self {
        Self {
            tracks,
            ..Self::new(tempo, DEFAULT_TICKS_PER_QUARTER)
        }
    }

    pub fn tempo(&self) -> u32 {
        self.tempo
    }

    pub fn set_tempo(&mut self, tempo: u32) {
        self.tempo = tempo;
    }

    pub fn ticks_per_quarter(&self) -> u16 {
        self.ticks_per_quarter
    }

    pub fn set_ticks_per_quarter(&mut self, ticks_per_quarter: u16) {
        self.ticks_per_quarter = ticks_per_quarter;
    }

    /// Adds a track and returns its index.
    pub fn add_track(&mut self, track: Track) -> usize {
        self.tracks.push(track);
        self.tracks.len() - 1
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track_at(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn track_at_mut(&mut self, index: usize) -> Option<&mut Track> {
        self.tracks.get_mut(index)
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Length of the longest track in quarter notes.
    pub fn duration(&self) -> f64 {
        self.tracks.iter().map(Track::duration).fold(0.0, f64::max)
    }

    /// Transposes every track.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PitchOverflow`](crate::Error::PitchOverflow) and
    /// leaves every track untouched if any pitch leaves the octave range.
    pub fn transpose(&mut self, delta: i32) -> Result<()> {
        let mut tracks = self.tracks.clone();
        for track in &mut tracks {
            track.transpose(delta)?;
        }
        self.tracks = tracks;
        Ok(())
    }

    /// Modulates every track from `src` to `dest`.
    ///
    /// # Errors
    ///
    /// Fails without touching any track if the scales differ in size or a
    /// pitch overflows.
    pub fn modulate(&mut self, src: &Scale, dest: &Scale) -> Result<()> {
        let mut tracks = self.tracks.clone();
        for track in &mut tracks {
            track.modulate(src, dest)?;
        }
        self.tracks = tracks;
        Ok(())
    }

    /// Returns the ordered event list for this song.
    pub fn events(&self) -> Result<Vec<TimedEvent>> {
        emit(self)
    }

    /// Feeds every event into `sink`, in order.
    pub fn emit_into<S: EventSink>(&self, sink: &mut S) -> Result<()> {
        for event in self.events()? {
            sink.add_event(event.track, event.tick, &event.event.to_bytes());
        }
        Ok(())
    }

    /// Serializes the song as a Format 1 Standard MIDI File.
    ///
    /// Container track 0 holds the tempo; track `i` of the song is
    /// container track `i + 1`.
    pub fn to_smf_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = SmfWriter::new(self.tracks.len() + 1, self.ticks_per_quarter);
        self.emit_into(&mut writer)?;
        Ok(writer.finish()?)
    }

    /// Writes the song to a `.mid` file.
    ///
    /// The whole file is built in memory first, so a song that fails
    /// validation never creates or truncates `path`.
    ///
    /// # Errors
    ///
    /// Returns any emission error, or an IO error if writing fails.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_smf_bytes()?;
        fs::write(path.as_ref(), &bytes)?;
        tracing::info!(
            "wrote {} ({} tracks, {} bytes) to {:?}",
            self.name,
            self.tracks.len(),
            bytes.len(),
            path.as_ref()
        );
        Ok(())
    }

    /// Serializes the song to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Saves the song to a JSON file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Loads a song saved with [`Song::save_to_file`].
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Saves the song in binary form (bincode).
    pub fn save_to_binary<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let data = bincode::serialize(self)?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Loads a song saved with [`Song::save_to_binary`].
    pub fn load_from_binary<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read(path)?;
        Ok(bincode::deserialize(&data)?)
    }
}

impl Default for Song {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPO, DEFAULT_TICKS_PER_QUARTER)
    }
}
