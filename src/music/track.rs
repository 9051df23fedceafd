//! Track representation.
//!
//! A track is an ordered run of chords with a base octave and a velocity.
//! Both are applied when the track is emitted as MIDI, never baked into the
//! stored pitches, which is why concatenating tracks with different octaves
//! transposes the appended material.

use super::chord::Chord;
use super::parser::parse_chords;
use super::scale::Scale;
use super::OCTAVE_WIDTH;
use serde::{Deserialize, Serialize};
use std::ops::Index;

use crate::error::{Error, Result};

/// Octave added to every pitch on output; octave 5 puts `C` at MIDI note 60.
pub const DEFAULT_OCTAVE: i32 = 5;

/// Default note-on velocity.
pub const DEFAULT_VELOCITY: i32 = 64;

/// An ordered sequence of chords plus playback settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    chords: Vec<Chord>,

    /// Base octave added to every pitch when emitting.
    octave: i32,

    /// Note-on velocity (0-127 for valid MIDI).
    velocity: i32,
}

impl Track {
    /// Creates an empty track.
    ///
    /// # Arguments
    ///
    /// * `octave` - Base octave applied on output
    /// * `velocity` - Velocity used for every note
    pub fn new(octave: i32, velocity: i32) -> Self {
        Self {
            chords: Vec::new(),
            octave,
            velocity,
        }
    }

    /// Creates a track from a notation string.
    ///
    /// # Errors
    ///
    /// Returns any error from [`parse_chords`].
    pub fn from_notation(notation: &str, octave: i32, velocity: i32) -> Result<Self> {
        let mut track = Self::new(octave, velocity);
        track.append_notation(notation)?;
        Ok(track)
    }

    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    pub fn get(&self, index: usize) -> Option<&Chord> {
        self.chords.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Chord> {
        self.chords.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.chords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }

    pub fn octave(&self) -> i32 {
        self.octave
    }

    pub fn set_octave(&mut self, octave: i32) {
        self.octave = octave;
    }

    pub fn velocity(&self) -> i32 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: i32) {
        self.velocity = velocity;
    }

    /// Total length of the track in quarter notes.
    pub fn duration(&self) -> f64 {
        self.chords.iter().map(Chord::length).sum()
    }

    /// Appends a chord at the end of the track.
    pub fn push(&mut self, chord: Chord) -> &mut Self {
        self.chords.push(chord);
        self
    }

    /// Parses `notation` and appends the resulting chords.
    ///
    /// Nothing is appended if parsing fails.
    pub fn append_notation(&mut self, notation: &str) -> Result<&mut Self> {
        let chords = parse_chords(notation)?;
        self.chords.extend(chords);
        Ok(self)
    }

    /// Applies `f` to a copy of every chord; the track only changes if all
    /// calls succeed.
    fn map_chords(&mut self, f: impl Fn(&mut Chord) -> Result<()>) -> Result<&mut Self> {
        let mut chords = self.chords.clone();
        for chord in &mut chords {
            f(chord)?;
        }
        self.chords = chords;
        Ok(self)
    }

    /// Shifts every pitch by `delta` semitones.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PitchOverflow`] if a pitch leaves the octave range,
    /// in which case the track is left untouched.
    pub fn transpose(&mut self, delta: i32) -> Result<&mut Self> {
        self.map_chords(|chord| chord.transpose(delta).map(|_| ()))
    }

    /// Moves the track from key `src` into key `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScaleSizeMismatch`] if the scales differ in size, in
    /// which case the track is left untouched.
    pub fn modulate(&mut self, src: &Scale, dest: &Scale) -> Result<&mut Self> {
        let deltas = src.create_mapping_to(dest)?;
        self.map_chords(|chord| chord.transform(&deltas).map(|_| ()))
    }

    /// Multiplies every chord length by `factor`.
    ///
    /// Non-positive factors are applied as-is; the resulting lengths are
    /// rejected later by the emitter if negative.
    pub fn resize(&mut self, factor: f64) -> &mut Self {
        for chord in &mut self.chords {
            chord.set_length(chord.length() * factor);
        }
        self
    }

    /// Appends `other`, transposed so that it keeps sounding in its own
    /// octave under this track's octave setting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PitchOverflow`] if the shifted material leaves the
    /// octave range; nothing is appended then.
    pub fn append_track(&mut self, other: &Track) -> Result<&mut Self> {
        let shift = (other.octave as i64 - self.octave as i64) * OCTAVE_WIDTH as i64;
        let shift = i32::try_from(shift).map_err(|_| Error::PitchOverflow)?;
        let mut appended = other.clone();
        appended.transpose(shift)?;
        self.chords.extend(appended.chords);
        Ok(self)
    }

    /// Returns this track followed by `other`. See [`Track::append_track`].
    pub fn concat(&self, other: &Track) -> Result<Track> {
        let mut joined = self.clone();
        joined.append_track(other)?;
        Ok(joined)
    }

    /// Repeats the current contents `factor` times in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRepeatFactor`] for a negative factor.
    pub fn repeat_in_place(&mut self, factor: i32) -> Result<&mut Self> {
        if factor < 0 {
            return Err(Error::InvalidRepeatFactor(factor));
        }
        if factor == 0 {
            self.chords.clear();
            return Ok(self);
        }
        let original = self.chords.clone();
        self.chords.reserve(original.len() * (factor as usize - 1));
        for _ in 1..factor {
            self.chords.extend(original.iter().cloned());
        }
        Ok(self)
    }

    /// Returns a track holding `factor` copies of this one.
    pub fn repeat(&self, factor: i32) -> Result<Track> {
        let mut repeated = self.clone();
        repeated.repeat_in_place(factor)?;
        Ok(repeated)
    }
}

impl Default for Track {
    fn default() -> Self {
        Self::new(DEFAULT_OCTAVE, DEFAULT_VELOCITY)
    }
}

impl Extend<Chord> for Track {
    fn extend<I: IntoIterator<Item = Chord>>(&mut self, iter: I) {
        self.chords.extend(iter);
    }
}

impl Index<usize> for Track {
    type Output = Chord;

    fn index(&self, index: usize) -> &Chord {
        &self.chords[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::pitch::{BasePitch, Pitch};
    use crate::music::scale::{MAJOR, NATURAL_MINOR};

    fn ints(track: &Track) -> Vec<Vec<i64>> {
        track
            .chords()
            .iter()
            .map(|c| c.pitches().iter().map(Pitch::value).collect())
            .collect()
    }

    #[test]
    fn test_track_creation() {
        let track = Track::default();
        assert_eq!(track.octave(), DEFAULT_OCTAVE);
        assert_eq!(track.velocity(), DEFAULT_VELOCITY);
        assert!(track.is_empty());
    }

    #[test]
    fn test_append_in_order() {
        let mut track = Track::default();
        track.push(Chord::note(Pitch::from_int(2), 1.0));
        track.append_notation("E F").unwrap();
        track.extend(vec![Chord::rest(2.0)]);
        assert_eq!(ints(&track), vec![vec![2], vec![4], vec![5], vec![]]);
        assert_eq!(track.duration(), 5.0);
    }

    #[test]
    fn test_failed_append_leaves_track_unchanged() {
        let mut track = Track::from_notation("C D", 5, 64).unwrap();
        assert!(track.append_notation("E X").is_err());
        assert_eq!(track.len(), 2);
    }

    #[test]
    fn test_transpose_and_resize() {
        let mut track = Track::from_notation("C 8( D )", 5, 64).unwrap();
        track.transpose(-3).unwrap().resize(0.5);
        assert_eq!(ints(&track), vec![vec![-3], vec![-1]]);
        assert_eq!(track[0].length(), 0.5);
        assert_eq!(track[1].length(), 0.25);

        track.resize(0.0);
        assert_eq!(track[0].length(), 0.0);
    }

    #[test]
    fn test_modulate_major_to_minor() {
        let mut track = Track::from_notation("C E G A^1 . F#", 5, 64).unwrap();
        let c_major = Scale::from_intervals(0, &MAJOR).unwrap();
        let c_minor = Scale::from_intervals(0, &NATURAL_MINOR).unwrap();
        track.modulate(&c_major, &c_minor).unwrap();
        assert_eq!(
            ints(&track),
            vec![vec![0], vec![3], vec![7], vec![20], vec![], vec![6]]
        );
    }

    #[test]
    fn test_modulate_size_mismatch_propagates() {
        let mut track = Track::from_notation("E", 5, 64).unwrap();
        let major = Scale::from_intervals(0, &MAJOR).unwrap();
        let triad: Scale = "C E G".parse().unwrap();
        assert!(matches!(
            track.modulate(&major, &triad),
            Err(Error::ScaleSizeMismatch { .. })
        ));
        assert_eq!(ints(&track), vec![vec![4]]);
    }

    #[test]
    fn test_concat_carries_octave() {
        let melody = Track::from_notation("C D", 5, 100).unwrap();
        let bass = Track::from_notation("C", 4, 50).unwrap();
        let joined = melody.concat(&bass).unwrap();
        assert_eq!(ints(&joined), vec![vec![0], vec![2], vec![-12]]);
        assert_eq!(joined.octave(), 5);
        assert_eq!(joined.velocity(), 100);
        assert_eq!(melody.len(), 2);
    }

    #[test]
    fn test_overflowing_transpose_leaves_track_unchanged() {
        let mut track = Track::from_notation("C D", 5, 64).unwrap();
        track.push(Chord::note(Pitch::new(BasePitch::B, 0, i32::MAX), 1.0));
        let before = track.clone();
        assert!(matches!(track.transpose(1), Err(Error::PitchOverflow)));
        assert_eq!(track, before);

        let far = Track::from_notation("C", i32::MIN, 64).unwrap();
        assert!(matches!(
            track.append_track(&far),
            Err(Error::PitchOverflow)
        ));
        assert_eq!(track.len(), 3);
    }

    #[test]
    fn test_repeat() {
        let track = Track::from_notation("A B", 5, 64).unwrap();
        let thrice = track.repeat(3).unwrap();
        assert_eq!(
            ints(&thrice),
            vec![vec![9], vec![11], vec![9], vec![11], vec![9], vec![11]]
        );
        assert_eq!(track.repeat(1).unwrap(), track);
        assert!(track.repeat(0).unwrap().is_empty());
        assert!(matches!(
            track.repeat(-1),
            Err(Error::InvalidRepeatFactor(-1))
        ));
    }

    #[test]
    fn test_repeat_in_place_compounds_from_original() {
        let mut track = Track::from_notation("C", 5, 64).unwrap();
        track.repeat_in_place(4).unwrap();
        assert_eq!(track.len(), 4);
        track.repeat_in_place(2).unwrap();
        assert_eq!(track.len(), 8);
    }
}
