//! Chords: rests, single notes and simultaneities share one type.
//!
//! The kind of a chord follows from how many pitches it holds: none is a
//! rest, one is a note, more is a chord in the usual sense.

use super::pitch::{Pitch, PitchMap};
use super::DEFAULT_LENGTH;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Index, Sub};

use crate::error::Result;

/// Zero or more pitches sounding together for `length` quarter notes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chord {
    pitches: Vec<Pitch>,
    length: f64,
}

impl Chord {
    pub fn new(pitches: Vec<Pitch>, length: f64) -> Self {
        Self { pitches, length }
    }

    pub fn note(pitch: Pitch, length: f64) -> Self {
        Self::new(vec![pitch], length)
    }

    pub fn rest(length: f64) -> Self {
        Self::new(Vec::new(), length)
    }

    /// Builder form of [`Chord::push`].
    pub fn with_pitch(mut self, pitch: Pitch) -> Self {
        self.pitches.push(pitch);
        self
    }

    pub fn push(&mut self, pitch: Pitch) -> &mut Self {
        self.pitches.push(pitch);
        self
    }

    pub fn pitches(&self) -> &[Pitch] {
        &self.pitches
    }

    /// Length in quarter notes.
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn set_length(&mut self, length: f64) {
        self.length = length;
    }

    pub fn len(&self) -> usize {
        self.pitches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }

    pub fn is_rest(&self) -> bool {
        self.pitches.is_empty()
    }

    pub fn is_note(&self) -> bool {
        self.pitches.len() == 1
    }

    pub fn is_chord(&self) -> bool {
        self.pitches.len() > 1
    }

    /// Replaces every pitch with `f(pitch)`, or nothing if any call fails.
    fn map_pitches(&mut self, f: impl Fn(&Pitch) -> Result<Pitch>) -> Result<&mut Self> {
        self.pitches = self.pitches.iter().map(f).collect::<Result<_>>()?;
        Ok(self)
    }

    /// Shifts every pitch by `delta` semitones.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PitchOverflow`](crate::Error::PitchOverflow) and
    /// leaves the chord unchanged if a pitch leaves the octave range.
    pub fn transpose(&mut self, delta: i32) -> Result<&mut Self> {
        self.map_pitches(|p| p.transposed(delta))
    }

    pub fn shift_octave(&mut self, delta: i32) -> Result<&mut Self> {
        self.map_pitches(|p| p.octave_shifted(delta))
    }

    pub fn transform(&mut self, deltas: &PitchMap) -> Result<&mut Self> {
        self.map_pitches(|p| {
            let mut p = *p;
            p.transform(deltas)?;
            Ok(p)
        })
    }
}

impl Default for Chord {
    fn default() -> Self {
        Self::rest(DEFAULT_LENGTH)
    }
}

impl Index<usize> for Chord {
    type Output = Pitch;

    fn index(&self, index: usize) -> &Pitch {
        &self.pitches[index]
    }
}

impl Add<i32> for Chord {
    type Output = Chord;

    fn add(mut self, delta: i32) -> Chord {
        for p in &mut self.pitches {
            *p += delta;
        }
        self
    }
}

impl Sub<i32> for Chord {
    type Output = Chord;

    fn sub(mut self, delta: i32) -> Chord {
        for p in &mut self.pitches {
            *p -= delta;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::pitch::BasePitch;

    fn triad() -> Chord {
        Chord::rest(1.0)
            .with_pitch(Pitch::new(BasePitch::C, 0, 0))
            .with_pitch(Pitch::new(BasePitch::E, 0, 0))
            .with_pitch(Pitch::new(BasePitch::G, 0, 0))
    }

    #[test]
    fn test_classification() {
        assert!(Chord::rest(1.0).is_rest());
        assert!(Chord::note(Pitch::default(), 1.0).is_note());
        assert!(triad().is_chord());
        assert!(!triad().is_note());
        assert_eq!(Chord::default().length(), DEFAULT_LENGTH);
    }

    #[test]
    fn test_transpose_all_pitches() {
        let up = triad() + 2;
        let values: Vec<i64> = up.pitches().iter().map(Pitch::value).collect();
        assert_eq!(values, vec![2, 6, 9]);

        let down = up - 14;
        assert_eq!(down[0].value(), -12);
        assert_eq!(down.length(), 1.0);
    }

    #[test]
    fn test_chained_mutators() {
        let mut chord = Chord::note(Pitch::new(BasePitch::D, -1, 0), 2.0);
        chord.shift_octave(1).unwrap().transpose(1).unwrap();
        assert_eq!(chord[0].value(), 14);
    }

    #[test]
    fn test_failed_transpose_leaves_chord_unchanged() {
        let mut chord = triad().with_pitch(Pitch::new(BasePitch::C, 0, i32::MAX));
        let before = chord.clone();
        assert!(matches!(
            chord.transpose(12),
            Err(crate::Error::PitchOverflow)
        ));
        assert_eq!(chord, before);
        assert!(chord.shift_octave(1).is_err());
        assert_eq!(chord[3].octave(), i32::MAX);
    }

    #[test]
    fn test_transform_rest_is_noop() {
        let mut map = PitchMap::new();
        map.insert(0, 1);
        let mut rest = Chord::rest(0.5);
        rest.transform(&map).unwrap();
        assert!(rest.is_rest());

        let mut c = triad();
        c.transform(&map).unwrap();
        assert_eq!(c[0].value(), 1);
        assert_eq!(c[1].value(), 4);
    }
}
