//! Scales as ordered, ascending lists of semitone positions.

use super::chord::Chord;
use super::pitch::{Pitch, PitchMap};
use super::OCTAVE_WIDTH;
use serde::{Deserialize, Serialize};
use std::ops::Index;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Major scale intervals.
pub const MAJOR: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];
/// Harmonic minor intervals.
pub const MINOR: [i32; 7] = [0, 2, 3, 5, 7, 8, 11];
pub const HARMONIC_MINOR: [i32; 7] = MINOR;
pub const NATURAL_MINOR: [i32; 7] = [0, 2, 3, 5, 7, 8, 10];

/// An ordered set of scale degrees.
///
/// Degrees are absolute semitone values, kept non-decreasing: every entry is
/// raised by whole octaves until it is at least its predecessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scale {
    degrees: Vec<i32>,
}

impl Scale {
    /// Raises each degree by the fewest whole octaves that put it at or
    /// above its predecessor.
    fn from_degrees(raw: impl IntoIterator<Item = i64>) -> Result<Self> {
        let width = OCTAVE_WIDTH as i64;
        let mut degrees: Vec<i32> = Vec::new();
        for mut degree in raw {
            if let Some(&prev) = degrees.last() {
                let gap = prev as i64 - degree;
                if gap > 0 {
                    degree += (gap + width - 1) / width * width;
                }
            }
            degrees.push(i32::try_from(degree).map_err(|_| Error::PitchOverflow)?);
        }
        Ok(Self { degrees })
    }

    /// Builds a scale from pitch classes; octaves are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PitchOverflow`] if stacking the degrees runs past the
    /// `i32` range.
    pub fn from_pitches(pitches: &[Pitch]) -> Result<Self> {
        Self::from_degrees(
            pitches
                .iter()
                .map(|p| p.value().rem_euclid(OCTAVE_WIDTH as i64)),
        )
    }

    /// Builds a scale from a root semitone and an interval pattern such as
    /// [`MAJOR`].
    pub fn from_intervals(root: i32, intervals: &[i32]) -> Result<Self> {
        Self::from_degrees(intervals.iter().map(|&i| root as i64 + i as i64))
    }

    pub fn size(&self) -> usize {
        self.degrees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.degrees.is_empty()
    }

    pub fn degrees(&self) -> &[i32] {
        &self.degrees
    }

    pub fn get(&self, index: usize) -> Option<i32> {
        self.degrees.get(index).copied()
    }

    /// Maps each degree's pitch class to the distance to the matching degree
    /// of `other`. Zero distances are left out.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScaleSizeMismatch`] if the scales differ in size, or
    /// [`Error::PitchOverflow`] if a distance does not fit an `i32`.
    pub fn create_mapping_to(&self, other: &Scale) -> Result<PitchMap> {
        if self.size() != other.size() {
            return Err(Error::ScaleSizeMismatch {
                source_size: self.size(),
                dest_size: other.size(),
            });
        }
        let mut map = PitchMap::new();
        for (from, to) in self.degrees.iter().zip(&other.degrees) {
            let delta = to.checked_sub(*from).ok_or(Error::PitchOverflow)?;
            if delta != 0 {
                map.insert(from.rem_euclid(OCTAVE_WIDTH), delta);
            }
        }
        Ok(map)
    }

    /// Returns the pitch at `degree`, wrapping by octaves outside `0..size`.
    ///
    /// With seven degrees, degree 7 is degree 0 an octave up and degree -1
    /// is degree 6 an octave down.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyScale`] for a scale with no degrees, and
    /// [`Error::PitchOverflow`] if the octave leaves the `i32` range.
    pub fn get_pitch(&self, degree: i32) -> Result<Pitch> {
        if self.is_empty() {
            return Err(Error::EmptyScale);
        }
        let size = i64::try_from(self.size()).map_err(|_| Error::PitchOverflow)?;
        let degree = degree as i64;
        let base = self.degrees[degree.rem_euclid(size) as usize];
        let octaves = i32::try_from(degree.div_euclid(size)).map_err(|_| Error::PitchOverflow)?;
        Pitch::from_int(base).octave_shifted(octaves)
    }

    /// Builds a chord from scale degrees, in the order given.
    pub fn get_chord(&self, degrees: &[i32], length: f64) -> Result<Chord> {
        let pitches = degrees
            .iter()
            .map(|&d| self.get_pitch(d))
            .collect::<Result<Vec<_>>>()?;
        Ok(Chord::new(pitches, length))
    }
}

impl FromStr for Scale {
    type Err = Error;

    /// Parses space-separated pitch tokens, e.g. `"C Db Eb F G Ab Bb"`.
    /// Octave markers are kept.
    fn from_str(input: &str) -> Result<Self> {
        let degrees = input
            .split_whitespace()
            .map(|tok| tok.parse::<Pitch>().map(|p| p.value()))
            .collect::<Result<Vec<_>>>()?;
        Self::from_degrees(degrees)
    }
}

impl Index<usize> for Scale {
    type Output = i32;

    fn index(&self, index: usize) -> &i32 {
        &self.degrees[index]
    }
}
