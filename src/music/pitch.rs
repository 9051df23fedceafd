//! Pitch representation.
//!
//! A pitch is a base letter, an accidental and an octave. The semitone value
//! returned by [`Pitch::value`] is the source of truth; the letter/accidental
//! split is only a spelling, recomputed canonically whenever a pitch is built
//! from an integer.

use super::OCTAVE_WIDTH;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Residue-indexed semitone deltas, as produced by
/// [`Scale::create_mapping_to`](super::Scale::create_mapping_to).
pub type PitchMap = BTreeMap<i32, i32>;

/// The seven natural pitch letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BasePitch {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl BasePitch {
    /// Semitone offset of the letter above C.
    pub const fn semitones(self) -> i32 {
        match self {
            BasePitch::C => 0,
            BasePitch::D => 2,
            BasePitch::E => 4,
            BasePitch::F => 5,
            BasePitch::G => 7,
            BasePitch::A => 9,
            BasePitch::B => 11,
        }
    }

    /// Maps an uppercase letter `A`-`G` to its base pitch.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'C' => Some(BasePitch::C),
            'D' => Some(BasePitch::D),
            'E' => Some(BasePitch::E),
            'F' => Some(BasePitch::F),
            'G' => Some(BasePitch::G),
            'A' => Some(BasePitch::A),
            'B' => Some(BasePitch::B),
            _ => None,
        }
    }

    pub const fn as_char(self) -> char {
        match self {
            BasePitch::C => 'C',
            BasePitch::D => 'D',
            BasePitch::E => 'E',
            BasePitch::F => 'F',
            BasePitch::G => 'G',
            BasePitch::A => 'A',
            BasePitch::B => 'B',
        }
    }
}

/// Returns true if `c` starts a new pitch inside a chord token.
pub fn is_base_pitch(c: char) -> bool {
    BasePitch::from_char(c).is_some()
}

/// Semitone delta for an accidental character (`#` sharp, `b` flat).
pub fn accidental_delta(c: char) -> Option<i32> {
    match c {
        '#' => Some(1),
        'b' => Some(-1),
        _ => None,
    }
}

/// Preferred spelling for every residue 0..12.
const CANONICAL_SPELLING: [(BasePitch, i32); 12] = [
    (BasePitch::C, 0),
    (BasePitch::C, 1),
    (BasePitch::D, 0),
    (BasePitch::E, -1),
    (BasePitch::E, 0),
    (BasePitch::F, 0),
    (BasePitch::F, 1),
    (BasePitch::G, 0),
    (BasePitch::A, -1),
    (BasePitch::A, 0),
    (BasePitch::B, -1),
    (BasePitch::B, 0),
];

/// A spelled pitch.
///
/// Equality, hashing and ordering all go through [`Pitch::value`], so
/// `C#` and `Db` in the same octave compare equal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pitch {
    base: BasePitch,
    accidental: i32,
    octave: i32,
}

impl Pitch {
    pub const fn new(base: BasePitch, accidental: i32, octave: i32) -> Self {
        Self {
            base,
            accidental,
            octave,
        }
    }

    /// Builds a pitch from a semitone value using the canonical spelling.
    ///
    /// Negative values are handled with floored division, so `-1` is
    /// `B` one octave below zero.
    pub fn from_int(value: i32) -> Self {
        let residue = value.rem_euclid(OCTAVE_WIDTH);
        let (base, accidental) = CANONICAL_SPELLING[residue as usize];
        Self {
            base,
            accidental,
            octave: value.div_euclid(OCTAVE_WIDTH),
        }
    }

    /// Canonical pitch for a wide semitone value.
    fn from_value(value: i64) -> Result<Self> {
        let width = OCTAVE_WIDTH as i64;
        let (base, accidental) = CANONICAL_SPELLING[value.rem_euclid(width) as usize];
        let octave = i32::try_from(value.div_euclid(width)).map_err(|_| Error::PitchOverflow)?;
        Ok(Self {
            base,
            accidental,
            octave,
        })
    }

    pub fn base(&self) -> BasePitch {
        self.base
    }

    pub fn accidental(&self) -> i32 {
        self.accidental
    }

    pub fn octave(&self) -> i32 {
        self.octave
    }

    /// Exact semitone value. Cannot overflow for any field values.
    pub fn value(&self) -> i64 {
        self.base.semitones() as i64
            + self.accidental as i64
            + OCTAVE_WIDTH as i64 * self.octave as i64
    }

    /// Semitone value as an `i32`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PitchOverflow`] if the value does not fit.
    pub fn to_int(&self) -> Result<i32> {
        i32::try_from(self.value()).map_err(|_| Error::PitchOverflow)
    }

    fn offset(&self, delta: i64) -> Result<Self> {
        Self::from_value(self.value() + delta)
    }

    /// Returns the pitch moved by `delta` semitones, respelled canonically.
    pub fn transposed(&self, delta: i32) -> Result<Self> {
        self.offset(delta as i64)
    }

    /// Moves the pitch by whole octaves without touching its spelling.
    pub fn shift_octave(&mut self, delta: i32) -> Result<&mut Self> {
        self.octave = self.octave.checked_add(delta).ok_or(Error::PitchOverflow)?;
        Ok(self)
    }

    pub fn octave_shifted(&self, delta: i32) -> Result<Self> {
        let mut p = *self;
        p.shift_octave(delta)?;
        Ok(p)
    }

    /// Applies the delta registered for this pitch's letter + accidental.
    ///
    /// The lookup key is `base + accidental` without octave reduction, so
    /// spellings like `Cb` (key -1) never match.
    pub fn transform(&mut self, deltas: &PitchMap) -> Result<&mut Self> {
        let key = self.base.semitones() as i64 + self.accidental as i64;
        let delta = i32::try_from(key).ok().and_then(|k| deltas.get(&k));
        if let Some(delta) = delta {
            *self = self.transposed(*delta)?;
        }
        Ok(self)
    }

    /// Panicking form of [`Pitch::offset`] for the operator impls.
    fn offset_or_panic(&self, delta: i64) -> Self {
        match self.offset(delta) {
            Ok(p) => p,
            Err(e) => panic!("{} ({} {:+})", e, self, delta),
        }
    }
}

impl Default for Pitch {
    fn default() -> Self {
        Self::new(BasePitch::C, 0, 0)
    }
}

impl From<i32> for Pitch {
    fn from(value: i32) -> Self {
        Self::from_int(value)
    }
}

/// Largest octave marker a token may carry; `12 * octave` must fit an `i32`.
pub const MAX_OCTAVE: i32 = i32::MAX / OCTAVE_WIDTH;

/// Parses the digits following an octave marker.
fn octave_digits(token: &str, rest: &str) -> Result<i32> {
    let digits: &str = &rest[..rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len())];
    if digits.is_empty() {
        return Err(Error::malformed(token, "octave marker without digits"));
    }
    match digits.parse::<i32>() {
        Ok(octave) if octave <= MAX_OCTAVE => Ok(octave),
        _ => Err(Error::malformed(token, "octave out of range")),
    }
}

impl FromStr for Pitch {
    type Err = Error;

    /// Parses `<A-G>[#|b]*[^N|_N]`.
    ///
    /// Characters after the recognised parts are ignored.
    fn from_str(token: &str) -> Result<Self> {
        let mut chars = token.char_indices();
        let base = match chars.next() {
            None => return Err(Error::EmptyPitchConversion),
            Some((_, c)) => BasePitch::from_char(c)
                .ok_or_else(|| Error::malformed(token, "pitch must start with A-G"))?,
        };

        let mut accidental = 0;
        let mut octave = 0;
        for (i, c) in chars {
            if let Some(delta) = accidental_delta(c) {
                accidental += delta;
                continue;
            }
            match c {
                '^' => octave = octave_digits(token, &token[i + 1..])?,
                '_' => octave = -octave_digits(token, &token[i + 1..])?,
                _ => continue,
            }
            break;
        }

        Ok(Self::new(base, accidental, octave))
    }
}

impl fmt::Display for Pitch {
    /// Writes the pitch back in token form, e.g. `C#^5` or `Bb_1`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base.as_char())?;
        let symbol = if self.accidental > 0 { '#' } else { 'b' };
        for _ in 0..self.accidental.unsigned_abs() {
            write!(f, "{}", symbol)?;
        }
        match self.octave.cmp(&0) {
            Ordering::Greater => write!(f, "^{}", self.octave),
            Ordering::Less => write!(f, "_{}", self.octave.unsigned_abs()),
            Ordering::Equal => Ok(()),
        }
    }
}

impl PartialEq for Pitch {
    fn eq(&self, other: &Self) -> bool {
        self.value() == other.value()
    }
}

impl Eq for Pitch {}

impl Hash for Pitch {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value().hash(state);
    }
}

impl PartialOrd for Pitch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pitch {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value().cmp(&other.value())
    }
}

// The operators panic when the result leaves the `i32` octave range, like
// integer overflow in debug builds. Use `transposed` for the checked form.

impl AddAssign<i32> for Pitch {
    fn add_assign(&mut self, delta: i32) {
        *self = self.offset_or_panic(delta as i64);
    }
}

impl SubAssign<i32> for Pitch {
    fn sub_assign(&mut self, delta: i32) {
        *self = self.offset_or_panic(-(delta as i64));
    }
}

impl Add<i32> for Pitch {
    type Output = Pitch;

    fn add(self, delta: i32) -> Pitch {
        self.offset_or_panic(delta as i64)
    }
}

impl Sub<i32> for Pitch {
    type Output = Pitch;

    fn sub(self, delta: i32) -> Pitch {
        self.offset_or_panic(-(delta as i64))
    }
}
