//! JSON score descriptions.
//!
//! A score file names tracks by notation string plus the transformations to
//! apply, and compiles into a [`Song`]:
//!
//! ```json
//! {
//!   "name": "twinkle",
//!   "tempo": 100,
//!   "tracks": [
//!     { "notation": "C C G G A A G -", "velocity": 90 },
//!     { "notation": "C_1 - E - F - C -", "octave": 4, "repeat": 2 }
//!   ],
//!   "modulate": {
//!     "from": { "root": "C", "mode": "major" },
//!     "to": { "root": "F#", "mode": "minor" }
//!   }
//! }
//! ```

use crate::error::{Error, Result};
use crate::midi::{Song, DEFAULT_TEMPO, DEFAULT_TICKS_PER_QUARTER};
use crate::music::{mode_intervals, Pitch, Scale, Track, DEFAULT_OCTAVE, DEFAULT_VELOCITY};
use crate::validate::validate_notation;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_tempo() -> u32 {
    DEFAULT_TEMPO
}

fn default_ticks_per_quarter() -> u16 {
    DEFAULT_TICKS_PER_QUARTER
}

fn default_octave() -> i32 {
    DEFAULT_OCTAVE
}

fn default_velocity() -> i32 {
    DEFAULT_VELOCITY
}

fn default_repeat() -> i32 {
    1
}

/// A key given either as root + mode or as a literal pitch list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScaleSpec {
    /// e.g. `{ "root": "F#", "mode": "minor" }`
    Mode { root: String, mode: String },
    /// e.g. `{ "pitches": "C Db Eb F G Ab Bb" }`
    Pitches { pitches: String },
}

impl ScaleSpec {
    pub fn to_scale(&self) -> Result<Scale> {
        match self {
            ScaleSpec::Mode { root, mode } => {
                let root: Pitch = root.parse()?;
                let intervals = mode_intervals(mode)
                    .ok_or_else(|| Error::malformed(mode, "unknown mode"))?;
                Scale::from_intervals(root.to_int()?, intervals)
            }
            ScaleSpec::Pitches { pitches } => pitches.parse(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modulation {
    pub from: ScaleSpec,
    pub to: ScaleSpec,
}

/// One track of a score file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSpec {
    pub notation: String,
    #[serde(default = "default_octave")]
    pub octave: i32,
    #[serde(default = "default_velocity")]
    pub velocity: i32,
    #[serde(default = "default_repeat")]
    pub repeat: i32,
    #[serde(default)]
    pub transpose: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resize: Option<f64>,
}

impl TrackSpec {
    /// Builds the track: parse, transpose, resize, then repeat.
    pub fn build(&self) -> Result<Track> {
        let mut track = Track::from_notation(&self.notation, self.octave, self.velocity)?;
        track.transpose(self.transpose)?;
        if let Some(factor) = self.resize {
            track.resize(factor);
        }
        track.repeat_in_place(self.repeat)?;
        Ok(track)
    }
}

/// A complete score file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "default_tempo")]
    pub tempo: u32,
    #[serde(default = "default_ticks_per_quarter")]
    pub ticks_per_quarter: u16,
    pub tracks: Vec<TrackSpec>,
    /// Applied to the whole song after the tracks are built.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modulate: Option<Modulation>,
    /// Applied to the whole song after modulation.
    #[serde(default)]
    pub transpose: i32,
}

impl Score {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Compiles the score into a song.
    ///
    /// With `validate` set, every notation string goes through
    /// [`validate_notation`] before it is parsed.
    pub fn compile(&self, validate: bool) -> Result<Song> {
        let mut song = Song::new(self.tempo, self.ticks_per_quarter);
        if let Some(name) = &self.name {
            song.name = name.clone();
        }

        for (index, spec) in self.tracks.iter().enumerate() {
            if validate {
                validate_notation(&spec.notation)?;
            }
            let track = spec.build()?;
            tracing::debug!("track {}: {} chords", index, track.len());
            song.add_track(track);
        }

        if let Some(modulation) = &self.modulate {
            song.modulate(&modulation.from.to_scale()?, &modulation.to.to_scale()?)?;
        }
        song.transpose(self.transpose)?;
        Ok(song)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWINKLE: &str = r#"{
        "name": "twinkle",
        "tempo": 100,
        "tracks": [
            { "notation": "C C G G A A G -", "velocity": 90 },
            { "notation": "C_1 - E - F - C -", "octave": 4, "repeat": 2 }
        ],
        "modulate": {
            "from": { "root": "C", "mode": "major" },
            "to": { "root": "F#", "mode": "minor" }
        }
    }"#;

    #[test]
    fn test_defaults() {
        let score = Score::from_json(r#"{ "tracks": [ { "notation": "C" } ] }"#).unwrap();
        assert_eq!(score.tempo, DEFAULT_TEMPO);
        assert_eq!(score.ticks_per_quarter, DEFAULT_TICKS_PER_QUARTER);
        assert_eq!(score.tracks[0].octave, DEFAULT_OCTAVE);
        assert_eq!(score.tracks[0].velocity, DEFAULT_VELOCITY);
        assert_eq!(score.tracks[0].repeat, 1);
        assert!(score.modulate.is_none());
    }

    #[test]
    fn test_compile() {
        let song = Score::from_json(TWINKLE).unwrap().compile(true).unwrap();
        assert_eq!(song.name, "twinkle");
        assert_eq!(song.tempo(), 100);
        assert_eq!(song.track_count(), 2);
        assert_eq!(song.tracks()[0].velocity(), 90);
        assert_eq!(song.tracks()[1].len(), 8);
        // C major -> F# harmonic minor moves C to F#
        assert_eq!(song.tracks()[0][0][0].value(), 6);
    }

    #[test]
    fn test_demo_scores_compile() {
        for name in ["twinkle.json", "moonlight.json"] {
            let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos").join(name);
            let song = Score::load(&path).unwrap().compile(true).unwrap();
            assert!(song.to_smf_bytes().is_ok(), "{} failed to emit", name);
        }
    }

    #[test]
    fn test_scale_spec_forms() {
        let literal = ScaleSpec::Pitches {
            pitches: "C Db Eb F G Ab Bb".to_string(),
        };
        assert_eq!(literal.to_scale().unwrap().degrees(), &[0, 1, 3, 5, 7, 8, 10]);

        let bad = ScaleSpec::Mode {
            root: "C".to_string(),
            mode: "lydian".to_string(),
        };
        assert!(matches!(bad.to_scale(), Err(Error::MalformedToken { .. })));
    }

    #[test]
    fn test_validation_toggle() {
        let score = Score::from_json(r#"{ "tracks": [ { "notation": "C D6x" } ] }"#).unwrap();
        assert!(matches!(
            score.compile(true),
            Err(Error::InvalidNotation { .. })
        ));
        assert_eq!(score.compile(false).unwrap().tracks()[0].len(), 2);
    }

    #[test]
    fn test_errors_propagate() {
        let score = Score::from_json(
            r#"{ "tracks": [ { "notation": "C", "repeat": -2 } ] }"#,
        )
        .unwrap();
        assert!(matches!(
            score.compile(true),
            Err(Error::InvalidRepeatFactor(-2))
        ));

        let score = Score::from_json(
            r#"{
                "tracks": [ { "notation": "C" } ],
                "modulate": { "from": { "root": "C", "mode": "major" }, "to": { "pitches": "C E G" } }
            }"#,
        )
        .unwrap();
        assert!(matches!(
            score.compile(true),
            Err(Error::ScaleSizeMismatch { .. })
        ));
    }
}
