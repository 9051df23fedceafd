//! Error types shared by the notation, music model and MIDI layers.

use thiserror::Error;

/// Everything that can go wrong between a notation string and a written file.
#[derive(Debug, Error)]
pub enum Error {
    /// A pitch, chord or duration token that cannot be parsed.
    #[error("malformed token {token:?}: {reason}")]
    MalformedToken { token: String, reason: String },

    #[error("cannot convert an empty string to a pitch")]
    EmptyPitchConversion,

    /// An extend token (`-`) with no chord before it.
    #[error("extend token at position {position} has no preceding chord")]
    DanglingExtend { position: usize },

    #[error("scales have different sizes ({source_size} vs {dest_size})")]
    ScaleSizeMismatch { source_size: usize, dest_size: usize },

    #[error("scale has no degrees")]
    EmptyScale,

    /// Pitch or scale arithmetic that leaves the `i32` semitone range.
    #[error("pitch arithmetic overflowed the semitone range")]
    PitchOverflow,

    #[error("invalid repeat factor {0}, must be >= 0")]
    InvalidRepeatFactor(i32),

    /// A computed MIDI data byte that does not fit in 0..=255.
    #[error("{what} value {value} does not fit in a byte")]
    ByteRangeOverflow { what: &'static str, value: i64 },

    #[error("chord length {0} cannot be emitted")]
    InvalidDuration(f64),

    #[error("tick position overflowed")]
    TickOverflow,

    #[error("invalid tempo {0} bpm")]
    InvalidTempo(u32),

    /// Rejected by the notation pre-filter.
    #[error("invalid notation at byte {position}: {reason}")]
    InvalidNotation { position: usize, reason: &'static str },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("binary encoding error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("MIDI parse error: {0}")]
    SmfParse(String),
}

impl Error {
    pub(crate) fn malformed(token: &str, reason: impl Into<String>) -> Self {
        Error::MalformedToken {
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
