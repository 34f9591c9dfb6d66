//! # Error Module
//!
//! Typed errors for sheet validation, option validation and grid queries.

use thiserror::Error;

/// Errors raised while configuring or querying the transform pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GaborError {
    /// The music sheet has no tracks.
    #[error("music sheet has no tracks")]
    EmptySheet,
    /// A track has no notes.
    #[error("track {track} has no notes")]
    EmptyTrack { track: usize },
    /// A note duration is zero, negative or not finite.
    #[error("note {note} of track {track} has invalid duration {duration}")]
    InvalidNoteDuration {
        track: usize,
        note: usize,
        duration: f64,
    },
    /// A note volume is negative or not finite.
    #[error("note {note} of track {track} has invalid volume {volume}")]
    InvalidVolume { track: usize, note: usize, volume: f64 },
    /// A note name is not in the note table.
    #[error("unknown note name '{0}'")]
    UnknownNote(String),
    /// Every note of the sheet is a rest.
    #[error("music sheet has no pitched notes")]
    NoPitchedNotes,
    /// A numeric option is outside its accepted domain.
    #[error("invalid value for {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
    /// A subsampling rate or resolution is zero.
    #[error("{name} must be at least 1")]
    ZeroRate { name: &'static str },
    /// A query index falls outside the computed grid.
    #[error("{axis} index {index} out of range (len {len})")]
    IndexOutOfRange {
        axis: &'static str,
        index: usize,
        len: usize,
    },
}

/// Convenience alias so callers can write `Result<T>` instead of `Result<T, GaborError>`.
pub type Result<T> = std::result::Result<T, GaborError>;

/// Rejects values that are not finite or not strictly positive.
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(GaborError::InvalidParameter { name, value })
    }
}

/// Rejects values that are not finite or negative.
pub(crate) fn ensure_non_negative(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(GaborError::InvalidParameter { name, value })
    }
}

pub(crate) fn ensure_nonzero(name: &'static str, value: usize) -> Result<usize> {
    if value == 0 {
        Err(GaborError::ZeroRate { name })
    } else {
        Ok(value)
    }
}
