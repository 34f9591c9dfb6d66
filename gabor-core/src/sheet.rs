//! # Music Sheet Module
//!
//! Serde data model for note tracks. A sheet holds tracks played together;
//! each track plays its notes one after another.

use serde::{Deserialize, Serialize};

use crate::error::{GaborError, Result};
use crate::tuning;

/// A single note of a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub name: String,     // Pitch class ("a".."l", with '#' or '&'), or "_" for a rest
    #[serde(default)]
    pub octave: i32,
    pub duration: f64,    // In sheet time units, scaled by the signal time scale
    #[serde(default = "default_volume")]
    pub volume: f64,
}

fn default_volume() -> f64 {
    1.0
}

impl Note {
    pub fn new(name: impl Into<String>, octave: i32, duration: f64, volume: f64) -> Self {
        Self {
            name: name.into(),
            octave,
            duration,
            volume,
        }
    }

    pub fn rest(duration: f64) -> Self {
        Self::new(tuning::REST, 0, duration, 0.0)
    }

    pub fn is_rest(&self) -> bool {
        tuning::is_rest(&self.name)
    }
}

/// Notes played one after the other.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Track {
    pub notes: Vec<Note>,
}

impl Track {
    pub fn new(notes: Vec<Note>) -> Self {
        Self { notes }
    }

    /// Sum of the note durations, unscaled.
    pub fn duration(&self) -> f64 {
        self.notes.iter().map(|n| n.duration).sum()
    }
}

/// Tracks played concurrently.
///
/// The order of the tracks is irrelevant, the order of notes within a track is not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MusicSheet {
    pub tracks: Vec<Track>,
}

impl MusicSheet {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    /// A sheet with a single track.
    pub fn single(notes: Vec<Note>) -> Self {
        Self::new(vec![Track::new(notes)])
    }

    /// Checks that the sheet can be turned into a signal.
    ///
    /// Every track needs at least one note, every note a finite positive
    /// duration, a finite non-negative volume and a known name, and at
    /// least one note of the sheet must be pitched.
    pub fn validate(&self) -> Result<()> {
        if self.tracks.is_empty() {
            return Err(GaborError::EmptySheet);
        }

        let mut pitched = false;
        for (t, track) in self.tracks.iter().enumerate() {
            if track.notes.is_empty() {
                return Err(GaborError::EmptyTrack { track: t });
            }
            for (n, note) in track.notes.iter().enumerate() {
                if !(note.duration.is_finite() && note.duration > 0.0) {
                    return Err(GaborError::InvalidNoteDuration {
                        track: t,
                        note: n,
                        duration: note.duration,
                    });
                }
                if !(note.volume.is_finite() && note.volume >= 0.0) {
                    return Err(GaborError::InvalidVolume {
                        track: t,
                        note: n,
                        volume: note.volume,
                    });
                }
                if note.is_rest() {
                    continue;
                }
                if tuning::semitone_offset(&note.name).is_none() {
                    return Err(GaborError::UnknownNote(note.name.clone()));
                }
                pitched = true;
            }
        }

        if pitched {
            Ok(())
        } else {
            Err(GaborError::NoPitchedNotes)
        }
    }
}

impl Default for MusicSheet {
    /// Two-track demo sheet: a rising `a` over three octaves against an
    /// `f`, a rest and a `g&`.
    fn default() -> Self {
        Self::new(vec![
            Track::new(vec![
                Note::new("a#", 0, 1.0, 1.0),
                Note::new("a", 1, 2.0, 2.0),
                Note::new("a", 2, 1.5, 0.5),
            ]),
            Track::new(vec![
                Note::new("f", 1, 2.0, 1.5),
                Note::rest(1.5),
                Note::new("g&", 1, 0.5, 1.0),
            ]),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sheet_is_valid() {
        let sheet = MusicSheet::default();
        assert!(sheet.validate().is_ok());
        assert_eq!(sheet.tracks[0].duration(), 4.5);
        assert_eq!(sheet.tracks[1].duration(), 4.0);
    }

    #[test]
    fn rejects_malformed_sheets() {
        assert_eq!(MusicSheet::new(vec![]).validate(), Err(GaborError::EmptySheet));
        assert_eq!(
            MusicSheet::new(vec![Track::default()]).validate(),
            Err(GaborError::EmptyTrack { track: 0 })
        );
        assert_eq!(
            MusicSheet::single(vec![Note::new("a", 0, 0.0, 1.0)]).validate(),
            Err(GaborError::InvalidNoteDuration {
                track: 0,
                note: 0,
                duration: 0.0
            })
        );
        assert_eq!(
            MusicSheet::single(vec![Note::new("z", 0, 1.0, 1.0)]).validate(),
            Err(GaborError::UnknownNote("z".to_string()))
        );
        assert_eq!(
            MusicSheet::single(vec![Note::rest(1.0)]).validate(),
            Err(GaborError::NoPitchedNotes)
        );
    }

    #[test]
    fn deserializes_with_defaults() {
        let json = r#"[[{"name": "c#", "duration": 0.5}, {"name": "_", "duration": 1}]]"#;
        let sheet: MusicSheet = serde_json::from_str(json).unwrap();
        let note = &sheet.tracks[0].notes[0];
        assert_eq!(note.octave, 0);
        assert_eq!(note.volume, 1.0);
        assert!(sheet.tracks[0].notes[1].is_rest());
        assert!(sheet.validate().is_ok());
    }
}
