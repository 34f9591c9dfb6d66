//! # Note Tuning Module
//!
//! This module maps note names to semitone offsets and frequencies for the
//! synthetic music signal.
//!
//! ## Note Names
//! - Twelve pitch classes named by the letters `a` to `l` (offsets 0 to 11)
//! - A `#` suffix raises the pitch by one semitone, a `&` suffix lowers it by one
//! - Names are case-insensitive
//! - `_` is a rest: it lasts for its duration but has no pitch
//!
//! Frequencies are relative to a base frequency:
//! `freq = base · 2^(octave + semitone / 12)`.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Name used for silent notes.
pub const REST: &str = "_";

/// Number of pitch classes in an octave.
const PITCH_CLASSES: i32 = 12;

/// Statically computed note-name table.
///
/// Every letter from `a` to `l` is stored three times: natural, flat (`&`)
/// and sharp (`#`), so lookups never have to parse accidentals.
static NOTE_MAP: Lazy<BTreeMap<String, i32>> = Lazy::new(|| {
    let mut map = BTreeMap::new();
    for i in 0..PITCH_CLASSES {
        let letter = char::from(b'a' + i as u8);
        map.insert(format!("{letter}&"), i - 1);
        map.insert(letter.to_string(), i);
        map.insert(format!("{letter}#"), i + 1);
    }
    map
});

/// Returns true if `name` denotes a rest.
pub fn is_rest(name: &str) -> bool {
    name.trim() == REST
}

/// Gets the semitone offset of a note name.
///
/// # Returns
/// * `Some(offset)` - Offset from the `a` pitch class, in `-1..=12`
/// * `None` - The name is not in the table (rests included)
pub fn semitone_offset(name: &str) -> Option<i32> {
    NOTE_MAP.get(&name.trim().to_lowercase()).copied()
}

/// Calculates the frequency of a note for a given base frequency.
///
/// # Arguments
/// * `base_frequency` - Frequency of the `a` pitch class in octave 0
/// * `name` - Note name (e.g. "a", "c#", "g&")
/// * `octave` - Octave number, may be negative
///
/// # Returns
/// * `Some(freq)` - Frequency of the note
/// * `None` - Unknown name or rest
pub fn note_frequency(base_frequency: f64, name: &str, octave: i32) -> Option<f64> {
    semitone_offset(name)
        .map(|offset| base_frequency * 2f64.powf(octave as f64 + offset as f64 / 12.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_map_to_consecutive_semitones() {
        assert_eq!(semitone_offset("a"), Some(0));
        assert_eq!(semitone_offset("f"), Some(5));
        assert_eq!(semitone_offset("l"), Some(11));
        assert_eq!(semitone_offset("m"), None);
    }

    #[test]
    fn accidentals_shift_by_one() {
        assert_eq!(semitone_offset("a&"), Some(-1));
        assert_eq!(semitone_offset("a#"), Some(1));
        assert_eq!(semitone_offset("G&"), Some(5));
        assert_eq!(semitone_offset("c#"), semitone_offset("d"));
    }

    #[test]
    fn rests_have_no_pitch() {
        assert!(is_rest("_"));
        assert!(!is_rest("a"));
        assert_eq!(note_frequency(1.0, REST, 0), None);
    }

    #[test]
    fn octaves_double_the_frequency() {
        let a0 = note_frequency(440.0, "a", 0).unwrap();
        let a1 = note_frequency(440.0, "a", 1).unwrap();
        let a_minus = note_frequency(440.0, "a", -1).unwrap();
        assert!((a0 - 440.0).abs() < 1e-9);
        assert!((a1 - 880.0).abs() < 1e-9);
        assert!((a_minus - 220.0).abs() < 1e-9);

        let g = note_frequency(1.0, "g", 0).unwrap();
        assert!((g - 2f64.powf(0.5)).abs() < 1e-12);
    }
}
