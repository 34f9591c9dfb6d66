//! # Signal Source Module
//!
//! This module turns a [`MusicSheet`] into a sampled, real-valued waveform
//! `f(x)` for `x ∈ [0, 1]`.
//!
//! ## Features
//! - Concurrent tracks of sequential notes
//! - Steep raised-cosine-like envelope so notes start and stop without clicks
//! - Optional additive noise, reproducible through a seeded PCG generator
//! - Cached sampling at the configured resolution
//!
//! Time scale and master volume are explicit [`SignalOptions`] fields, there
//! is no process-wide configuration.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::f64::consts::PI;
use tracing::debug;

use crate::error::{Result, ensure_non_negative, ensure_nonzero, ensure_positive};
use crate::sheet::MusicSheet;
use crate::tuning;

/// Options recognised by [`SignalSource`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalOptions {
    /// Number of cached samples.
    pub num_points: usize,
    /// Frequency of the `a` pitch class in octave 0.
    pub base_frequency: f64,
    /// Multiplies every note duration.
    pub time_scale: f64,
    /// Amplitude of the additive uniform noise, relative to each note volume.
    pub noise_factor: f64,
    /// Multiplies every note volume.
    pub master_volume: f64,
    /// Seed of the noise generator.
    pub seed: u64,
}

impl Default for SignalOptions {
    fn default() -> Self {
        Self {
            num_points: 1000,
            base_frequency: 1.0,
            time_scale: 1.0,
            noise_factor: 0.0,
            master_volume: 1.0,
            seed: 0,
        }
    }
}

impl SignalOptions {
    fn validate(&self) -> Result<()> {
        ensure_nonzero("num_points", self.num_points)?;
        ensure_positive("base_frequency", self.base_frequency)?;
        ensure_positive("time_scale", self.time_scale)?;
        ensure_non_negative("noise_factor", self.noise_factor)?;
        ensure_non_negative("master_volume", self.master_volume)?;
        Ok(())
    }
}

/// Lowest and highest note frequency of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyRange {
    pub min: f64,
    pub max: f64,
}

impl FrequencyRange {
    /// Width of the range, `max - min`.
    pub fn diff(&self) -> f64 {
        self.max - self.min
    }
}

/// A note resolved to absolute time and frequency.
#[derive(Debug, Clone)]
struct ScheduledNote {
    duration: f64,
    frequency: Option<f64>, // None for rests
    volume: f64,
}

/// Synthetic music signal `f(x)`.
#[derive(Debug, Clone)]
pub struct SignalSource {
    sheet: MusicSheet,
    options: SignalOptions,
    tracks: Vec<Vec<ScheduledNote>>,
    track_durations: Vec<f64>,
    duration: f64,
    range: FrequencyRange,
    sampled: Vec<f64>,
    amp: f64,
}

impl SignalSource {
    /// Creates the signal and caches `options.num_points` samples.
    ///
    /// # Returns
    /// * `Ok(signal)` - The sampled signal
    /// * `Err(e)` - The sheet or the options are invalid
    pub fn new(sheet: MusicSheet, options: SignalOptions) -> Result<Self> {
        let mut signal = Self {
            sheet: MusicSheet::new(Vec::new()),
            options: SignalOptions::default(),
            tracks: Vec::new(),
            track_durations: Vec::new(),
            duration: 0.0,
            range: FrequencyRange { min: 0.0, max: 0.0 },
            sampled: Vec::new(),
            amp: 0.0,
        };
        signal.update(sheet, options)?;
        Ok(signal)
    }

    /// Replaces the sheet and options and recomputes every derived value.
    ///
    /// On error the signal is left unchanged.
    pub fn update(&mut self, sheet: MusicSheet, options: SignalOptions) -> Result<()> {
        sheet.validate()?;
        options.validate()?;

        let tracks: Vec<Vec<ScheduledNote>> = sheet
            .tracks
            .iter()
            .map(|track| {
                track
                    .notes
                    .iter()
                    .map(|note| ScheduledNote {
                        duration: note.duration * options.time_scale,
                        frequency: if note.is_rest() {
                            None
                        } else {
                            tuning::note_frequency(options.base_frequency, &note.name, note.octave)
                        },
                        volume: note.volume * options.master_volume,
                    })
                    .collect()
            })
            .collect();

        let track_durations: Vec<f64> = tracks
            .iter()
            .map(|notes| notes.iter().map(|n| n.duration).sum())
            .collect();
        let duration = track_durations.iter().cloned().fold(0.0, f64::max);

        // validate() guarantees at least one pitched note
        let range = tracks
            .iter()
            .flatten()
            .filter_map(|n| n.frequency)
            .fold(
                FrequencyRange {
                    min: f64::INFINITY,
                    max: f64::NEG_INFINITY,
                },
                |r, f| FrequencyRange {
                    min: r.min.min(f),
                    max: r.max.max(f),
                },
            );

        self.sheet = sheet;
        self.options = options;
        self.tracks = tracks;
        self.track_durations = track_durations;
        self.duration = duration;
        self.range = range;
        self.sampled = self.sample(self.options.num_points);
        self.amp = self.sampled.iter().fold(0.0f64, |m, v| m.max(v.abs()));

        debug!(
            "[SIGNAL] {} track(s), duration {:.3}, range [{:.3}, {:.3}], {} samples",
            self.tracks.len(),
            self.duration,
            self.range.min,
            self.range.max,
            self.sampled.len()
        );
        Ok(())
    }

    /// Gets the value of the signal `f(x)` for `x ∈ [0, 1]`.
    ///
    /// Each track that is still playing at `t = x · duration` contributes its
    /// active note, shaped by the note envelope. Outside `[0, 1)` the signal
    /// is silent.
    pub fn value_at(&self, x: f64) -> f64 {
        let time = x * self.duration;
        if !(time >= 0.0 && time < self.duration) {
            return 0.0;
        }

        let mut rng = Pcg32::seed_from_u64(self.options.seed ^ x.to_bits());
        let mut fx = 0.0;

        for (notes, &track_duration) in self.tracks.iter().zip(&self.track_durations) {
            if time >= track_duration {
                continue;
            }

            // Linear scan for the note playing at `time`
            let mut start = 0.0;
            let mut active = None;
            for note in notes {
                if time < start + note.duration {
                    active = Some(note);
                    break;
                }
                start += note.duration;
            }

            let Some(note) = active else { continue };
            let Some(freq) = note.frequency else { continue };
            if note.volume == 0.0 {
                continue;
            }

            let tone = (2.0 * PI * freq * time).sin();
            let noise = if self.options.noise_factor > 0.0 {
                self.options.noise_factor * rng.random::<f64>()
            } else {
                0.0
            };
            fx += envelope(time - start, note.duration) * note.volume * (tone + noise);
        }

        fx
    }

    /// Gets `n` evenly spaced samples of the signal over `[0, 1)`.
    ///
    /// The cached samples are borrowed when `n` matches the configured
    /// resolution. Any other resolution is computed on demand and not cached.
    pub fn get_sampled(&self, n: usize) -> Cow<'_, [f64]> {
        if n == self.sampled.len() {
            Cow::Borrowed(&self.sampled)
        } else {
            Cow::Owned(self.sample(n))
        }
    }

    fn sample(&self, n: usize) -> Vec<f64> {
        (0..n).map(|i| self.value_at(i as f64 / n as f64)).collect()
    }

    /// Total duration, that of the longest track.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Duration of every track, in sheet order.
    pub fn track_durations(&self) -> &[f64] {
        &self.track_durations
    }

    /// Lowest and highest frequency among the pitched notes.
    pub fn range(&self) -> FrequencyRange {
        self.range
    }

    /// Peak absolute value of the cached samples.
    pub fn amp(&self) -> f64 {
        self.amp
    }

    pub fn num_points(&self) -> usize {
        self.sampled.len()
    }

    pub fn sheet(&self) -> &MusicSheet {
        &self.sheet
    }

    pub fn options(&self) -> &SignalOptions {
        &self.options
    }
}

/// Note envelope `exp(-π · (2u - 1)^12)` with `u` the position inside the note.
///
/// Flat near 1 in the middle of the note, about `e^-π` at both edges.
fn envelope(offset: f64, duration: f64) -> f64 {
    let u = 2.0 * (offset / duration - 0.5);
    (-PI * u.powi(12)).exp()
}
