//! # Oscillation Basis Module
//!
//! Frequency axis mapping and the precomputed table of analysis kernels
//! `e^(-2πi·t·ω)` shared by the Gabor transform, the Fourier transform and
//! the synthesis.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;

use crate::complex::ComplexNumber;
use crate::signal::FrequencyRange;

/// Maps grid indices `j ∈ [0, N)` to absolute frequencies.
///
/// The analysed band is the note range widened by `padding` on both sides:
/// `ω(j) = (min - padding) + (j / N) · (max - min + 2 · padding)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyAxis {
    pub range: FrequencyRange,
    /// Absolute padding, in frequency units.
    pub padding: f64,
    pub num_points: usize,
}

impl FrequencyAxis {
    /// Builds the axis from a padding expressed as a fraction of the range.
    ///
    /// A single-pitch range has no width, so the fraction is taken of the
    /// pitch itself instead.
    pub fn new(range: FrequencyRange, padding_fraction: f64, num_points: usize) -> Self {
        let span = if range.diff() > 0.0 { range.diff() } else { range.max.abs() };
        Self {
            range,
            padding: padding_fraction * span,
            num_points,
        }
    }

    /// Lowest analysed frequency.
    pub fn low(&self) -> f64 {
        self.range.min - self.padding
    }

    /// Width of the analysed band.
    pub fn bandwidth(&self) -> f64 {
        self.range.diff() + 2.0 * self.padding
    }

    /// Frequency of grid index `j`.
    pub fn frequency(&self, j: usize) -> f64 {
        self.low() + (j as f64 / self.num_points as f64) * self.bandwidth()
    }
}

/// Table `basis[i][k] = e^(-2πi · t_i · ω(k · freq_rate))`.
///
/// Rows are time samples `t_i = i / N · duration`, columns the subsampled
/// frequency indices. Stored row-major.
#[derive(Debug, Clone)]
pub struct Basis {
    coefficients: Vec<ComplexNumber>,
    frequencies: Vec<f64>,
    num_points: usize,
}

impl Basis {
    /// Precomputes the table for `num_points` time samples of a signal
    /// lasting `duration`, keeping every `freq_rate`-th frequency of `axis`.
    pub fn new(axis: &FrequencyAxis, duration: f64, freq_rate: usize) -> Self {
        let num_points = axis.num_points;
        let frequencies: Vec<f64> = (0..num_points)
            .step_by(freq_rate.max(1))
            .map(|j| axis.frequency(j))
            .collect();
        Self::from_frequencies(num_points, duration, frequencies)
    }

    /// Precomputes the table for an explicit list of frequencies.
    pub fn from_frequencies(num_points: usize, duration: f64, frequencies: Vec<f64>) -> Self {
        let mut coefficients = Vec::with_capacity(num_points * frequencies.len());
        for i in 0..num_points {
            let time = i as f64 / num_points as f64 * duration;
            for &omega in &frequencies {
                coefficients.push(ComplexNumber::from_phase(-2.0 * PI * time * omega));
            }
        }

        debug!(
            "[BASIS] {} time samples x {} frequencies, band [{:.3}, {:.3}]",
            num_points,
            frequencies.len(),
            frequencies.first().copied().unwrap_or(0.0),
            frequencies.last().copied().unwrap_or(0.0)
        );

        Self {
            coefficients,
            frequencies,
            num_points,
        }
    }

    /// Kernel for time sample `t` and frequency column `k`.
    #[inline]
    pub fn at(&self, t: usize, k: usize) -> ComplexNumber {
        self.coefficients[t * self.frequencies.len() + k]
    }

    /// Kernels of time sample `t`, one per frequency column.
    pub fn row(&self, t: usize) -> &[ComplexNumber] {
        let cols = self.frequencies.len();
        &self.coefficients[t * cols..(t + 1) * cols]
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }

    pub fn num_frequencies(&self) -> usize {
        self.frequencies.len()
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Direct Fourier sum `Σ_t basis[t][k] · samples[t] · dt`.
    pub fn fourier(&self, samples: &[f64], k: usize, dt: f64) -> ComplexNumber {
        let mut sum = ComplexNumber::ZERO;
        for (t, &f) in samples.iter().enumerate().take(self.num_points) {
            sum += self.at(t, k).scale(f * dt);
        }
        sum
    }
}
