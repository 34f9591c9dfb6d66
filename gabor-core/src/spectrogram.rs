//! # Spectrogram Module
//!
//! Storage and post-processing of the Gabor coefficients computed on the
//! subsampled time × frequency grid.
//!
//! ## Features
//! - Single-window and cross-window (`Vgf2 · Vgf1`) coefficient grids
//! - Magnitude normalisation to `[0, 1]` with optional hard-threshold denoising
//! - Destructive rectangular cuts

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::complex::ComplexNumber;
use crate::error::{GaborError, Result};

/// Which coefficient grid feeds the scaled spectrogram and the synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpectrumSelection {
    /// `Vgf1`, the transform with the first window
    SingleWindow,
    /// `Vgf2 · Vgf1`, the complex product of both transforms
    TwoWindows,
}

impl SpectrumSelection {
    pub fn from_flag(use_two_windows: bool) -> Self {
        if use_two_windows {
            SpectrumSelection::TwoWindows
        } else {
            SpectrumSelection::SingleWindow
        }
    }
}

/// Row-major grid of complex coefficients, rows are time, columns frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrogramGrid {
    rows: usize,
    cols: usize,
    cells: Vec<ComplexNumber>,
}

impl SpectrogramGrid {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![ComplexNumber::ZERO; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> ComplexNumber {
        self.cells[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: ComplexNumber) {
        self.cells[row * self.cols + col] = value;
    }

    pub fn row(&self, row: usize) -> &[ComplexNumber] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    /// Largest magnitude of the grid, 0 for an empty or silent grid.
    pub fn max_magnitude(&self) -> f64 {
        self.cells.iter().fold(0.0f64, |m, c| m.max(c.abs()))
    }

    /// Complex values as nested rows.
    pub fn to_rows(&self) -> Vec<Vec<ComplexNumber>> {
        self.cells.chunks(self.cols.max(1)).map(|r| r.to_vec()).collect()
    }
}

/// Both coefficient grids of a transform, filled in the same pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram {
    pub single: SpectrogramGrid,
    pub cross: SpectrogramGrid,
}

impl Spectrogram {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            single: SpectrogramGrid::zeros(rows, cols),
            cross: SpectrogramGrid::zeros(rows, cols),
        }
    }

    pub fn select(&self, selection: SpectrumSelection) -> &SpectrogramGrid {
        match selection {
            SpectrumSelection::SingleWindow => &self.single,
            SpectrumSelection::TwoWindows => &self.cross,
        }
    }

    /// Zeroes the cells of both grids covered by `region`.
    ///
    /// Only grid points are considered: row `r` stands for time index
    /// `r · time_rate` and column `c` for frequency index `c · freq_rate`.
    pub fn cut(&mut self, region: &CutRegion, time_rate: usize, freq_rate: usize) {
        let rows = grid_points(&region.time, time_rate, self.single.rows());
        let cols = grid_points(&region.frequency, freq_rate, self.single.cols());

        for r in rows {
            for c in cols.clone() {
                self.single.set(r, c, ComplexNumber::ZERO);
                self.cross.set(r, c, ComplexNumber::ZERO);
            }
        }
    }
}

/// Grid positions whose index (`position · rate`) lies inside `range`.
fn grid_points(range: &Range<usize>, rate: usize, len: usize) -> Range<usize> {
    let first = range.start.div_ceil(rate);
    let end = range.end.div_ceil(rate).min(len);
    first.min(end)..end
}

/// Normalised magnitudes of a coefficient grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaledSpectrogram {
    /// Values in `[0, 1]`, indexed `[time row][frequency column]`.
    pub values: Vec<Vec<f64>>,
    /// Magnitude that maps to 1.
    pub max_magnitude: f64,
}

impl ScaledSpectrogram {
    /// Largest normalised value, 1 unless the grid is silent.
    pub fn peak(&self) -> f64 {
        self.values.iter().flatten().cloned().fold(0.0, f64::max)
    }
}

/// Normalises `magnitude` by `max`, treating a silent grid as all zeros.
pub fn normalize(magnitude: f64, max: f64) -> f64 {
    if max > 0.0 { magnitude / max } else { 0.0 }
}

/// Whether a cell is removed by denoising.
pub fn is_noise(value: ComplexNumber, max: f64, denoise_factor: f64) -> bool {
    normalize(value.abs(), max) < denoise_factor
}

/// Scales a grid to `[0, 1]`.
///
/// With `denoise_factor`, normalised values below it are set to zero.
pub fn scale(grid: &SpectrogramGrid, denoise_factor: Option<f64>) -> ScaledSpectrogram {
    let max_magnitude = grid.max_magnitude();
    let values = (0..grid.rows())
        .map(|r| {
            grid.row(r)
                .iter()
                .map(|c| {
                    let v = normalize(c.abs(), max_magnitude);
                    match denoise_factor {
                        Some(threshold) if v < threshold => 0.0,
                        _ => v,
                    }
                })
                .collect()
        })
        .collect();

    ScaledSpectrogram {
        values,
        max_magnitude,
    }
}

/// Rectangle of time and frequency indices, both in `[0, N]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutRegion {
    pub time: Range<usize>,
    pub frequency: Range<usize>,
}

impl CutRegion {
    /// Converts fractions of the axes into index ranges.
    ///
    /// Fractions are clamped to `[0, 1]` and each pair is ordered, so
    /// `(0.6, 0.2)` selects the same indices as `(0.2, 0.6)`.
    ///
    /// # Returns
    /// * `Ok(region)` - `[round(t1·N), round(t2·N)) × [round(ω1·N), round(ω2·N))`
    /// * `Err(e)` - One of the fractions is not finite
    pub fn from_fractions(t1: f64, t2: f64, w1: f64, w2: f64, num_points: usize) -> Result<Self> {
        for (name, value) in [("t1", t1), ("t2", t2), ("omega1", w1), ("omega2", w2)] {
            if !value.is_finite() {
                return Err(GaborError::InvalidParameter { name, value });
            }
        }

        let to_index = |f: f64| (f.clamp(0.0, 1.0) * num_points as f64).round() as usize;
        let span = |a: f64, b: f64| {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            to_index(lo)..to_index(hi)
        };

        Ok(Self {
            time: span(t1, t2),
            frequency: span(w1, w2),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(rows: usize, cols: usize) -> Spectrogram {
        let mut spec = Spectrogram::zeros(rows, cols);
        for r in 0..rows {
            for c in 0..cols {
                let v = ComplexNumber::new((r + 1) as f64, c as f64);
                spec.single.set(r, c, v);
                spec.cross.set(r, c, v.multiply(v));
            }
        }
        spec
    }

    #[test]
    fn scaling_maps_peak_to_one() {
        let spec = filled(4, 3);
        let scaled = scale(&spec.single, None);
        assert_eq!(scaled.values.len(), 4);
        assert_eq!(scaled.values[0].len(), 3);
        assert!((scaled.peak() - 1.0).abs() < 1e-12);
        assert!(scaled.values.iter().flatten().all(|v| (0.0..=1.0).contains(v)));
        assert!((scaled.max_magnitude - ComplexNumber::new(4.0, 2.0).abs()).abs() < 1e-12);
    }

    #[test]
    fn silent_grid_scales_to_zero() {
        let grid = SpectrogramGrid::zeros(3, 3);
        let scaled = scale(&grid, Some(0.1));
        assert_eq!(scaled.max_magnitude, 0.0);
        assert!(scaled.values.iter().flatten().all(|&v| v == 0.0));
        assert!(scaled.values.iter().flatten().all(|v| !v.is_nan()));
    }

    #[test]
    fn denoising_applies_hard_threshold() {
        let mut grid = SpectrogramGrid::zeros(1, 3);
        grid.set(0, 0, ComplexNumber::new(10.0, 0.0));
        grid.set(0, 1, ComplexNumber::new(0.5, 0.0));
        grid.set(0, 2, ComplexNumber::new(2.0, 0.0));
        let scaled = scale(&grid, Some(0.1));
        assert_eq!(scaled.values[0], vec![1.0, 0.0, 0.2]);
        assert!(is_noise(grid.get(0, 1), 10.0, 0.1));
        assert!(!is_noise(grid.get(0, 2), 10.0, 0.1));
    }

    #[test]
    fn region_from_fractions() {
        let region = CutRegion::from_fractions(0.5, 0.25, -1.0, 2.0, 100).unwrap();
        assert_eq!(region.time, 25..50);
        assert_eq!(region.frequency, 0..100);
        assert!(CutRegion::from_fractions(f64::NAN, 0.5, 0.0, 1.0, 100).is_err());
    }

    #[test]
    fn cut_zeroes_only_grid_points_inside() {
        let mut spec = filled(5, 5);
        let before = spec.clone();
        // Time indices [3, 7) with rate 2 cover rows 2 and 3
        let region = CutRegion {
            time: 3..7,
            frequency: 0..4,
        };
        spec.cut(&region, 2, 2);

        for r in 0..5 {
            for c in 0..5 {
                let inside = (2..4).contains(&r) && (0..2).contains(&c);
                if inside {
                    assert!(spec.single.get(r, c).is_zero());
                    assert!(spec.cross.get(r, c).is_zero());
                } else {
                    assert_eq!(spec.single.get(r, c), before.single.get(r, c));
                    assert_eq!(spec.cross.get(r, c), before.cross.get(r, c));
                }
            }
        }
    }

    #[test]
    fn cut_is_idempotent() {
        let region = CutRegion::from_fractions(0.2, 0.6, 0.1, 0.9, 10).unwrap();
        let mut once = filled(10, 10);
        once.cut(&region, 1, 1);
        let mut twice = once.clone();
        twice.cut(&region, 1, 1);
        assert_eq!(once, twice);
    }

    #[test]
    fn selection_follows_flag() {
        let spec = filled(2, 2);
        assert_eq!(spec.select(SpectrumSelection::from_flag(false)), &spec.single);
        assert_eq!(spec.select(SpectrumSelection::from_flag(true)), &spec.cross);
    }
}
