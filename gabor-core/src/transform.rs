//! # Gabor Transform Module
//!
//! This module provides the transform engine: a direct (non-FFT) discrete
//! Gabor transform of a [`SignalSource`] with one or two Gaussian windows,
//! the plain Fourier transform, the spectrogram derived from them, region
//! cuts, and the inverse synthesis back to the time domain.
//!
//! ## Pipeline
//! 1. The signal and windows are sampled at the engine resolution `N`
//! 2. A table of kernels `e^(-2πi·t·ω)` is precomputed ([`Basis`])
//! 3. The Gabor coefficients are computed on the subsampled grid
//! 4. Queries normalise, denoise and invert the stored coefficients
//!
//! The spectrogram costs `O(N³ / (time_rate · freq_rate))`, which is what the
//! subsampling rates trade against resolution.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::basis::{Basis, FrequencyAxis};
use crate::complex::ComplexNumber;
use crate::error::{GaborError, Result, ensure_non_negative, ensure_nonzero};
use crate::signal::{FrequencyRange, SignalSource};
use crate::spectrogram::{
    self, CutRegion, ScaledSpectrogram, Spectrogram, SpectrogramGrid, SpectrumSelection,
};
use crate::window::WindowFunction;

/// Options recognised by [`TransformEngine`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Second window for the cross-window spectrogram.
    #[serde(skip)]
    pub window2: Option<Arc<WindowFunction>>,
    /// Time resolution `N`, also the number of frequency indices.
    pub num_points: usize,
    /// Band padding, as a fraction of the note range.
    pub padding: f64,
    /// Keep every `time_rate`-th time index in the grid.
    pub time_rate: usize,
    /// Keep every `freq_rate`-th frequency index in the grid.
    pub freq_rate: usize,
    /// Use `Vgf2 · Vgf1` instead of `Vgf1`. Needs `window2`.
    pub use_two_windows: bool,
    /// Normalised magnitude under which cells are dropped, in `[0, 1]`.
    pub denoise_factor: f64,
    /// Apply denoising to the scaled spectrogram and the synthesis.
    pub is_processed: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            window2: None,
            num_points: 400,
            padding: 0.1,
            time_rate: 1,
            freq_rate: 1,
            use_two_windows: false,
            denoise_factor: 0.1,
            is_processed: false,
        }
    }
}

impl TransformOptions {
    fn validate(&self) -> Result<()> {
        ensure_nonzero("num_points", self.num_points)?;
        ensure_nonzero("time_rate", self.time_rate)?;
        ensure_nonzero("freq_rate", self.freq_rate)?;
        ensure_non_negative("padding", self.padding)?;
        validate_denoise_factor(self.denoise_factor)
    }
}

fn validate_denoise_factor(value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(GaborError::InvalidParameter {
            name: "denoise_factor",
            value,
        })
    }
}

/// Gabor coefficients of one grid point for both windows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GaborPair {
    pub vgf1: ComplexNumber,
    pub vgf2: ComplexNumber,
}

impl GaborPair {
    /// Cross-window value `Vgf2 · Vgf1`.
    pub fn cross(&self) -> ComplexNumber {
        self.vgf2.multiply(self.vgf1)
    }
}

/// Gabor/Fourier transform engine.
///
/// The signal and windows are shared with the caller; the sampled copies,
/// the basis and the spectrogram belong to the engine.
#[derive(Debug, Clone)]
pub struct TransformEngine {
    signal: Arc<SignalSource>,
    window1: Arc<WindowFunction>,
    window2: Arc<WindowFunction>,
    has_second_window: bool,
    options: TransformOptions,

    signal_duration: f64,
    axis: FrequencyAxis,
    dt: f64,

    sampled_signal: Vec<f64>,
    sampled_window1: Vec<f64>,
    sampled_window2: Vec<f64>,
    basis: Basis,
    spectrogram: Spectrogram,
}

impl TransformEngine {
    /// Samples the inputs, precomputes the basis and computes the spectrogram.
    ///
    /// # Returns
    /// * `Ok(engine)` - Engine with a freshly computed spectrogram
    /// * `Err(e)` - The options are invalid (zero rates, zero resolution,
    ///   negative padding, denoise factor outside `[0, 1]`)
    pub fn new(
        signal: Arc<SignalSource>,
        window1: Arc<WindowFunction>,
        mut options: TransformOptions,
    ) -> Result<Self> {
        options.validate()?;

        let n = options.num_points;
        let has_second_window = options.window2.is_some();
        if options.use_two_windows && !has_second_window {
            warn!("[TRANSFORM] two windows requested without a second window, using one");
            options.use_two_windows = false;
        }
        let window2 = options.window2.clone().unwrap_or_else(|| Arc::clone(&window1));

        let signal_duration = signal.duration();
        let axis = FrequencyAxis::new(signal.range(), options.padding, n);
        let sampled_signal = signal.get_sampled(n).into_owned();
        let sampled_window1 = window1.get_sampled(n).into_owned();
        let sampled_window2 = window2.get_sampled(n).into_owned();
        let basis = Basis::new(&axis, signal_duration, options.freq_rate);

        let mut engine = Self {
            signal,
            window1,
            window2,
            has_second_window,
            options,
            signal_duration,
            axis,
            dt: signal_duration / n as f64,
            sampled_signal,
            sampled_window1,
            sampled_window2,
            basis,
            spectrogram: Spectrogram::zeros(0, 0),
        };
        engine.update_spectrogram();
        Ok(engine)
    }

    /// Reconfigures the engine from scratch, discarding every cut.
    ///
    /// On error the engine is left unchanged.
    pub fn update(
        &mut self,
        signal: Arc<SignalSource>,
        window1: Arc<WindowFunction>,
        options: TransformOptions,
    ) -> Result<()> {
        *self = Self::new(signal, window1, options)?;
        Ok(())
    }

    /// Recomputes both coefficient grids at every subsampled grid point.
    fn update_spectrogram(&mut self) {
        let start = Instant::now();
        let n = self.options.num_points;
        let rows = n.div_ceil(self.options.time_rate);
        let cols = self.basis.num_frequencies();

        let mut spectrogram = Spectrogram::zeros(rows, cols);
        for r in 0..rows {
            let x = r * self.options.time_rate;
            for k in 0..cols {
                let pair = self.gabor_pair(x, k);
                spectrogram.single.set(r, k, pair.vgf1);
                spectrogram.cross.set(r, k, pair.cross());
            }
        }
        self.spectrogram = spectrogram;

        info!(
            "[SPECTROGRAM] {}x{} grid (N={}, rates {}/{}) in {:.1?}",
            rows,
            cols,
            n,
            self.options.time_rate,
            self.options.freq_rate,
            start.elapsed()
        );
    }

    /// Gabor coefficients at time index `x ∈ [0, N]` and frequency column `k`.
    ///
    /// `Vgf(x, k) = Σ_t basis[t][k] · f[t] · g[N + t - x] · dt`
    fn gabor_pair(&self, x: usize, k: usize) -> GaborPair {
        let n = self.options.num_points;
        let shared = Arc::ptr_eq(&self.window1, &self.window2);
        let mut vgf1 = ComplexNumber::ZERO;
        let mut vgf2 = ComplexNumber::ZERO;

        for t in 0..n {
            let c = self.basis.at(t, k).scale(self.sampled_signal[t] * self.dt);
            vgf1 += c.scale(self.sampled_window1[n + t - x]);
            if !shared {
                vgf2 += c.scale(self.sampled_window2[n + t - x]);
            }
        }

        if shared {
            vgf2 = vgf1;
        }
        GaborPair { vgf1, vgf2 }
    }

    /// Computes the Gabor transform at time index `time_index` and frequency
    /// column `freq_column` (a frequency index divided by `freq_rate`).
    ///
    /// Both windows are evaluated in the same pass. Without a second window
    /// `vgf2` equals `vgf1`.
    pub fn gabor_at(&self, time_index: usize, freq_column: usize) -> Result<GaborPair> {
        self.check_time(time_index)?;
        self.check_column(freq_column)?;
        Ok(self.gabor_pair(time_index, freq_column))
    }

    /// Computes the plain Fourier transform `F(k) = Σ_t basis[t][k] · f[t] · dt`.
    pub fn fourier_at(&self, freq_column: usize) -> Result<ComplexNumber> {
        self.check_column(freq_column)?;
        Ok(self.basis.fourier(&self.sampled_signal, freq_column, self.dt))
    }

    /// Fourier transform at every frequency column.
    pub fn fourier_transform(&self) -> Vec<ComplexNumber> {
        (0..self.basis.num_frequencies())
            .map(|k| self.basis.fourier(&self.sampled_signal, k, self.dt))
            .collect()
    }

    fn check_time(&self, index: usize) -> Result<()> {
        let len = self.options.num_points;
        if index < len {
            Ok(())
        } else {
            Err(GaborError::IndexOutOfRange {
                axis: "time",
                index,
                len,
            })
        }
    }

    fn check_column(&self, index: usize) -> Result<()> {
        let len = self.basis.num_frequencies();
        if index < len {
            Ok(())
        } else {
            Err(GaborError::IndexOutOfRange {
                axis: "frequency",
                index,
                len,
            })
        }
    }

    fn selection(&self) -> SpectrumSelection {
        SpectrumSelection::from_flag(self.options.use_two_windows)
    }

    /// Coefficient grid currently used for display and synthesis.
    pub fn gabor_transform(&self) -> &SpectrogramGrid {
        self.spectrogram.select(self.selection())
    }

    /// Spectrogram normalised to `[0, 1]`, indexed `[time row][frequency column]`.
    ///
    /// The maximum is taken from the current coefficients, so cuts are
    /// reflected on the next call. In processed mode values below the
    /// denoise factor are zeroed.
    pub fn scaled_spectrogram(&self) -> ScaledSpectrogram {
        let denoise = self.options.is_processed.then_some(self.options.denoise_factor);
        spectrogram::scale(self.gabor_transform(), denoise)
    }

    /// Zeroes the region `[t1, t2) × [ω1, ω2)` of both coefficient grids.
    ///
    /// Bounds are fractions of the time and frequency axes. The edit is
    /// destructive and only undone by [`TransformEngine::update`] or a rate
    /// change.
    pub fn cut_spectrogram(&mut self, t1: f64, t2: f64, omega1: f64, omega2: f64) -> Result<()> {
        let region = CutRegion::from_fractions(t1, t2, omega1, omega2, self.options.num_points)?;
        debug!(
            "[SPECTROGRAM] cut time {:?} x frequency {:?}",
            region.time, region.frequency
        );
        self.spectrogram
            .cut(&region, self.options.time_rate, self.options.freq_rate);
        Ok(())
    }

    /// Reconstructs the time-domain signal from the current spectrogram.
    ///
    /// The normalisation maximum is taken from the current coefficients.
    pub fn synthesize_signal(&self) -> Vec<f64> {
        self.synthesize_with_scale(self.gabor_transform().max_magnitude())
    }

    /// Reconstructs the time-domain signal, testing denoising against
    /// `max_magnitude`.
    ///
    /// `f[t] = Re(Σ_k conj(basis[t][k]) · S[t / time_rate][k]) / (N / freq_rate)`
    pub fn synthesize_with_scale(&self, max_magnitude: f64) -> Vec<f64> {
        let n = self.options.num_points;
        let grid = self.gabor_transform();
        let norm = n as f64 / self.options.freq_rate as f64;
        let processed = self.options.is_processed;
        let threshold = self.options.denoise_factor;

        (0..n)
            .map(|t| {
                let row = grid.row(t / self.options.time_rate);
                let mut sum = ComplexNumber::ZERO;
                for (&b, &s) in self.basis.row(t).iter().zip(row) {
                    if processed && spectrogram::is_noise(s, max_magnitude, threshold) {
                        continue;
                    }
                    sum += b.conj().multiply(s);
                }
                sum.real() / norm
            })
            .collect()
    }

    /// Signal multiplied by the first window centred at `position ∈ [0, 1]`.
    pub fn windowed_signal(&self, position: f64) -> Vec<f64> {
        let n = self.options.num_points;
        let position = if position.is_finite() { position.clamp(0.0, 1.0) } else { 0.0 };
        let shift = (position * n as f64).round() as usize;
        self.sampled_signal
            .iter()
            .enumerate()
            .map(|(i, &f)| f * self.sampled_window1[n + i - shift])
            .collect()
    }

    /// Selects the cross-window spectrogram.
    ///
    /// Both grids are always kept up to date, so switching does not
    /// recompute anything. Ignored without a second window.
    pub fn set_use_two_windows(&mut self, use_two_windows: bool) {
        if use_two_windows && !self.has_second_window {
            warn!("[TRANSFORM] no second window configured, keeping a single window");
            return;
        }
        self.options.use_two_windows = use_two_windows;
    }

    /// Enables denoising of the scaled spectrogram and the synthesis.
    pub fn set_processed_synthesis(&mut self, is_processed: bool) {
        self.options.is_processed = is_processed;
    }

    pub fn set_denoise_factor(&mut self, denoise_factor: f64) -> Result<()> {
        validate_denoise_factor(denoise_factor)?;
        self.options.denoise_factor = denoise_factor;
        Ok(())
    }

    /// Changes the frequency subsampling, rebuilding the basis and the
    /// spectrogram. Cuts are discarded.
    pub fn set_freq_rate(&mut self, freq_rate: usize) -> Result<()> {
        ensure_nonzero("freq_rate", freq_rate)?;
        if freq_rate != self.options.freq_rate {
            self.options.freq_rate = freq_rate;
            self.basis = Basis::new(&self.axis, self.signal_duration, freq_rate);
            self.update_spectrogram();
        }
        Ok(())
    }

    /// Changes the time subsampling, rebuilding the spectrogram. Cuts are
    /// discarded.
    pub fn set_time_rate(&mut self, time_rate: usize) -> Result<()> {
        ensure_nonzero("time_rate", time_rate)?;
        if time_rate != self.options.time_rate {
            self.options.time_rate = time_rate;
            self.update_spectrogram();
        }
        Ok(())
    }

    pub fn num_points(&self) -> usize {
        self.options.num_points
    }

    pub fn time_rate(&self) -> usize {
        self.options.time_rate
    }

    pub fn freq_rate(&self) -> usize {
        self.options.freq_rate
    }

    pub fn signal(&self) -> &Arc<SignalSource> {
        &self.signal
    }

    pub fn window1(&self) -> &Arc<WindowFunction> {
        &self.window1
    }

    pub fn window2(&self) -> &Arc<WindowFunction> {
        &self.window2
    }

    /// Absolute padding of the frequency band.
    pub fn padding(&self) -> f64 {
        self.axis.padding
    }

    pub fn range(&self) -> FrequencyRange {
        self.axis.range
    }

    pub fn range_diff(&self) -> f64 {
        self.axis.range.diff()
    }

    pub fn signal_duration(&self) -> f64 {
        self.signal_duration
    }

    pub fn frequency_axis(&self) -> &FrequencyAxis {
        &self.axis
    }

    /// Frequency of every grid column.
    pub fn frequencies(&self) -> &[f64] {
        self.basis.frequencies()
    }

    pub fn frequency_at(&self, freq_column: usize) -> Option<f64> {
        self.basis.frequencies().get(freq_column).copied()
    }

    /// Time of grid row `row`.
    pub fn time_at(&self, row: usize) -> f64 {
        (row * self.options.time_rate) as f64 / self.options.num_points as f64
            * self.signal_duration
    }

    pub fn use_two_windows(&self) -> bool {
        self.options.use_two_windows
    }

    pub fn is_processed(&self) -> bool {
        self.options.is_processed
    }

    pub fn denoise_factor(&self) -> f64 {
        self.options.denoise_factor
    }

    pub fn sampled_signal(&self) -> &[f64] {
        &self.sampled_signal
    }

    pub fn spectrogram(&self) -> &Spectrogram {
        &self.spectrogram
    }
}
