//! # Window Function Module
//!
//! This module provides the Gaussian window `g(x)` used to localise the
//! Gabor transform in time.
//!
//! The window is sampled at `2N` points over `x ∈ [-2, 2)`, twice the width
//! of the signal, so a window centred at any shift `s ∈ [0, N]` can be read as
//! `sampled[N + i - s]` for `i ∈ [0, N)` without bounds checks.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::error::{Result, ensure_nonzero, ensure_positive};

/// Options recognised by [`WindowFunction`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowOptions {
    /// Resolution `N`; the cache holds `2N` samples.
    pub num_points: usize,
    /// Multiplies `x` before the Gaussian is applied.
    pub scale: f64,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            num_points: 1000,
            scale: 1.0,
        }
    }
}

/// Gaussian window `g(x) = exp(-(x · scale)² / (2σ²))`.
#[derive(Debug, Clone)]
pub struct WindowFunction {
    sigma: f64,
    options: WindowOptions,
    sampled: Vec<f64>,
}

impl WindowFunction {
    pub fn new(sigma: f64, options: WindowOptions) -> Result<Self> {
        let mut window = Self {
            sigma: 1.0,
            options: WindowOptions::default(),
            sampled: Vec::new(),
        };
        window.update(sigma, options)?;
        Ok(window)
    }

    /// Replaces the spread and options and resamples the window.
    pub fn update(&mut self, sigma: f64, options: WindowOptions) -> Result<()> {
        ensure_positive("sigma", sigma)?;
        ensure_positive("window scale", options.scale)?;
        ensure_nonzero("window num_points", options.num_points)?;

        self.sigma = sigma;
        self.options = options;
        self.sampled = self.sample(self.options.num_points);
        Ok(())
    }

    /// Gets the value of the window `g(x)`.
    pub fn value_at(&self, x: f64) -> f64 {
        let c = -1.0 / (2.0 * self.sigma * self.sigma);
        let u = x * self.options.scale;
        (c * u * u).exp()
    }

    /// Gets `2n` samples of the window over `[-2, 2)`.
    ///
    /// Sample `n` is the centre of the window. The cached samples are
    /// borrowed when `n` matches the configured resolution.
    pub fn get_sampled(&self, n: usize) -> Cow<'_, [f64]> {
        if n == self.options.num_points {
            Cow::Borrowed(&self.sampled)
        } else {
            Cow::Owned(self.sample(n))
        }
    }

    fn sample(&self, n: usize) -> Vec<f64> {
        (0..2 * n)
            .map(|i| self.value_at(-2.0 + 2.0 * i as f64 / n as f64))
            .collect()
    }

    pub fn num_points(&self) -> usize {
        self.options.num_points
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn options(&self) -> &WindowOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GaborError;

    fn window(sigma: f64, n: usize) -> WindowFunction {
        WindowFunction::new(
            sigma,
            WindowOptions {
                num_points: n,
                ..WindowOptions::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn samples_double_width_domain() {
        let g = window(0.5, 100);
        let sampled = g.get_sampled(100);
        assert_eq!(sampled.len(), 200);
        // Centre of the window
        assert!((sampled[100] - 1.0).abs() < 1e-12);
        assert!((sampled[0] - g.value_at(-2.0)).abs() < 1e-12);
    }

    #[test]
    fn is_symmetric_around_zero() {
        let g = window(0.3, 64);
        for k in 1..64 {
            let x = k as f64 / 32.0;
            assert!((g.value_at(x) - g.value_at(-x)).abs() < 1e-12);
        }
        let sampled = g.get_sampled(64);
        for k in 1..64 {
            assert!((sampled[64 + k] - sampled[64 - k]).abs() < 1e-12);
        }
    }

    #[test]
    fn sigma_is_the_standard_deviation() {
        let g = window(0.5, 10);
        assert!((g.value_at(0.5) - (-0.5f64).exp()).abs() < 1e-12);

        let scaled = WindowFunction::new(
            0.5,
            WindowOptions {
                num_points: 10,
                scale: 2.0,
            },
        )
        .unwrap();
        assert!((scaled.value_at(0.25) - g.value_at(0.5)).abs() < 1e-12);
    }

    #[test]
    fn shifted_lookups_stay_in_range() {
        let n = 32;
        let g = window(0.2, n);
        let sampled = g.get_sampled(n);
        for shift in 0..=n {
            for i in 0..n {
                assert!(sampled.get(n + i - shift).is_some());
            }
        }
    }

    #[test]
    fn rejects_degenerate_spread() {
        assert_eq!(
            WindowFunction::new(0.0, WindowOptions::default()).unwrap_err(),
            GaborError::InvalidParameter {
                name: "sigma",
                value: 0.0
            }
        );
        assert!(WindowFunction::new(f64::NAN, WindowOptions::default()).is_err());
    }
}
