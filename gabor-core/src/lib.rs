// gabor-core/src/lib.rs

//! The core logic for the Gabor transform workbench.
//! This crate synthesises a music-like signal from note tracks, computes its
//! Gabor (short-time Fourier) and Fourier transforms by direct summation,
//! derives an editable spectrogram and resynthesises the signal from it.
//! It is completely headless and contains no rendering code.

pub mod basis;
pub mod complex;
pub mod error;
pub mod sheet;
pub mod signal;
pub mod spectrogram;
pub mod transform;
pub mod tuning;
pub mod window;

pub use complex::ComplexNumber;
pub use error::{GaborError, Result};
pub use sheet::{MusicSheet, Note, Track};
pub use signal::{FrequencyRange, SignalOptions, SignalSource};
pub use spectrogram::{ScaledSpectrogram, SpectrumSelection};
pub use transform::{GaborPair, TransformEngine, TransformOptions};
pub use window::{WindowFunction, WindowOptions};
