//! # Report Module
//!
//! JSON output of one workbench run.

use serde::Serialize;

use gabor_core::{FrequencyRange, ScaledSpectrogram, TransformEngine};

/// Everything a plotting front end needs from one engine run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub duration: f64,
    pub range: FrequencyRange,
    pub padding: f64,
    pub num_points: usize,
    pub time_rate: usize,
    pub freq_rate: usize,
    pub use_two_windows: bool,
    pub is_processed: bool,
    /// Time of each spectrogram row.
    pub times: Vec<f64>,
    /// Frequency of each spectrogram column.
    pub frequencies: Vec<f64>,
    pub spectrogram: ScaledSpectrogram,
    /// Fourier magnitude of each column.
    pub fourier: Vec<f64>,
    pub signal: Vec<f64>,
    pub synthesized: Vec<f64>,
}

impl Report {
    pub fn from_engine(engine: &TransformEngine) -> Self {
        let spectrogram = engine.scaled_spectrogram();
        let times = (0..spectrogram.values.len())
            .map(|row| engine.time_at(row))
            .collect();
        let synthesized = engine.synthesize_with_scale(spectrogram.max_magnitude);

        Self {
            duration: engine.signal_duration(),
            range: engine.range(),
            padding: engine.padding(),
            num_points: engine.num_points(),
            time_rate: engine.time_rate(),
            freq_rate: engine.freq_rate(),
            use_two_windows: engine.use_two_windows(),
            is_processed: engine.is_processed(),
            times,
            frequencies: engine.frequencies().to_vec(),
            fourier: engine.fourier_transform().iter().map(|c| c.abs()).collect(),
            signal: engine.sampled_signal().to_vec(),
            synthesized,
            spectrogram,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkbenchConfig;

    #[test]
    fn report_axes_match_the_grid() {
        let mut config = WorkbenchConfig::default();
        config.signal.num_points = 60;
        config.transform.num_points = 60;
        let engine = config.build().unwrap();

        let report = Report::from_engine(&engine);
        assert_eq!(report.times.len(), report.spectrogram.values.len());
        assert_eq!(report.frequencies.len(), report.spectrogram.values[0].len());
        assert_eq!(report.fourier.len(), report.frequencies.len());
        assert_eq!(report.synthesized.len(), 60);
        assert_eq!(report.times[0], 0.0);

        let json = serde_json::to_value(&report).unwrap();
        assert!(json["spectrogram"]["max_magnitude"].as_f64().unwrap() > 0.0);
    }
}
