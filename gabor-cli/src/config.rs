//! # Workbench Configuration
//!
//! JSON description of a complete run: the music sheet, the signal options,
//! the window spreads and the transform options. Every field is optional;
//! the defaults reproduce the classic workbench page.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use gabor_core::{
    MusicSheet, SignalOptions, SignalSource, TransformEngine, TransformOptions, WindowFunction,
    WindowOptions,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbenchConfig {
    pub sheet: MusicSheet,
    pub signal: SignalOptions,
    /// Spread of the first window.
    pub sigma1: f64,
    /// Spread of the second window, `None` for a single window.
    pub sigma2: Option<f64>,
    pub transform: TransformOptions,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            sheet: MusicSheet::default(),
            signal: SignalOptions {
                num_points: 1200,
                time_scale: 20.0,
                ..SignalOptions::default()
            },
            sigma1: 0.5,
            sigma2: Some(1.0),
            transform: TransformOptions {
                num_points: 1200,
                padding: 0.2,
                time_rate: 5,
                freq_rate: 15,
                ..TransformOptions::default()
            },
        }
    }
}

impl WorkbenchConfig {
    /// Reads a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Builds the signal, the windows and the engine.
    ///
    /// Windows are sampled at the signal resolution and scaled by the
    /// signal time scale.
    pub fn build(&self) -> gabor_core::Result<TransformEngine> {
        let signal = Arc::new(SignalSource::new(self.sheet.clone(), self.signal.clone())?);

        let window_options = WindowOptions {
            num_points: self.signal.num_points,
            scale: self.signal.time_scale,
        };
        let window1 = Arc::new(WindowFunction::new(self.sigma1, window_options.clone())?);
        let window2 = self
            .sigma2
            .map(|sigma| WindowFunction::new(sigma, window_options).map(Arc::new))
            .transpose()?;

        let options = TransformOptions {
            window2,
            ..self.transform.clone()
        };
        TransformEngine::new(signal, window1, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let json = r#"{
            "sheet": [[{"name": "a", "octave": 1, "duration": 1.0}]],
            "transform": {"num_points": 64, "time_rate": 2}
        }"#;
        let config: WorkbenchConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.sheet.tracks.len(), 1);
        assert_eq!(config.sigma1, 0.5);
        assert_eq!(config.signal.time_scale, 20.0);
        assert_eq!(config.transform.num_points, 64);
        assert_eq!(config.transform.time_rate, 2);
        assert_eq!(config.transform.freq_rate, 1);
    }

    #[test]
    fn builds_a_two_window_engine() {
        let mut config = WorkbenchConfig::default();
        config.signal.num_points = 64;
        config.transform.num_points = 64;
        config.transform.use_two_windows = true;

        let engine = config.build().unwrap();
        assert!(engine.use_two_windows());
        assert_eq!(engine.num_points(), 64);
        assert_eq!(engine.frequencies().len(), 64usize.div_ceil(15));
        assert_eq!(engine.window2().sigma(), 1.0);
    }

    #[test]
    fn invalid_sheet_is_reported() {
        let config = WorkbenchConfig {
            sheet: MusicSheet::new(vec![]),
            ..WorkbenchConfig::default()
        };
        assert!(config.build().is_err());
    }
}
