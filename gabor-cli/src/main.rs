//! # gabor
//!
//! Command-line front end for the Gabor transform workbench. Reads a JSON
//! workbench configuration, runs the transform, applies the requested cuts
//! and writes a JSON report with the spectrogram and the resynthesised
//! signal.

mod config;
mod report;
mod telemetry;

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use config::WorkbenchConfig;
use report::Report;

#[derive(Parser, Debug)]
#[command(name = "gabor", version, about = "Gabor transform workbench")]
struct Cli {
    /// Workbench configuration (JSON). Defaults are used when omitted.
    config: Option<PathBuf>,

    /// Write the report here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Zero a spectrogram region given as `t1,t2,f1,f2` fractions. Repeatable.
    #[arg(long = "cut", value_parser = parse_cut)]
    cuts: Vec<Cut>,

    /// Denoise the spectrogram before synthesis.
    #[arg(long)]
    processed: bool,

    /// Use the product of both window transforms.
    #[arg(long)]
    two_windows: bool,

    /// Pretty-print the JSON report.
    #[arg(long)]
    pretty: bool,
}

/// Rectangle of the spectrogram in fractions of the signal.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cut {
    t1: f64,
    t2: f64,
    f1: f64,
    f2: f64,
}

fn parse_cut(arg: &str) -> Result<Cut> {
    let values = arg
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .with_context(|| format!("invalid number '{}'", part.trim()))
        })
        .collect::<Result<Vec<_>>>()?;

    match values.as_slice() {
        &[t1, t2, f1, f2] => Ok(Cut { t1, t2, f1, f2 }),
        other => bail!("expected 4 comma-separated values, got {}", other.len()),
    }
}

fn main() -> Result<()> {
    telemetry::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => WorkbenchConfig::load(path)?,
        None => WorkbenchConfig::default(),
    };
    if cli.two_windows {
        config.transform.use_two_windows = true;
    }
    if cli.processed {
        config.transform.is_processed = true;
    }

    let start = Instant::now();
    let mut engine = config
        .build()
        .context("Failed to build the transform engine")?;

    for cut in &cli.cuts {
        engine
            .cut_spectrogram(cut.t1, cut.t2, cut.f1, cut.f2)
            .with_context(|| format!("Failed to apply cut {cut:?}"))?;
        info!("[CLI] Applied cut {:?}", cut);
    }

    let report = Report::from_engine(&engine);
    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };

    match &cli.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write report {}", path.display()))?;
            info!("[CLI] Report written to {}", path.display());
        }
        None => println!("{json}"),
    }

    info!(
        "[CLI] Done in {:.2?} ({} points, {} cuts)",
        start.elapsed(),
        engine.num_points(),
        cli.cuts.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cut_fractions() {
        let cut = parse_cut("0.1, 0.5,0,1").unwrap();
        assert_eq!(
            cut,
            Cut {
                t1: 0.1,
                t2: 0.5,
                f1: 0.0,
                f2: 1.0
            }
        );
    }

    #[test]
    fn rejects_malformed_cuts() {
        assert!(parse_cut("0.1,0.5,0").is_err());
        assert!(parse_cut("0.1,0.5,0,x").is_err());
        assert!(parse_cut("").is_err());
    }

    #[test]
    fn cli_collects_repeated_cuts() {
        let cli = Cli::try_parse_from([
            "gabor",
            "--cut",
            "0,0.5,0,1",
            "--cut",
            "0.6,0.7,0.2,0.4",
            "--two-windows",
        ])
        .unwrap();
        assert_eq!(cli.cuts.len(), 2);
        assert!(cli.two_windows);
        assert!(!cli.processed);
        assert!(cli.config.is_none());
    }
}
