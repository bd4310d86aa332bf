//! Spectrum, peaks and spectral shape.

use clap::Args;
use timbre_analysis::{Analyzer, Partials};
use timbre_config::AnalysisConfig;

use crate::report::Report;

#[derive(Args)]
pub struct PeaksArgs {
    /// Peak threshold, percent of the spectrum maximum
    #[arg(long, value_name = "P")]
    percent: Option<f64>,
}

impl PeaksArgs {
    pub fn apply(&self, config: &mut AnalysisConfig) {
        if let Some(percent) = self.percent {
            config.peak_threshold_percent = percent;
        }
    }
}

#[derive(Args)]
pub struct FlatnessArgs {
    /// Report 10·log10(flatness)
    #[arg(long)]
    db: bool,
}

impl FlatnessArgs {
    pub fn apply(&self, config: &mut AnalysisConfig) {
        if self.db {
            config.flatness_db = true;
        }
    }
}

#[derive(Args)]
pub struct RolloffArgs {
    /// Share of total magnitude below the rolloff point, in percent
    #[arg(long, value_name = "P")]
    percent: Option<f64>,
}

impl RolloffArgs {
    pub fn apply(&self, config: &mut AnalysisConfig) {
        if let Some(percent) = self.percent {
            config.rolloff_percent = percent;
        }
    }
}

pub fn spectrum(analyzer: &Analyzer, frame: &[f64], sr: f64) -> anyhow::Result<Report> {
    let spectrum = analyzer.spectrum(frame, sr)?;
    let bins = (0..spectrum.len()).map(|i| (spectrum.frequency(i), spectrum[i]));
    Ok(Report::bins("spectrum", bins))
}

pub fn peaks(
    analyzer: &Analyzer,
    config: &AnalysisConfig,
    frame: &[f64],
) -> anyhow::Result<Report> {
    let peaks = analyzer.peaks(frame, config.sample_rate, &config.peak_params())?;
    Ok(Report::bins("peaks", peaks.iter_partials()))
}

pub fn flatness(
    analyzer: &Analyzer,
    config: &AnalysisConfig,
    frame: &[f64],
) -> anyhow::Result<Report> {
    let value = analyzer.flatness(frame, &config.flatness_params())?;
    Ok(Report::value("flatness", value))
}

pub fn tonality(analyzer: &Analyzer, frame: &[f64]) -> anyhow::Result<Report> {
    Ok(Report::value("tonality", analyzer.tonality(frame)?))
}

pub fn rolloff(
    analyzer: &Analyzer,
    config: &AnalysisConfig,
    frame: &[f64],
) -> anyhow::Result<Report> {
    let hz = analyzer.rolloff(frame, config.sample_rate, &config.rolloff_params())?;
    Ok(Report::value("rolloff", hz))
}
