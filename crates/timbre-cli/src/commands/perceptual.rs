//! Bark bands, loudness and MFCC.

use timbre_analysis::Analyzer;
use timbre_config::AnalysisConfig;

use crate::report::Report;

pub fn loudness(analyzer: &Analyzer, frame: &[f64], sr: f64) -> anyhow::Result<Report> {
    Ok(Report::value("loudness", analyzer.loudness(frame, sr)?))
}

pub fn bark(analyzer: &Analyzer, frame: &[f64], sr: f64) -> anyhow::Result<Report> {
    let bands = analyzer.bark_coefficients(frame, sr)?;
    Ok(Report::values("bark", bands.to_vec()))
}

pub fn mfcc(analyzer: &Analyzer, config: &AnalysisConfig, frame: &[f64]) -> anyhow::Result<Report> {
    let coefficients = analyzer.mfcc(frame, config.sample_rate, &config.mfcc_params())?;
    Ok(Report::values("mfcc", coefficients))
}
