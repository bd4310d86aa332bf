//! Fundamental frequency estimators.
//!
//! Both report 0 Hz when no pitch can be determined.

use timbre_analysis::Analyzer;

use crate::report::Report;

pub fn f0(analyzer: &Analyzer, frame: &[f64], sr: f64) -> anyhow::Result<Report> {
    Ok(Report::value("f0", analyzer.f0(frame, sr)?))
}

pub fn wavelet_f0(analyzer: &Analyzer, frame: &[f64], sr: f64) -> anyhow::Result<Report> {
    Ok(Report::value("wavelet-f0", analyzer.wavelet_f0(frame, sr)?))
}
