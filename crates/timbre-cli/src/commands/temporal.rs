//! Time-domain features.

use timbre_analysis::Analyzer;

use crate::report::Report;

pub fn zcr(analyzer: &Analyzer, frame: &[f64]) -> Report {
    Report::value("zcr", analyzer.zero_crossing_rate(frame))
}

pub fn asdf(analyzer: &Analyzer, frame: &[f64]) -> Report {
    Report::values("asdf", analyzer.average_square_difference(frame))
}
