//! Harmonic timbre features.

use clap::Args;
use timbre_analysis::{Analyzer, TristimulusOrder, TristimulusParams};
use timbre_config::AnalysisConfig;
use timbre_config::validation::{
    ValidationError, ValidationResult, Violations, check_positive, check_range,
};

use crate::report::Report;

#[derive(Args)]
pub struct TristimulusArgs {
    /// Band: 1 (fundamental), 2 (partials 2-4) or 3 (partials 5 and up)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=3))]
    order: u8,

    /// Fundamental in Hz; restricts the partials to its harmonics
    #[arg(long, value_name = "HZ")]
    f0: Option<f64>,

    /// Relative harmonic tolerance in [0, 1]; needs --f0
    #[arg(long, value_name = "T")]
    threshold: Option<f64>,
}

impl TristimulusArgs {
    pub fn validate(&self) -> ValidationResult<()> {
        let mut violations = Violations::new();
        match self.f0 {
            Some(f0) => violations.check(check_positive("f0", f0)),
            None => {
                if self.order < 3 {
                    violations.push(ValidationError::InvalidFormat {
                        param: "f0".to_string(),
                        reason: format!("tristimulus order {} needs --f0", self.order),
                    });
                }
                if self.threshold.is_some() {
                    violations.push(ValidationError::InvalidFormat {
                        param: "threshold".to_string(),
                        reason: "a harmonic threshold needs --f0".to_string(),
                    });
                }
            }
        }
        if let Some(threshold) = self.threshold {
            violations.check(check_range("threshold", threshold, 0.0, 1.0));
        }
        violations.finish()
    }
}

#[derive(Args)]
pub struct OddEvenArgs {
    /// Fundamental in Hz
    #[arg(long, value_name = "HZ")]
    f0: f64,

    /// Relative harmonic tolerance in [0, 1]
    #[arg(long, value_name = "T")]
    threshold: Option<f64>,
}

impl OddEvenArgs {
    pub fn apply(&self, config: &mut AnalysisConfig) {
        if let Some(threshold) = self.threshold {
            config.harmonic_threshold = threshold;
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        check_positive("f0", self.f0)
    }
}

pub fn tristimulus(
    analyzer: &Analyzer,
    config: &AnalysisConfig,
    args: &TristimulusArgs,
    frame: &[f64],
) -> anyhow::Result<Report> {
    let mut params = TristimulusParams::new(TristimulusOrder::try_from(args.order)?);
    if let Some(f0) = args.f0 {
        params = params
            .with_f0(f0)
            .with_threshold(args.threshold.unwrap_or(config.harmonic_threshold));
    }
    let value = analyzer.tristimulus(frame, config.sample_rate, &params)?;
    Ok(Report::value("tristimulus", value))
}

pub fn odd_even(
    analyzer: &Analyzer,
    config: &AnalysisConfig,
    args: &OddEvenArgs,
    frame: &[f64],
) -> anyhow::Result<Report> {
    let params = config.harmonic_params(args.f0);
    let ratio = analyzer.odd_even_ratio(frame, config.sample_rate, &params)?;
    Ok(Report::value("odd-even", ratio))
}
