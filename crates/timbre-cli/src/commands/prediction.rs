//! Linear prediction and its cepstrum.

use clap::Args;
use timbre_analysis::Analyzer;
use timbre_config::AnalysisConfig;

use crate::report::Report;

#[derive(Args)]
pub struct LpccArgs {
    /// Number of cepstral coefficients [default: 1.5 × (frame length − 1)]
    #[arg(long, value_name = "K")]
    order: Option<usize>,
}

impl LpccArgs {
    pub fn apply(&self, config: &mut AnalysisConfig) {
        if let Some(order) = self.order {
            config.lpcc_order = Some(order);
        }
    }
}

pub fn lpc(analyzer: &Analyzer, frame: &[f64]) -> anyhow::Result<Report> {
    Ok(Report::lpc(analyzer.lpc(frame)?))
}

pub fn lpcc(analyzer: &Analyzer, config: &AnalysisConfig, frame: &[f64]) -> anyhow::Result<Report> {
    let cepstrum = analyzer.lpcc(frame, &config.lpcc_params())?;
    Ok(Report::values("lpcc", cepstrum))
}
