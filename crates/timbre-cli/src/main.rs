//! Timbre CLI - audio feature extraction from the command line.

mod commands;
mod input;
mod report;

use clap::Parser;
use std::path::PathBuf;
use timbre_analysis::Analyzer;
use timbre_config::AnalysisConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "timbre")]
#[command(author, version, about = "Frame-level audio feature extraction", long_about = None)]
struct Cli {
    #[command(subcommand)]
    feature: commands::Feature,

    /// File of whitespace- or comma-separated samples; stdin when omitted or `-`
    #[arg(long, short, global = true, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Sample rate in Hz [default: from config, else 44100]
    #[arg(long, short = 'r', global = true, value_name = "HZ")]
    sample_rate: Option<f64>,

    /// TOML config file [default: timbre.toml in the user config dir, if present]
    #[arg(long, short, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print JSON instead of plain text
    #[arg(long, global = true)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = AnalysisConfig::load_or_default(cli.config.as_deref())?;
    if let Some(sample_rate) = cli.sample_rate {
        config.sample_rate = sample_rate;
    }
    cli.feature.apply(&mut config);
    cli.feature.validate(&config)?;
    tracing::debug!(sample_rate = config.sample_rate, "configuration ready");

    let frame = input::read_frame(cli.input.as_deref())?;
    tracing::debug!(samples = frame.len(), "frame loaded");

    let analyzer = Analyzer::new();
    let report = cli.feature.run(&analyzer, &config, &frame)?;

    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.to_text());
    }
    Ok(())
}
