//! Feature subcommands.
//!
//! Each subcommand folds its flags into the loaded [`AnalysisConfig`],
//! validates everything, then runs one extractor over the input frame.

pub mod harmonic;
pub mod perceptual;
pub mod pitch;
pub mod prediction;
pub mod spectral;
pub mod temporal;

use clap::Subcommand;
use timbre_analysis::Analyzer;
use timbre_config::AnalysisConfig;
use timbre_config::validation::{ValidationResult, Violations};

use crate::report::Report;

#[derive(Subcommand)]
pub enum Feature {
    /// Magnitude spectrum of the zero-padded frame
    Spectrum,

    /// Spectral peaks above the peak threshold
    Peaks(spectral::PeaksArgs),

    /// Zero-crossing rate
    Zcr,

    /// Average squared difference for every lag
    Asdf,

    /// Spectral flatness (geometric over arithmetic mean)
    Flatness(spectral::FlatnessArgs),

    /// Tonality derived from dB flatness
    Tonality,

    /// Frequency below which a share of spectral magnitude lies
    Rolloff(spectral::RolloffArgs),

    /// Total loudness over the Bark bands
    Loudness,

    /// Bark-band coefficients
    Bark,

    /// Mel-frequency cepstral coefficients
    Mfcc,

    /// Linear prediction coefficients
    Lpc,

    /// LPC cepstrum
    Lpcc(prediction::LpccArgs),

    /// Tristimulus of the spectral peaks or of the harmonics of f0
    Tristimulus(harmonic::TristimulusArgs),

    /// Odd-to-even harmonic energy ratio
    OddEven(harmonic::OddEvenArgs),

    /// Fundamental frequency (AMDF with spectral fallback)
    F0,

    /// Fundamental frequency by wavelet analysis
    WaveletF0,
}

impl Feature {
    /// Fold command-line overrides into `config`.
    pub fn apply(&self, config: &mut AnalysisConfig) {
        match self {
            Feature::Peaks(args) => args.apply(config),
            Feature::Flatness(args) => args.apply(config),
            Feature::Rolloff(args) => args.apply(config),
            Feature::Lpcc(args) => args.apply(config),
            Feature::OddEven(args) => args.apply(config),
            _ => {}
        }
    }

    /// Validate `config` together with this command's own arguments.
    pub fn validate(&self, config: &AnalysisConfig) -> ValidationResult<()> {
        let mut violations = Violations::new();
        violations.check(config.validate());
        match self {
            Feature::Tristimulus(args) => violations.check(args.validate()),
            Feature::OddEven(args) => violations.check(args.validate()),
            _ => {}
        }
        violations.finish()
    }

    /// Compute the feature for `frame`.
    pub fn run(
        &self,
        analyzer: &Analyzer,
        config: &AnalysisConfig,
        frame: &[f64],
    ) -> anyhow::Result<Report> {
        let sr = config.sample_rate;
        let report = match self {
            Feature::Spectrum => spectral::spectrum(analyzer, frame, sr)?,
            Feature::Peaks(_) => spectral::peaks(analyzer, config, frame)?,
            Feature::Zcr => temporal::zcr(analyzer, frame),
            Feature::Asdf => temporal::asdf(analyzer, frame),
            Feature::Flatness(_) => spectral::flatness(analyzer, config, frame)?,
            Feature::Tonality => spectral::tonality(analyzer, frame)?,
            Feature::Rolloff(_) => spectral::rolloff(analyzer, config, frame)?,
            Feature::Loudness => perceptual::loudness(analyzer, frame, sr)?,
            Feature::Bark => perceptual::bark(analyzer, frame, sr)?,
            Feature::Mfcc => perceptual::mfcc(analyzer, config, frame)?,
            Feature::Lpc => prediction::lpc(analyzer, frame)?,
            Feature::Lpcc(_) => prediction::lpcc(analyzer, config, frame)?,
            Feature::Tristimulus(args) => harmonic::tristimulus(analyzer, config, args, frame)?,
            Feature::OddEven(args) => harmonic::odd_even(analyzer, config, args, frame)?,
            Feature::F0 => pitch::f0(analyzer, frame, sr)?,
            Feature::WaveletF0 => pitch::wavelet_f0(analyzer, frame, sr)?,
        };
        Ok(report)
    }
}
