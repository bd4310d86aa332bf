//! Analysis settings file format and operations.

use serde::{Deserialize, Serialize};
use std::path::Path;

use timbre_analysis::mel::{DEFAULT_MEL_FILTERS, DEFAULT_MEL_HIGH_HZ, DEFAULT_MEL_LOW_HZ};
use timbre_analysis::params::{DEFAULT_PEAK_THRESHOLD, DEFAULT_ROLLOFF_FRACTION};
use timbre_analysis::peaks::DEFAULT_HARMONIC_THRESHOLD;
use timbre_analysis::{
    FlatnessParams, GainMode, HarmonicParams, LpccParams, MelSettings, MfccParams, PeakParams,
    RolloffParams,
};

use crate::error::ConfigError;
use crate::paths::default_config_path;
use crate::validation::{ValidationError, ValidationResult, Violations, check_positive, check_range};

/// Default sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: f64 = 44100.0;

/// Largest accepted LPC cepstrum length.
pub const MAX_LPCC_ORDER: usize = 4096;

/// Settings shared by every feature.
///
/// Thresholds a user types are percentages; they become fractions when
/// converted to the extractor parameter structs.
///
/// # TOML Format
///
/// ```toml
/// sample_rate = 44100.0
/// peak_threshold_percent = 10.0
/// harmonic_threshold = 0.2
/// rolloff_percent = 85.0
/// flatness_db = false
/// lpcc_order = 12
///
/// [mel]
/// filters = 13
/// low_hz = 20.0
/// high_hz = 20000.0
/// gain = "equal_gain"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Sample rate of the input frames, in Hz.
    pub sample_rate: f64,
    /// Peak-picking threshold, percent of the spectrum maximum.
    pub peak_threshold_percent: f64,
    /// Relative tolerance for harmonic matching, in `[0, 1]`.
    pub harmonic_threshold: f64,
    /// Rolloff point, percent of total magnitude.
    pub rolloff_percent: f64,
    /// Report flatness in decibels.
    pub flatness_db: bool,
    /// LPC cepstrum length; derived from the frame length when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lpcc_order: Option<usize>,
    /// Mel filterbank shape.
    pub mel: MelConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            peak_threshold_percent: DEFAULT_PEAK_THRESHOLD * 100.0,
            harmonic_threshold: DEFAULT_HARMONIC_THRESHOLD,
            rolloff_percent: DEFAULT_ROLLOFF_FRACTION * 100.0,
            flatness_db: false,
            lpcc_order: None,
            mel: MelConfig::default(),
        }
    }
}

/// `[mel]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MelConfig {
    /// Number of triangular filters.
    pub filters: usize,
    /// Lower edge in Hz.
    pub low_hz: f64,
    /// Upper edge in Hz, limited to Nyquist at extraction time.
    pub high_hz: f64,
    /// Filter normalisation.
    pub gain: MelGain,
}

impl Default for MelConfig {
    fn default() -> Self {
        Self {
            filters: DEFAULT_MEL_FILTERS,
            low_hz: DEFAULT_MEL_LOW_HZ,
            high_hz: DEFAULT_MEL_HIGH_HZ,
            gain: MelGain::default(),
        }
    }
}

/// Serialized form of [`GainMode`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MelGain {
    /// Every filter peaks at 1.
    #[default]
    EqualGain,
    /// Every filter has the same area.
    EqualArea,
}

impl From<MelGain> for GainMode {
    fn from(gain: MelGain) -> Self {
        match gain {
            MelGain::EqualGain => GainMode::EqualGain,
            MelGain::EqualArea => GainMode::EqualArea,
        }
    }
}

impl AnalysisConfig {
    /// Load and validate a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Load `path` if given, else the default config file if it exists, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default = default_config_path();
                if default.is_file() {
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Convert the configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save the configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Check every field, reporting all violations together.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut violations = Violations::new();
        violations.check(check_positive("sample_rate", self.sample_rate));
        violations.check(check_range(
            "peak_threshold_percent",
            self.peak_threshold_percent,
            0.0,
            100.0,
        ));
        violations.check(check_range(
            "harmonic_threshold",
            self.harmonic_threshold,
            0.0,
            1.0,
        ));
        violations.check(check_range("rolloff_percent", self.rolloff_percent, 0.0, 100.0));
        if let Some(order) = self.lpcc_order
            && !(1..=MAX_LPCC_ORDER).contains(&order)
        {
            violations.push(ValidationError::InvalidFormat {
                param: "lpcc_order".to_string(),
                reason: format!("{order} must be between 1 and {MAX_LPCC_ORDER}"),
            });
        }
        self.mel.check(&mut violations);
        violations.finish()
    }

    /// Peak-picking parameters.
    pub fn peak_params(&self) -> PeakParams {
        PeakParams {
            threshold: self.peak_threshold_percent / 100.0,
        }
    }

    /// Harmonic matching parameters for a known fundamental.
    pub fn harmonic_params(&self, f0: f64) -> HarmonicParams {
        HarmonicParams::new(f0).with_threshold(self.harmonic_threshold)
    }

    /// Rolloff parameters.
    pub fn rolloff_params(&self) -> RolloffParams {
        RolloffParams {
            fraction: self.rolloff_percent / 100.0,
        }
    }

    /// Flatness parameters.
    pub fn flatness_params(&self) -> FlatnessParams {
        FlatnessParams {
            db: self.flatness_db,
        }
    }

    /// LPC cepstrum parameters.
    pub fn lpcc_params(&self) -> LpccParams {
        LpccParams {
            order: self.lpcc_order,
        }
    }

    /// MFCC parameters.
    pub fn mfcc_params(&self) -> MfccParams {
        MfccParams {
            mel: self.mel.settings(),
        }
    }
}

impl MelConfig {
    /// Filterbank settings for the extractor.
    pub fn settings(&self) -> MelSettings {
        MelSettings {
            filters: self.filters,
            low_hz: self.low_hz,
            high_hz: self.high_hz,
            gain: self.gain.into(),
        }
    }

    fn check(&self, violations: &mut Violations) {
        if self.filters == 0 {
            violations.push(ValidationError::InvalidFormat {
                param: "mel.filters".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if !(self.low_hz.is_finite() && self.low_hz >= 0.0) {
            violations.push(ValidationError::InvalidFormat {
                param: "mel.low_hz".to_string(),
                reason: format!("{} must be non-negative and finite", self.low_hz),
            });
        }
        violations.check(check_positive("mel.high_hz", self.high_hz));
        if self.high_hz <= self.low_hz {
            violations.push(ValidationError::InvalidFormat {
                param: "mel.high_hz".to_string(),
                reason: format!("{} must exceed low_hz {}", self.high_hz, self.low_hz),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_extractor_defaults() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.peak_params().threshold - PeakParams::default().threshold).abs() < 1e-12);
        assert!(
            (config.rolloff_params().fraction - RolloffParams::default().fraction).abs() < 1e-12
        );
        assert_eq!(config.mfcc_params(), MfccParams::default());
        assert_eq!(config.harmonic_params(440.0).threshold(), 0.2);
    }

    #[test]
    fn empty_toml_is_default() {
        let config = AnalysisConfig::from_toml_str("").unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn parses_full_document() {
        let toml = r#"
            sample_rate = 48000.0
            peak_threshold_percent = 5.0
            harmonic_threshold = 0.1
            rolloff_percent = 95.0
            flatness_db = true
            lpcc_order = 12

            [mel]
            filters = 20
            low_hz = 100.0
            high_hz = 8000.0
            gain = "equal_area"
        "#;
        let config = AnalysisConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.sample_rate, 48000.0);
        assert!((config.peak_params().threshold - 0.05).abs() < 1e-12);
        assert!((config.rolloff_params().fraction - 0.95).abs() < 1e-12);
        assert!(config.flatness_params().db);
        assert_eq!(config.lpcc_params().order, Some(12));
        let mel = config.mfcc_params().mel;
        assert_eq!(mel.filters, 20);
        assert_eq!(mel.gain, GainMode::EqualArea);
    }

    #[test]
    fn unknown_field_is_a_parse_error() {
        let err = AnalysisConfig::from_toml_str("window = \"hann\"").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn unknown_gain_is_a_parse_error() {
        let err = AnalysisConfig::from_toml_str("[mel]\ngain = \"loud\"").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn validate_collects_every_violation() {
        let config = AnalysisConfig {
            sample_rate: 0.0,
            rolloff_percent: 150.0,
            lpcc_order: Some(0),
            ..AnalysisConfig::default()
        };
        match config.validate() {
            Err(ValidationError::Multiple(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("expected three violations, got {other:?}"),
        }
    }

    #[test]
    fn lpcc_order_is_bounded() {
        let at_limit = AnalysisConfig {
            lpcc_order: Some(MAX_LPCC_ORDER),
            ..AnalysisConfig::default()
        };
        assert!(at_limit.validate().is_ok());

        let too_long = AnalysisConfig {
            lpcc_order: Some(MAX_LPCC_ORDER + 1),
            ..AnalysisConfig::default()
        };
        let err = too_long.validate().unwrap_err();
        assert!(err.to_string().contains("lpcc_order"));

        let err = AnalysisConfig::from_toml_str("lpcc_order = 100000000").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ValidationError::InvalidFormat { .. })));
    }

    #[test]
    fn mel_edges_must_be_ordered() {
        let mut config = AnalysisConfig::default();
        config.mel.low_hz = 5000.0;
        config.mel.high_hz = 1000.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("mel.high_hz"));
    }

    #[test]
    fn rejects_invalid_values_on_parse() {
        let err = AnalysisConfig::from_toml_str("peak_threshold_percent = -1.0").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ValidationError::OutOfRange { .. })));
    }

    #[test]
    fn toml_round_trip_preserves_config() {
        let config = AnalysisConfig {
            lpcc_order: Some(8),
            ..AnalysisConfig::default()
        };
        let text = config.to_toml().unwrap();
        assert!(text.contains("[mel]"));
        assert!(text.contains("gain = \"equal_gain\""));
        assert_eq!(AnalysisConfig::from_toml_str(&text).unwrap(), config);
    }
}
