//! Integration tests for timbre-config.
//!
//! These tests exercise file I/O and the hand-off to the extractor.

use std::f64::consts::PI;

use tempfile::TempDir;
use timbre_analysis::{Analyzer, Partials};
use timbre_config::{AnalysisConfig, ConfigError, MelGain, ValidationError};

#[test]
fn save_then_load_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("timbre.toml");

    let mut config = AnalysisConfig {
        sample_rate: 22050.0,
        rolloff_percent: 90.0,
        lpcc_order: Some(10),
        ..AnalysisConfig::default()
    };
    config.mel.gain = MelGain::EqualArea;

    config.save(&path).expect("save should create parent dirs");
    assert!(path.exists());

    let loaded = AnalysisConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn load_missing_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    let err = AnalysisConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn load_rejects_invalid_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "sample_rate = -1.0\nharmonic_threshold = 2.0\n").unwrap();

    match AnalysisConfig::load(&path) {
        Err(ConfigError::Validation(ValidationError::Multiple(errors))) => {
            assert_eq!(errors.len(), 2);
        }
        other => panic!("expected two violations, got {other:?}"),
    }
}

#[test]
fn load_or_default_prefers_explicit_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("explicit.toml");
    std::fs::write(&path, "sample_rate = 8000.0\n").unwrap();

    let config = AnalysisConfig::load_or_default(Some(&path)).unwrap();
    assert_eq!(config.sample_rate, 8000.0);
}

#[test]
fn converted_params_drive_the_analyzer() {
    let config = AnalysisConfig::from_toml_str("[mel]\nfilters = 20\nhigh_hz = 8000.0\n").unwrap();
    let sr = config.sample_rate;
    let frame: Vec<f64> = (0..1024)
        .map(|i| (2.0 * PI * 440.0 * i as f64 / sr).sin())
        .collect();

    let analyzer = Analyzer::new();
    let mfcc = analyzer.mfcc(&frame, sr, &config.mfcc_params()).unwrap();
    assert_eq!(mfcc.len(), 20);

    let rolloff = analyzer.rolloff(&frame, sr, &config.rolloff_params()).unwrap();
    assert!(rolloff > 0.0 && rolloff < sr / 2.0);

    let peaks = analyzer.peaks(&frame, sr, &config.peak_params()).unwrap();
    assert!(peaks.magnitudes().iter().any(|&m| m > 0.0));
}
