//! Timbre Analysis - Frame-level audio feature extraction
//!
//! This crate computes scalar and vector descriptors from short frames of
//! `f64` audio:
//!
//! - [`frame`] - Zero-padding to power-of-two lengths
//! - [`fft`] - Magnitude spectra over a shared FFT plan cache
//! - [`spectrum`] - Spectral flatness, tonality and rolloff
//! - [`peaks`] - Spectral peak picking and harmonic matching
//! - [`lpc`] - Autocorrelation, Levinson-Durbin LPC and LPC cepstrum
//! - [`bark`] - Bark-band aggregation and loudness
//! - [`mel`] - Mel filterbank and MFCC
//! - [`temporal`] - Zero-crossing rate and average squared difference
//! - [`timbre`] - Tristimulus and odd/even harmonic ratio
//! - [`pitch`] - AMDF fundamental with a spectral fallback
//! - [`wavelet`] - Wavelet pitch tracking
//! - [`extractor`] - [`Analyzer`], one entry point per feature
//!
//! ## Example
//!
//! ```rust
//! use timbre_analysis::{Analyzer, MfccParams};
//!
//! let sr = 44100.0;
//! let frame: Vec<f64> = (0..1024)
//!     .map(|i| (2.0 * std::f64::consts::PI * 440.0 * i as f64 / sr).sin())
//!     .collect();
//!
//! let analyzer = Analyzer::new();
//! let f0 = analyzer.f0(&frame, sr).unwrap();
//! assert!((f0 - 440.0).abs() < 10.0);
//!
//! let mfcc = analyzer.mfcc(&frame, sr, &MfccParams::default()).unwrap();
//! assert_eq!(mfcc.len(), 13);
//! ```
//!
//! ## Lower-level pipeline
//!
//! ```rust
//! use timbre_analysis::{SpectrumEngine, find_peaks, pad};
//!
//! let engine = SpectrumEngine::new();
//! let padded = pad(&[0.0, 1.0, 0.0, -1.0, 0.0, 1.0]).unwrap();
//! let spectrum = engine.magnitude_spectrum(&padded, 8000.0).unwrap();
//! let peaks = find_peaks(&spectrum, 0.1).unwrap();
//! ```
//!
//! ## Logging
//!
//! With the `tracing` feature enabled, cache builds and f0 fallbacks emit
//! `debug` events.

pub mod bark;
pub mod cache;
pub mod error;
pub mod extractor;
pub mod fft;
pub mod frame;
pub mod lpc;
pub mod mel;
pub mod params;
pub mod peaks;
pub mod pitch;
pub mod spectrum;
pub mod temporal;
pub mod timbre;
pub mod wavelet;

// Re-export main types
pub use bark::{BARK_BANDS, BandLimits, bark_band_limits, bark_coefficients, loudness};
pub use cache::KeyedCache;
pub use error::{FeatureError, Result};
pub use extractor::{Analyzer, CacheStats};
pub use fft::{SpectrumEngine, SpectrumKind, TransformKind};
pub use frame::{PaddedFrame, pad, padded_len};
pub use lpc::{Lpc, autocorrelate, lpc, lpcc};
pub use mel::{GainMode, MelFilterbank, MelSettings, mfcc};
pub use params::{
    FlatnessParams, HarmonicParams, LpccParams, MfccParams, PeakParams, RolloffParams,
    TristimulusParams,
};
pub use peaks::{HarmonicSet, PeakSet, Partials, find_harmonics, find_peaks};
pub use pitch::{AmdfPitch, FallbackPitch, NO_PITCH, PitchEstimator};
pub use spectrum::{Spectrum, flatness_db, spectral_flatness, spectral_rolloff, tonality};
pub use temporal::{average_square_difference, zero_crossing_rate};
pub use timbre::{TristimulusOrder, odd_even_ratio, tristimulus};
pub use wavelet::{WaveletPitchTracker, wavelet_f0};
