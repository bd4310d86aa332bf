//! Fundamental-frequency estimation with a spectral fallback.
//!
//! ```text
//! frame ──► primary estimator ──ok──► f0
//!                 │
//!             NoResult
//!                 ▼
//!   pad ──► magnitude spectrum ──► peaks (10 %) ──► lowest peak frequency
//! ```

use crate::error::{FeatureError, Result, check_sample_rate};
use crate::fft::SpectrumEngine;
use crate::frame::pad;
use crate::peaks::find_peaks;

/// Peak threshold used by the spectral fallback, as a fraction of the maximum.
pub const FALLBACK_PEAK_THRESHOLD: f64 = 0.10;

/// Value reported when no fundamental can be found.
pub const NO_PITCH: f64 = 0.0;

/// AMDF peak-clipping level relative to the frame maximum.
const PEAK_CLIP: f64 = 0.8;

/// AMDF centre-clipping level relative to the frame maximum.
const CENTRE_CLIP: f64 = 0.3;

/// A fundamental-frequency estimator over a single frame.
pub trait PitchEstimator {
    /// Estimate f0 in Hz.
    ///
    /// Returns [`FeatureError::NoResult`] when the frame has no determinable
    /// pitch.
    fn estimate(&self, frame: &[f64], sample_rate: f64) -> Result<f64>;
}

/// Clipped average magnitude difference function.
///
/// The frame is peak-clipped at 0.8 of its maximum and centre-clipped at 0.3
/// (values below the centre level become 0, the rest are shifted down by it).
/// Over the first half of the frame, the lag-1 difference sum is the
/// reference error; the first lag τ ≥ 2 whose difference sum falls below it
/// gives `f0 = sr / (τ + err_τ / err_1)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmdfPitch;

impl AmdfPitch {
    fn clip(frame: &[f64]) -> Vec<f64> {
        let max = frame.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let peak = PEAK_CLIP * max;
        let centre = CENTRE_CLIP * max;
        frame
            .iter()
            .map(|&x| {
                let x = x.clamp(-peak.abs(), peak.abs());
                if x < centre { 0.0 } else { x - centre }
            })
            .collect()
    }
}

impl PitchEstimator for AmdfPitch {
    fn estimate(&self, frame: &[f64], sample_rate: f64) -> Result<f64> {
        check_sample_rate(sample_rate)?;
        let half = frame.len() / 2;
        if half < 3 {
            return Err(FeatureError::NoResult("amdf pitch"));
        }

        let x = Self::clip(frame);
        let difference = |lag: usize| -> f64 {
            (1..half).map(|n| (x[n] - x[n + lag]).abs()).sum()
        };

        let reference = difference(1);
        for lag in 2..half {
            let err = difference(lag);
            if err < reference {
                return Ok(sample_rate / (lag as f64 + err / reference));
            }
        }

        Err(FeatureError::NoResult("amdf pitch"))
    }
}

/// Runs a primary estimator and falls back to the lowest spectral peak.
///
/// Only [`FeatureError::NoResult`] from the primary triggers the fallback;
/// other errors are returned unchanged. A frame with no spectral peak yields
/// [`NO_PITCH`].
#[derive(Debug, Clone, Default)]
pub struct FallbackPitch<P = AmdfPitch> {
    primary: P,
    engine: SpectrumEngine,
}

impl<P: PitchEstimator> FallbackPitch<P> {
    /// Wrap `primary`, computing fallback spectra with `engine`.
    pub fn new(primary: P, engine: SpectrumEngine) -> Self {
        Self { primary, engine }
    }

    /// The primary estimator.
    pub fn primary(&self) -> &P {
        &self.primary
    }

    /// Estimate f0 in Hz, never returning `NoResult`.
    pub fn estimate(&self, frame: &[f64], sample_rate: f64) -> Result<f64> {
        check_sample_rate(sample_rate)?;
        match self.primary.estimate(frame, sample_rate) {
            Err(FeatureError::NoResult(_)) => {}
            other => return other,
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(len = frame.len(), "primary f0 undetermined, using lowest spectral peak");

        if frame.is_empty() {
            return Ok(NO_PITCH);
        }
        let padded = pad(frame)?;
        let spectrum = self.engine.magnitude_spectrum(&padded, sample_rate)?;
        let peaks = find_peaks(&spectrum, FALLBACK_PEAK_THRESHOLD)?;
        Ok(peaks.lowest_frequency().unwrap_or(NO_PITCH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    struct Undetermined;

    impl PitchEstimator for Undetermined {
        fn estimate(&self, _frame: &[f64], _sample_rate: f64) -> Result<f64> {
            Err(FeatureError::NoResult("stub"))
        }
    }

    struct Broken;

    impl PitchEstimator for Broken {
        fn estimate(&self, _frame: &[f64], _sample_rate: f64) -> Result<f64> {
            Err(FeatureError::failure("stub", "broken"))
        }
    }

    fn sine(freq: f64, sr: f64, len: usize) -> Vec<f64> {
        (0..len).map(|i| (2.0 * PI * freq * i as f64 / sr).sin()).collect()
    }

    #[test]
    fn amdf_finds_sine_pitch() {
        let frame = sine(440.0, 44100.0, 1024);
        let f0 = AmdfPitch.estimate(&frame, 44100.0).unwrap();
        assert!((f0 - 440.0).abs() < 10.0, "f0 {f0}");
    }

    #[test]
    fn amdf_on_silence_has_no_result() {
        assert!(AmdfPitch.estimate(&[0.0; 512], 44100.0).unwrap_err().is_no_result());
    }

    #[test]
    fn amdf_on_tiny_frame_has_no_result() {
        assert!(AmdfPitch.estimate(&[1.0, -1.0, 1.0], 44100.0).unwrap_err().is_no_result());
    }

    #[test]
    fn fallback_uses_lowest_spectral_peak() {
        let sr = 44100.0;
        let frame = sine(440.0, sr, 2048);
        let pitch = FallbackPitch::new(Undetermined, SpectrumEngine::new());
        let f0 = pitch.estimate(&frame, sr).unwrap();
        assert!((f0 - 440.0).abs() < sr / 2048.0, "f0 {f0}");
    }

    #[test]
    fn silence_gives_sentinel() {
        let pitch = FallbackPitch::<AmdfPitch>::default();
        assert_eq!(pitch.estimate(&[0.0; 256], 44100.0).unwrap(), NO_PITCH);
    }

    #[test]
    fn empty_frame_gives_sentinel() {
        let pitch = FallbackPitch::<AmdfPitch>::default();
        assert_eq!(pitch.estimate(&[], 44100.0).unwrap(), NO_PITCH);
    }

    #[test]
    fn primary_result_is_used_directly() {
        let frame = sine(440.0, 44100.0, 1024);
        let pitch = FallbackPitch::<AmdfPitch>::default();
        let direct = AmdfPitch.estimate(&frame, 44100.0).unwrap();
        assert_eq!(pitch.estimate(&frame, 44100.0).unwrap(), direct);
    }

    #[test]
    fn other_primary_errors_propagate() {
        let pitch = FallbackPitch::new(Broken, SpectrumEngine::new());
        assert!(matches!(
            pitch.estimate(&[1.0; 64], 44100.0),
            Err(FeatureError::ComputationFailure { .. })
        ));
    }

    #[test]
    fn invalid_sample_rate_rejected() {
        let pitch = FallbackPitch::<AmdfPitch>::default();
        assert!(matches!(
            pitch.estimate(&[1.0; 64], 0.0),
            Err(FeatureError::InvalidInput { .. })
        ));
    }
}
