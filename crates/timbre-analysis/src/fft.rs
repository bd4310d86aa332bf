//! Spectrum engine: FFT magnitude spectra over a shared plan cache.

use rustfft::{Fft, FftPlanner, num_complex::Complex};
use std::sync::Arc;

use crate::cache::KeyedCache;
use crate::error::{FeatureError, Result, check_sample_rate};
use crate::frame::{PaddedFrame, padded_len};
use crate::spectrum::{LOG_FLOOR, Spectrum};

/// What a cached transform plan is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformKind {
    /// Forward transform for spectra.
    Spectrum,
    /// Forward and inverse pair for FFT autocorrelation.
    Autocorrelation,
}

/// Cache key for a transform plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlanKey {
    /// Transform length.
    pub len: usize,
    /// Intended use.
    pub kind: TransformKind,
}

/// A prepared transform for one length.
pub struct TransformPlan {
    forward: Arc<dyn Fft<f64>>,
    inverse: Option<Arc<dyn Fft<f64>>>,
    len: usize,
}

impl TransformPlan {
    fn build(key: PlanKey) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(key.len);
        let inverse = match key.kind {
            TransformKind::Spectrum => None,
            TransformKind::Autocorrelation => Some(planner.plan_fft_inverse(key.len)),
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(len = key.len, kind = ?key.kind, "built transform plan");
        Self {
            forward,
            inverse,
            len: key.len,
        }
    }

    /// Transform length.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the plan has zero length.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Forward transform of a real signal, zero-extended to the plan length.
    pub fn forward_real(&self, input: &[f64]) -> Vec<Complex<f64>> {
        let mut buffer: Vec<Complex<f64>> =
            input.iter().map(|&x| Complex::new(x, 0.0)).collect();
        buffer.resize(self.len, Complex::new(0.0, 0.0));
        self.forward.process(&mut buffer);
        buffer
    }

    /// Unnormalized in-place inverse transform, if this plan has one.
    pub fn inverse_in_place(&self, buffer: &mut [Complex<f64>]) -> bool {
        match &self.inverse {
            Some(inverse) => {
                inverse.process(buffer);
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for TransformPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformPlan")
            .field("len", &self.len)
            .field("inverse", &self.inverse.is_some())
            .finish()
    }
}

/// Scaling applied to FFT bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpectrumKind {
    /// |X|
    #[default]
    Magnitude,
    /// |X|²
    Power,
    /// ln(max(|X|, floor))
    LogMagnitude,
    /// ln(max(|X|², floor))
    LogPower,
}

impl SpectrumKind {
    fn scale(self, bin: Complex<f64>) -> f64 {
        match self {
            SpectrumKind::Magnitude => bin.norm(),
            SpectrumKind::Power => bin.norm_sqr(),
            SpectrumKind::LogMagnitude => bin.norm().max(LOG_FLOOR).ln(),
            SpectrumKind::LogPower => bin.norm_sqr().max(LOG_FLOOR).ln(),
        }
    }
}

/// FFT front end with a shared plan cache.
///
/// Cloning is cheap and clones share the same cache, so one engine can be
/// handed to many threads.
#[derive(Debug, Clone, Default)]
pub struct SpectrumEngine {
    plans: Arc<KeyedCache<PlanKey, TransformPlan>>,
}

impl SpectrumEngine {
    /// Create an engine with an empty plan cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine over an existing plan cache.
    pub fn with_cache(plans: Arc<KeyedCache<PlanKey, TransformPlan>>) -> Self {
        Self { plans }
    }

    /// Plan for `len`/`kind`, built on first use.
    pub fn plan(&self, len: usize, kind: TransformKind) -> Arc<TransformPlan> {
        let key = PlanKey { len, kind };
        self.plans.get_or_build(&key, || TransformPlan::build(key))
    }

    /// Number of plans constructed so far.
    pub fn plan_builds(&self) -> usize {
        self.plans.builds()
    }

    /// Number of plans held in the cache.
    pub fn cached_plans(&self) -> usize {
        self.plans.len()
    }

    /// Magnitude spectrum of a padded frame: M/2 bins, bin 0 is DC.
    pub fn magnitude_spectrum(&self, frame: &PaddedFrame, sample_rate: f64) -> Result<Spectrum> {
        self.spectrum(frame, sample_rate, SpectrumKind::Magnitude)
    }

    /// Spectrum of a padded frame with the given bin scaling.
    pub fn spectrum(
        &self,
        frame: &PaddedFrame,
        sample_rate: f64,
        kind: SpectrumKind,
    ) -> Result<Spectrum> {
        check_sample_rate(sample_rate)?;
        let m = frame.len();
        if m == 0 {
            return Err(FeatureError::invalid("frame", "padded length is zero"));
        }

        let plan = self.plan(m, TransformKind::Spectrum);
        let bins = plan.forward_real(frame.samples());
        let values = bins[..m / 2].iter().map(|&c| kind.scale(c)).collect();

        Ok(Spectrum::new(values, sample_rate / m as f64))
    }

    /// Biased autocorrelation computed through the FFT.
    ///
    /// Matches [`crate::lpc::autocorrelate`] to rounding error; the frame is
    /// zero-extended to at least twice its length so the circular
    /// correlation does not wrap.
    pub fn autocorrelation_fft(&self, frame: &[f64]) -> Result<Vec<f64>> {
        let n = frame.len();
        if n == 0 {
            return Err(FeatureError::invalid("frame", "cannot autocorrelate an empty frame"));
        }
        let len = padded_len(2 * n);
        let plan = self.plan(len, TransformKind::Autocorrelation);

        let mut buffer = plan.forward_real(frame);
        for bin in &mut buffer {
            *bin = Complex::new(bin.norm_sqr(), 0.0);
        }
        if !plan.inverse_in_place(&mut buffer) {
            return Err(FeatureError::failure(
                "autocorrelation",
                "transform plan has no inverse",
            ));
        }

        let scale = 1.0 / (len as f64 * n as f64);
        Ok(buffer[..n].iter().map(|c| c.re * scale).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::pad;
    use std::f64::consts::PI;

    #[test]
    fn spectrum_length_is_half_the_padded_length() {
        let engine = SpectrumEngine::new();
        let frame = pad(&vec![0.1; 300]).unwrap();
        let spectrum = engine.magnitude_spectrum(&frame, 44100.0).unwrap();
        assert_eq!(spectrum.len(), 256);
        assert!((spectrum.bin_width() - 44100.0 / 512.0).abs() < 1e-12);
    }

    #[test]
    fn dc_lands_in_bin_zero() {
        let engine = SpectrumEngine::new();
        let frame = pad(&[1.0; 64]).unwrap();
        let spectrum = engine.magnitude_spectrum(&frame, 8000.0).unwrap();
        assert!((spectrum[0] - 64.0).abs() < 1e-9);
        assert!(spectrum.as_slice()[1..].iter().all(|&m| m < 1e-9));
    }

    #[test]
    fn bin_centred_tone_peaks_at_its_bin() {
        let engine = SpectrumEngine::new();
        let n = 1024;
        let k = 37;
        let signal: Vec<f64> = (0..n)
            .map(|i| (2.0 * PI * k as f64 * i as f64 / n as f64).sin())
            .collect();
        let spectrum = engine
            .magnitude_spectrum(&pad(&signal).unwrap(), 48000.0)
            .unwrap();
        assert!((spectrum[k] - n as f64 / 2.0).abs() < 1e-6);
        assert_eq!(spectrum.argmax(), Some(k));
    }

    #[test]
    fn power_is_magnitude_squared() {
        let engine = SpectrumEngine::new();
        let frame = pad(&[0.3, -0.2, 0.7, 0.1, -0.4]).unwrap();
        let mag = engine.spectrum(&frame, 100.0, SpectrumKind::Magnitude).unwrap();
        let pow = engine.spectrum(&frame, 100.0, SpectrumKind::Power).unwrap();
        for (m, p) in mag.as_slice().iter().zip(pow.as_slice()) {
            assert!((m * m - p).abs() < 1e-12);
        }
    }

    #[test]
    fn log_spectrum_is_floored() {
        let engine = SpectrumEngine::new();
        let frame = pad(&[0.0; 8]).unwrap();
        let log = engine.spectrum(&frame, 100.0, SpectrumKind::LogMagnitude).unwrap();
        assert!(log.as_slice().iter().all(|&v| v == LOG_FLOOR.ln()));
    }

    #[test]
    fn rejects_bad_sample_rate() {
        let engine = SpectrumEngine::new();
        let frame = pad(&[1.0, 2.0]).unwrap();
        assert!(engine.magnitude_spectrum(&frame, 0.0).is_err());
    }

    #[test]
    fn plan_is_reused_for_equal_lengths() {
        let engine = SpectrumEngine::new();
        engine.magnitude_spectrum(&pad(&[1.0; 100]).unwrap(), 1.0).unwrap();
        engine.magnitude_spectrum(&pad(&[2.0; 120]).unwrap(), 1.0).unwrap();
        assert_eq!(engine.plan_builds(), 1);
        engine.magnitude_spectrum(&pad(&[2.0; 300]).unwrap(), 1.0).unwrap();
        assert_eq!(engine.plan_builds(), 2);
    }

    #[test]
    fn clones_share_plans() {
        let engine = SpectrumEngine::new();
        let other = engine.clone();
        engine.plan(64, TransformKind::Spectrum);
        other.plan(64, TransformKind::Spectrum);
        assert_eq!(engine.plan_builds(), 1);
        assert_eq!(other.cached_plans(), 1);
    }

    #[test]
    fn fft_autocorrelation_matches_direct() {
        let engine = SpectrumEngine::new();
        let frame = [0.5, -1.0, 0.25, 0.75, -0.3, 0.1, 0.9];
        let fast = engine.autocorrelation_fft(&frame).unwrap();
        let direct = crate::lpc::autocorrelate(&frame);
        assert_eq!(fast.len(), direct.len());
        for (a, b) in fast.iter().zip(&direct) {
            assert!((a - b).abs() < 1e-12, "{a} vs {b}");
        }
    }
}
