//! Per-feature entry points over raw frames.
//!
//! [`Analyzer`] runs each feature's full pipeline (padding, spectrum, peaks,
//! aggregation) and owns the shared caches: FFT plans, Bark band limits and
//! mel filterbanks. Clones share those caches.

use std::sync::Arc;

use crate::bark::{self, BARK_BANDS, BandLimits};
use crate::cache::KeyedCache;
use crate::error::{FeatureError, Result};
use crate::fft::SpectrumEngine;
use crate::frame::pad;
use crate::lpc::{self, Lpc};
use crate::mel::{self, MelFilterbank, MelKey, MelSettings};
use crate::params::{
    FlatnessParams, HarmonicParams, LpccParams, MfccParams, PeakParams, RolloffParams,
    TristimulusParams,
};
use crate::peaks::{self, HarmonicSet, PeakSet};
use crate::pitch::{AmdfPitch, FallbackPitch};
use crate::spectrum::{self, Spectrum};
use crate::temporal;
use crate::timbre;
use crate::wavelet;

/// Bin spacing used for features that do not depend on the sample rate.
const UNIT_RATE: f64 = 1.0;

/// Bark cache key: FFT length and sample-rate bits.
type BarkKey = (usize, u64);

/// Construction counts of each shared cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// FFT plans built.
    pub plans: usize,
    /// Bark band-limit tables built.
    pub bark: usize,
    /// Mel filterbanks built.
    pub mel: usize,
}

/// Feature extractor over single frames.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    engine: SpectrumEngine,
    bark: Arc<KeyedCache<BarkKey, BandLimits>>,
    mel: Arc<KeyedCache<MelKey, MelFilterbank>>,
}

impl Analyzer {
    /// Create an analyzer with empty caches.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an analyzer that shares `engine`'s plan cache.
    pub fn with_engine(engine: SpectrumEngine) -> Self {
        Self {
            engine,
            ..Self::default()
        }
    }

    /// The spectrum engine.
    pub fn engine(&self) -> &SpectrumEngine {
        &self.engine
    }

    /// How many entries each cache has built.
    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            plans: self.engine.plan_builds(),
            bark: self.bark.builds(),
            mel: self.mel.builds(),
        }
    }

    /// Bark band limits for `fft_size` at `sample_rate`, cached.
    pub fn bark_limits(&self, fft_size: usize, sample_rate: f64) -> Result<Arc<BandLimits>> {
        bark::check_band_arguments(fft_size, sample_rate)?;
        let key = (fft_size, sample_rate.to_bits());
        Ok(self
            .bark
            .get_or_build(&key, || bark::compute_band_limits(fft_size, sample_rate)))
    }

    /// Mel filterbank over `num_bins` bins up to `nyquist`, cached.
    pub fn mel_filterbank(
        &self,
        num_bins: usize,
        nyquist: f64,
        settings: &MelSettings,
    ) -> Result<Arc<MelFilterbank>> {
        MelFilterbank::check(num_bins, nyquist, settings)?;
        let key = MelKey::new(num_bins, nyquist, settings);
        Ok(self
            .mel
            .get_or_build(&key, || MelFilterbank::build(num_bins, nyquist, settings)))
    }

    /// Magnitude spectrum of the zero-padded frame.
    pub fn spectrum(&self, frame: &[f64], sample_rate: f64) -> Result<Spectrum> {
        let padded = pad(frame)?;
        self.engine.magnitude_spectrum(&padded, sample_rate)
    }

    /// Spectral peaks of the frame.
    pub fn peaks(&self, frame: &[f64], sample_rate: f64, params: &PeakParams) -> Result<PeakSet> {
        let spectrum = self.spectrum(frame, sample_rate)?;
        peaks::find_peaks(&spectrum, params.threshold)
    }

    /// Harmonics of `params.f0` among the frame's spectral peaks.
    pub fn harmonics(
        &self,
        frame: &[f64],
        sample_rate: f64,
        params: &HarmonicParams,
    ) -> Result<HarmonicSet> {
        let peaks = self.peaks(frame, sample_rate, &PeakParams::default())?;
        peaks::find_harmonics(&peaks, params.f0, params.threshold())
    }

    /// Zero-crossing rate.
    pub fn zero_crossing_rate(&self, frame: &[f64]) -> f64 {
        temporal::zero_crossing_rate(frame)
    }

    /// Average squared difference function.
    pub fn average_square_difference(&self, frame: &[f64]) -> Vec<f64> {
        temporal::average_square_difference(frame)
    }

    /// Spectral flatness, optionally in dB.
    ///
    /// A silent frame has flatness 0 (the dB floor when `params.db` is set).
    pub fn flatness(&self, frame: &[f64], params: &FlatnessParams) -> Result<f64> {
        let spectrum = self.spectrum(frame, UNIT_RATE)?;
        let flatness = match spectrum::spectral_flatness(&spectrum) {
            Err(FeatureError::NoResult(_)) => 0.0,
            other => other?,
        };
        Ok(if params.db {
            spectrum::flatness_db(flatness)
        } else {
            flatness
        })
    }

    /// Tonality coefficient.
    pub fn tonality(&self, frame: &[f64]) -> Result<f64> {
        let db = self.flatness(frame, &FlatnessParams { db: true })?;
        Ok(spectrum::tonality(db))
    }

    /// Spectral rolloff in Hz.
    pub fn rolloff(&self, frame: &[f64], sample_rate: f64, params: &RolloffParams) -> Result<f64> {
        let spectrum = self.spectrum(frame, sample_rate)?;
        spectrum::spectral_rolloff_hz(&spectrum, params.fraction)
    }

    /// Bark band magnitude sums.
    pub fn bark_coefficients(&self, frame: &[f64], sample_rate: f64) -> Result<[f64; BARK_BANDS]> {
        let spectrum = self.spectrum(frame, sample_rate)?;
        let limits = self.bark_limits(spectrum.fft_size(), sample_rate)?;
        Ok(bark::bark_coefficients(&spectrum, &limits))
    }

    /// Loudness from the Bark bands.
    pub fn loudness(&self, frame: &[f64], sample_rate: f64) -> Result<f64> {
        let bands = self.bark_coefficients(frame, sample_rate)?;
        Ok(bark::loudness(&bands))
    }

    /// Mel-frequency cepstral coefficients.
    pub fn mfcc(&self, frame: &[f64], sample_rate: f64, params: &MfccParams) -> Result<Vec<f64>> {
        let spectrum = self.spectrum(frame, sample_rate)?;
        let filterbank = self.mel_filterbank(spectrum.len(), sample_rate / 2.0, &params.mel)?;
        mel::mfcc(&spectrum, &filterbank)
    }

    /// Linear prediction over the frame's full autocorrelation (order N−1).
    ///
    /// A silent frame yields an all-zero model.
    pub fn lpc(&self, frame: &[f64]) -> Result<Lpc> {
        match lpc::lpc(&lpc::autocorrelate(frame)) {
            Err(FeatureError::NoResult(_)) => Ok(Lpc::zeroed(frame.len().saturating_sub(1))),
            other => other,
        }
    }

    /// LPC cepstrum. A silent frame yields all-zero coefficients.
    pub fn lpcc(&self, frame: &[f64], params: &LpccParams) -> Result<Vec<f64>> {
        match lpc::lpc(&lpc::autocorrelate(frame)) {
            Ok(model) => lpc::lpcc(&model, params.order),
            Err(FeatureError::NoResult(_)) => {
                let silent = Lpc::zeroed(frame.len().saturating_sub(1));
                let order = params
                    .order
                    .unwrap_or_else(|| silent.default_cepstrum_order());
                if order == 0 {
                    return Err(FeatureError::invalid("lpcc_order", "order must be at least 1"));
                }
                Ok(vec![0.0; order])
            }
            Err(e) => Err(e),
        }
    }

    /// Tristimulus over the frame's peaks or, with `f0`, its harmonics.
    pub fn tristimulus(
        &self,
        frame: &[f64],
        sample_rate: f64,
        params: &TristimulusParams,
    ) -> Result<f64> {
        let harmonics = params.harmonics()?;
        let peaks = self.peaks(frame, sample_rate, &PeakParams::default())?;
        match harmonics {
            Some(harmonic) => {
                let set = peaks::find_harmonics(&peaks, harmonic.f0, harmonic.threshold())?;
                timbre::tristimulus(&set, params.order, params.f0)
            }
            None => timbre::tristimulus(&peaks, params.order, params.f0),
        }
    }

    /// Odd-to-even harmonic ratio, 0.0 when the frame has no harmonics.
    pub fn odd_even_ratio(
        &self,
        frame: &[f64],
        sample_rate: f64,
        params: &HarmonicParams,
    ) -> Result<f64> {
        let harmonics = self.harmonics(frame, sample_rate, params)?;
        match timbre::odd_even_ratio(&harmonics) {
            Err(FeatureError::NoResult(_)) => Ok(0.0),
            other => other,
        }
    }

    /// Fundamental frequency: AMDF, falling back to the lowest spectral peak.
    ///
    /// Returns 0.0 when neither finds a pitch.
    pub fn f0(&self, frame: &[f64], sample_rate: f64) -> Result<f64> {
        FallbackPitch::new(AmdfPitch, self.engine.clone()).estimate(frame, sample_rate)
    }

    /// Wavelet fundamental frequency, 0.0 when none is found.
    pub fn wavelet_f0(&self, frame: &[f64], sample_rate: f64) -> Result<f64> {
        wavelet::wavelet_f0(frame, sample_rate)
    }
}
