//! Spectrum type and spectral shape features
//!
//! - [`spectral_flatness`] and [`flatness_db`] (Wiener entropy)
//! - [`tonality`] from dB flatness
//! - [`spectral_rolloff`] in bins or Hz

use std::ops::Index;

use crate::error::{FeatureError, Result, check_fraction};

/// Floor applied before taking logarithms of spectral values.
pub const LOG_FLOOR: f64 = 2e-42;

/// dB flatness at which [`tonality`] saturates to 1.
pub const TONALITY_SATURATION_DB: f64 = -60.0;

/// Half spectrum of a padded frame.
///
/// Index `i` corresponds to `i * bin_width` Hz; bin 0 is DC.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    values: Vec<f64>,
    bin_width: f64,
}

impl Spectrum {
    /// Build a spectrum from bin values and the bin spacing in Hz.
    pub fn new(values: Vec<f64>, bin_width: f64) -> Self {
        Self { values, bin_width }
    }

    /// Number of bins (M/2).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the spectrum has no bins.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Bin values.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Frequency spacing between bins in Hz.
    pub fn bin_width(&self) -> f64 {
        self.bin_width
    }

    /// Transform length M the spectrum was computed with.
    pub fn fft_size(&self) -> usize {
        self.values.len() * 2
    }

    /// Sample rate implied by the bin spacing.
    pub fn sample_rate(&self) -> f64 {
        self.bin_width * self.fft_size() as f64
    }

    /// Centre frequency of bin `bin` in Hz.
    pub fn frequency(&self, bin: usize) -> f64 {
        bin as f64 * self.bin_width
    }

    /// Index of the largest bin.
    pub fn argmax(&self) -> Option<usize> {
        self.values
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, _)| i)
    }

    /// Largest bin value, 0 for an empty spectrum.
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    /// Consume and return the bin values.
    pub fn into_inner(self) -> Vec<f64> {
        self.values
    }
}

impl Index<usize> for Spectrum {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.values[index]
    }
}

/// Spectral flatness: geometric mean over arithmetic mean of the nonzero bins.
///
/// The geometric mean is taken in the log domain so long spectra do not
/// underflow. Zero bins are skipped in both means, which keeps the result in
/// `(0, 1]`. A spectrum with no nonzero bin has no flatness.
pub fn spectral_flatness(spectrum: &Spectrum) -> Result<f64> {
    let mut log_sum = 0.0;
    let mut sum = 0.0;
    let mut count = 0usize;

    for &m in spectrum.as_slice() {
        if m > 0.0 {
            log_sum += m.ln();
            sum += m;
            count += 1;
        }
    }

    if count == 0 {
        return Err(FeatureError::NoResult("spectral flatness"));
    }

    let n = count as f64;
    let geometric_mean = (log_sum / n).exp();
    let arithmetic_mean = sum / n;
    Ok((geometric_mean / arithmetic_mean).min(1.0))
}

/// Flatness in dB: `10 * log10(flatness)`, with non-positive input clamped to [`LOG_FLOOR`].
pub fn flatness_db(flatness: f64) -> f64 {
    let flatness = if flatness > 0.0 { flatness } else { LOG_FLOOR };
    10.0 * flatness.log10()
}

/// Tonality coefficient from dB flatness: `min(db / -60, 1)`.
///
/// White noise (0 dB) maps to 0, anything at or below -60 dB to 1.
pub fn tonality(flatness_db: f64) -> f64 {
    (flatness_db / TONALITY_SATURATION_DB).min(1.0)
}

/// Spectral rolloff bin.
///
/// Smallest bin `b` such that the cumulative sum of bins `0..=b` reaches
/// `fraction` of the total. A fraction of 1 selects the whole band, i.e. the
/// last bin. `fraction` must lie in `[0, 1]`.
pub fn spectral_rolloff(spectrum: &Spectrum, fraction: f64) -> Result<usize> {
    check_fraction("rolloff_fraction", fraction)?;
    if spectrum.is_empty() {
        return Err(FeatureError::invalid("spectrum", "spectrum has no bins"));
    }

    let last = spectrum.len() - 1;
    if fraction >= 1.0 {
        return Ok(last);
    }

    let total: f64 = spectrum.as_slice().iter().sum();
    let target = total * fraction;

    let mut cumulative = 0.0;
    for (i, &m) in spectrum.as_slice().iter().enumerate() {
        cumulative += m;
        if cumulative >= target {
            return Ok(i);
        }
    }

    Ok(last)
}

/// Spectral rolloff in Hz.
pub fn spectral_rolloff_hz(spectrum: &Spectrum, fraction: f64) -> Result<f64> {
    spectral_rolloff(spectrum, fraction).map(|bin| spectrum.frequency(bin))
}
