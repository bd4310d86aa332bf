//! Mel filterbank and MFCC.

use std::f64::consts::PI;

use crate::error::{FeatureError, Result};
use crate::spectrum::{LOG_FLOOR, Spectrum};

/// Default number of mel filters.
pub const DEFAULT_MEL_FILTERS: usize = 13;

/// Default lower edge of the filterbank in Hz.
pub const DEFAULT_MEL_LOW_HZ: f64 = 20.0;

/// Default upper edge of the filterbank in Hz (limited to Nyquist when built).
pub const DEFAULT_MEL_HIGH_HZ: f64 = 20000.0;

/// Convert Hz to mel (natural-log form, 1127 · ln(1 + f/700)).
pub fn hz_to_mel(hz: f64) -> f64 {
    1127.0 * (1.0 + hz / 700.0).ln()
}

/// Convert mel to Hz.
pub fn mel_to_hz(mel: f64) -> f64 {
    700.0 * ((mel / 1127.0).exp() - 1.0)
}

/// Peak height of each triangular filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GainMode {
    /// Every filter peaks at 1.
    #[default]
    EqualGain,
    /// Every filter has the same area; the first filter peaks at 1.
    EqualArea,
}

/// Shape of a mel filterbank, independent of the spectrum it is applied to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MelSettings {
    /// Number of triangular filters.
    pub filters: usize,
    /// Lower edge in Hz.
    pub low_hz: f64,
    /// Upper edge in Hz.
    pub high_hz: f64,
    /// Peak normalisation.
    pub gain: GainMode,
}

impl Default for MelSettings {
    fn default() -> Self {
        Self {
            filters: DEFAULT_MEL_FILTERS,
            low_hz: DEFAULT_MEL_LOW_HZ,
            high_hz: DEFAULT_MEL_HIGH_HZ,
            gain: GainMode::EqualGain,
        }
    }
}

/// Cache key for a built filterbank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MelKey {
    num_bins: usize,
    nyquist_bits: u64,
    low_bits: u64,
    high_bits: u64,
    filters: usize,
    gain: GainMode,
}

impl MelKey {
    /// Key for a filterbank over `num_bins` bins up to `nyquist` Hz.
    pub fn new(num_bins: usize, nyquist: f64, settings: &MelSettings) -> Self {
        Self {
            num_bins,
            nyquist_bits: nyquist.to_bits(),
            low_bits: settings.low_hz.to_bits(),
            high_bits: settings.high_hz.to_bits(),
            filters: settings.filters,
            gain: settings.gain,
        }
    }
}

/// Triangular filters spaced evenly on the mel scale.
#[derive(Debug, Clone, PartialEq)]
pub struct MelFilterbank {
    filters: Vec<Vec<f64>>,
    num_bins: usize,
}

impl MelFilterbank {
    /// Build a filterbank for a spectrum of `num_bins` bins spanning `0..nyquist` Hz.
    ///
    /// Filter `m` rises from mel point `m` to `m + 1` and falls to `m + 2`,
    /// evaluated at each bin's centre frequency. The upper edge is clamped to
    /// Nyquist.
    pub fn new(num_bins: usize, nyquist: f64, settings: &MelSettings) -> Result<Self> {
        Self::check(num_bins, nyquist, settings)?;
        Ok(Self::build(num_bins, nyquist, settings))
    }

    pub(crate) fn check(num_bins: usize, nyquist: f64, settings: &MelSettings) -> Result<()> {
        if num_bins == 0 {
            return Err(FeatureError::invalid("num_bins", "must be nonzero"));
        }
        if !(nyquist.is_finite() && nyquist > 0.0) {
            return Err(FeatureError::invalid("nyquist", format!("{nyquist} must be positive")));
        }
        if settings.filters == 0 {
            return Err(FeatureError::invalid("mel_filters", "must be at least 1"));
        }
        let high_hz = settings.high_hz.min(nyquist);
        if !(settings.low_hz >= 0.0 && settings.low_hz < high_hz) {
            return Err(FeatureError::invalid(
                "mel_low_hz",
                format!(
                    "band {}..{} Hz is empty below Nyquist {nyquist}",
                    settings.low_hz, settings.high_hz
                ),
            ));
        }
        Ok(())
    }

    pub(crate) fn build(num_bins: usize, nyquist: f64, settings: &MelSettings) -> Self {
        let high_hz = settings.high_hz.min(nyquist);
        let count = settings.filters;
        let mel_low = hz_to_mel(settings.low_hz);
        let mel_step = (hz_to_mel(high_hz) - mel_low) / (count + 1) as f64;
        let edges: Vec<f64> = (0..count + 2)
            .map(|i| mel_to_hz(mel_low + mel_step * i as f64))
            .collect();

        let first_width = edges[2] - edges[0];
        let bin_hz = nyquist / num_bins as f64;

        let filters = (0..count)
            .map(|m| {
                let (left, centre, right) = (edges[m], edges[m + 1], edges[m + 2]);
                let height = match settings.gain {
                    GainMode::EqualGain => 1.0,
                    GainMode::EqualArea => first_width / (right - left),
                };
                (0..num_bins)
                    .map(|k| {
                        let f = k as f64 * bin_hz;
                        let weight = if f >= left && f <= centre {
                            (f - left) / (centre - left)
                        } else if f > centre && f <= right {
                            (right - f) / (right - centre)
                        } else {
                            0.0
                        };
                        weight * height
                    })
                    .collect()
            })
            .collect();

        #[cfg(feature = "tracing")]
        tracing::debug!(num_bins, nyquist, filters = count, "built mel filterbank");

        Self { filters, num_bins }
    }

    /// Weighted magnitude sum per filter.
    pub fn apply(&self, spectrum: &[f64]) -> Vec<f64> {
        self.filters
            .iter()
            .map(|filter| filter.iter().zip(spectrum).map(|(&w, &s)| w * s).sum())
            .collect()
    }

    /// Filter weights, one row per filter.
    pub fn filters(&self) -> &[Vec<f64>] {
        &self.filters
    }

    /// Number of filters.
    pub fn num_filters(&self) -> usize {
        self.filters.len()
    }

    /// Number of spectrum bins each filter spans.
    pub fn num_bins(&self) -> usize {
        self.num_bins
    }
}

/// Unnormalised DCT-II: `X[k] = 2 Σ x[n] cos(π/N (n + ½) k)`.
///
/// The factor of 2 matches the common REDFT10 convention, so `X[0]` is twice
/// the sum of the input.
pub fn dct_ii(input: &[f64]) -> Vec<f64> {
    let n = input.len() as f64;
    (0..input.len())
        .map(|k| {
            2.0 * input
                .iter()
                .enumerate()
                .map(|(i, &x)| x * (PI / n * (i as f64 + 0.5) * k as f64).cos())
                .sum::<f64>()
        })
        .collect()
}

/// Mel-frequency cepstral coefficients, one per filter.
///
/// Filter energies are log-compressed (natural log, floored at
/// [`LOG_FLOOR`]) and decorrelated with [`dct_ii`].
pub fn mfcc(spectrum: &Spectrum, filterbank: &MelFilterbank) -> Result<Vec<f64>> {
    if spectrum.len() != filterbank.num_bins() {
        return Err(FeatureError::invalid(
            "spectrum",
            format!(
                "{} bins but filterbank expects {}",
                spectrum.len(),
                filterbank.num_bins()
            ),
        ));
    }

    let log_energies: Vec<f64> = filterbank
        .apply(spectrum.as_slice())
        .into_iter()
        .map(|e| e.max(LOG_FLOOR).ln())
        .collect();

    Ok(dct_ii(&log_energies))
}
