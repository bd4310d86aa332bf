//! Bark-band aggregation and loudness.
//!
//! Band edges follow the critical-band table of Zwicker, extended up to
//! 27 kHz so sample rates up to 54 kHz are covered.

use crate::error::{FeatureError, Result, check_sample_rate};
use crate::spectrum::Spectrum;

/// Number of Bark bands.
pub const BARK_BANDS: usize = 25;

/// Number of band boundaries (one more than bands).
pub const BARK_LIMITS: usize = BARK_BANDS + 1;

/// Specific-loudness exponent applied to each band.
pub const LOUDNESS_EXPONENT: f64 = 0.23;

/// Critical-band edges in Hz.
pub const BARK_EDGES_HZ: [f64; 27] = [
    0.0, 100.0, 200.0, 300.0, 400.0, 510.0, 630.0, 770.0, 920.0, 1080.0, 1270.0, 1480.0, 1720.0,
    2000.0, 2320.0, 2700.0, 3150.0, 3700.0, 4400.0, 5300.0, 6400.0, 7700.0, 9500.0, 12000.0,
    15500.0, 20500.0, 27000.0,
];

/// Bin indices of the Bark band boundaries for one (M, sample rate) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandLimits([usize; BARK_LIMITS]);

impl BandLimits {
    /// Boundary bin indices, ascending.
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Half-open bin range `[start, end)` of band `band`, `None` past the
    /// last of the [`BARK_BANDS`] bands.
    pub fn band(&self, band: usize) -> Option<(usize, usize)> {
        Some((*self.0.get(band)?, *self.0.get(band.checked_add(1)?)?))
    }
}

/// Boundary bins for an FFT of length `fft_size` at `sample_rate`.
///
/// Boundary `i` is `floor(edge[i] / sample_rate * fft_size)`.
pub fn bark_band_limits(fft_size: usize, sample_rate: f64) -> Result<BandLimits> {
    check_band_arguments(fft_size, sample_rate)?;
    Ok(compute_band_limits(fft_size, sample_rate))
}

pub(crate) fn check_band_arguments(fft_size: usize, sample_rate: f64) -> Result<()> {
    check_sample_rate(sample_rate)?;
    if fft_size == 0 {
        return Err(FeatureError::invalid("fft_size", "must be nonzero"));
    }
    Ok(())
}

pub(crate) fn compute_band_limits(fft_size: usize, sample_rate: f64) -> BandLimits {
    let mut limits = [0usize; BARK_LIMITS];
    for (limit, &edge) in limits.iter_mut().zip(BARK_EDGES_HZ.iter()) {
        *limit = (edge / sample_rate * fft_size as f64) as usize;
    }
    #[cfg(feature = "tracing")]
    tracing::debug!(fft_size, sample_rate, "built bark band limits");
    BandLimits(limits)
}

/// Sum of spectrum magnitudes within each Bark band.
///
/// Bands reaching past the end of the spectrum are truncated, so bands above
/// Nyquist are zero.
pub fn bark_coefficients(spectrum: &Spectrum, limits: &BandLimits) -> [f64; BARK_BANDS] {
    let values = spectrum.as_slice();
    let mut bands = [0.0; BARK_BANDS];
    for (energy, edges) in bands.iter_mut().zip(limits.as_slice().windows(2)) {
        let (start, end) = (edges[0], edges[1].min(values.len()));
        if start < end {
            *energy = values[start..end].iter().sum();
        }
    }
    bands
}

/// Total loudness: sum of band energies raised to [`LOUDNESS_EXPONENT`].
///
/// The compressive exponent means quiet bands add comparatively little, so
/// the sum is carried by the strongest bands. Only the first
/// [`BARK_BANDS`] entries are used.
pub fn loudness(bark_coefficients: &[f64]) -> f64 {
    bark_coefficients
        .iter()
        .take(BARK_BANDS)
        .map(|&band| band.max(0.0).powf(LOUDNESS_EXPONENT))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_scale_with_fft_size() {
        let limits = bark_band_limits(1024, 44100.0).unwrap();
        assert_eq!(limits.as_slice()[0], 0);
        // 100 Hz at 44100/1024 Hz per bin.
        assert_eq!(limits.as_slice()[1], 2);
        assert_eq!(limits.as_slice()[25], (20500.0 / 44100.0 * 1024.0) as usize);
        assert!(limits.as_slice().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn band_past_the_last_is_none() {
        let limits = bark_band_limits(1024, 44100.0).unwrap();
        assert_eq!(limits.band(0), Some((0, 2)));
        assert!(limits.band(BARK_BANDS - 1).is_some());
        assert_eq!(limits.band(BARK_BANDS), None);
        assert_eq!(limits.band(usize::MAX), None);
    }

    #[test]
    fn limits_reject_bad_arguments() {
        assert!(bark_band_limits(0, 44100.0).is_err());
        assert!(bark_band_limits(1024, 0.0).is_err());
    }

    #[test]
    fn flat_spectrum_band_sums_are_band_widths() {
        let limits = bark_band_limits(1024, 44100.0).unwrap();
        let spectrum = Spectrum::new(vec![1.0; 512], 44100.0 / 1024.0);
        let bands = bark_coefficients(&spectrum, &limits);
        for (i, &energy) in bands.iter().enumerate() {
            let (start, end) = limits.band(i).unwrap();
            assert_eq!(energy, (end.min(512) - start.min(end.min(512))) as f64);
        }
    }

    #[test]
    fn bands_past_nyquist_are_zero() {
        // At 8 kHz only bands below 4 kHz have bins.
        let limits = bark_band_limits(256, 8000.0).unwrap();
        let spectrum = Spectrum::new(vec![1.0; 128], 8000.0 / 256.0);
        let bands = bark_coefficients(&spectrum, &limits);
        assert!(bands[..17].iter().all(|&b| b > 0.0));
        assert!(bands[20..].iter().all(|&b| b == 0.0));
    }

    #[test]
    fn loudness_of_silence_is_zero() {
        assert_eq!(loudness(&[0.0; BARK_BANDS]), 0.0);
    }

    #[test]
    fn loudness_uses_compressive_exponent() {
        let mut bands = [0.0; BARK_BANDS];
        bands[3] = 1000.0;
        assert!((loudness(&bands) - 1000.0_f64.powf(0.23)).abs() < 1e-12);

        bands[4] = 1.0;
        assert!((loudness(&bands) - (1000.0_f64.powf(0.23) + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn loudness_ignores_extra_entries() {
        let mut bands = vec![1.0; BARK_BANDS + 3];
        bands[BARK_BANDS] = 1e9;
        assert!((loudness(&bands) - BARK_BANDS as f64).abs() < 1e-12);
    }
}
