//! Spectral peak picking and harmonic matching.

use crate::error::{FeatureError, Result, check_fraction};
use crate::spectrum::Spectrum;

/// Default relative tolerance used when matching harmonics to k·f0.
pub const DEFAULT_HARMONIC_THRESHOLD: f64 = 0.2;

/// A set of spectral partials stored bin-parallel.
///
/// Both vectors have the spectrum's length; bins that carry no partial hold
/// 0.0 in both.
pub trait Partials {
    /// Partial magnitudes, zero where no partial was found.
    fn magnitudes(&self) -> &[f64];

    /// Partial frequencies in Hz, zero where no partial was found.
    fn frequencies(&self) -> &[f64];

    /// Iterate over `(frequency, magnitude)` of the nonzero partials, low to high bin.
    fn iter_partials(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.frequencies()
            .iter()
            .zip(self.magnitudes())
            .filter(|&(_, &m)| m != 0.0)
            .map(|(&f, &m)| (f, m))
    }

    /// Number of nonzero partials.
    fn count(&self) -> usize {
        self.magnitudes().iter().filter(|&&m| m != 0.0).count()
    }
}

/// Spectrum with every bin that is not a local maximum zeroed.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakSet {
    magnitudes: Vec<f64>,
    frequencies: Vec<f64>,
}

impl PeakSet {
    /// Frequency of the lowest nonzero peak, if any.
    pub fn lowest_frequency(&self) -> Option<f64> {
        self.iter_partials()
            .map(|(f, _)| f)
            .filter(|&f| f > 0.0)
            .min_by(f64::total_cmp)
    }
}

impl Partials for PeakSet {
    fn magnitudes(&self) -> &[f64] {
        &self.magnitudes
    }

    fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }
}

/// Peaks lying near integer multiples of a fundamental.
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonicSet {
    magnitudes: Vec<f64>,
    frequencies: Vec<f64>,
    f0: f64,
}

impl HarmonicSet {
    /// Fundamental the harmonics were matched against.
    pub fn f0(&self) -> f64 {
        self.f0
    }

    /// Harmonic number (nearest k ≥ 1) for a partial frequency.
    pub fn harmonic_number(&self, frequency: f64) -> usize {
        (frequency / self.f0).round().max(1.0) as usize
    }
}

impl Partials for HarmonicSet {
    fn magnitudes(&self) -> &[f64] {
        &self.magnitudes
    }

    fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }
}

/// Pick local maxima from a magnitude spectrum.
///
/// Bin `i` survives iff it is strictly greater than both neighbours and at
/// least `threshold` times the spectrum maximum; the first and last bin
/// never qualify. `threshold` is a fraction in `[0, 1]`.
///
/// Peak frequencies are refined by parabolic interpolation over the three
/// bins around the maximum; magnitudes keep their bin values.
pub fn find_peaks(spectrum: &Spectrum, threshold: f64) -> Result<PeakSet> {
    check_fraction("peak_threshold", threshold)?;

    let values = spectrum.as_slice();
    let n = values.len();
    let mut magnitudes = vec![0.0; n];
    let mut frequencies = vec![0.0; n];
    let floor = threshold * spectrum.max();

    for i in 1..n.saturating_sub(1) {
        let (left, centre, right) = (values[i - 1], values[i], values[i + 1]);
        if centre >= floor && centre > left && centre > right {
            let curvature = left - 2.0 * centre + right;
            let offset = if curvature != 0.0 {
                0.5 * (left - right) / curvature
            } else {
                0.0
            };
            magnitudes[i] = centre;
            frequencies[i] = (i as f64 + offset) * spectrum.bin_width();
        }
    }

    Ok(PeakSet {
        magnitudes,
        frequencies,
    })
}

/// Keep the peaks that lie within `threshold * f0` of some `k * f0`, k ≥ 1.
pub fn find_harmonics(peaks: &PeakSet, f0: f64, threshold: f64) -> Result<HarmonicSet> {
    check_fraction("harmonic_threshold", threshold)?;
    if !(f0.is_finite() && f0 > 0.0) {
        return Err(FeatureError::invalid(
            "f0",
            format!("{f0} must be finite and positive"),
        ));
    }

    let n = peaks.magnitudes.len();
    let mut magnitudes = vec![0.0; n];
    let mut frequencies = vec![0.0; n];

    for i in 0..n {
        let freq = peaks.frequencies[i];
        if peaks.magnitudes[i] == 0.0 || freq <= 0.0 {
            continue;
        }
        let ratio = freq / f0;
        let nearest = ratio.round().max(1.0);
        if (ratio - nearest).abs() <= threshold {
            magnitudes[i] = peaks.magnitudes[i];
            frequencies[i] = freq;
        }
    }

    Ok(HarmonicSet {
        magnitudes,
        frequencies,
        f0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spectrum(values: &[f64]) -> Spectrum {
        Spectrum::new(values.to_vec(), 100.0)
    }

    #[test]
    fn picks_local_maxima_only() {
        let s = spectrum(&[0.0, 1.0, 0.5, 0.2, 2.0, 0.1, 0.0]);
        let peaks = find_peaks(&s, 0.0).unwrap();
        assert_eq!(peaks.magnitudes(), &[0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0]);
        assert_eq!(peaks.count(), 2);
    }

    #[test]
    fn threshold_is_relative_to_maximum() {
        let s = spectrum(&[0.0, 1.0, 0.5, 0.2, 2.0, 0.1, 0.0]);
        let peaks = find_peaks(&s, 0.6).unwrap();
        assert_eq!(peaks.count(), 1);
        assert_eq!(peaks.magnitudes()[4], 2.0);
    }

    #[test]
    fn edge_bins_are_never_peaks() {
        let s = spectrum(&[5.0, 1.0, 0.0, 1.0, 5.0]);
        let peaks = find_peaks(&s, 0.0).unwrap();
        assert_eq!(peaks.count(), 0);
        assert_eq!(peaks.lowest_frequency(), None);
    }

    #[test]
    fn symmetric_peak_is_not_shifted() {
        let s = spectrum(&[0.0, 1.0, 3.0, 1.0, 0.0]);
        let peaks = find_peaks(&s, 0.0).unwrap();
        assert!((peaks.frequencies()[2] - 200.0).abs() < 1e-12);
    }

    #[test]
    fn asymmetric_peak_is_interpolated_towards_larger_neighbour() {
        let s = spectrum(&[0.0, 1.0, 3.0, 2.0, 0.0]);
        let peaks = find_peaks(&s, 0.0).unwrap();
        let f = peaks.frequencies()[2];
        assert!(f > 200.0 && f < 250.0, "interpolated frequency {f}");
    }

    #[test]
    fn peak_threshold_validated() {
        assert!(find_peaks(&spectrum(&[0.0, 1.0, 0.0]), 1.2).is_err());
    }

    #[test]
    fn harmonics_match_multiples_of_f0() {
        let peaks = PeakSet {
            magnitudes: vec![0.0, 1.0, 1.0, 0.5, 1.0],
            frequencies: vec![0.0, 100.0, 210.0, 350.0, 400.0],
        };

        let harmonics = find_harmonics(&peaks, 100.0, 0.2).unwrap();
        assert_eq!(harmonics.magnitudes(), &[0.0, 1.0, 1.0, 0.0, 1.0]);
        assert_eq!(harmonics.frequencies()[3], 0.0);
        assert_eq!(harmonics.f0(), 100.0);
        assert_eq!(harmonics.harmonic_number(400.0), 4);
    }

    #[test]
    fn partials_below_half_f0_are_not_harmonics() {
        let peaks = PeakSet {
            magnitudes: vec![0.0, 1.0, 1.0],
            frequencies: vec![0.0, 30.0, 95.0],
        };
        let harmonics = find_harmonics(&peaks, 100.0, 0.2).unwrap();
        assert_eq!(harmonics.magnitudes(), &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn harmonic_arguments_validated() {
        let peaks = PeakSet {
            magnitudes: vec![0.0],
            frequencies: vec![0.0],
        };
        assert!(find_harmonics(&peaks, 100.0, 1.5).is_err());
        assert!(find_harmonics(&peaks, 100.0, -0.5).is_err());
        assert!(find_harmonics(&peaks, 0.0, 0.2).is_err());
    }

    #[test]
    fn lowest_frequency_skips_empty_bins() {
        let peaks = PeakSet {
            magnitudes: vec![0.0, 0.0, 2.0, 0.0, 4.0],
            frequencies: vec![0.0, 0.0, 210.0, 0.0, 405.0],
        };
        assert_eq!(peaks.lowest_frequency(), Some(210.0));
    }
}
