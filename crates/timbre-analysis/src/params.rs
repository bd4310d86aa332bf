//! Per-feature parameters with documented defaults.

use crate::error::{FeatureError, Result, check_fraction};
use crate::mel::MelSettings;
use crate::peaks::DEFAULT_HARMONIC_THRESHOLD;
use crate::timbre::TristimulusOrder;

/// Default peak-picking threshold, as a fraction of the spectrum maximum.
pub const DEFAULT_PEAK_THRESHOLD: f64 = 0.10;

/// Default rolloff fraction.
pub const DEFAULT_ROLLOFF_FRACTION: f64 = 0.85;

/// Peak picking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakParams {
    /// Minimum peak height relative to the spectrum maximum, in `[0, 1]`.
    pub threshold: f64,
}

impl Default for PeakParams {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_PEAK_THRESHOLD,
        }
    }
}

/// Harmonic matching against a known fundamental.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HarmonicParams {
    /// Fundamental in Hz.
    pub f0: f64,
    /// Relative tolerance around each multiple of `f0`; 0.2 when unset.
    pub threshold: Option<f64>,
}

impl HarmonicParams {
    /// Match against `f0` with the default tolerance.
    pub fn new(f0: f64) -> Self {
        Self { f0, threshold: None }
    }

    /// Set the matching tolerance.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Tolerance in effect.
    pub fn threshold(&self) -> f64 {
        self.threshold.unwrap_or(DEFAULT_HARMONIC_THRESHOLD)
    }
}

/// Tristimulus.
///
/// With `f0` set, only the harmonics of `f0` are counted; otherwise every
/// spectral peak is. Orders 1 and 2 always need `f0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TristimulusParams {
    /// Which band.
    pub order: TristimulusOrder,
    /// Fundamental in Hz.
    pub f0: Option<f64>,
    /// Harmonic tolerance; only meaningful with `f0`.
    pub threshold: Option<f64>,
}

impl TristimulusParams {
    /// Tristimulus over all spectral peaks.
    pub fn new(order: TristimulusOrder) -> Self {
        Self {
            order,
            f0: None,
            threshold: None,
        }
    }

    /// Restrict to the harmonics of `f0`.
    pub fn with_f0(mut self, f0: f64) -> Self {
        self.f0 = Some(f0);
        self
    }

    /// Set the harmonic tolerance.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Harmonic matching parameters, if an `f0` was given.
    pub fn harmonics(&self) -> Result<Option<HarmonicParams>> {
        match (self.f0, self.threshold) {
            (Some(f0), threshold) => Ok(Some(HarmonicParams { f0, threshold })),
            (None, Some(_)) => Err(FeatureError::invalid(
                "harmonic_threshold",
                "a harmonic threshold needs an f0",
            )),
            (None, None) => Ok(None),
        }
    }
}

/// LPC cepstrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LpccParams {
    /// Number of cepstral coefficients; round(1.5 · (N−1)) when unset.
    pub order: Option<usize>,
}

/// Spectral rolloff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RolloffParams {
    /// Fraction of total magnitude below the rolloff point, in `[0, 1]`.
    pub fraction: f64,
}

impl RolloffParams {
    /// Build from a percentage in `[0, 100]`.
    pub fn from_percent(percent: f64) -> Result<Self> {
        let fraction = percent / 100.0;
        check_fraction("rolloff_percent", fraction)?;
        Ok(Self { fraction })
    }
}

impl Default for RolloffParams {
    fn default() -> Self {
        Self {
            fraction: DEFAULT_ROLLOFF_FRACTION,
        }
    }
}

/// Spectral flatness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlatnessParams {
    /// Report `10 · log10(flatness)` instead of the raw ratio.
    pub db: bool,
}

/// MFCC.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MfccParams {
    /// Filterbank shape.
    pub mel: MelSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        assert_eq!(PeakParams::default().threshold, 0.10);
        assert_eq!(RolloffParams::default().fraction, 0.85);
        assert!(!FlatnessParams::default().db);
        assert_eq!(LpccParams::default().order, None);
        assert_eq!(HarmonicParams::new(220.0).threshold(), 0.2);
        assert_eq!(MfccParams::default().mel.filters, 13);
    }

    #[test]
    fn rolloff_percent_conversion() {
        assert_eq!(RolloffParams::from_percent(50.0).unwrap().fraction, 0.5);
        assert!(RolloffParams::from_percent(120.0).is_err());
        assert!(RolloffParams::from_percent(-1.0).is_err());
    }

    #[test]
    fn tristimulus_harmonics_need_f0() {
        let all = TristimulusParams::new(TristimulusOrder::Third);
        assert_eq!(all.harmonics().unwrap(), None);

        let harmonic = all.with_f0(110.0).with_threshold(0.1);
        let params = harmonic.harmonics().unwrap().unwrap();
        assert_eq!(params.f0, 110.0);
        assert_eq!(params.threshold(), 0.1);

        let orphan = TristimulusParams::new(TristimulusOrder::Third).with_threshold(0.1);
        assert!(orphan.harmonics().is_err());
    }
}
