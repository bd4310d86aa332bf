//! Harmonic-structure features: tristimulus and odd/even ratio.

use crate::error::{FeatureError, Result};
use crate::peaks::{HarmonicSet, Partials};

/// Which tristimulus band to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TristimulusOrder {
    /// Share of the fundamental (harmonic 1).
    First,
    /// Share of harmonics 2 to 4.
    Second,
    /// Share of the fifth and later partials.
    Third,
}

impl TristimulusOrder {
    /// Whether this order needs a fundamental to number partials.
    pub fn needs_f0(self) -> bool {
        !matches!(self, TristimulusOrder::Third)
    }
}

impl TryFrom<u8> for TristimulusOrder {
    type Error = FeatureError;

    fn try_from(order: u8) -> Result<Self> {
        match order {
            1 => Ok(TristimulusOrder::First),
            2 => Ok(TristimulusOrder::Second),
            3 => Ok(TristimulusOrder::Third),
            other => Err(FeatureError::invalid(
                "tristimulus_order",
                format!("{other} is not 1, 2 or 3"),
            )),
        }
    }
}

/// Tristimulus: magnitude share of one group of partials.
///
/// Orders 1 and 2 number each partial as `round(f / f0)` and need a positive
/// `f0`. Order 3 counts nonzero partials from the lowest upwards and sums the
/// fifth and later, so `f0` is ignored. The denominator is the summed
/// magnitude of all nonzero partials; an empty group yields 0.
pub fn tristimulus<P: Partials>(
    partials: &P,
    order: TristimulusOrder,
    f0: Option<f64>,
) -> Result<f64> {
    let total: f64 = partials.iter_partials().map(|(_, m)| m).sum();
    if total == 0.0 {
        return Err(FeatureError::failure(
            "tristimulus",
            "no partial energy in frame",
        ));
    }

    let group: f64 = match order {
        TristimulusOrder::Third => partials.iter_partials().skip(4).map(|(_, m)| m).sum(),
        TristimulusOrder::First | TristimulusOrder::Second => {
            let f0 = match f0 {
                Some(f0) if f0.is_finite() && f0 > 0.0 => f0,
                other => {
                    return Err(FeatureError::invalid(
                        "f0",
                        format!("tristimulus order {order:?} needs a positive f0, got {other:?}"),
                    ));
                }
            };
            let range = if order == TristimulusOrder::First { 1..=1 } else { 2..=4 };
            partials
                .iter_partials()
                .filter(|&(f, _)| range.contains(&((f / f0).round() as i64)))
                .map(|(_, m)| m)
                .sum()
        }
    };

    Ok(group / total)
}

/// Ratio of odd-numbered to even-numbered harmonic magnitudes.
///
/// Harmonic numbers come from [`HarmonicSet::harmonic_number`]. A set with no
/// harmonics has no ratio; odd harmonics without any even ones give
/// `f64::INFINITY`.
pub fn odd_even_ratio(harmonics: &HarmonicSet) -> Result<f64> {
    let mut odd = 0.0;
    let mut even = 0.0;
    for (freq, mag) in harmonics.iter_partials() {
        if harmonics.harmonic_number(freq) % 2 == 1 {
            odd += mag;
        } else {
            even += mag;
        }
    }

    if odd == 0.0 && even == 0.0 {
        return Err(FeatureError::NoResult("odd/even ratio"));
    }
    if even == 0.0 {
        return Ok(f64::INFINITY);
    }
    Ok(odd / even)
}
