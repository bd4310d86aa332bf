//! Wavelet pitch tracking.
//!
//! Pitch is read off the spacing of waveform extrema, checked across
//! successive levels of a Haar-style lifting decomposition (pairwise
//! averaging). Two consecutive levels that agree on the dominant spacing
//! settle the period.
//!
//! ```text
//! level 0 ─ extrema spacing d0
//!    │ average pairs
//! level 1 ─ extrema spacing d1 ── |2·d1 − d0| ≤ 2δ ? ──► f0 = sr / d0
//!    │
//!   ...  (at most 6 levels)
//! ```

use crate::error::{Result, check_sample_rate};
use crate::pitch::NO_PITCH;

/// Maximum number of decomposition levels tried.
const MAX_LEVELS: u32 = 6;

/// Highest pitch the tracker looks for, in Hz.
const MAX_FREQUENCY: f64 = 3000.0;

/// Extrema are paired with their next `DIFFERENCE_LEVELS - 1` successors.
const DIFFERENCE_LEVELS: usize = 3;

/// Extrema below this fraction of the peak amplitude are ignored.
const MAXIMA_THRESHOLD_RATIO: f64 = 0.75;

/// Relative deviation under which two pitches are considered the same.
const ACCEPTED_ERROR: f64 = 0.2;

/// Confidence ceiling of the tracker.
const MAX_CONFIDENCE: u32 = 5;

/// Frame-to-frame smoothing state for wavelet pitch estimates.
///
/// A fresh tracker reports each frame's raw estimate. Fed consecutive frames,
/// it holds a trusted pitch through short dropouts and folds octave errors
/// back onto it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WaveletPitchTracker {
    previous: Option<f64>,
    confidence: u32,
}

impl WaveletPitchTracker {
    /// Create a tracker with no history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current confidence in the previous pitch.
    pub fn confidence(&self) -> u32 {
        self.confidence
    }

    /// Estimate the pitch of `frame`, updating the tracker state.
    ///
    /// Returns [`NO_PITCH`] when no pitch is found and none is trusted.
    pub fn process(&mut self, frame: &[f64], sample_rate: f64) -> Result<f64> {
        check_sample_rate(sample_rate)?;
        let raw = raw_wavelet_pitch(frame, sample_rate);
        Ok(self.smooth(raw).unwrap_or(NO_PITCH))
    }

    fn smooth(&mut self, pitch: Option<f64>) -> Option<f64> {
        let near = |a: f64, b: f64| (a - b).abs() / b < ACCEPTED_ERROR;
        let trusted = self.confidence + 2 >= MAX_CONFIDENCE;

        let estimate = match (pitch, self.previous) {
            (Some(pitch), None) => {
                self.previous = Some(pitch);
                self.confidence = 1;
                Some(pitch)
            }
            (Some(pitch), Some(previous)) if near(previous, pitch) => {
                self.previous = Some(pitch);
                self.confidence = (self.confidence + 1).min(MAX_CONFIDENCE);
                Some(pitch)
            }
            (Some(pitch), Some(previous)) if trusted && near(previous, 2.0 * pitch) => {
                self.previous = Some(2.0 * pitch);
                Some(2.0 * pitch)
            }
            (Some(pitch), Some(previous)) if trusted && near(previous, 0.5 * pitch) => {
                self.previous = Some(0.5 * pitch);
                Some(0.5 * pitch)
            }
            (Some(pitch), Some(previous)) => {
                if self.confidence >= 1 {
                    self.confidence -= 1;
                    Some(previous)
                } else {
                    self.previous = Some(pitch);
                    self.confidence = 1;
                    Some(pitch)
                }
            }
            (None, Some(previous)) => {
                if self.confidence >= 1 {
                    self.confidence -= 1;
                    Some(previous)
                } else {
                    self.previous = None;
                    None
                }
            }
            (None, None) => None,
        };

        if self.confidence >= 1 { estimate } else { None }
    }
}

/// Wavelet pitch of a single frame, with no history.
pub fn wavelet_f0(frame: &[f64], sample_rate: f64) -> Result<f64> {
    WaveletPitchTracker::new().process(frame, sample_rate)
}

/// Indices of the first maximum after each upward zero crossing and the first
/// minimum after each downward one, keeping extrema at least `threshold` in
/// magnitude and more than `delta` samples apart.
fn extrema(samples: &[f64], dc: f64, threshold: f64, delta: usize) -> (Vec<usize>, Vec<usize>) {
    let mut mins = Vec::new();
    let mut maxs = Vec::new();
    let mut last_min: Option<usize> = None;
    let mut last_max: Option<usize> = None;
    let mut seek_min = false;
    let mut seek_max = false;
    let mut previous_slope: Option<f64> = None;
    let spaced = |last: Option<usize>, i: usize| last.is_none_or(|last| i > last.saturating_add(delta));

    for i in 2..samples.len() {
        let current = samples[i] - dc;
        let before = samples[i - 1] - dc;

        if before <= 0.0 && current > 0.0 {
            seek_max = true;
        }
        if before >= 0.0 && current < 0.0 {
            seek_min = true;
        }

        let slope = current - before;
        let loud = current.abs() >= threshold;
        if let Some(previous) = previous_slope {
            if seek_min && previous < 0.0 && slope >= 0.0 && loud && spaced(last_min, i) {
                mins.push(i);
                last_min = Some(i);
                seek_min = false;
            }
            if seek_max && previous > 0.0 && slope <= 0.0 && loud && spaced(last_max, i) {
                maxs.push(i);
                last_max = Some(i);
                seek_max = false;
            }
        }
        previous_slope = Some(slope);
    }

    (mins, maxs)
}

/// Spacing histogram of each extremum to its next few successors.
fn spacing_histogram(len: usize, mins: &[usize], maxs: &[usize]) -> Vec<u32> {
    let mut histogram = vec![0u32; len];
    for positions in [mins, maxs] {
        for (i, &from) in positions.iter().enumerate() {
            for &to in positions.iter().skip(i + 1).take(DIFFERENCE_LEVELS - 1) {
                histogram[to.abs_diff(from)] += 1;
            }
        }
    }
    histogram
}

/// Dominant spacing: the histogram window of ±`delta` with the largest count,
/// averaged over that window. Ties prefer a spacing twice the current best.
fn mode_distance(histogram: &[u32], delta: usize) -> Option<f64> {
    let window = |centre: usize| {
        let end = centre.saturating_add(delta).saturating_add(1).min(histogram.len());
        centre.saturating_sub(delta)..end
    };

    let mut best: Option<(usize, u32)> = None;
    for i in 0..histogram.len() {
        let summed: u32 = histogram[window(i)].iter().sum();
        best = match best {
            None => Some((i, summed)),
            Some((best_i, best_sum)) if summed == best_sum && i == 2 * best_i => Some((i, summed)),
            Some((_, best_sum)) if summed > best_sum => Some((i, summed)),
            keep => keep,
        };
    }
    let (centre, _) = best?;

    let (mut weighted, mut count) = (0.0, 0.0);
    for d in window(centre) {
        weighted += d as f64 * histogram[d] as f64;
        count += histogram[d] as f64;
    }
    (count > 0.0).then(|| weighted / count)
}

/// Raw per-frame pitch, `None` when no level settles.
fn raw_wavelet_pitch(frame: &[f64], sample_rate: f64) -> Option<f64> {
    if frame.len() < 2 {
        return None;
    }

    let mut samples = frame.to_vec();
    let dc = samples.iter().sum::<f64>() / samples.len() as f64;
    let (min, max) = samples
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));
    let threshold = (max - dc).max(dc - min) * MAXIMA_THRESHOLD_RATIO;

    let mut previous_mode: Option<f64> = None;
    for level in 0..MAX_LEVELS {
        if samples.len() < 2 {
            return None;
        }
        let scale = f64::from(1u32 << level);
        let delta = (sample_rate / (scale * MAX_FREQUENCY)) as usize;

        let (mins, maxs) = extrema(&samples, dc, threshold, delta);
        if mins.is_empty() && maxs.is_empty() {
            return None;
        }

        let histogram = spacing_histogram(samples.len(), &mins, &maxs);
        let mode = mode_distance(&histogram, delta);

        if let (Some(mode), Some(previous)) = (mode, previous_mode) {
            if (2.0 * mode - previous).abs() <= 2.0 * delta as f64 {
                return Some(sample_rate / (scale / 2.0 * previous));
            }
        }
        previous_mode = mode;

        samples = samples
            .chunks_exact(2)
            .map(|pair| (pair[0] + pair[1]) / 2.0)
            .collect();
    }

    None
}
