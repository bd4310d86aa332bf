//! Signal preparation: zero-padding a frame to a power-of-two length.

use crate::error::{FeatureError, Result};

/// A frame zero-padded to a power-of-two length.
#[derive(Debug, Clone, PartialEq)]
pub struct PaddedFrame {
    samples: Vec<f64>,
    original_len: usize,
}

impl PaddedFrame {
    /// Wrap samples whose length is already a nonzero power of two.
    pub fn from_power_of_two(samples: Vec<f64>) -> Result<Self> {
        if samples.is_empty() || !samples.len().is_power_of_two() {
            return Err(FeatureError::invalid(
                "frame",
                format!("length {} is not a nonzero power of two", samples.len()),
            ));
        }
        let original_len = samples.len();
        Ok(Self {
            samples,
            original_len,
        })
    }

    /// Padded samples.
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Padded length M.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false: padded frames hold at least one sample.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length N of the frame before padding.
    pub fn original_len(&self) -> usize {
        self.original_len
    }

    /// Consume and return the padded samples.
    pub fn into_inner(self) -> Vec<f64> {
        self.samples
    }
}

/// Smallest power of two greater than or equal to `n` (0 maps to 0).
pub fn padded_len(n: usize) -> usize {
    if n == 0 { 0 } else { n.next_power_of_two() }
}

/// Zero-pad `frame` to the next power-of-two length.
///
/// Samples `0..N` are copied and `N..M` are zero. A frame that is already a
/// power of two in length is returned unchanged. Empty frames are rejected:
/// there is no meaningful spectrum of zero samples.
pub fn pad(frame: &[f64]) -> Result<PaddedFrame> {
    if frame.is_empty() {
        return Err(FeatureError::invalid("frame", "cannot pad an empty frame"));
    }
    let mut samples = frame.to_vec();
    samples.resize(padded_len(frame.len()), 0.0);
    Ok(PaddedFrame {
        samples,
        original_len: frame.len(),
    })
}
