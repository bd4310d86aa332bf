//! Linear prediction and LPC cepstrum
//!
//! The predictor polynomial is `A(z) = 1 + a[0] z^-1 + ... + a[p-1] z^-p`, so a
//! sample is predicted as `x̂[n] = -Σ a[k] x[n-k-1]`.
//!
//! ```text
//! frame ──► autocorrelate ──► lpc (Levinson-Durbin) ──► lpcc
//! ```

use crate::error::{FeatureError, Result};

/// Biased autocorrelation, lags `0..N`.
///
/// ```text
/// r[k] = (1/N) Σ_{i=0}^{N-1-k} x[i] · x[i+k]
/// ```
pub fn autocorrelate(frame: &[f64]) -> Vec<f64> {
    let n = frame.len();
    (0..n)
        .map(|lag| {
            let sum: f64 = frame[..n - lag]
                .iter()
                .zip(&frame[lag..])
                .map(|(a, b)| a * b)
                .sum();
            sum / n as f64
        })
        .collect()
}

/// Output of the Levinson-Durbin recursion.
#[derive(Debug, Clone, PartialEq)]
pub struct Lpc {
    /// Reflection (PARCOR) coefficients, one per order.
    pub reflection: Vec<f64>,
    /// Predictor coefficients `a[0..p]`.
    pub coefficients: Vec<f64>,
    /// Residual prediction-error energy after the last stage.
    pub error: f64,
}

impl Lpc {
    /// All-zero model of order `p`, reported for frames with no energy.
    pub fn zeroed(p: usize) -> Self {
        Self {
            reflection: vec![0.0; p],
            coefficients: vec![0.0; p],
            error: 0.0,
        }
    }

    /// Predictor order p.
    pub fn order(&self) -> usize {
        self.coefficients.len()
    }

    /// Cepstral length used when none is requested: round(1.5 · p).
    pub fn default_cepstrum_order(&self) -> usize {
        (1.5 * self.order() as f64).round() as usize
    }

    /// Zeroth cepstral coefficient, ln of the residual energy.
    pub fn log_gain(&self) -> f64 {
        self.error.ln()
    }
}

/// Levinson-Durbin recursion over an autocorrelation vector of length N.
///
/// Produces N−1 coefficients in O(N²). A zero lag-0 term (silent frame) has
/// no solution and yields [`FeatureError::NoResult`]. If the residual energy
/// reaches zero the signal is perfectly predicted and the remaining
/// higher-order coefficients stay zero.
pub fn lpc(autocorrelation: &[f64]) -> Result<Lpc> {
    if autocorrelation.len() < 2 {
        return Err(FeatureError::invalid(
            "autocorrelation",
            format!("need at least 2 lags, got {}", autocorrelation.len()),
        ));
    }

    let r = autocorrelation;
    let p = r.len() - 1;
    let mut coefficients = vec![0.0; p];
    let mut reflection = vec![0.0; p];
    let mut previous = vec![0.0; p];
    let mut error = r[0];

    if error <= 0.0 || !error.is_finite() {
        return Err(FeatureError::NoResult("lpc"));
    }

    for i in 0..p {
        let mut acc = -r[i + 1];
        for j in 0..i {
            acc -= coefficients[j] * r[i - j];
        }
        let k = acc / error;
        reflection[i] = k;

        previous[..i].copy_from_slice(&coefficients[..i]);
        for j in 0..i {
            coefficients[j] = previous[j] + k * previous[i - 1 - j];
        }
        coefficients[i] = k;

        error *= 1.0 - k * k;
        if error <= 0.0 {
            error = 0.0;
            break;
        }
    }

    Ok(Lpc {
        reflection,
        coefficients,
        error,
    })
}

/// Cepstral coefficients `c[1..=order]` of the all-pole model `1 / A(z)`.
///
/// ```text
/// c[n] = -a[n] - Σ_{k=1}^{n-1} (k/n) c[k] a[n-k]        1 ≤ n ≤ p
/// c[n] =       - Σ_{k=n-p}^{n-1} (k/n) c[k] a[n-k]      n > p
/// ```
///
/// `order` defaults to [`Lpc::default_cepstrum_order`] and must be at least 1.
/// A model whose residual energy is not strictly positive has no finite
/// log gain and is rejected as a computation failure.
pub fn lpcc(lpc: &Lpc, order: Option<usize>) -> Result<Vec<f64>> {
    let order = order.unwrap_or_else(|| lpc.default_cepstrum_order());
    if order == 0 {
        return Err(FeatureError::invalid("lpcc_order", "order must be at least 1"));
    }
    if !lpc.error.is_finite() || lpc.error <= 0.0 {
        return Err(FeatureError::failure(
            "lpcc",
            format!("residual energy {} is not a valid energy", lpc.error),
        ));
    }

    let p = lpc.order();
    // 1-based views: a[n] = coefficients[n-1], c[n] = cepstrum[n-1].
    let a = |n: usize| lpc.coefficients[n - 1];
    let mut cepstrum = vec![0.0; order];

    for n in 1..=order {
        let start = if n > p { n - p } else { 1 };
        let mut sum = 0.0;
        for k in start..n {
            sum += k as f64 * cepstrum[k - 1] * a(n - k);
        }
        let direct = if n <= p { a(n) } else { 0.0 };
        cepstrum[n - 1] = -direct - sum / n as f64;
    }

    if cepstrum.iter().any(|c| !c.is_finite()) {
        return Err(FeatureError::failure("lpcc", "recursion diverged"));
    }
    Ok(cepstrum)
}
