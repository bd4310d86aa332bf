//! Time-domain frame features.

/// Fraction of adjacent sample pairs whose signs differ.
///
/// A pair counts when `x[i] * x[i+1] < 0`, so exact zeros never cross. The
/// count is divided by the N−1 pairs; frames shorter than two samples have no
/// pairs and yield 0.
pub fn zero_crossing_rate(frame: &[f64]) -> f64 {
    if frame.len() < 2 {
        return 0.0;
    }
    let crossings = frame.windows(2).filter(|w| w[0] * w[1] < 0.0).count();
    crossings as f64 / (frame.len() - 1) as f64
}

/// Average squared difference function, lags `0..N`.
///
/// ```text
/// d[τ] = (1/N) Σ_{i=0}^{N-1-τ} (x[i] - x[i+τ])²
/// ```
pub fn average_square_difference(frame: &[f64]) -> Vec<f64> {
    let n = frame.len();
    (0..n)
        .map(|lag| {
            let sum: f64 = frame[..n - lag]
                .iter()
                .zip(&frame[lag..])
                .map(|(a, b)| (a - b) * (a - b))
                .sum();
            sum / n as f64
        })
        .collect()
}
