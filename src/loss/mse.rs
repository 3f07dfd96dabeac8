pub struct MseLoss;

impl MseLoss {
    /// Scalar MSE: mean((predicted - expected)²) over the expected length.
    ///
    /// A missing prediction counts as 0, so a short output vector is charged
    /// the full error for every absent entry.
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        if expected.is_empty() {
            return 0.0;
        }
        let n = expected.len() as f64;
        expected.iter().enumerate()
            .map(|(i, t)| (predicted.get(i).copied().unwrap_or(0.0) - t).powi(2))
            .sum::<f64>() / n
    }

    /// Per-output error: predicted - expected
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted.iter().enumerate()
            .map(|(i, p)| p - expected.get(i).copied().unwrap_or(0.0))
            .collect()
    }
}
