use serde::{Serialize, Deserialize};

use crate::data::dataset::Sample;
use crate::loss::mse::MseLoss;
use crate::network::forward::forward;
use crate::network::network::NeuralNetwork;

/// Accuracy and mean loss of a network over a sample set.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Evaluation {
    pub accuracy: f64,
    pub loss: f64,
}

/// Index of the maximum element; the first wins ties. `None` when empty.
pub fn argmax(v: &[f64]) -> Option<usize> {
    v.iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (i, &x)| match best {
            Some((_, b)) if b >= x => best,
            _ => Some((i, x)),
        })
        .map(|(i, _)| i)
}

/// Predicted class equals actual class. An empty output is never correct.
pub fn is_correct(output: &[f64], target: &[f64]) -> bool {
    match (argmax(output), argmax(target)) {
        (Some(p), Some(t)) => p == t,
        _ => false,
    }
}

/// Fraction of `samples` classified correctly; 0 for an empty set.
pub fn accuracy(network: &NeuralNetwork, samples: &[Sample]) -> f64 {
    evaluate(network, samples).accuracy
}

/// Accuracy and mean MSE in one pass, without touching any weight.
pub fn evaluate(network: &NeuralNetwork, samples: &[Sample]) -> Evaluation {
    if samples.is_empty() {
        return Evaluation::default();
    }
    let mut correct = 0usize;
    let mut total_loss = 0.0;
    for sample in samples {
        let output = forward(network, &sample.input).output;
        total_loss += MseLoss::loss(&output, &sample.target);
        if is_correct(&output, &sample.target) {
            correct += 1;
        }
    }
    let n = samples.len() as f64;
    Evaluation { accuracy: correct as f64 / n, loss: total_loss / n }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_prefers_first_on_ties() {
        assert_eq!(argmax(&[0.2, 0.9, 0.9]), Some(1));
        assert_eq!(argmax(&[0.0, 0.0]), Some(0));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn correctness_compares_classes() {
        assert!(is_correct(&[0.7, 0.3], &[1.0, 0.0]));
        assert!(!is_correct(&[0.1, 0.3], &[1.0, 0.0]));
        assert!(!is_correct(&[], &[1.0, 0.0]));
    }

    #[test]
    fn empty_set_evaluates_to_zero() {
        let net = NeuralNetwork::random(3, 3, 2);
        assert_eq!(evaluate(&net, &[]), Evaluation { accuracy: 0.0, loss: 0.0 });
    }

    #[test]
    fn counts_correct_samples() {
        let mut net = NeuralNetwork::random(2, 2, 2);
        // Identity-like wiring: input i drives hidden i drives output i.
        for c in &mut net.connections {
            let same = c.source_id.ends_with(&c.target_id[c.target_id.len() - 1..]);
            c.weight = if same { 1.0 } else { 0.0 };
        }
        let samples = vec![
            Sample { input: vec![1.0, 0.0], target: vec![1.0, 0.0] },
            Sample { input: vec![0.0, 1.0], target: vec![0.0, 1.0] },
            Sample { input: vec![1.0, 0.0], target: vec![0.0, 1.0] },
            Sample { input: vec![0.0, 1.0], target: vec![0.0, 1.0] },
        ];
        let eval = evaluate(&net, &samples);
        assert!((eval.accuracy - 0.75).abs() < 1e-12);
        assert!((eval.loss - 0.25).abs() < 1e-12);
    }
}
