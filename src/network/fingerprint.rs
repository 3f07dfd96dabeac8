use serde::Serialize;

use crate::network::network::NeuralNetwork;

#[derive(Serialize)]
struct CanonicalLayer<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    neuron_count: usize,
}

#[derive(Serialize)]
struct CanonicalConnection<'a> {
    source: &'a str,
    target: &'a str,
    /// Weight in thousandths; integer so -0.0 and float formatting never leak in.
    weight_milli: i64,
}

#[derive(Serialize)]
struct CanonicalNetwork<'a> {
    layers: Vec<CanonicalLayer<'a>>,
    connections: Vec<CanonicalConnection<'a>>,
    activation_function: &'a str,
    learning_rate: f64,
    regularization: &'a str,
    optimizer: &'a str,
}

/// Rounds a weight to 3 decimal places, expressed in thousandths.
fn round_milli(weight: f64) -> i64 {
    (weight * 1000.0).round() as i64
}

fn canonical_form(network: &NeuralNetwork) -> String {
    // Input, hidden, output; stable sort keeps document order among hidden layers.
    let mut ordered: Vec<_> = network.layers.iter().collect();
    ordered.sort_by_key(|l| l.kind);
    let layers = ordered
        .into_iter()
        .map(|l| CanonicalLayer { kind: l.kind.as_str(), neuron_count: l.neurons.len() })
        .collect();

    let mut connections: Vec<CanonicalConnection> = network
        .connections
        .iter()
        .map(|c| CanonicalConnection {
            source: &c.source_id,
            target: &c.target_id,
            weight_milli: round_milli(c.weight),
        })
        .collect();
    connections.sort_by(|a, b| {
        (a.source, a.target, a.weight_milli).cmp(&(b.source, b.target, b.weight_milli))
    });

    let canonical = CanonicalNetwork {
        layers,
        connections,
        activation_function: network.activation_function.as_str(),
        learning_rate: network.learning_rate,
        regularization: network.regularization.as_str(),
        optimizer: network.optimizer.as_str(),
    };
    // Serializing plain structs of strings and numbers cannot fail.
    serde_json::to_string(&canonical).unwrap_or_default()
}

/// Polynomial (×31) string hash over 64 bits.
fn hash_str(s: &str) -> u64 {
    s.bytes()
        .fold(0u64, |h, b| h.wrapping_shl(5).wrapping_sub(h).wrapping_add(b as u64))
}

/// Deterministic content key for a network.
///
/// Covers layer neuron counts, weights rounded to 3 decimals and the four
/// hyperparameters. Layers and connections are put in a canonical order
/// first, so document order does not affect the result. Rendered as `0x`
/// followed by 64 hex digits.
pub fn fingerprint(network: &NeuralNetwork) -> String {
    let canonical = canonical_form(network);
    format!("0x{:064x}", hash_str(&canonical))
}
