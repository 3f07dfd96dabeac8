use rand::Rng;

use crate::loss::mse::MseLoss;
use crate::network::forward::Topology;
use crate::network::network::NeuralNetwork;

/// One backpropagation step on a single sample; weights are updated in place.
///
/// Returns the MSE of the forward pass taken *before* the update.
pub fn train_step(
    network: &mut NeuralNetwork,
    input: &[f64],
    target: &[f64],
    learning_rate: f64,
) -> f64 {
    train_step_with_rng(network, input, target, learning_rate, &mut rand::thread_rng())
}

/// `train_step` with an explicit source of randomness for dropout.
///
/// Unresolvable connections (unknown neuron ids) are skipped; a network
/// missing its input or output layer is left untouched.
pub fn train_step_with_rng<R: Rng + ?Sized>(
    network: &mut NeuralNetwork,
    input: &[f64],
    target: &[f64],
    learning_rate: f64,
    rng: &mut R,
) -> f64 {
    let Some(topology) = Topology::of(network) else {
        return MseLoss::loss(&[], target);
    };
    let activation = network.activation_function;
    let pass = topology.forward(&network.connections, activation, input);
    let depth = topology.depth();

    // Output layer: (predicted - target) ⊙ act'(z)
    let mut gradients: Vec<Vec<f64>> = topology.layer_sizes.iter().map(|&n| vec![0.0; n]).collect();
    let out = depth - 1;
    let error = MseLoss::derivative(&pass.output, target);
    for (i, e) in error.iter().enumerate() {
        gradients[out][i] = e * activation.derivative(pass.layer_pre_activations[out - 1][i]);
    }

    // Hidden layers, back to front: Σ(downstream gradient · weight) ⊙ act'(z)
    for layer in (1..out).rev() {
        let mut errors = vec![0.0; topology.layer_sizes[layer]];
        for (conn, link) in network.connections.iter().zip(&topology.links) {
            let Some(link) = link else { continue };
            if link.source.0 == layer && link.target.0 == layer + 1 {
                errors[link.source.1] += gradients[layer + 1][link.target.1] * conn.weight;
            }
        }
        let pre = &pass.layer_pre_activations[layer - 1];
        for (i, e) in errors.into_iter().enumerate() {
            gradients[layer][i] = e * activation.derivative(pre[i]);
        }
    }

    let optimizer = network.optimizer;
    let regularization = network.regularization;
    for (conn, link) in network.connections.iter_mut().zip(&topology.links) {
        let Some(link) = link else {
            log::debug!("skipping connection '{}': unknown endpoint", conn.id);
            continue;
        };
        let source_output = pass.layer_outputs[link.source.0]
            .get(link.source.1)
            .copied()
            .unwrap_or(0.0);
        let target_gradient = gradients[link.target.0][link.target.1];

        let decay = regularization.decay_term(conn.weight);
        let update = optimizer.scale(learning_rate * target_gradient * source_output);
        let update = regularization.mask_update(update, rng);
        conn.weight -= update + decay;
    }

    MseLoss::loss(&pass.output, target)
}
