use std::collections::HashMap;

use crate::activation::activation::ActivationFunction;
use crate::network::network::{Connection, LayerType, NeuralNetwork};

/// Result of one forward evaluation.
///
/// `layer_outputs[0]` is the raw input; `layer_pre_activations[k]` belongs to
/// `layer_outputs[k + 1]`. Both are kept so backprop never recomputes them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForwardPass {
    pub output: Vec<f64>,
    pub layer_outputs: Vec<Vec<f64>>,
    pub layer_pre_activations: Vec<Vec<f64>>,
}

impl ForwardPass {
    /// True when the network could not be evaluated (missing layers).
    pub fn is_empty(&self) -> bool {
        self.layer_outputs.is_empty()
    }
}

/// Position of a neuron as (layer depth, index within layer).
pub(crate) type Slot = (usize, usize);

/// A connection resolved to neuron slots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Link {
    pub source: Slot,
    pub target: Slot,
}

/// Evaluation order and id resolution for one network.
///
/// Owns no borrow of the network, so the trainer can hold it while writing
/// weights back.
#[derive(Debug, Clone)]
pub(crate) struct Topology {
    pub layer_sizes: Vec<usize>,
    /// One entry per connection, `None` when an endpoint id is unknown.
    pub links: Vec<Option<Link>>,
}

impl Topology {
    /// Orders layers input, hidden..., output. `None` if input or output is missing.
    pub fn of(network: &NeuralNetwork) -> Option<Topology> {
        let input = network.layer(LayerType::Input)?;
        let output = network.layer(LayerType::Output)?;
        let ordered: Vec<_> = std::iter::once(input)
            .chain(network.layers.iter().filter(|l| l.kind == LayerType::Hidden))
            .chain(std::iter::once(output))
            .collect();

        let mut slots: HashMap<&str, Slot> = HashMap::new();
        for (depth, layer) in ordered.iter().enumerate() {
            for (i, neuron) in layer.neurons.iter().enumerate() {
                slots.entry(neuron.id.as_str()).or_insert((depth, i));
            }
        }

        let links = network
            .connections
            .iter()
            .map(|c| {
                let source = *slots.get(c.source_id.as_str())?;
                let target = *slots.get(c.target_id.as_str())?;
                Some(Link { source, target })
            })
            .collect();

        Some(Topology {
            layer_sizes: ordered.iter().map(|l| l.neurons.len()).collect(),
            links,
        })
    }

    pub fn depth(&self) -> usize {
        self.layer_sizes.len()
    }

    /// Layer-by-layer propagation. Inputs missing from `input` and links
    /// whose source has no value yet contribute nothing to the sum.
    pub fn forward(
        &self,
        connections: &[Connection],
        activation: ActivationFunction,
        input: &[f64],
    ) -> ForwardPass {
        let mut layer_outputs: Vec<Vec<f64>> = Vec::with_capacity(self.depth());
        let mut layer_pre_activations: Vec<Vec<f64>> = Vec::with_capacity(self.depth() - 1);
        layer_outputs.push(input.to_vec());

        for depth in 1..self.depth() {
            let mut sums = vec![0.0; self.layer_sizes[depth]];
            for (conn, link) in connections.iter().zip(&self.links) {
                let Some(link) = link else { continue };
                if link.target.0 != depth {
                    continue;
                }
                let source_value = layer_outputs
                    .get(link.source.0)
                    .and_then(|values| values.get(link.source.1));
                if let Some(value) = source_value {
                    sums[link.target.1] += value * conn.weight;
                }
            }
            let outputs = sums.iter().map(|&z| activation.function(z)).collect();
            layer_pre_activations.push(sums);
            layer_outputs.push(outputs);
        }

        ForwardPass {
            output: layer_outputs.last().cloned().unwrap_or_default(),
            layer_outputs,
            layer_pre_activations,
        }
    }
}

/// Computes activations for every neuron given `input`.
///
/// A network missing its input or output layer yields an empty pass rather
/// than an error, so a half-edited network never crashes the caller.
pub fn forward(network: &NeuralNetwork, input: &[f64]) -> ForwardPass {
    match Topology::of(network) {
        Some(topology) => topology.forward(&network.connections, network.activation_function, input),
        None => ForwardPass::default(),
    }
}

impl NeuralNetwork {
    /// Output-layer activations for `input`; empty for a malformed network.
    pub fn predict(&self, input: &[f64]) -> Vec<f64> {
        forward(self, input).output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::network::NeuralNetwork;

    fn net_with_weights(weight: f64) -> NeuralNetwork {
        let mut net = NeuralNetwork::random(2, 2, 1);
        for c in &mut net.connections {
            c.weight = weight;
        }
        net
    }

    #[test]
    fn hand_computed_pass() {
        let mut net = net_with_weights(0.5);
        net.activation_function = ActivationFunction::Relu;
        let pass = forward(&net, &[1.0, 2.0]);
        // hidden: 0.5*1 + 0.5*2 = 1.5 each; output: 0.5*1.5*2 = 1.5
        assert_eq!(pass.layer_outputs[0], vec![1.0, 2.0]);
        assert_eq!(pass.layer_pre_activations[0], vec![1.5, 1.5]);
        assert_eq!(pass.output, vec![1.5]);
        assert_eq!(pass.layer_outputs.len(), 3);
        assert_eq!(pass.layer_pre_activations.len(), 2);
    }

    #[test]
    fn negative_sums_are_clamped_by_relu() {
        let net = net_with_weights(-1.0);
        let pass = forward(&net, &[1.0, 1.0]);
        assert_eq!(pass.layer_pre_activations[0], vec![-2.0, -2.0]);
        assert_eq!(pass.output, vec![0.0]);
    }

    #[test]
    fn zero_output_weights_give_zero_output() {
        let mut net = NeuralNetwork::random(3, 5, 2);
        for c in net.connections.iter_mut().filter(|c| c.target_id.starts_with("output")) {
            c.weight = 0.0;
        }
        assert_eq!(net.predict(&[0.3, 0.9, 0.1]), vec![0.0, 0.0]);
    }

    #[test]
    fn missing_output_layer_yields_empty_pass() {
        let mut net = NeuralNetwork::random(2, 2, 2);
        net.layers.retain(|l| l.kind != LayerType::Output);
        let pass = forward(&net, &[1.0, 1.0]);
        assert!(pass.is_empty());
        assert!(pass.output.is_empty());
    }

    #[test]
    fn dangling_connections_are_ignored() {
        let mut net = net_with_weights(1.0);
        net.connections[0].source_id = "nowhere".into();
        let pass = forward(&net, &[1.0, 1.0]);
        assert_eq!(pass.layer_pre_activations[0], vec![1.0, 2.0]);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let mut net = NeuralNetwork::random(3, 4, 2);
        net.activation_function = ActivationFunction::Tanh;
        let a = forward(&net, &[0.1, 0.2, 0.3]);
        let b = forward(&net, &[0.1, 0.2, 0.3]);
        assert_eq!(a, b);
    }
}
