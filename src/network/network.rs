use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::{NetworkError, Result};
use crate::optim::{optimizer::Optimizer, regularization::Regularization};

/// Role of a layer (and of every neuron in it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    Input,
    Hidden,
    Output,
}

impl LayerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerType::Input => "input",
            LayerType::Hidden => "hidden",
            LayerType::Output => "output",
        }
    }
}

/// Renderer-only coordinates; the engine carries them through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neuron {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LayerType,
    #[serde(default)]
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LayerType,
    pub neurons: Vec<Neuron>,
}

/// A weighted edge. Endpoints are neuron ids, never references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub weight: f64,
}

/// The network document exchanged with the editor, the renderer and the
/// persistence layer.
///
/// `Clone` is the structural deep copy used for working clones: every layer,
/// neuron and connection is owned, so a clone shares nothing with its source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeuralNetwork {
    #[serde(default)]
    pub id: String,
    pub layers: Vec<Layer>,
    pub connections: Vec<Connection>,
    pub activation_function: ActivationFunction,
    pub learning_rate: f64,
    #[serde(default)]
    pub regularization: Regularization,
    #[serde(default)]
    pub optimizer: Optimizer,
}

impl NeuralNetwork {
    /// Builds a fully connected input → hidden → output network with weights
    /// drawn uniformly from [-1, 1] and default hyperparameters
    /// (relu, lr 0.01, no regularization, sgd).
    pub fn random(input: usize, hidden: usize, output: usize) -> NeuralNetwork {
        NeuralNetwork::random_with_rng(input, hidden, output, &mut rand::thread_rng())
    }

    pub fn random_with_rng<R: Rng + ?Sized>(
        input: usize,
        hidden: usize,
        output: usize,
        rng: &mut R,
    ) -> NeuralNetwork {
        let layers = vec![
            build_layer(LayerType::Input, input, 0.0),
            build_layer(LayerType::Hidden, hidden, 1.0),
            build_layer(LayerType::Output, output, 2.0),
        ];

        let mut connections = Vec::with_capacity(input * hidden + hidden * output);
        for pair in layers.windows(2) {
            for src in &pair[0].neurons {
                for dst in &pair[1].neurons {
                    connections.push(Connection {
                        id: format!("{}-{}", src.id, dst.id),
                        source_id: src.id.clone(),
                        target_id: dst.id.clone(),
                        weight: rng.gen::<f64>() * 2.0 - 1.0,
                    });
                }
            }
        }

        NeuralNetwork {
            id: "random-network".to_owned(),
            layers,
            connections,
            activation_function: ActivationFunction::Relu,
            learning_rate: 0.01,
            regularization: Regularization::None,
            optimizer: Optimizer::Sgd,
        }
    }

    /// First layer with the given role, if any.
    pub fn layer(&self, kind: LayerType) -> Option<&Layer> {
        self.layers.iter().find(|l| l.kind == kind)
    }

    /// Neuron counts in input, hidden, output order; absent layers count 0.
    pub fn layer_sizes(&self) -> [usize; 3] {
        [LayerType::Input, LayerType::Hidden, LayerType::Output]
            .map(|kind| self.layer(kind).map(|l| l.neurons.len()).unwrap_or(0))
    }

    /// Total neurons across all layers.
    pub fn neuron_count(&self) -> usize {
        self.layers.iter().map(|l| l.neurons.len()).sum()
    }

    pub fn weights(&self) -> Vec<f64> {
        self.connections.iter().map(|c| c.weight).collect()
    }

    /// Copies weights by position from `trained` into `self`.
    ///
    /// Topology is assumed unchanged since `trained` was cloned from `self`.
    /// The full weight vector is snapshotted before any write so a partially
    /// copied state is never built from a half-read source.
    pub fn copy_weights_from(&mut self, trained: &NeuralNetwork) {
        let snapshot = trained.weights();
        for (conn, weight) in self.connections.iter_mut().zip(snapshot) {
            conn.weight = weight;
        }
    }

    /// Strict structural check for collaborators that want one.
    ///
    /// The engine never calls this; it tolerates partially built networks.
    pub fn validate(&self) -> Result<()> {
        let order = [LayerType::Input, LayerType::Hidden, LayerType::Output];
        if self.layers.len() != 3 {
            return Err(NetworkError::Invalid(format!(
                "expected 3 layers, found {}",
                self.layers.len()
            )));
        }
        for (layer, expected) in self.layers.iter().zip(order) {
            if layer.kind != expected {
                return Err(NetworkError::Invalid(format!(
                    "layer '{}' is {} but {} was expected at this position",
                    layer.id,
                    layer.kind.as_str(),
                    expected.as_str()
                )));
            }
            if layer.neurons.is_empty() {
                return Err(NetworkError::Invalid(format!("{} layer has no neurons", expected.as_str())));
            }
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(NetworkError::Invalid(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }

        let depth_of = |id: &str| {
            self.layers
                .iter()
                .position(|l| l.neurons.iter().any(|n| n.id == id))
        };
        for conn in &self.connections {
            let src = depth_of(&conn.source_id).ok_or_else(|| {
                NetworkError::Invalid(format!("connection '{}' has unknown source '{}'", conn.id, conn.source_id))
            })?;
            let dst = depth_of(&conn.target_id).ok_or_else(|| {
                NetworkError::Invalid(format!("connection '{}' has unknown target '{}'", conn.id, conn.target_id))
            })?;
            if dst != src + 1 {
                return Err(NetworkError::Invalid(format!(
                    "connection '{}' must join adjacent layers",
                    conn.id
                )));
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<NeuralNetwork> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the network to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a network from a JSON file previously written by `save_json`.
    pub fn load_json(path: &str) -> Result<NeuralNetwork> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

fn build_layer(kind: LayerType, size: usize, x: f64) -> Layer {
    let half = size as f64 / 2.0;
    let neurons = (0..size)
        .map(|i| Neuron {
            id: format!("{}-{}", kind.as_str(), i),
            kind,
            position: Position { x, y: i as f64 - half, z: 0.0 },
        })
        .collect();
    Layer {
        id: format!("{}-layer", kind.as_str()),
        kind,
        neurons,
    }
}
