pub mod network;
pub mod forward;
pub mod fingerprint;

pub use network::{Connection, Layer, LayerType, NeuralNetwork, Neuron, Position};
pub use forward::{forward, ForwardPass};
pub use fingerprint::fingerprint;
