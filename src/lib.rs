pub mod error;
pub mod activation;
pub mod network;
pub mod data;
pub mod loss;
pub mod optim;
pub mod train;
pub mod session;

// Convenience re-exports
pub use error::{NetworkError, Result};
pub use activation::activation::ActivationFunction;
pub use network::network::{Connection, Layer, LayerType, NeuralNetwork, Neuron, Position};
pub use network::forward::{forward, ForwardPass};
pub use network::fingerprint::fingerprint;
pub use data::dataset::{generate, DatasetKind, Sample};
pub use loss::mse::MseLoss;
pub use loss::accuracy::{evaluate, Evaluation};
pub use optim::{optimizer::Optimizer, regularization::Regularization};
pub use train::trainer::train_step;
pub use train::{simulate_training, EpochStats, TrainConfig, TrainingOutcome, TrainingResult, TrainingRun};
pub use session::{GameSession, Level};
