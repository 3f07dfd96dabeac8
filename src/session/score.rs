use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::network::fingerprint::fingerprint;
use crate::network::network::NeuralNetwork;
use crate::optim::{optimizer::Optimizer, regularization::Regularization};
use crate::session::level::Level;

/// Level score for a training result.
///
/// `accuracy·100 + (max_neurons − size)·5 + max(0, 10 − seconds)·5 + level_id·50`,
/// rounded. Oversized networks lose points through the efficiency term.
pub fn level_score(accuracy: f64, execution_time: f64, network_size: usize, level: &Level) -> i64 {
    let info = level.info();
    let efficiency_bonus = info.max_neurons as f64 - network_size as f64;
    let time_bonus = (10.0 - execution_time).max(0.0) * 5.0;
    let level_bonus = info.id as f64 * 50.0;
    (accuracy * 100.0 + efficiency_bonus * 5.0 + time_bonus + level_bonus).round() as i64
}

/// Share of the neuron budget left unused, against three times the level cap.
pub fn efficiency(network_size: usize, max_neurons: usize) -> f64 {
    if max_neurons == 0 {
        return 0.0;
    }
    (1.0 - network_size as f64 / (max_neurons as f64 * 3.0)).max(0.0)
}

/// Rewards adventurous hyperparameter choices; capped at 1.
pub fn innovation(network: &NeuralNetwork, level: &Level) -> f64 {
    let mut score = 0.0;
    if network.activation_function != ActivationFunction::Relu {
        score += 0.2;
    }
    if network.regularization != Regularization::None {
        score += 0.3;
    }
    if network.optimizer != Optimizer::Sgd {
        score += 0.2;
    }
    if (0.005..=0.05).contains(&network.learning_rate) {
        score += 0.2;
    }
    if let Level::Puzzle { info, .. } = level {
        match info.id {
            2 if network.activation_function == ActivationFunction::Tanh => score += 0.1,
            3 if network.layer_sizes()[1] <= 3 => score += 0.1,
            _ => {}
        }
    }
    f64::min(1.0, score)
}

/// Payload handed to the persistence/leaderboard collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub score: i64,
    pub accuracy: f64,
    pub efficiency: f64,
    pub innovation: f64,
    pub network_hash: String,
}

impl Submission {
    pub fn new(network: &NeuralNetwork, level: &Level, score: i64, accuracy: f64) -> Submission {
        Submission {
            score,
            accuracy,
            efficiency: efficiency(network.neuron_count(), level.info().max_neurons),
            innovation: innovation(network, level),
            network_hash: fingerprint(network),
        }
    }
}
