use serde::Serialize;

use crate::network::network::NeuralNetwork;
use crate::session::level::{catalog, next_level, Level};
use crate::session::score::{level_score, Submission};
use crate::train::epoch_stats::{EpochStats, TrainingOutcome};

/// Latest metrics shown to the player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub accuracy: f64,
    pub loss: f64,
    pub execution_time: f64,
    pub score: i64,
    /// Rough progress bar value in [0, 1].
    pub training_progress: f64,
}

/// Everything one player's game needs, passed explicitly to whoever needs it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub level: Level,
    pub network: Option<NeuralNetwork>,
    pub metrics: Metrics,
    pub accuracy_history: Vec<f64>,
    pub loss_history: Vec<f64>,
    pub is_training: bool,
}

impl GameSession {
    /// Starts at the first catalog level.
    pub fn new() -> GameSession {
        GameSession::with_level(catalog().remove(0))
    }

    pub fn with_level(level: Level) -> GameSession {
        GameSession {
            level,
            network: None,
            metrics: Metrics::default(),
            accuracy_history: Vec::new(),
            loss_history: Vec::new(),
            is_training: false,
        }
    }

    pub fn set_network(&mut self, network: NeuralNetwork) {
        self.network = Some(network);
    }

    /// Clears the previous run's history.
    pub fn start_training(&mut self) {
        self.is_training = true;
        self.metrics.training_progress = 0.0;
        self.accuracy_history.clear();
        self.loss_history.clear();
    }

    /// Appends one epoch to the history. Elapsed time is estimated at half a
    /// second per epoch until the real figure arrives with the outcome.
    pub fn record_epoch(&mut self, stats: &EpochStats) {
        self.accuracy_history.push(stats.accuracy);
        self.loss_history.push(stats.loss);
        self.update_metrics(stats.accuracy, stats.loss, (stats.epoch + 1) as f64 * 0.5);
    }

    pub fn record_outcome(&mut self, outcome: &TrainingOutcome) {
        if let TrainingOutcome::Completed(result) = outcome {
            self.update_metrics(result.final_accuracy, result.final_loss, result.execution_time);
        }
        self.is_training = false;
    }

    fn update_metrics(&mut self, accuracy: f64, loss: f64, execution_time: f64) {
        let size = self.network.as_ref().map(|n| n.neuron_count()).unwrap_or(0);
        self.metrics = Metrics {
            accuracy,
            loss,
            execution_time,
            score: level_score(accuracy, execution_time, size, &self.level),
            training_progress: (self.metrics.training_progress + 0.1).min(1.0),
        };
    }

    pub fn has_passed_level(&self) -> bool {
        self.metrics.accuracy >= self.level.info().target_accuracy
    }

    /// Moves to the next catalog level, keeping the score. Returns `false`
    /// (and changes nothing) on the last level.
    pub fn advance_to_next_level(&mut self) -> bool {
        let Some(next) = next_level(self.level.id()) else {
            return false;
        };
        let score = self.metrics.score;
        *self = GameSession::with_level(next);
        self.metrics.score = score;
        true
    }

    pub fn reset(&mut self) {
        *self = GameSession::new();
    }

    /// Leaderboard payload for the current network, if there is one.
    pub fn submission(&self) -> Option<Submission> {
        let network = self.network.as_ref()?;
        Some(Submission::new(network, &self.level, self.metrics.score, self.metrics.accuracy))
    }
}

impl Default for GameSession {
    fn default() -> Self {
        GameSession::new()
    }
}
