use serde::{Serialize, Deserialize};

/// Per-epoch results yielded by a `TrainingRun`.
///
/// When a `progress_tx` channel is configured in `TrainConfig`, the run
/// also sends one `EpochStats` value at the end of every completed epoch.
/// Receivers (e.g. the studio SSE handler) use this to drive live charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 0-based epoch index.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Test-set accuracy after this epoch's updates, in [0, 1].
    pub accuracy: f64,
    /// Mean training loss over all samples in this epoch.
    pub loss: f64,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}

/// Final metrics of a run that went through all its epochs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingResult {
    pub final_accuracy: f64,
    pub final_loss: f64,
    /// Seconds from run start to completion.
    pub execution_time: f64,
    pub epochs_completed: usize,
}

/// How a run ended. A stop request is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum TrainingOutcome {
    Completed(TrainingResult),
    #[serde(rename_all = "camelCase")]
    Stopped { epochs_completed: usize },
}

impl TrainingOutcome {
    pub fn result(&self) -> Option<&TrainingResult> {
        match self {
            TrainingOutcome::Completed(result) => Some(result),
            TrainingOutcome::Stopped { .. } => None,
        }
    }

    pub fn epochs_completed(&self) -> usize {
        match self {
            TrainingOutcome::Completed(result) => result.epochs_completed,
            TrainingOutcome::Stopped { epochs_completed } => *epochs_completed,
        }
    }
}
