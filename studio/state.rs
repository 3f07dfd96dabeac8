use std::sync::{Arc, Mutex, atomic::AtomicBool, mpsc};
use neural_sandbox::{EpochStats, GameSession, TrainingOutcome};

// ---------------------------------------------------------------------------
// Training status
// ---------------------------------------------------------------------------

pub enum TrainingStatus {
    /// No training has been started yet.
    Idle,
    /// Training is running in a background thread.
    Running {
        stop_flag:    Arc<AtomicBool>,
        epoch_rx:     Arc<Mutex<mpsc::Receiver<EpochStats>>>,
        total_epochs: usize,
    },
    /// The run resolved, either through every epoch or via Stop.
    Done {
        outcome: TrainingOutcome,
    },
}

impl TrainingStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TrainingStatus::Idle           => "idle",
            TrainingStatus::Running { .. } => "running",
            TrainingStatus::Done { outcome: TrainingOutcome::Completed(_) }   => "completed",
            TrainingStatus::Done { outcome: TrainingOutcome::Stopped { .. } } => "stopped",
        }
    }
}

// ---------------------------------------------------------------------------
// Main state struct
// ---------------------------------------------------------------------------

pub struct StudioState {
    /// The player's level, network, metrics and history.
    pub session:  GameSession,
    /// Current training lifecycle state.
    pub training: TrainingStatus,
}

impl StudioState {
    pub fn new() -> Self {
        StudioState {
            session:  GameSession::new(),
            training: TrainingStatus::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.training, TrainingStatus::Running { .. })
    }
}

/// Shared state type, an `Arc<Mutex<StudioState>>` passed to every handler.
pub type SharedState = Arc<Mutex<StudioState>>;
