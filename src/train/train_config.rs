use std::sync::mpsc;
use std::sync::{Arc, atomic::AtomicBool};
use crate::train::epoch_stats::EpochStats;

/// Configuration for a training run.
///
/// # Fields
/// - `epochs`      — total number of full passes over the training set
/// - `batch_size`  — samples per accounting batch; every sample still
///                   updates the weights on its own
/// - `train_size`  — samples generated for training
/// - `test_size`   — samples generated for the held-out evaluation set
/// - `seed`        — fixes dataset generation and dropout for reproducible runs
/// - `progress_tx` — optional channel sender; one `EpochStats` is sent per
///                   completed epoch.  If the receiver is dropped the run
///                   stops at the next epoch boundary.
/// - `stop_flag`   — optional atomic flag; when set to `true` from another
///                   thread the run stops before starting the next epoch.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub train_size: usize,
    pub test_size: usize,
    pub seed: Option<u64>,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

pub const DEFAULT_EPOCHS: usize = 10;
pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_TRAIN_SIZE: usize = 100;
pub const DEFAULT_TEST_SIZE: usize = 20;

impl TrainConfig {
    /// Creates a `TrainConfig` with default sizes, no progress channel and no stop flag.
    pub fn new(epochs: usize) -> Self {
        TrainConfig {
            epochs,
            ..TrainConfig::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = Some(flag);
        self
    }

    pub fn with_progress(mut self, tx: mpsc::Sender<EpochStats>) -> Self {
        self.progress_tx = Some(tx);
        self
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            epochs: DEFAULT_EPOCHS,
            batch_size: DEFAULT_BATCH_SIZE,
            train_size: DEFAULT_TRAIN_SIZE,
            test_size: DEFAULT_TEST_SIZE,
            seed: None,
            progress_tx: None,
            stop_flag: None,
        }
    }
}
