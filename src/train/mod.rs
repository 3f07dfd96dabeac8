pub mod trainer;
pub mod epoch_stats;
pub mod train_config;
pub mod loop_fn;

pub use trainer::{train_step, train_step_with_rng};
pub use epoch_stats::{EpochStats, TrainingOutcome, TrainingResult};
pub use train_config::TrainConfig;
pub use loop_fn::{simulate_training, RunState, TrainingRun};
