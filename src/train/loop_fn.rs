use std::sync::atomic::Ordering;
use std::time::Instant;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::data::dataset::{generate_with_rng, DatasetKind, Sample};
use crate::loss::accuracy::evaluate;
use crate::network::network::NeuralNetwork;
use crate::train::epoch_stats::{EpochStats, TrainingOutcome, TrainingResult};
use crate::train::train_config::TrainConfig;
use crate::train::trainer::train_step_with_rng;

// ---------------------------------------------------------------------------
// Run state
// ---------------------------------------------------------------------------

/// Lifecycle of a `TrainingRun`.
///
/// Batch processing and evaluation happen inside a single `next()` call, so
/// callers only ever observe these four states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Created, no epoch started yet.
    Idle,
    /// At least one epoch done, more to go.
    Running,
    /// All requested epochs done.
    Completed,
    /// A stop was requested at an epoch boundary.
    Stopped,
}

/// An in-flight training run over a private working clone of a network.
///
/// The run is an iterator: every call to `next()` performs exactly one epoch
/// (all training updates, then one evaluation pass over the test set) and
/// hands control back to the caller with that epoch's `EpochStats`. The
/// caller's network is only written by `finish`, and only when every epoch
/// completed.
pub struct TrainingRun {
    network: NeuralNetwork,
    train_set: Vec<Sample>,
    test_set: Vec<Sample>,
    config: TrainConfig,
    rng: StdRng,
    epoch: usize,
    state: RunState,
    receiver_gone: bool,
    started: Instant,
}

impl TrainingRun {
    /// Clones `network` and generates `config.train_size` training samples
    /// and `config.test_size` test samples of `dataset`.
    ///
    /// An unknown dataset name produces empty sets; the run still completes,
    /// with zero accuracy and zero loss.
    pub fn new(network: &NeuralNetwork, dataset: &str, config: TrainConfig) -> TrainingRun {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (train_set, test_set) = match DatasetKind::parse(dataset) {
            Some(kind) => (
                generate_with_rng(kind, config.train_size, &mut rng),
                generate_with_rng(kind, config.test_size, &mut rng),
            ),
            None => {
                warn!("unknown dataset '{dataset}', training on an empty set");
                (Vec::new(), Vec::new())
            }
        };
        info!(
            "starting run on '{}': {} epochs, {} train / {} test samples",
            dataset, config.epochs, train_set.len(), test_set.len()
        );
        TrainingRun::build(network, train_set, test_set, config, rng)
    }

    /// A run over caller-supplied samples.
    pub fn with_samples(
        network: &NeuralNetwork,
        train_set: Vec<Sample>,
        test_set: Vec<Sample>,
        config: TrainConfig,
    ) -> TrainingRun {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        TrainingRun::build(network, train_set, test_set, config, rng)
    }

    fn build(
        network: &NeuralNetwork,
        train_set: Vec<Sample>,
        test_set: Vec<Sample>,
        config: TrainConfig,
        rng: StdRng,
    ) -> TrainingRun {
        TrainingRun {
            network: network.clone(),
            train_set,
            test_set,
            config,
            rng,
            epoch: 0,
            state: RunState::Idle,
            receiver_gone: false,
            started: Instant::now(),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Number of epochs completed so far.
    pub fn epochs_completed(&self) -> usize {
        self.epoch
    }

    pub fn total_epochs(&self) -> usize {
        self.config.epochs
    }

    /// Read-only view of the working clone, e.g. for a renderer.
    pub fn network(&self) -> &NeuralNetwork {
        &self.network
    }

    pub fn train_set(&self) -> &[Sample] {
        &self.train_set
    }

    pub fn test_set(&self) -> &[Sample] {
        &self.test_set
    }

    fn stop_requested(&self) -> bool {
        self.receiver_gone
            || self
                .config
                .stop_flag
                .as_ref()
                .map(|flag| flag.load(Ordering::Relaxed))
                .unwrap_or(false)
    }

    /// Runs every remaining epoch (unless stopped), then resolves the run.
    ///
    /// On completion the final test-set metrics are computed and the trained
    /// weights are copied into `original`. A stopped run leaves `original`
    /// untouched.
    pub fn finish(mut self, original: &mut NeuralNetwork) -> TrainingOutcome {
        for _ in self.by_ref() {}

        if self.state == RunState::Stopped {
            warn!("run stopped after {} of {} epochs", self.epoch, self.config.epochs);
            return TrainingOutcome::Stopped { epochs_completed: self.epoch };
        }

        let eval = evaluate(&self.network, &self.test_set);
        original.copy_weights_from(&self.network);
        let execution_time = self.started.elapsed().as_secs_f64();
        info!(
            "run completed: accuracy {:.3}, loss {:.5}, {:.2}s",
            eval.accuracy, eval.loss, execution_time
        );
        TrainingOutcome::Completed(TrainingResult {
            final_accuracy: eval.accuracy,
            final_loss: eval.loss,
            execution_time,
            epochs_completed: self.epoch,
        })
    }
}

impl Iterator for TrainingRun {
    type Item = EpochStats;

    fn next(&mut self) -> Option<EpochStats> {
        match self.state {
            RunState::Completed | RunState::Stopped => return None,
            RunState::Idle | RunState::Running => {}
        }
        if self.epoch >= self.config.epochs {
            self.state = RunState::Completed;
            return None;
        }
        if self.stop_requested() {
            self.state = RunState::Stopped;
            return None;
        }
        self.state = RunState::Running;

        let t_start = Instant::now();

        // ── One full pass over the training data ───────────────────────────
        let loss = run_one_epoch(
            &mut self.network,
            &self.train_set,
            self.config.batch_size,
            &mut self.rng,
        );

        // ── Evaluation on the held-out set ────────────────────────────────
        let eval = evaluate(&self.network, &self.test_set);

        let stats = EpochStats {
            epoch: self.epoch,
            total_epochs: self.config.epochs,
            accuracy: eval.accuracy,
            loss,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };
        debug!("epoch {} accuracy {:.3} loss {:.5}", stats.epoch, stats.accuracy, stats.loss);

        if let Some(ref tx) = self.config.progress_tx {
            // If the receiver has been dropped, stop at the next boundary.
            if tx.send(stats.clone()).is_err() {
                self.receiver_gone = true;
            }
        }

        self.epoch += 1;
        Some(stats)
    }
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains a working clone of `network` on `dataset` and reports each epoch
/// through `callback(epoch_index, accuracy, loss)`.
///
/// The callback is invoked synchronously between epochs, once per completed
/// epoch, with 0-based increasing indices. On completion the trained weights
/// are merged back into `network`.
pub fn simulate_training<F>(
    network: &mut NeuralNetwork,
    dataset: &str,
    config: TrainConfig,
    mut callback: F,
) -> TrainingOutcome
where
    F: FnMut(usize, f64, f64),
{
    let mut run = TrainingRun::new(network, dataset, config);
    for stats in run.by_ref() {
        callback(stats.epoch, stats.accuracy, stats.loss);
    }
    run.finish(network)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// One epoch of per-sample updates, walked batch by batch in order.
/// Returns the mean loss over all samples (0 for an empty set).
fn run_one_epoch(
    network: &mut NeuralNetwork,
    samples: &[Sample],
    batch_size: usize,
    rng: &mut StdRng,
) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let learning_rate = network.learning_rate;
    let mut total_loss = 0.0;

    for batch in samples.chunks(batch_size.max(1)) {
        for sample in batch {
            total_loss += train_step_with_rng(network, &sample.input, &sample.target, learning_rate, rng);
        }
    }

    total_loss / samples.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{atomic::AtomicBool, mpsc, Arc};

    #[test]
    fn callback_fires_once_per_epoch_in_order() {
        let mut net = NeuralNetwork::random(3, 4, 2);
        let mut seen = Vec::new();
        let outcome = simulate_training(&mut net, "rgb-classification", TrainConfig::new(5), |e, acc, loss| {
            assert!((0.0..=1.0).contains(&acc));
            assert!(loss >= 0.0);
            seen.push(e);
        });
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        assert_eq!(outcome.epochs_completed(), 5);
        assert!(outcome.result().is_some());
    }

    #[test]
    fn unknown_dataset_completes_with_zero_accuracy() {
        let mut net = NeuralNetwork::random(3, 4, 2);
        let before = net.clone();
        let outcome = simulate_training(&mut net, "no-such-dataset", TrainConfig::new(3), |_, acc, loss| {
            assert_eq!(acc, 0.0);
            assert_eq!(loss, 0.0);
        });
        let result = outcome.result().copied().unwrap();
        assert_eq!(result.final_accuracy, 0.0);
        assert_eq!(result.final_loss, 0.0);
        assert_eq!(net, before);
    }

    #[test]
    fn run_leaves_original_alone_until_finish() {
        let mut original = NeuralNetwork::random(3, 4, 2);
        original.learning_rate = 0.1;
        original.activation_function = crate::activation::activation::ActivationFunction::Sigmoid;
        let snapshot = original.clone();
        let mut run = TrainingRun::new(&original, "rgb-classification", TrainConfig::new(2).with_seed(1));
        assert_eq!(run.state(), RunState::Idle);
        assert!(run.next().is_some());
        assert_eq!(run.state(), RunState::Running);
        assert_eq!(original, snapshot);
        assert_ne!(run.network().weights(), snapshot.weights());

        let trained = run.network().clone();
        let outcome = run.finish(&mut original);
        assert!(matches!(outcome, TrainingOutcome::Completed(_)));
        assert_ne!(original.weights(), snapshot.weights());
        assert_ne!(original.weights(), trained.weights());
    }

    #[test]
    fn stop_flag_is_honoured_at_epoch_boundary() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut original = NeuralNetwork::random(3, 4, 2);
        let snapshot = original.clone();
        let config = TrainConfig::new(10).with_stop_flag(flag.clone());
        let mut run = TrainingRun::new(&original, "rgb-classification", config);

        assert!(run.next().is_some());
        assert!(run.next().is_some());
        flag.store(true, Ordering::Relaxed);
        assert!(run.next().is_none());
        assert_eq!(run.state(), RunState::Stopped);

        let outcome = run.finish(&mut original);
        assert_eq!(outcome, TrainingOutcome::Stopped { epochs_completed: 2 });
        assert_eq!(original, snapshot);
    }

    #[test]
    fn progress_channel_receives_every_epoch() {
        let (tx, rx) = mpsc::channel();
        let mut net = NeuralNetwork::random(4, 4, 2);
        simulate_training(&mut net, "complex-classification", TrainConfig::new(4).with_progress(tx), |_, _, _| {});
        let epochs: Vec<usize> = rx.try_iter().map(|s| s.epoch).collect();
        assert_eq!(epochs, vec![0, 1, 2, 3]);
    }

    #[test]
    fn dropped_receiver_stops_the_run() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut net = NeuralNetwork::random(3, 3, 2);
        let outcome = simulate_training(&mut net, "rgb-classification", TrainConfig::new(5).with_progress(tx), |_, _, _| {});
        assert_eq!(outcome, TrainingOutcome::Stopped { epochs_completed: 1 });
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let net = NeuralNetwork::random(3, 4, 2);
        let a: Vec<EpochStats> = TrainingRun::new(&net, "rgb-classification", TrainConfig::new(3).with_seed(42)).collect();
        let b: Vec<EpochStats> = TrainingRun::new(&net, "rgb-classification", TrainConfig::new(3).with_seed(42)).collect();
        let strip = |v: &[EpochStats]| v.iter().map(|s| (s.epoch, s.accuracy, s.loss)).collect::<Vec<_>>();
        assert_eq!(strip(&a), strip(&b));
    }

    #[test]
    fn custom_sizes_are_used() {
        let net = NeuralNetwork::random(3, 2, 2);
        let config = TrainConfig { train_size: 30, test_size: 7, ..TrainConfig::new(1) };
        let run = TrainingRun::new(&net, "rgb-classification", config);
        assert_eq!(run.train_set().len(), 30);
        assert_eq!(run.test_set().len(), 7);
        assert_eq!(run.total_epochs(), 1);
    }

    #[test]
    fn run_over_supplied_samples() {
        use crate::loss::mse::MseLoss;

        let sample = |input: [f64; 2], class: usize| Sample {
            input: input.to_vec(),
            target: crate::data::dataset::one_hot(class, 2),
        };
        let train = vec![
            sample([0.0, 0.0], 1),
            sample([0.0, 1.0], 0),
            sample([1.0, 0.0], 0),
            sample([1.0, 1.0], 0),
        ];
        let test = vec![sample([1.0, 1.0], 0), sample([0.0, 0.0], 1)];

        // Zero learning rate: the network is fixed, so every figure is checkable.
        let mut original = NeuralNetwork::random(2, 3, 2);
        original.learning_rate = 0.0;
        let expected_loss = train
            .iter()
            .map(|s| MseLoss::loss(&original.predict(&s.input), &s.target))
            .sum::<f64>()
            / train.len() as f64;
        let expected_eval = evaluate(&original, &test);

        let mut run = TrainingRun::with_samples(&original, train.clone(), test.clone(), TrainConfig::new(2));
        assert_eq!(run.train_set(), &train[..]);
        assert_eq!(run.test_set(), &test[..]);

        let stats: Vec<EpochStats> = run.by_ref().collect();
        assert_eq!(stats.len(), 2);
        for s in &stats {
            assert!((s.loss - expected_loss).abs() < 1e-12);
            assert_eq!(s.accuracy, expected_eval.accuracy);
        }

        let snapshot = original.clone();
        let result = run.finish(&mut original).result().copied().unwrap();
        assert_eq!(result.epochs_completed, 2);
        assert_eq!(result.final_accuracy, expected_eval.accuracy);
        assert_eq!(original, snapshot);
    }
}
