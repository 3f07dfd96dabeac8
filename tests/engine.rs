use std::sync::{Arc, atomic::{AtomicBool, Ordering}, mpsc};

use rand::{rngs::StdRng, SeedableRng};

use neural_sandbox::session::GameSession;
use neural_sandbox::{
    fingerprint, forward, simulate_training, ActivationFunction, NeuralNetwork, Optimizer,
    Regularization, TrainConfig, TrainingOutcome, TrainingRun,
};

fn seeded_network(seed: u64, hidden: usize) -> NeuralNetwork {
    let mut rng = StdRng::seed_from_u64(seed);
    NeuralNetwork::random_with_rng(3, hidden, 2, &mut rng)
}

#[test]
fn default_relu_network_reaches_seventy_percent() {
    // 3-5-2, relu / sgd / no regularization, lr 0.01, 20 epochs, 20 test samples.
    // A relu unit whose pre-activation goes negative for every input stops
    // learning, so individual seeds can stall near chance.
    let mut reached = 0;
    for seed in 1..=20u64 {
        let mut network = seeded_network(seed, 5);
        assert_eq!(network.activation_function, ActivationFunction::Relu);
        assert_eq!(network.optimizer, Optimizer::Sgd);
        assert_eq!(network.regularization, Regularization::None);

        let config = TrainConfig::new(20).with_seed(seed);
        assert_eq!(config.test_size, 20);
        let outcome = simulate_training(&mut network, "rgb-classification", config, |_, _, _| {});
        let result = outcome.result().expect("run should complete");
        assert!((0.0..=1.0).contains(&result.final_accuracy));
        if result.final_accuracy >= 0.7 {
            reached += 1;
        }
    }
    assert!(reached >= 5, "only {reached} of 20 seeded relu runs reached 70% accuracy");
}

#[test]
fn sigmoid_network_learns_warm_vs_cool() {
    let mut passed = 0;
    for seed in 1..=5u64 {
        let mut network = seeded_network(seed, 5);
        network.activation_function = ActivationFunction::Sigmoid;
        network.learning_rate = 0.5;

        let config = TrainConfig { test_size: 100, ..TrainConfig::new(50) }.with_seed(seed);
        let outcome = simulate_training(&mut network, "rgb-classification", config, |_, _, _| {});
        let result = outcome.result().expect("run should complete");
        if result.final_accuracy >= 0.7 {
            passed += 1;
        }
    }
    assert!(passed >= 3, "only {passed} of 5 seeded runs reached 70% accuracy");
}

#[test]
fn training_reports_every_epoch_in_order() {
    let mut network = seeded_network(7, 5);
    let mut seen = Vec::new();
    let outcome = simulate_training(
        &mut network,
        "rgb-classification",
        TrainConfig::new(5).with_seed(7),
        |epoch, accuracy, loss| {
            assert!((0.0..=1.0).contains(&accuracy));
            assert!(loss >= 0.0);
            seen.push(epoch);
        },
    );
    assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    assert_eq!(outcome.epochs_completed(), 5);
}

#[test]
fn unknown_dataset_completes_with_zero_accuracy() {
    let mut network = seeded_network(3, 4);
    let before = network.weights();
    let outcome = simulate_training(&mut network, "no-such-dataset", TrainConfig::new(3), |_, _, _| {});
    let result = outcome.result().expect("unknown dataset is not an error");
    assert_eq!(result.final_accuracy, 0.0);
    assert_eq!(result.epochs_completed, 3);
    // Nothing to learn from, so the merge is a no-op.
    assert_eq!(network.weights(), before);
}

#[test]
fn fingerprint_survives_deep_copy_and_json() {
    let network = seeded_network(11, 5);
    let copy = network.clone();
    assert_eq!(fingerprint(&network), fingerprint(&copy));

    let restored = NeuralNetwork::from_json(&network.to_json().unwrap()).unwrap();
    assert_eq!(restored, network);
    assert_eq!(fingerprint(&restored), fingerprint(&network));

    let input = [0.9, 0.1, 0.2];
    assert_eq!(forward(&restored, &input).output, forward(&network, &input).output);
}

#[test]
fn training_changes_fingerprint() {
    let mut network = seeded_network(5, 5);
    network.activation_function = ActivationFunction::Sigmoid;
    network.learning_rate = 0.5;
    let before = fingerprint(&network);
    simulate_training(&mut network, "rgb-classification", TrainConfig::new(2).with_seed(5), |_, _, _| {});
    assert_ne!(fingerprint(&network), before);
}

#[test]
fn stop_from_another_thread_leaves_network_untouched() {
    let mut network = seeded_network(9, 5);
    let before = network.clone();
    let flag = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel();
    let config = TrainConfig::new(100_000)
        .with_seed(9)
        .with_stop_flag(flag.clone())
        .with_progress(tx);

    let run = TrainingRun::new(&network, "rgb-classification", config);
    let stopper = std::thread::spawn(move || {
        // Let a couple of epochs through, then ask for a stop.
        for _ in 0..2 {
            rx.recv().unwrap();
        }
        flag.store(true, Ordering::Relaxed);
        rx
    });

    let outcome = run.finish(&mut network);
    let _rx = stopper.join().unwrap();

    match outcome {
        TrainingOutcome::Stopped { epochs_completed } => {
            assert!(epochs_completed >= 2 && epochs_completed < 100_000);
        }
        other => panic!("expected a stopped run, got {other:?}"),
    }
    assert_eq!(network, before);
}

#[test]
fn session_tracks_a_full_run() {
    let mut session = GameSession::new();
    let mut network = seeded_network(13, 4);
    network.activation_function = ActivationFunction::Sigmoid;
    session.set_network(network.clone());
    session.start_training();

    let mut run = TrainingRun::new(&network, "rgb-classification", TrainConfig::new(4).with_seed(13));
    for stats in run.by_ref() {
        session.record_epoch(&stats);
    }
    let outcome = run.finish(&mut network);
    session.set_network(network);
    session.record_outcome(&outcome);

    assert!(!session.is_training);
    assert_eq!(session.accuracy_history.len(), 4);
    assert_eq!(session.loss_history.len(), 4);
    let result = outcome.result().unwrap();
    assert_eq!(session.metrics.accuracy, result.final_accuracy);

    let submission = session.submission().unwrap();
    assert_eq!(submission.network_hash, fingerprint(session.network.as_ref().unwrap()));
}
