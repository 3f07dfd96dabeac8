//! Command-line trainer.
//!
//! Usage:
//!   neural-sandbox [dataset] [epochs] [hidden]
//!   neural-sandbox --load network.json [dataset] [epochs]
//!
//! Trains a network (random 3-layer by default, sized for the dataset) and
//! prints per-epoch progress, final metrics and the network fingerprint.
//! Set `RUST_LOG=debug` for engine diagnostics.

use anyhow::{bail, Context, Result};
use neural_sandbox::{fingerprint, simulate_training, DatasetKind, NeuralNetwork, TrainConfig, TrainingOutcome};

fn main() -> Result<()> {
    env_logger::init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();

    let loaded = match args.iter().position(|a| a == "--load") {
        Some(pos) => {
            if pos + 1 >= args.len() {
                bail!("--load needs a path to a network JSON file");
            }
            let path = args.remove(pos + 1);
            args.remove(pos);
            Some(NeuralNetwork::load_json(&path).with_context(|| format!("loading '{path}'"))?)
        }
        None => None,
    };

    let dataset = args.first().cloned().unwrap_or_else(|| "rgb-classification".to_owned());
    let epochs: usize = match args.get(1) {
        Some(s) => s.parse().with_context(|| format!("epochs must be a number, got '{s}'"))?,
        None => 20,
    };
    let hidden: usize = match args.get(2) {
        Some(s) => s.parse().with_context(|| format!("hidden size must be a number, got '{s}'"))?,
        None => 5,
    };

    let mut network = match loaded {
        Some(network) => network,
        None => {
            let kind = DatasetKind::parse(&dataset)
                .with_context(|| format!("unknown dataset '{dataset}'"))?;
            NeuralNetwork::random(kind.input_size(), hidden, kind.output_size())
        }
    };

    let [i, h, o] = network.layer_sizes();
    println!(
        "Training {i}-{h}-{o} network ({}, lr {}, {}, {}) on {dataset} for {epochs} epochs",
        network.activation_function.as_str(),
        network.learning_rate,
        network.regularization.as_str(),
        network.optimizer.as_str(),
    );

    let outcome = simulate_training(&mut network, &dataset, TrainConfig::new(epochs), |epoch, accuracy, loss| {
        println!("Epoch {:>3}: accuracy = {:.3}, loss = {:.6}", epoch + 1, accuracy, loss);
    });

    match outcome {
        TrainingOutcome::Completed(result) => {
            println!(
                "Final: accuracy = {:.3}, loss = {:.6}, time = {:.3}s",
                result.final_accuracy, result.final_loss, result.execution_time
            );
        }
        TrainingOutcome::Stopped { epochs_completed } => {
            println!("Stopped after {epochs_completed} epochs");
        }
    }
    println!("Fingerprint: {}", fingerprint(&network));

    Ok(())
}
