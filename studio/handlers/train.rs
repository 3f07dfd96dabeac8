use std::io::Cursor;
use std::sync::{Arc, Mutex, atomic::{AtomicBool, Ordering}, mpsc};
use std::thread;
use serde_json::json;
use tiny_http::Response;

use neural_sandbox::train::train_config::DEFAULT_EPOCHS;
use neural_sandbox::{EpochStats, NeuralNetwork, TrainConfig, TrainingOutcome, TrainingRun};

use crate::routes::{json_error, json_ok};
use crate::state::{SharedState, TrainingStatus};
use crate::util::form::{parse_query, query_parse};

// ---------------------------------------------------------------------------
// POST /train/start
// ---------------------------------------------------------------------------

/// Starts training the session network on the level's dataset.
///
/// Query parameters: `epochs` (default 10), `batch`, `seed`. The run works
/// on its own clone; the session network only receives the trained weights
/// once every epoch has completed.
pub fn handle_start(query: &str, state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let pairs = parse_query(query);
    let parsed = (|| -> Result<(usize, Option<usize>, Option<u64>), String> {
        Ok((
            query_parse(&pairs, "epochs")?.unwrap_or(DEFAULT_EPOCHS),
            query_parse(&pairs, "batch")?,
            query_parse(&pairs, "seed")?,
        ))
    })();
    let (epochs, batch, seed) = match parsed {
        Ok(v)    => v,
        Err(msg) => return json_error(400, &msg),
    };
    if batch == Some(0) {
        return json_error(400, "batch must be at least 1");
    }

    let mut st = state.lock().unwrap();
    if st.is_running() {
        return json_error(409, "training is already running");
    }
    let network = match &st.session.network {
        Some(n) => n.clone(),
        None    => return json_error(409, "build a network before training"),
    };
    let dataset = st.session.level.info().dataset.as_str().to_owned();

    let stop_flag = Arc::new(AtomicBool::new(false));
    let mut config = TrainConfig::new(epochs).with_stop_flag(stop_flag.clone());
    if let Some(batch) = batch {
        config.batch_size = batch;
    }
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }

    let (tx, rx) = mpsc::channel();
    st.session.start_training();
    st.training = TrainingStatus::Running {
        stop_flag,
        epoch_rx: Arc::new(Mutex::new(rx)),
        total_epochs: epochs,
    };
    drop(st);

    log::info!("training started: {epochs} epochs on {dataset}");

    let response = json_ok(&json!({ "status": "running", "totalEpochs": epochs, "dataset": dataset }));

    let state_clone = state.clone();
    thread::spawn(move || {
        run_training(network, &dataset, config, tx, state_clone);
    });

    response
}

/// Background thread body. Each epoch is recorded into the session before it
/// is forwarded to the event stream, and the status is resolved before the
/// sender is dropped so that stream readers always see the final state.
fn run_training(
    mut network: NeuralNetwork,
    dataset: &str,
    config: TrainConfig,
    tx: mpsc::Sender<EpochStats>,
    state: SharedState,
) {
    let mut run = TrainingRun::new(&network, dataset, config);
    for stats in run.by_ref() {
        state.lock().unwrap().session.record_epoch(&stats);
        // Nobody listening is fine; the session already has the epoch.
        let _ = tx.send(stats);
    }
    let outcome = run.finish(&mut network);

    let mut st = state.lock().unwrap();
    if let TrainingOutcome::Completed(_) = outcome {
        st.session.set_network(network);
    }
    st.session.record_outcome(&outcome);
    st.training = TrainingStatus::Done { outcome };
    drop(st);
    drop(tx);
}

// ---------------------------------------------------------------------------
// POST /train/stop
// ---------------------------------------------------------------------------

pub fn handle_stop(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let st = state.lock().unwrap();
    match &st.training {
        TrainingStatus::Running { stop_flag, total_epochs, .. } => {
            stop_flag.store(true, Ordering::Relaxed);
            log::info!("stop requested");
            json_ok(&json!({ "status": "stopping", "totalEpochs": total_epochs }))
        }
        _ => json_error(409, "no training is running"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use neural_sandbox::ActivationFunction;

    use crate::state::StudioState;

    fn wait_until_idle(state: &SharedState) {
        let deadline = Instant::now() + Duration::from_secs(30);
        while state.lock().unwrap().is_running() {
            assert!(Instant::now() < deadline, "training thread never resolved");
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn start_without_network_is_rejected() {
        let state: SharedState = Arc::new(Mutex::new(StudioState::new()));
        let response = handle_start("epochs=2", state.clone());
        assert_eq!(response.status_code().0, 409);
        assert!(!state.lock().unwrap().is_running());
    }

    #[test]
    fn start_runs_to_completion_and_merges() {
        let state: SharedState = Arc::new(Mutex::new(StudioState::new()));
        let mut network = NeuralNetwork::random(3, 4, 2);
        network.activation_function = ActivationFunction::Sigmoid;
        network.learning_rate = 0.5;
        let before = network.weights();
        state.lock().unwrap().session.set_network(network);

        let response = handle_start("epochs=3&seed=4", state.clone());
        assert_eq!(response.status_code().0, 200);
        wait_until_idle(&state);

        let st = state.lock().unwrap();
        match &st.training {
            TrainingStatus::Done { outcome: TrainingOutcome::Completed(result) } => {
                assert_eq!(result.epochs_completed, 3);
            }
            other => panic!("unexpected status {}", other.label()),
        }
        assert_eq!(st.session.accuracy_history.len(), 3);
        assert!(!st.session.is_training);
        assert_ne!(st.session.network.as_ref().unwrap().weights(), before);
    }

    #[test]
    fn bad_query_values_are_rejected() {
        let state: SharedState = Arc::new(Mutex::new(StudioState::new()));
        assert_eq!(handle_start("epochs=many", state.clone()).status_code().0, 400);
        assert_eq!(handle_start("batch=0", state).status_code().0, 400);
    }

    #[test]
    fn stop_without_run_is_rejected() {
        let state: SharedState = Arc::new(Mutex::new(StudioState::new()));
        assert_eq!(handle_stop(state).status_code().0, 409);
    }
}
