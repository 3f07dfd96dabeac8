use std::io::Cursor;
use serde_json::json;
use tiny_http::{Request, Response};

use neural_sandbox::data::preview;
use neural_sandbox::{fingerprint, ActivationFunction, DatasetKind, NeuralNetwork, Optimizer, Regularization};

use crate::routes::{json_error, json_ok};
use crate::state::SharedState;
use crate::util::form::{parse_query, query_get, query_parse};

const DEFAULT_HIDDEN: usize = 5;
const DEFAULT_PREVIEW: usize = 10;
const MAX_PREVIEW: usize = 200;

// ---------------------------------------------------------------------------
// POST /network/random
// ---------------------------------------------------------------------------

/// Builds a random input → hidden → output network. Layer sizes default to
/// the current level's dataset; hyperparameters may be overridden with
/// `activation`, `lr`, `optimizer` and `regularization`.
pub fn handle_random(query: &str, state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let pairs = parse_query(query);
    let mut st = state.lock().unwrap();
    if st.is_running() {
        return json_error(409, "training is in progress");
    }

    let dataset = st.session.level.info().dataset;
    let sizes = (|| -> Result<(usize, usize, usize, Option<f64>), String> {
        Ok((
            query_parse(&pairs, "input")?.unwrap_or(dataset.input_size()),
            query_parse(&pairs, "hidden")?.unwrap_or(DEFAULT_HIDDEN),
            query_parse(&pairs, "output")?.unwrap_or(dataset.output_size()),
            query_parse(&pairs, "lr")?,
        ))
    })();
    let (input, hidden, output, lr) = match sizes {
        Ok(v)    => v,
        Err(msg) => return json_error(400, &msg),
    };

    let mut network = NeuralNetwork::random(input, hidden, output);
    if let Some(lr) = lr {
        network.learning_rate = lr;
    }
    if let Some(raw) = query_get(&pairs, "activation") {
        match ActivationFunction::parse(raw) {
            Some(a) => network.activation_function = a,
            None    => return json_error(400, &format!("unknown activation '{raw}'")),
        }
    }
    if let Some(raw) = query_get(&pairs, "optimizer") {
        match Optimizer::parse(raw) {
            Some(o) => network.optimizer = o,
            None    => return json_error(400, &format!("unknown optimizer '{raw}'")),
        }
    }
    if let Some(raw) = query_get(&pairs, "regularization") {
        match Regularization::parse(raw) {
            Some(r) => network.regularization = r,
            None    => return json_error(400, &format!("unknown regularization '{raw}'")),
        }
    }

    log::info!("built random {input}-{hidden}-{output} network");
    let violations = st.session.level.violations(&network);
    st.session.set_network(network);
    json_ok(&json!({ "network": st.session.network, "violations": violations }))
}

// ---------------------------------------------------------------------------
// POST /network  (JSON body)
// ---------------------------------------------------------------------------

pub fn handle_put(request: &mut Request, state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let mut body = String::new();
    if let Err(e) = request.as_reader().read_to_string(&mut body) {
        return json_error(400, &format!("failed to read body: {e}"));
    }

    let network = match NeuralNetwork::from_json(&body) {
        Ok(n)  => n,
        Err(e) => return json_error(400, &e.to_string()),
    };
    if let Err(e) = network.validate() {
        return json_error(422, &e.to_string());
    }

    let mut st = state.lock().unwrap();
    if st.is_running() {
        return json_error(409, "training is in progress");
    }
    let violations = st.session.level.violations(&network);
    log::info!("installed network '{}' ({} neurons)", network.id, network.neuron_count());
    st.session.set_network(network);
    json_ok(&json!({ "network": st.session.network, "violations": violations }))
}

// ---------------------------------------------------------------------------
// GET /network, GET /network/fingerprint
// ---------------------------------------------------------------------------

pub fn handle_get(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let st = state.lock().unwrap();
    match &st.session.network {
        Some(network) => json_ok(network),
        None          => json_error(404, "no network has been built yet"),
    }
}

pub fn handle_fingerprint(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let st = state.lock().unwrap();
    match &st.session.network {
        Some(network) => json_ok(&json!({ "fingerprint": fingerprint(network) })),
        None          => json_error(404, "no network has been built yet"),
    }
}

// ---------------------------------------------------------------------------
// GET /dataset/preview
// ---------------------------------------------------------------------------

/// Samples from `dataset` (default: the level's dataset), `count` capped.
pub fn handle_preview(query: &str, state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let pairs = parse_query(query);
    let kind = match query_get(&pairs, "dataset") {
        Some(name) => match DatasetKind::parse(name) {
            Some(kind) => kind,
            None       => return json_error(400, &format!("unknown dataset '{name}'")),
        },
        None => state.lock().unwrap().session.level.info().dataset,
    };
    let count = match query_parse::<usize>(&pairs, "count") {
        Ok(c)    => c.unwrap_or(DEFAULT_PREVIEW).min(MAX_PREVIEW),
        Err(msg) => return json_error(400, &msg),
    };
    json_ok(&preview(kind, count))
}
