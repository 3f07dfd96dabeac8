use serde::{Serialize, Deserialize};

use crate::data::dataset::DatasetKind;
use crate::network::network::NeuralNetwork;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Basic,
    Advanced,
}

/// What every level carries, puzzle or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelInfo {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub dataset: DatasetKind,
    pub target_accuracy: f64,
    pub max_neurons: usize,
}

/// Neuron-count bounds a puzzle imposes on the player's network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LevelConstraints {
    pub min_input_neurons: Option<usize>,
    pub max_input_neurons: Option<usize>,
    pub min_output_neurons: Option<usize>,
    pub max_output_neurons: Option<usize>,
    pub max_hidden_neurons: Option<usize>,
}

impl LevelConstraints {
    /// Human-readable violations; empty when the network fits.
    pub fn check(&self, network: &NeuralNetwork) -> Vec<String> {
        let [input, hidden, output] = network.layer_sizes();
        let mut violations = Vec::new();
        let mut bound = |label: &str, actual: usize, min: Option<usize>, max: Option<usize>| {
            if let Some(min) = min.filter(|&m| actual < m) {
                violations.push(format!("{label} layer needs at least {min} neurons, has {actual}"));
            }
            if let Some(max) = max.filter(|&m| actual > m) {
                violations.push(format!("{label} layer allows at most {max} neurons, has {actual}"));
            }
        };
        bound("input", input, self.min_input_neurons, self.max_input_neurons);
        bound("hidden", hidden, None, self.max_hidden_neurons);
        bound("output", output, self.min_output_neurons, self.max_output_neurons);
        violations
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reward {
    pub points: u32,
    pub badge: String,
}

/// A level from the catalog. Puzzles add constraints, hints and a reward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Level {
    Basic(LevelInfo),
    #[serde(rename_all = "camelCase")]
    Puzzle {
        info: LevelInfo,
        input_description: String,
        output_description: String,
        constraints: LevelConstraints,
        hints: Vec<String>,
        reward: Reward,
    },
}

impl Level {
    pub fn info(&self) -> &LevelInfo {
        match self {
            Level::Basic(info) => info,
            Level::Puzzle { info, .. } => info,
        }
    }

    pub fn id(&self) -> u32 {
        self.info().id
    }

    pub fn hints(&self) -> &[String] {
        match self {
            Level::Basic(_) => &[],
            Level::Puzzle { hints, .. } => hints,
        }
    }

    /// Everything that keeps `network` from being a legal entry.
    pub fn violations(&self, network: &NeuralNetwork) -> Vec<String> {
        let info = self.info();
        let mut violations = match self {
            Level::Basic(_) => Vec::new(),
            Level::Puzzle { constraints, .. } => constraints.check(network),
        };
        let size = network.neuron_count();
        if size > info.max_neurons {
            violations.push(format!("network uses {size} neurons, level allows {}", info.max_neurons));
        }
        violations
    }
}

fn puzzle(
    info: LevelInfo,
    io: (&str, &str),
    constraints: LevelConstraints,
    hints: &[&str],
    reward: (u32, &str),
) -> Level {
    Level::Puzzle {
        info,
        input_description: io.0.to_owned(),
        output_description: io.1.to_owned(),
        constraints,
        hints: hints.iter().map(|h| (*h).to_owned()).collect(),
        reward: Reward { points: reward.0, badge: reward.1.to_owned() },
    }
}

/// The built-in levels, in play order.
pub fn catalog() -> Vec<Level> {
    vec![
        puzzle(
            LevelInfo {
                id: 1,
                name: "RGB Color Classifier".into(),
                description: "Classify colors as predominantly warm (more red) or cool (more blue/green) from their RGB values.".into(),
                difficulty: Difficulty::Basic,
                dataset: DatasetKind::RgbClassification,
                target_accuracy: 0.85,
                max_neurons: 10,
            },
            ("3 input neurons representing R, G, B values (0-1)", "2 output neurons: [warm, cool]"),
            LevelConstraints {
                min_input_neurons: Some(3),
                max_input_neurons: Some(3),
                min_output_neurons: Some(2),
                max_output_neurons: Some(2),
                max_hidden_neurons: None,
            },
            &[
                "Start with 5-7 neurons in your hidden layer",
                "ReLU activation often works well for this type of classification",
                "The rule is simple: if R > (G+B)/2 then it's warm, otherwise cool",
            ],
            (100, "color-master"),
        ),
        puzzle(
            LevelInfo {
                id: 2,
                name: "Pattern Recognition Challenge".into(),
                description: "Identify complex patterns in multi-dimensional data by fine-tuning hyperparameters.".into(),
                difficulty: Difficulty::Advanced,
                dataset: DatasetKind::ComplexClassification,
                target_accuracy: 0.92,
                max_neurons: 15,
            },
            ("4 input neurons representing x1, x2, x3, x4 values (-1 to 1)", "2 output neurons: [pattern A, pattern B]"),
            LevelConstraints {
                min_input_neurons: Some(4),
                max_input_neurons: Some(4),
                min_output_neurons: Some(2),
                max_output_neurons: Some(2),
                max_hidden_neurons: None,
            },
            &[
                "Try different activation functions - tanh might perform better than ReLU here",
                "Experiment with regularization to prevent overfitting",
                "Adam optimizer often converges faster than SGD for complex patterns",
                "The underlying pattern involves trigonometric relationships between inputs",
            ],
            (250, "pattern-master"),
        ),
        puzzle(
            LevelInfo {
                id: 3,
                name: "Efficiency Challenge".into(),
                description: "Design the smallest network that still reaches 90% accuracy on RGB classification.".into(),
                difficulty: Difficulty::Advanced,
                dataset: DatasetKind::RgbClassification,
                target_accuracy: 0.90,
                max_neurons: 5,
            },
            ("3 input neurons representing R, G, B values (0-1)", "2 output neurons: [warm, cool]"),
            LevelConstraints {
                min_input_neurons: Some(3),
                max_input_neurons: Some(3),
                min_output_neurons: Some(2),
                max_output_neurons: Some(2),
                max_hidden_neurons: Some(5),
            },
            &[
                "Focus on the most essential connections",
                "A well-designed small network can outperform a poorly designed large one",
                "Consider which activation function might be most efficient for this task",
            ],
            (300, "efficiency-expert"),
        ),
    ]
}

pub fn level_by_id(id: u32) -> Option<Level> {
    catalog().into_iter().find(|l| l.id() == id)
}

/// The level after `id` in play order; `None` after the last one.
pub fn next_level(id: u32) -> Option<Level> {
    let levels = catalog();
    let pos = levels.iter().position(|l| l.id() == id)?;
    levels.into_iter().nth(pos + 1)
}
