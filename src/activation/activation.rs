use serde::{Serialize, Deserialize};
use std::f64::consts::E;

/// The single activation function shared by every non-input neuron.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActivationFunction {
    #[default]
    Relu,
    Sigmoid,
    Tanh,
}

impl ActivationFunction {
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Relu => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::Tanh => x.tanh(),
        }
    }

    /// Derivative evaluated at the pre-activation value `x`.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Relu => if x > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::Sigmoid => {
                let fx = self.function(x);
                fx * (1.0 - fx)
            }
            ActivationFunction::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivationFunction::Relu => "relu",
            ActivationFunction::Sigmoid => "sigmoid",
            ActivationFunction::Tanh => "tanh",
        }
    }

    pub fn parse(name: &str) -> Option<ActivationFunction> {
        match name.trim().to_ascii_lowercase().as_str() {
            "relu" => Some(ActivationFunction::Relu),
            "sigmoid" => Some(ActivationFunction::Sigmoid),
            "tanh" => Some(ActivationFunction::Tanh),
            _ => None,
        }
    }
}
