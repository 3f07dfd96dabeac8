use serde::{Serialize, Deserialize};

/// Update rule selector.
///
/// `Adam` and `RmsProp` are not the adaptive algorithms their names suggest:
/// they scale the plain SGD update by a fixed factor. Training outcomes and
/// level scores depend on these exact factors, so they stay as they are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Optimizer {
    #[default]
    Sgd,
    Adam,
    #[serde(rename = "rmsprop")]
    RmsProp,
}

impl Optimizer {
    /// Factor applied to `lr * gradient * source_output`.
    pub fn multiplier(&self) -> f64 {
        match self {
            Optimizer::Sgd => 1.0,
            Optimizer::Adam => 1.1,
            Optimizer::RmsProp => 1.05,
        }
    }

    /// Scales a raw weight update.
    pub fn scale(&self, update: f64) -> f64 {
        match self {
            Optimizer::Sgd => update,
            _ => update * self.multiplier(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Optimizer::Sgd => "sgd",
            Optimizer::Adam => "adam",
            Optimizer::RmsProp => "rmsprop",
        }
    }

    pub fn parse(name: &str) -> Option<Optimizer> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sgd" => Some(Optimizer::Sgd),
            "adam" => Some(Optimizer::Adam),
            "rmsprop" => Some(Optimizer::RmsProp),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multipliers_are_fixed() {
        assert_eq!(Optimizer::Sgd.scale(0.5), 0.5);
        assert!((Optimizer::Adam.scale(0.5) - 0.55).abs() < 1e-12);
        assert!((Optimizer::RmsProp.scale(0.5) - 0.525).abs() < 1e-12);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Optimizer::RmsProp).unwrap(), "\"rmsprop\"");
        let adam: Optimizer = serde_json::from_str("\"adam\"").unwrap();
        assert_eq!(adam, Optimizer::Adam);
    }
}
