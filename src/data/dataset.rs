use rand::Rng;
use serde::{Serialize, Deserialize};

/// One labeled example. `target` is one-hot over the output classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub input: Vec<f64>,
    pub target: Vec<f64>,
}

/// The synthetic dataset families the sandbox knows how to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatasetKind {
    /// Three channels in [0, 1]; class 0 ("warm") iff `R > (G + B) / 2`.
    #[serde(rename = "rgb-classification")]
    RgbClassification,
    /// Four values in [-1, 1]; class 0 iff `sin(x1·x2) + cos(x3·x4) > 0`.
    #[serde(rename = "complex-classification")]
    ComplexClassification,
}

impl DatasetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::RgbClassification => "rgb-classification",
            DatasetKind::ComplexClassification => "complex-classification",
        }
    }

    /// `None` for names the generator does not know.
    pub fn parse(name: &str) -> Option<DatasetKind> {
        match name.trim() {
            "rgb-classification" => Some(DatasetKind::RgbClassification),
            "complex-classification" => Some(DatasetKind::ComplexClassification),
            _ => None,
        }
    }

    pub fn input_size(&self) -> usize {
        match self {
            DatasetKind::RgbClassification => 3,
            DatasetKind::ComplexClassification => 4,
        }
    }

    pub fn output_size(&self) -> usize {
        2
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Sample {
        match self {
            DatasetKind::RgbClassification => {
                let (r, g, b) = (rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>());
                let class = if r > (g + b) / 2.0 { 0 } else { 1 };
                Sample { input: vec![r, g, b], target: one_hot(class, 2) }
            }
            DatasetKind::ComplexClassification => {
                let x: Vec<f64> = (0..4).map(|_| rng.gen::<f64>() * 2.0 - 1.0).collect();
                let class = if (x[0] * x[1]).sin() + (x[2] * x[3]).cos() > 0.0 { 0 } else { 1 };
                Sample { input: x, target: one_hot(class, 2) }
            }
        }
    }
}

/// One-hot vector of length `num_classes` with `label` set.
pub fn one_hot(label: usize, num_classes: usize) -> Vec<f64> {
    let mut v = vec![0.0; num_classes];
    if label < num_classes {
        v[label] = 1.0;
    }
    v
}

/// Fresh, independently random samples of `kind`.
pub fn generate(kind: DatasetKind, count: usize) -> Vec<Sample> {
    generate_with_rng(kind, count, &mut rand::thread_rng())
}

pub fn generate_with_rng<R: Rng + ?Sized>(kind: DatasetKind, count: usize, rng: &mut R) -> Vec<Sample> {
    (0..count).map(|_| kind.sample(rng)).collect()
}

/// Generates by name. Unknown names produce an empty dataset, not an error.
pub fn generate_named(name: &str, count: usize) -> Vec<Sample> {
    match DatasetKind::parse(name) {
        Some(kind) => generate(kind, count),
        None => {
            log::warn!("unknown dataset '{name}', generating no samples");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn rgb_labels_follow_warmth_rule() {
        let samples = generate_with_rng(DatasetKind::RgbClassification, 500, &mut StdRng::seed_from_u64(11));
        assert_eq!(samples.len(), 500);
        for s in &samples {
            assert_eq!(s.input.len(), 3);
            assert!(s.input.iter().all(|v| (0.0..=1.0).contains(v)));
            assert_eq!(s.target.iter().sum::<f64>(), 1.0);
            assert_eq!(s.target.len(), 2);
            let warm = s.input[0] > (s.input[1] + s.input[2]) / 2.0;
            assert_eq!(s.target[0] == 1.0, warm);
        }
    }

    #[test]
    fn complex_labels_follow_trig_rule() {
        let samples = generate(DatasetKind::ComplexClassification, 200);
        for s in &samples {
            assert_eq!(s.input.len(), 4);
            assert!(s.input.iter().all(|v| (-1.0..=1.0).contains(v)));
            let x = &s.input;
            let class0 = (x[0] * x[1]).sin() + (x[2] * x[3]).cos() > 0.0;
            assert_eq!(s.target, if class0 { vec![1.0, 0.0] } else { vec![0.0, 1.0] });
        }
    }

    #[test]
    fn unknown_name_is_empty() {
        assert!(generate_named("spiral", 50).is_empty());
        assert_eq!(generate_named("rgb-classification", 5).len(), 5);
    }

    #[test]
    fn calls_are_independent() {
        let a = generate(DatasetKind::RgbClassification, 10);
        let b = generate(DatasetKind::RgbClassification, 10);
        assert_ne!(a, b);
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in [DatasetKind::RgbClassification, DatasetKind::ComplexClassification] {
            assert_eq!(DatasetKind::parse(kind.as_str()), Some(kind));
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
