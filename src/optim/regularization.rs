use rand::Rng;
use serde::{Serialize, Deserialize};

/// Weight-decay coefficient used by `Regularization::L2`.
pub const L2_DECAY: f64 = 0.0001;

/// Probability that a connection's update is dropped under `Dropout`.
pub const DROPOUT_RATE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Regularization {
    #[default]
    None,
    Dropout,
    L2,
}

impl Regularization {
    /// Decay added to the subtracted amount on every update.
    pub fn decay_term(&self, weight: f64) -> f64 {
        match self {
            Regularization::L2 => L2_DECAY * weight,
            _ => 0.0,
        }
    }

    /// Returns the update to apply this step: zero for a dropped connection.
    pub fn mask_update<R: Rng + ?Sized>(&self, update: f64, rng: &mut R) -> f64 {
        match self {
            Regularization::Dropout if rng.gen_bool(DROPOUT_RATE) => 0.0,
            _ => update,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Regularization::None => "none",
            Regularization::Dropout => "dropout",
            Regularization::L2 => "l2",
        }
    }

    pub fn parse(name: &str) -> Option<Regularization> {
        match name.trim().to_ascii_lowercase().as_str() {
            "none" => Some(Regularization::None),
            "dropout" => Some(Regularization::Dropout),
            "l2" => Some(Regularization::L2),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn l2_decay_only_for_l2() {
        assert_eq!(Regularization::None.decay_term(2.0), 0.0);
        assert_eq!(Regularization::Dropout.decay_term(2.0), 0.0);
        assert!((Regularization::L2.decay_term(2.0) - 0.0002).abs() < 1e-15);
    }

    #[test]
    fn dropout_zeroes_roughly_half() {
        let mut rng = StdRng::seed_from_u64(7);
        let dropped = (0..10_000)
            .filter(|_| Regularization::Dropout.mask_update(1.0, &mut rng) == 0.0)
            .count();
        assert!((4_500..5_500).contains(&dropped), "dropped {dropped}");
    }

    #[test]
    fn non_dropout_never_masks() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            assert_eq!(Regularization::L2.mask_update(0.3, &mut rng), 0.3);
            assert_eq!(Regularization::None.mask_update(0.3, &mut rng), 0.3);
        }
    }
}
