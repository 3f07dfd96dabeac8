pub mod mse;
pub mod accuracy;

pub use mse::MseLoss;
pub use accuracy::{accuracy, argmax, evaluate, is_correct, Evaluation};
