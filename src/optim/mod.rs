pub mod optimizer;
pub mod regularization;

pub use optimizer::Optimizer;
pub use regularization::Regularization;
