pub mod dataset;
pub mod preview;

pub use dataset::{generate, generate_named, generate_with_rng, one_hot, DatasetKind, Sample};
pub use preview::{preview, PreviewSample};
