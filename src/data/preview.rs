use serde::Serialize;

use crate::data::dataset::{generate, DatasetKind, Sample};

/// A sample annotated for display next to the training chart.
#[derive(Debug, Clone, Serialize)]
pub struct PreviewSample {
    #[serde(flatten)]
    pub sample: Sample,
    /// `#rrggbb`, only for colour datasets.
    pub color: Option<String>,
    pub label: String,
}

/// A handful of fresh samples with display labels.
pub fn preview(kind: DatasetKind, count: usize) -> Vec<PreviewSample> {
    generate(kind, count).into_iter().map(|s| annotate(kind, s)).collect()
}

fn annotate(kind: DatasetKind, sample: Sample) -> PreviewSample {
    match kind {
        DatasetKind::RgbClassification => {
            let color = rgb_to_hex(sample.input[0], sample.input[1], sample.input[2]);
            let warm = sample.target[0] > sample.target[1];
            PreviewSample {
                sample,
                color: Some(color),
                label: if warm { "Warm" } else { "Cool" }.to_owned(),
            }
        }
        DatasetKind::ComplexClassification => {
            let class = if sample.target[0] > sample.target[1] { 0 } else { 1 };
            PreviewSample { sample, color: None, label: format!("Class {class}") }
        }
    }
}

/// Channels in [0, 1] to a lowercase hex colour.
pub fn rgb_to_hex(r: f64, g: f64, b: f64) -> String {
    let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("#{:02x}{:02x}{:02x}", channel(r), channel(g), channel(b))
}
