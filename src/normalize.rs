// MotionCoach — Feature Normalisation
//
// The six features are two independent 3-vectors (linear, rotational). Each
// is scaled on its own and keeps the sign of every component.
//
// A zero sub-vector has no direction; it maps to zeros (with a warning) so a
// NaN can never reach the network's weights.

use crate::config::*;
use crate::events::{FeatureVector, NormalizedVector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Normalization {
    /// `|x_i| / ‖x‖`, sign restored; each sub-vector lands on the unit sphere.
    #[default]
    UnitSphere,
    /// `x_i² / Σ x_j²`, sign restored; each sub-vector's magnitudes sum to 1.
    SquareLaw,
}

impl Normalization {
    pub fn apply(self, features: &FeatureVector) -> NormalizedVector {
        match self {
            Self::UnitSphere => motion_softmax(features),
            Self::SquareLaw => square_law_softmax(features),
        }
    }
}

pub fn motion_softmax(features: &FeatureVector) -> NormalizedVector {
    normalize_with(features, |x, sum_sq| x.abs() / sum_sq.sqrt())
}

pub fn square_law_softmax(features: &FeatureVector) -> NormalizedVector {
    normalize_with(features, |x, sum_sq| x * x / sum_sq)
}

fn normalize_with(features: &FeatureVector, scale: impl Fn(f32, f32) -> f32) -> NormalizedVector {
    let mut out = [0.0f32; FEATURE_COUNT];

    for (half, sub) in features.values().chunks_exact(AXES).enumerate() {
        let sub: Vec<f32> = sub.iter().map(|&v| v as f32).collect();
        let sum_sq: f32 = sub.iter().map(|v| v * v).sum();

        if sum_sq == 0.0 {
            log::warn!("Zero {} sub-vector — normalised to zeros", if half == 0 { "linear" } else { "rotation" });
            continue;
        }

        for (axis, &x) in sub.iter().enumerate() {
            let magnitude = scale(x, sum_sq);
            out[half * AXES + axis] = if x < 0.0 { -magnitude } else { magnitude };
        }
    }

    NormalizedVector::new(out)
}
