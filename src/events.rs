// MotionCoach — System Events & Data Types

use crate::config::*;

// ---------------------------------------------------------------------------
// Raw sensor reading (one 3-axis sample)
// ---------------------------------------------------------------------------

/// Integer axis triple in sensor units: mg for acceleration, mdps for
/// angular velocity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Axes {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Axes {
    pub const ZERO: Axes = Axes { x: 0, y: 0, z: 0 };

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(self) -> [i32; AXES] {
        [self.x, self.y, self.z]
    }

    pub fn wrapping_sub(self, rhs: Axes) -> Axes {
        Axes {
            x: self.x.wrapping_sub(rhs.x),
            y: self.y.wrapping_sub(rhs.y),
            z: self.z.wrapping_sub(rhs.z),
        }
    }
}

// ---------------------------------------------------------------------------
// Feature pipeline values
// ---------------------------------------------------------------------------

/// One captured gesture: `[0..3]` linear displacement proxy (mg),
/// `[3..6]` rotation angle proxy (milli-degrees, truncated).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureVector([i32; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [i32; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn from_parts(linear: [i32; AXES], rotation: [i32; AXES]) -> Self {
        let mut values = [0; FEATURE_COUNT];
        values[..AXES].copy_from_slice(&linear);
        values[AXES..].copy_from_slice(&rotation);
        Self(values)
    }

    pub fn values(&self) -> &[i32; FEATURE_COUNT] {
        &self.0
    }

    pub fn linear(&self) -> &[i32] {
        &self.0[..AXES]
    }

    pub fn rotation(&self) -> &[i32] {
        &self.0[AXES..]
    }
}

/// Sign-preserving, per-sub-vector normalised features in `[-1, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NormalizedVector(pub(crate) [f32; FEATURE_COUNT]);

impl NormalizedVector {
    pub fn new(values: [f32; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Values scaled to integer percent, the way they are printed on the console.
    pub fn percent(&self) -> [i32; FEATURE_COUNT] {
        self.0.map(|v| (100.0 * v) as i32)
    }
}

/// One-hot backpropagation target for motion class `class`.
pub fn target_vector(class: usize) -> [f32; MOTION_CLASSES] {
    let mut target = [0.0; MOTION_CLASSES];
    if let Some(slot) = target.get_mut(class) {
        *slot = 1.0;
    }
    target
}

// ---------------------------------------------------------------------------
// Training dataset [class][cycle]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TrainingDataset {
    cycles: usize,
    samples: Vec<Vec<NormalizedVector>>,
}

impl TrainingDataset {
    /// `cycles` is clamped to `1..=MAX_TRAIN_DATA_CYCLES`.
    pub fn new(cycles: usize) -> Self {
        let cycles = cycles.clamp(1, MAX_TRAIN_DATA_CYCLES);
        Self {
            cycles,
            samples: vec![vec![NormalizedVector::default(); cycles]; MOTION_CLASSES],
        }
    }

    /// Dataset with a single cycle holding one example per class.
    pub fn from_examples(examples: [NormalizedVector; MOTION_CLASSES]) -> Self {
        Self {
            cycles: 1,
            samples: examples.iter().map(|v| vec![*v]).collect(),
        }
    }

    pub fn cycles(&self) -> usize {
        self.cycles
    }

    pub fn set(&mut self, class: usize, cycle: usize, sample: NormalizedVector) {
        if let Some(slot) = self.samples.get_mut(class).and_then(|c| c.get_mut(cycle)) {
            *slot = sample;
        }
    }

    pub fn get(&self, class: usize, cycle: usize) -> Option<&NormalizedVector> {
        self.samples.get(class).and_then(|c| c.get(cycle))
    }
}

// ---------------------------------------------------------------------------
// Session results
// ---------------------------------------------------------------------------

/// Result of one live inference. `predicted` is `None` when no output
/// clears [`CONFIDENCE_FLOOR`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub predicted: Option<usize>,
    pub confidence: f32,
    pub discriminability: f32,
    pub outputs: Vec<f32>,
}

impl ClassificationResult {
    /// Blink count used to report the result: class index + 1, 0 for none.
    pub fn blink_code(&self) -> usize {
        self.predicted.map_or(0, |c| c + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingOutcome {
    /// All stored examples classified cleanly at a checkpoint.
    pub converged: bool,
    /// Training steps taken when the session ended.
    pub steps: usize,
}

/// What a foreground poll of the session did.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Trained(TrainingOutcome),
    Classified(Vec<ClassificationResult>),
}
