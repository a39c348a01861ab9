// MotionCoach — On-device exercise orientation learning
//
// Two-phase motion capture → per-sub-vector normalisation → a small
// feed-forward network trained in place, toggled by a double tap between a
// training session and a classification session.

pub mod ann;
pub mod board;
pub mod clock;
pub mod config;
pub mod console;
pub mod drivers;
pub mod evaluate;
pub mod events;
pub mod features;
pub mod input;
pub mod normalize;
pub mod session;
pub mod sim;
pub mod tasks;

pub use ann::{Activation, Ann};
pub use board::Board;
pub use config::{LearningRates, SessionOptions};
pub use events::{ClassificationResult, FeatureVector, NormalizedVector, SessionEvent, TrainingOutcome};
pub use session::{Session, SessionState};
