pub mod classify;
pub mod train;

use crate::board::Board;
use crate::clock::Clock;
use crate::config::*;
use crate::console::Console;
use crate::drivers::imu::MotionSensor;
use crate::drivers::led::Indicator;
use crate::events::{FeatureVector, NormalizedVector};
use crate::normalize::Normalization;

/// Tab-separated integers, as printed on the console.
fn tabbed<I: IntoIterator<Item = i32>>(values: I) -> String {
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("\t")
}

/// Wait at the start pose, capture one gesture and normalise it, echoing both
/// vectors to the console.
fn capture_normalized<S, K, C, L>(
    board: &mut Board<S, K, C, L>,
    normalization: Normalization,
    prompt: Option<&str>,
) -> (FeatureVector, NormalizedVector)
where
    S: MotionSensor,
    K: Clock,
    C: Console,
    L: Indicator,
{
    board.say("Move to Start Position - Wait for LED On");
    board.delay_ms(START_POSITION_INTERVAL_MS);
    if let Some(prompt) = prompt {
        board.say(prompt);
    }

    let features = crate::features::capture(board);
    let normalized = normalization.apply(&features);

    board.say(&format!("Softmax Input \t{}", tabbed(features.values().iter().copied())));
    board.say(&format!("Softmax Output\t{}", tabbed(normalized.percent())));
    (features, normalized)
}
