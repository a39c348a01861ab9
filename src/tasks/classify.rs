// MotionCoach — Classification Session
//
// A fixed number of live gestures, each classified by the trained network and
// reported as an LED code (class + 1 pulses, none when nothing is confident).

use crate::ann::Ann;
use crate::board::Board;
use crate::clock::Clock;
use crate::config::*;
use crate::console::Console;
use crate::drivers::imu::MotionSensor;
use crate::drivers::led::Indicator;
use crate::evaluate::score;
use crate::events::{ClassificationResult, NormalizedVector};

use super::capture_normalized;

/// Inference without the training-time discriminability and margin gates.
pub fn infer(net: &mut Ann, input: &NormalizedVector) -> ClassificationResult {
    let outputs = net.run(input.as_slice()).to_vec();
    let scores = score(&outputs);
    ClassificationResult {
        predicted: scores.predicted,
        confidence: scores.top,
        discriminability: scores.discriminability,
        outputs,
    }
}

pub fn run<S, K, C, L>(board: &mut Board<S, K, C, L>, net: &mut Ann, options: &SessionOptions) -> Vec<ClassificationResult>
where
    S: MotionSensor,
    K: Clock,
    C: Console,
    L: Indicator,
{
    let mut results = Vec::with_capacity(options.test_cycles);

    for _ in 0..options.test_cycles {
        board.led(false);
        let (_, normalized) = capture_normalized(board, options.normalization, None);

        let result = infer(net, &normalized);
        board.blink_code(result.blink_code());
        board.say(&format!("Neural Network Classification - Motion {}", result.blink_code()));

        match result.predicted {
            Some(class) => log::info!(
                "Classified motion {} (confidence {:.2}, z {:.2})",
                class + 1,
                result.confidence,
                result.discriminability
            ),
            None => log::info!("No confident motion class"),
        }
        results.push(result);
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{sim_board, Gesture};

    #[test]
    fn untrained_network_still_reports_each_cycle() {
        let mut board = sim_board(Gesture::exercise_set());
        let mut net = Ann::preset(&SessionOptions::default()).unwrap();
        let options = SessionOptions {
            test_cycles: 3,
            ..SessionOptions::default()
        };

        let results = run(&mut board, &mut net, &options);
        assert_eq!(results.len(), 3);
        for r in &results {
            assert_eq!(r.outputs.len(), MOTION_CLASSES);
            assert_eq!(r.blink_code(), r.predicted.map_or(0, |c| c + 1));
        }
        let reports = board
            .console
            .lines
            .iter()
            .filter(|l| l.starts_with("Neural Network Classification"))
            .count();
        assert_eq!(reports, 3);
    }

    #[test]
    fn inference_below_floor_predicts_nothing() {
        // Zero weights and biases: every output sits at 0.
        let mut net = Ann::new(
            &[6, 2, 6],
            &[0.0; 24],
            0.0,
            crate::ann::Activation::Relu2,
            crate::ann::Activation::Relu2,
            LearningRates::default(),
        )
        .unwrap();
        let result = infer(&mut net, &NormalizedVector::new([1.0, 0.0, 0.0, 0.0, 1.0, 0.0]));
        assert_eq!(result.predicted, None);
        assert_eq!(result.blink_code(), 0);
        assert_eq!(result.confidence, 0.0);
    }
}
