// MotionCoach — Training Session
//
// Records one example per motion class, then trains round-robin against
// one-hot targets. Every checkpoint re-scores all stored examples; training
// stops at the first checkpoint where every example is classified cleanly, or
// when the step budget runs out.

use crate::ann::Ann;
use crate::board::Board;
use crate::clock::Clock;
use crate::config::*;
use crate::console::Console;
use crate::drivers::imu::MotionSensor;
use crate::drivers::led::Indicator;
use crate::evaluate::evaluate;
use crate::events::{target_vector, TrainingDataset, TrainingOutcome};
use crate::normalize::Normalization;

use super::capture_normalized;

/// Dense checkpoints early on, sparse later.
pub fn is_checkpoint(step: usize) -> bool {
    (step % CHECKPOINT_EARLY_INTERVAL == 0 && step < CHECKPOINT_EARLY_LIMIT) || step % CHECKPOINT_INTERVAL == 0
}

pub fn capture_dataset<S, K, C, L>(board: &mut Board<S, K, C, L>, normalization: Normalization) -> TrainingDataset
where
    S: MotionSensor,
    K: Clock,
    C: Console,
    L: Indicator,
{
    board.say("Training Start in 2 seconds ..");
    board.led(false);
    board.delay_ms(TRAINING_START_DELAY_MS);

    let mut dataset = TrainingDataset::new(NUM_TRAIN_DATA_CYCLES);
    for cycle in 0..dataset.cycles() {
        for class in 0..MOTION_CLASSES {
            let prompt = format!("Move to Orientation {} on LED On", class + 1);
            let (features, normalized) = capture_normalized(board, normalization, Some(&prompt));
            log::info!("Recorded orientation {}: {:?}", class + 1, features.values());
            dataset.set(class, cycle, normalized);
        }
    }
    dataset
}

/// Score every stored example of `cycle`; `true` when none is in error.
fn checkpoint<S, K, C, L>(board: &mut Board<S, K, C, L>, net: &mut Ann, dataset: &TrainingDataset, cycle: usize) -> bool
where
    S: MotionSensor,
    K: Clock,
    C: Console,
    L: Indicator,
{
    let mut clean = true;
    for class in 0..MOTION_CLASSES {
        let Some(sample) = dataset.get(class, cycle) else {
            clean = false;
            continue;
        };
        let eval = evaluate(net.run(sample.as_slice()), class);
        log::debug!("class {} -> {:?}", class, eval.scores);
        board.say(&eval.summary());
        if eval.is_error() {
            clean = false;
        }
    }
    board.say(&format!("Error State: {}", u8::from(!clean)));
    clean
}

pub fn fit<S, K, C, L>(
    board: &mut Board<S, K, C, L>,
    net: &mut Ann,
    dataset: &TrainingDataset,
    training_cycles: usize,
) -> TrainingOutcome
where
    S: MotionSensor,
    K: Clock,
    C: Console,
    L: Indicator,
{
    board.say("Training Start");

    let mut converged = false;
    let mut steps = 0;

    'cycles: for cycle in 0..dataset.cycles() {
        let mut step = 0;
        while step < training_cycles {
            for class in 0..MOTION_CLASSES {
                if is_checkpoint(step) {
                    board.say(&format!("Training Epochs: {}", step));
                    board.blink_code(0);
                    if checkpoint(board, net, dataset, cycle) {
                        converged = true;
                        break 'cycles;
                    }
                }

                if let Some(sample) = dataset.get(class, cycle) {
                    net.train(sample.as_slice(), &target_vector(class));
                }
                step += 1;
                steps += 1;
                board.delay_ms(TRAINING_STEP_DELAY_MS);
            }
        }
    }

    let code = if converged { 0 } else { 1 };
    board.blink_code(code);
    board.blink_code(code);

    if converged {
        log::info!("Training converged after {} steps", steps);
    } else {
        log::warn!("Training budget exhausted after {} steps without a clean checkpoint", steps);
    }
    board.say("Training Complete, Now Start Test Motions");

    TrainingOutcome { converged, steps }
}

/// Record the dataset and train on it.
pub fn run<S, K, C, L>(board: &mut Board<S, K, C, L>, net: &mut Ann, options: &SessionOptions) -> TrainingOutcome
where
    S: MotionSensor,
    K: Clock,
    C: Console,
    L: Indicator,
{
    let dataset = capture_dataset(board, options.normalization);
    fit(board, net, &dataset, options.training_cycles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NormalizedVector;
    use crate::normalize::motion_softmax;
    use crate::events::FeatureVector;
    use crate::sim::{sim_board, Gesture};

    fn dataset(features: [[i32; 6]; 6]) -> TrainingDataset {
        TrainingDataset::from_examples(features.map(|f| motion_softmax(&FeatureVector::new(f))))
    }

    fn axis_dataset() -> TrainingDataset {
        dataset([
            [1000, 0, 0, 90_000, 0, 0],
            [-1000, 0, 0, -90_000, 0, 0],
            [0, 1000, 0, 0, 90_000, 0],
            [0, -1000, 0, 0, -90_000, 0],
            [0, 0, 1000, 0, 0, 90_000],
            [0, 0, -1000, 0, 0, -90_000],
        ])
    }

    #[test]
    fn checkpoint_schedule() {
        let hits: Vec<usize> = (0..450).filter(|&s| is_checkpoint(s)).collect();
        assert_eq!(hits, vec![0, 20, 40, 60, 80, 100, 200, 300, 400]);
    }

    #[test]
    fn separable_axes_converge_within_budget() {
        let mut board = sim_board(Vec::new());
        let mut net = Ann::preset(&SessionOptions::default()).unwrap();
        let data = axis_dataset();

        let outcome = fit(&mut board, &mut net, &data, TRAINING_CYCLES);
        assert!(outcome.converged, "{:?}", outcome);
        assert!(outcome.steps < TRAINING_CYCLES);
        assert!(board.console.contains("Error State: 0"));

        for class in 0..MOTION_CLASSES {
            let sample = data.get(class, 0).unwrap();
            let eval = evaluate(net.run(sample.as_slice()), class);
            assert!(!eval.is_error(), "class {}: {}", class, eval.summary());
        }
    }

    #[test]
    fn one_hot_inputs_converge() {
        let mut examples = [NormalizedVector::default(); MOTION_CLASSES];
        for (class, example) in examples.iter_mut().enumerate() {
            let mut v = [0.0; FEATURE_COUNT];
            v[class] = 1.0;
            *example = NormalizedVector::new(v);
        }
        let data = TrainingDataset::from_examples(examples);
        let mut board = sim_board(Vec::new());
        let mut net = Ann::preset(&SessionOptions::default()).unwrap();

        let outcome = fit(&mut board, &mut net, &data, TRAINING_CYCLES);
        assert!(outcome.converged, "{:?}", outcome);
    }

    #[test]
    fn exhausted_budget_reports_failure() {
        let mut board = sim_board(Vec::new());
        let mut net = Ann::preset(&SessionOptions::default()).unwrap();
        let outcome = fit(&mut board, &mut net, &axis_dataset(), 12);

        assert!(!outcome.converged);
        assert_eq!(outcome.steps, 12);
        assert!(board.console.contains("Error State: 1"));
        assert!(board.console.contains("Training Complete"));
        // checkpoint at step 0, then two failure codes of one slow pulse each
        assert_eq!(board.led.pulses(), 3 * 2 * LED_CODE_RAPID_PULSES + 2);
    }

    #[test]
    fn capture_records_one_example_per_class() {
        let mut board = sim_board(Gesture::exercise_set());
        let data = capture_dataset(&mut board, Normalization::UnitSphere);

        assert_eq!(data.cycles(), 1);
        for class in 0..MOTION_CLASSES {
            let v = data.get(class, 0).unwrap().as_slice();
            let linear: f32 = v[..3].iter().map(|x| x * x).sum();
            assert!((linear - 1.0).abs() < 1e-4);
        }
        // Orientation 1 moves +X, orientation 2 moves -X.
        assert!(data.get(0, 0).unwrap().as_slice()[0] > 0.9);
        assert!(data.get(1, 0).unwrap().as_slice()[0] < -0.9);
        assert!(board.console.contains("Move to Orientation 6 on LED On"));
    }
}
