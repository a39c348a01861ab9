// End-to-end session runs on the simulated board.

use std::sync::Arc;

use motioncoach::config::{MOTION_CLASSES, NUMBER_TEST_CYCLES};
use motioncoach::input::TapLatch;
use motioncoach::sim::{sim_board, Gesture};
use motioncoach::{Session, SessionEvent, SessionOptions, SessionState};

fn biased_exercise_set() -> Vec<Gesture> {
    Gesture::exercise_set()
        .into_iter()
        .map(|g| g.with_gyro_bias([350, -120, 75]))
        .collect()
}

#[test]
fn trains_then_classifies_every_exercise() {
    let tap = Arc::new(TapLatch::new());
    let mut session = Session::new(
        sim_board(Gesture::exercise_set()),
        SessionOptions::default(),
        Arc::clone(&tap),
    )
    .unwrap();
    assert_eq!(session.board().led.pulses(), 3);

    tap.signal();
    let Some(SessionEvent::Trained(outcome)) = session.poll() else {
        panic!("tap should start a training session");
    };
    assert!(outcome.converged, "{:?}", outcome);

    let Some(SessionEvent::Classified(results)) = session.poll() else {
        panic!("training should be followed by classification");
    };
    assert_eq!(results.len(), NUMBER_TEST_CYCLES);
    for (i, result) in results.iter().enumerate() {
        let expected = i % MOTION_CLASSES;
        assert_eq!(result.predicted, Some(expected), "test cycle {}: {:?}", i, result.outputs);
        assert_eq!(result.blink_code(), expected + 1);
        assert!(result.confidence > 0.1);
    }

    let console = &session.board().console;
    assert!(console.contains("Training Complete, Now Start Test Motions"));
    assert!(console.contains("Neural Network Classification - Motion 6"));
    assert!(console.contains("Softmax Input"));
}

#[test]
fn gyro_bias_does_not_change_the_result() {
    let run = |gestures: Vec<Gesture>| {
        let tap = Arc::new(TapLatch::new());
        let mut session = Session::new(sim_board(gestures), SessionOptions::default(), Arc::clone(&tap)).unwrap();
        tap.signal();
        let trained = session.poll();
        let classified = session.poll();
        (trained, classified)
    };

    assert_eq!(run(Gesture::exercise_set()), run(biased_exercise_set()));
}

#[test]
fn taps_while_pending_are_coalesced() {
    let tap = Arc::new(TapLatch::new());
    let options = SessionOptions {
        test_cycles: 1,
        ..SessionOptions::default()
    };
    let mut session = Session::new(sim_board(Gesture::exercise_set()), options, Arc::clone(&tap)).unwrap();

    assert!(tap.signal());
    assert!(!tap.signal(), "second tap before the session consumed the first");

    assert!(matches!(session.poll(), Some(SessionEvent::Trained(_))));
    assert!(matches!(session.poll(), Some(SessionEvent::Classified(_))));
    assert_eq!(session.poll(), None);
    assert_eq!(session.state(), SessionState::Untrained);
}

#[test]
fn retraining_on_the_same_motions_is_already_clean() {
    let tap = Arc::new(TapLatch::new());
    let options = SessionOptions {
        test_cycles: 2,
        ..SessionOptions::default()
    };
    let mut session = Session::new(sim_board(Gesture::exercise_set()), options, Arc::clone(&tap)).unwrap();

    tap.signal();
    assert!(matches!(session.poll(), Some(SessionEvent::Trained(o)) if o.converged));
    assert!(matches!(session.poll(), Some(SessionEvent::Classified(_))));

    // Weights persist across sessions; replay the same motions from the start.
    session.board_mut().sensor.load(Gesture::exercise_set());
    tap.signal();
    let Some(SessionEvent::Trained(outcome)) = session.poll() else {
        panic!("second tap should retrain");
    };
    assert!(outcome.converged);
    assert_eq!(outcome.steps, 0);
}
