// MotionCoach — Training / Classification Session
//
// Owns the board, the network, the trained flag and the double-tap mailbox.
// `poll` is one pass of the foreground loop:
//
//   Untrained --double tap--> train --> Trained --next poll--> classify --> Untrained

use std::sync::Arc;

use crate::ann::Ann;
use crate::board::Board;
use crate::clock::Clock;
use crate::config::*;
use crate::console::Console;
use crate::drivers::imu::MotionSensor;
use crate::drivers::led::Indicator;
use crate::events::{SessionEvent, TrainingOutcome};
use crate::input::TapLatch;
use crate::tasks;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Untrained,
    Trained(TrainingOutcome),
}

pub struct Session<S, K, C, L> {
    board: Board<S, K, C, L>,
    net: Ann,
    options: SessionOptions,
    tap: Arc<TapLatch>,
    state: SessionState,
}

impl<S, K, C, L> Session<S, K, C, L>
where
    S: MotionSensor,
    K: Clock,
    C: Console,
    L: Indicator,
{
    pub fn new(mut board: Board<S, K, C, L>, options: SessionOptions, tap: Arc<TapLatch>) -> anyhow::Result<Self> {
        let net = Ann::preset(&options)?;

        board.say("EmbeddedML Physical Therapy Two-Motion Exercise Classification");
        board.say("DOUBLE TAP to start recording motions");
        board.blink_notification(3);

        Ok(Self {
            board,
            net,
            options,
            tap,
            state: SessionState::Untrained,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn board(&self) -> &Board<S, K, C, L> {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board<S, K, C, L> {
        &mut self.board
    }

    pub fn network(&self) -> &Ann {
        &self.net
    }

    /// One foreground iteration. Returns what happened, if anything.
    pub fn poll(&mut self) -> Option<SessionEvent> {
        if let SessionState::Trained(_) = self.state {
            let results = tasks::classify::run(&mut self.board, &mut self.net, &self.options);
            self.state = SessionState::Untrained;
            self.board.say("DOUBLE TAP to start recording new Two-Motion Exercises");
            return Some(SessionEvent::Classified(results));
        }

        if self.tap.take() {
            log::info!("Double tap — starting training session");
            self.board.blink_code(0);
            let outcome = tasks::train::run(&mut self.board, &mut self.net, &self.options);
            self.state = SessionState::Trained(outcome);
            return Some(SessionEvent::Trained(outcome));
        }

        None
    }

    /// Foreground loop, ticking every [`DATA_PERIOD_MS`]. Never returns.
    pub fn run(&mut self) -> ! {
        loop {
            if let Some(event) = self.poll() {
                log::debug!("Session event: {:?}", event);
            }
            self.board.delay_ms(DATA_PERIOD_MS);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{sim_board, Gesture};

    #[test]
    fn idle_without_a_tap() {
        let tap = Arc::new(TapLatch::new());
        let mut session = Session::new(sim_board(Gesture::exercise_set()), SessionOptions::default(), tap).unwrap();

        assert_eq!(session.poll(), None);
        assert_eq!(session.poll(), None);
        assert_eq!(session.state(), SessionState::Untrained);
        assert!(session.board().console.contains("DOUBLE TAP to start recording motions"));
    }

    #[test]
    fn tap_trains_then_next_poll_classifies() {
        let tap = Arc::new(TapLatch::new());
        let options = SessionOptions {
            test_cycles: 2,
            ..SessionOptions::default()
        };
        let mut session = Session::new(sim_board(Gesture::exercise_set()), options, Arc::clone(&tap)).unwrap();

        assert!(tap.signal());
        let Some(SessionEvent::Trained(outcome)) = session.poll() else {
            panic!("expected a training event");
        };
        assert!(outcome.converged);
        assert_eq!(session.state(), SessionState::Trained(outcome));
        assert!(!tap.is_pending());

        let Some(SessionEvent::Classified(results)) = session.poll() else {
            panic!("expected a classification event");
        };
        assert_eq!(results.len(), 2);
        // Replayed gestures wrap around to orientations 1 and 2.
        assert_eq!(results[0].predicted, Some(0));
        assert_eq!(results[1].predicted, Some(1));
        assert_eq!(session.state(), SessionState::Untrained);
        assert!(session.board().console.contains("DOUBLE TAP to start recording new"));

        // Back to waiting for the next tap.
        assert_eq!(session.poll(), None);
    }
}
