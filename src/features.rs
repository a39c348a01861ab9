// MotionCoach — Two-Phase Motion Feature Extraction
//
// Phase 0 measures how far the resting acceleration moved across a fixed dwell
// (a linear displacement proxy). Phase 1 integrates the gyroscope until the
// rotation magnitude reaches ANGLE_MAG_MAX_THRESHOLD or the cycle ceiling.

use crate::board::Board;
use crate::clock::Clock;
use crate::config::*;
use crate::console::Console;
use crate::drivers::imu::MotionSensor;
use crate::drivers::led::Indicator;
use crate::events::{Axes, FeatureVector};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearCapture {
    /// Post-motion minus pre-motion acceleration, mg.
    pub delta: [i32; AXES],
    /// Euclidean norm of `delta`. Reported, not used as a feature.
    pub magnitude: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationCapture {
    /// Truncated rotation per axis, milli-degrees.
    pub angles: [i32; AXES],
    /// Rotation magnitude at loop exit, degrees.
    pub magnitude: f32,
    /// Integration steps executed.
    pub cycles: usize,
}

pub fn capture_linear<S, K, C, L>(board: &mut Board<S, K, C, L>) -> LinearCapture
where
    S: MotionSensor,
    K: Clock,
    C: Console,
    L: Indicator,
{
    let initial = board.sensor.linear_acceleration();

    board.say("Start First Motion when LED On");
    board.led(true);
    board.delay_ms(MOTION_DWELL_MS);

    board.say("End Motion");
    board.delay_ms(MOTION_SETTLE_MS);

    let last = board.sensor.linear_acceleration();
    let delta = last.wrapping_sub(initial).to_array();
    let magnitude = delta.iter().map(|&d| (d as f32).powi(2)).sum::<f32>().sqrt();
    log::debug!("Linear delta {:?} (|a| = {:.1} mg)", delta, magnitude);

    board.led(false);
    LinearCapture { delta, magnitude }
}

pub fn capture_rotation<S, K, C, L>(board: &mut Board<S, K, C, L>) -> RotationCapture
where
    S: MotionSensor,
    K: Clock,
    C: Console,
    L: Indicator,
{
    let t_sample = DATA_PERIOD_MS as f32 / 1000.0;

    // Resting rate, subtracted from every later sample.
    let offset = board.sensor.angular_velocity();

    board.say("Start Second Motion when LED On");
    board.led(true);

    let mut previous = Axes::ZERO.to_array();
    let mut rotate_angle = [0.0f32; AXES];
    let mut angles = [0i32; AXES];
    let mut magnitude = 0.0f32;
    let mut cycles = 0;

    for _ in 0..MAX_ROTATION_ACQUIRE_CYCLES {
        board.delay_ms(DATA_PERIOD_MS);
        let current = board.sensor.angular_velocity().wrapping_sub(offset).to_array();
        cycles += 1;

        // Trapezoidal integration: mdps * s = milli-degrees.
        for axis in 0..AXES {
            rotate_angle[axis] += (previous[axis] + current[axis]) as f32 * t_sample / 2.0;
        }
        previous = current;

        magnitude = rotate_angle.iter().map(|a| a * a).sum::<f32>().sqrt() / MILLI_PER_UNIT;
        if magnitude >= ANGLE_MAG_MAX_THRESHOLD {
            break;
        }

        // Only iterations below the threshold update the stored angles.
        for axis in 0..AXES {
            angles[axis] = rotate_angle[axis] as i32;
        }
    }

    board.say(&format!(
        "Motion with Angle Mag of {} degrees complete. Now Return to Next Start Position",
        magnitude as i32
    ));
    log::debug!("Rotation {:?} after {} cycles", angles, cycles);

    board.led(false);
    board.delay_ms(ROTATION_RETURN_MS);

    RotationCapture {
        angles,
        magnitude,
        cycles,
    }
}

/// Both phases, back to back, as one feature vector.
pub fn capture<S, K, C, L>(board: &mut Board<S, K, C, L>) -> FeatureVector
where
    S: MotionSensor,
    K: Clock,
    C: Console,
    L: Indicator,
{
    let linear = capture_linear(board);
    let rotation = capture_rotation(board);
    FeatureVector::from_parts(linear.delta, rotation.angles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::console::RecordingConsole;
    use crate::drivers::led::RecordingLed;
    use crate::sim::{Gesture, SimulatedImu};
    use approx::assert_relative_eq;

    fn board(gestures: Vec<Gesture>) -> Board<SimulatedImu, ManualClock, RecordingConsole, RecordingLed> {
        Board::new(
            SimulatedImu::new(gestures),
            ManualClock::new(),
            RecordingConsole::new(),
            RecordingLed::new(),
        )
    }

    #[test]
    fn linear_phase_reports_acceleration_change() {
        let mut b = board(vec![Gesture::new([300, -400, 0], [0, 0, 0])]);
        let capture = capture_linear(&mut b);

        assert_eq!(capture.delta, [300, -400, 0]);
        assert_relative_eq!(capture.magnitude, 500.0);
        assert_eq!(b.clock.now_ms(), MOTION_DWELL_MS + MOTION_SETTLE_MS);
        assert!(b.console.contains("Start First Motion"));
        assert!(b.console.contains("End Motion"));
        assert_eq!(b.led.pulses(), 1);
        assert!(!b.led.is_on());
    }

    #[test]
    fn rotation_exits_early_past_threshold() {
        // 90 °/s about X: crosses 90° after ~100 steps of 10 ms.
        let mut b = board(vec![Gesture::new([0, 0, 0], [90_000, 0, 0])]);
        capture_linear(&mut b);
        let capture = capture_rotation(&mut b);

        assert!(capture.cycles < MAX_ROTATION_ACQUIRE_CYCLES);
        assert!(capture.magnitude >= ANGLE_MAG_MAX_THRESHOLD);
        // First step integrates from rest: 450 mdeg, then 900 per step.
        assert_eq!(capture.cycles, 101);
        // Stored angles lag the exiting iteration by one step.
        assert_eq!(capture.angles, [89_550, 0, 0]);
        assert!(b.console.contains("Angle Mag of 90 degrees"));
    }

    #[test]
    fn slow_rotation_runs_to_the_ceiling() {
        // 10 °/s for 4 s tops out at ~40°.
        let mut b = board(vec![Gesture::new([0, 0, 0], [0, -10_000, 0])]);
        capture_linear(&mut b);
        let before = b.clock.now_ms();
        let capture = capture_rotation(&mut b);

        assert_eq!(capture.cycles, MAX_ROTATION_ACQUIRE_CYCLES);
        assert!(capture.magnitude < ANGLE_MAG_MAX_THRESHOLD);
        assert!(capture.angles[1] < -39_000 && capture.angles[1] > -40_000);
        assert_eq!(
            b.clock.now_ms() - before,
            MAX_ROTATION_ACQUIRE_CYCLES as u64 * DATA_PERIOD_MS + ROTATION_RETURN_MS
        );
    }

    #[test]
    fn gyro_offset_is_removed() {
        let mut b = board(vec![Gesture::new([0, 0, 0], [0, 0, 60_000]).with_gyro_bias([1500, -700, 250])]);
        let features = capture(&mut b);
        assert_eq!(features.rotation()[0], 0);
        assert_eq!(features.rotation()[1], 0);
        assert!(features.rotation()[2] > 80_000);
    }

    #[test]
    fn failed_reads_yield_zero_features() {
        let mut b = board(vec![Gesture::new([100, 100, 100], [50_000, 0, 0])]);
        b.sensor.fail_reads(true);
        let features = capture(&mut b);
        assert_eq!(features.values(), &[0; FEATURE_COUNT]);
    }
}
