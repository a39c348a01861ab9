// MotionCoach — Simulated Hardware
//
// Scripted motion source for the host build and tests. Each capture consumes
// one gesture: the pre-motion accelerometer read starts it, the post-motion
// read returns rest + delta, the first gyro read is the resting offset and
// every later one adds the gesture's constant rate.

use crate::clock::ManualClock;
use crate::console::RecordingConsole;
use crate::board::Board;
use crate::drivers::imu::MotionSensor;
use crate::drivers::led::RecordingLed;
use crate::events::Axes;

/// Gravity on Z, in mg.
pub const REST_ACCELERATION: Axes = Axes::new(0, 0, 1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gesture {
    pub accel_delta: Axes,
    pub rate: Axes,
    pub gyro_bias: Axes,
}

impl Gesture {
    pub fn new(accel_delta: [i32; 3], rate: [i32; 3]) -> Self {
        Self {
            accel_delta: Axes::new(accel_delta[0], accel_delta[1], accel_delta[2]),
            rate: Axes::new(rate[0], rate[1], rate[2]),
            gyro_bias: Axes::ZERO,
        }
    }

    pub fn with_gyro_bias(mut self, bias: [i32; 3]) -> Self {
        self.gyro_bias = Axes::new(bias[0], bias[1], bias[2]);
        self
    }

    /// Six well-separated exercise motions, one per class.
    pub fn exercise_set() -> Vec<Gesture> {
        vec![
            Gesture::new([800, -100, 50], [60_000, 20_000, -5_000]),
            Gesture::new([-700, 200, -30], [-50_000, 10_000, 8_000]),
            Gesture::new([50, 900, -200], [4_000, 70_000, -3_000]),
            Gesture::new([-40, -850, 120], [-2_000, -65_000, 9_000]),
            Gesture::new([30, 60, 950], [1_000, -4_000, 80_000]),
            Gesture::new([-20, -90, -900], [3_000, 6_000, -75_000]),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct SimulatedImu {
    gestures: Vec<Gesture>,
    current: usize,
    accel_reads: usize,
    gyro_reads: usize,
    failing: bool,
}

impl SimulatedImu {
    /// Gestures are played in order and wrap around.
    pub fn new(gestures: Vec<Gesture>) -> Self {
        Self {
            gestures,
            current: 0,
            accel_reads: 0,
            gyro_reads: 0,
            failing: false,
        }
    }

    pub fn fail_reads(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// Replace the script and restart from its first gesture.
    pub fn load(&mut self, gestures: Vec<Gesture>) {
        *self = Self {
            failing: self.failing,
            ..Self::new(gestures)
        };
    }

    fn gesture(&self) -> Gesture {
        self.gestures
            .get(self.current)
            .copied()
            .unwrap_or_else(|| Gesture::new([0, 0, 0], [0, 0, 0]))
    }
}

fn add(a: Axes, b: Axes) -> Axes {
    Axes::new(a.x + b.x, a.y + b.y, a.z + b.z)
}

impl MotionSensor for SimulatedImu {
    fn read_acceleration(&mut self) -> anyhow::Result<Axes> {
        anyhow::ensure!(!self.failing, "simulated bus fault");

        let pre_motion = self.accel_reads % 2 == 0;
        if pre_motion && self.accel_reads > 0 && !self.gestures.is_empty() {
            self.current = (self.current + 1) % self.gestures.len();
        }
        self.accel_reads += 1;

        if pre_motion {
            self.gyro_reads = 0;
            Ok(REST_ACCELERATION)
        } else {
            Ok(add(REST_ACCELERATION, self.gesture().accel_delta))
        }
    }

    fn read_angular_velocity(&mut self) -> anyhow::Result<Axes> {
        anyhow::ensure!(!self.failing, "simulated bus fault");

        let gesture = self.gesture();
        let moving = self.gyro_reads > 0;
        self.gyro_reads += 1;

        Ok(if moving {
            add(gesture.gyro_bias, gesture.rate)
        } else {
            gesture.gyro_bias
        })
    }
}

pub type SimBoard = Board<SimulatedImu, ManualClock, RecordingConsole, RecordingLed>;

/// Fully simulated board running on virtual time.
pub fn sim_board(gestures: Vec<Gesture>) -> SimBoard {
    Board::new(
        SimulatedImu::new(gestures),
        ManualClock::new(),
        RecordingConsole::new(),
        RecordingLed::new(),
    )
}
