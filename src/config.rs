// MotionCoach — Hardware & System Configuration
// Target: Seeed Studio Xiao ESP32-C3 (RISC-V) + MPU6050, host simulator otherwise

use crate::ann::Activation;
use crate::normalize::Normalization;

// ---------------------------------------------------------------------------
// GPIO Pin Definitions (Xiao ESP32-C3 pinout)
// ---------------------------------------------------------------------------
pub const PIN_BUTTON: i32 = 3;      // D1/A1 — Tap button (INPUT_PULLUP, active LOW)
pub const PIN_LED: i32 = 4;         // D2/A2 — Status LED
pub const PIN_I2C_SDA: i32 = 6;     // D4    — I2C data line
pub const PIN_I2C_SCL: i32 = 7;     // D5    — I2C clock line

// ---------------------------------------------------------------------------
// I2C Bus
// ---------------------------------------------------------------------------
pub const I2C_ADDR_MPU6050: u8 = 0x68;
pub const I2C_TIMEOUT_TICKS: u32 = 1000; // FreeRTOS ticks

// ---------------------------------------------------------------------------
// MPU6050 Sensor Scale Factors
// ---------------------------------------------------------------------------
pub const ACCEL_SCALE_8G: f32 = 4096.0;   // LSB/g  at ±8 g
pub const GYRO_SCALE_500: f32 = 65.5;     // LSB/°/s at ±500 °/s

// ---------------------------------------------------------------------------
// Task Stack Sizes (bytes)
// ---------------------------------------------------------------------------
pub const STACK_BUTTON: usize = 4096;

// ---------------------------------------------------------------------------
// Timing (milliseconds)
// ---------------------------------------------------------------------------
pub const DATA_PERIOD_MS: u64 = 10;                    // gyro integration + main loop tick
pub const UI_POLL_INTERVAL_MS: u64 = 10;               // 100 Hz button poll
pub const DEBOUNCE_MS: u64 = 50;
pub const DOUBLE_CLICK_WINDOW_MS: u64 = 400;
pub const START_POSITION_INTERVAL_MS: u64 = 3000;      // time to reach the start pose
pub const MOTION_DWELL_MS: u64 = 2000;                 // phase 0 motion window
pub const MOTION_SETTLE_MS: u64 = 1000;                // phase 0 settle before re-read
pub const ROTATION_RETURN_MS: u64 = 3000;              // after phase 1
pub const TRAINING_START_DELAY_MS: u64 = 2000;
pub const TRAINING_STEP_DELAY_MS: u64 = 5;

// LED code blink: rapid preamble/trailer pulses around slow count pulses.
pub const LED_CODE_RAPID_PULSES: usize = 7;
pub const LED_RAPID_ON_MS: u64 = 20;
pub const LED_RAPID_OFF_MS: u64 = 50;
pub const LED_TRAILER_OFF_MS: u64 = 30;
pub const LED_CODE_PAUSE_MS: u64 = 1000;
pub const LED_SLOW_ON_MS: u64 = 500;
pub const LED_SLOW_OFF_MS: u64 = 500;

// ---------------------------------------------------------------------------
// Feature Extraction
// ---------------------------------------------------------------------------
pub const AXES: usize = 3;
pub const FEATURE_COUNT: usize = 2 * AXES;
pub const ANGLE_MAG_MAX_THRESHOLD: f32 = 90.0;         // degrees
pub const MAX_ROTATION_ACQUIRE_CYCLES: usize = 400;    // 4 s at DATA_PERIOD_MS
pub const MILLI_PER_UNIT: f32 = 1000.0;                // mdps integrates to milli-degrees

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------
pub const MOTION_CLASSES: usize = 6;
pub const CONFIDENCE_FLOOR: f32 = 0.1;
pub const DISCRIMINABILITY_THRESHOLD: f32 = 1.0;
pub const MARGIN_THRESHOLD: f32 = 1.05;
pub const NUMBER_TEST_CYCLES: usize = 10;

// ---------------------------------------------------------------------------
// Training
// ---------------------------------------------------------------------------
pub const TRAINING_CYCLES: usize = 2000;
pub const NUM_TRAIN_DATA_CYCLES: usize = 1;
pub const MAX_TRAIN_DATA_CYCLES: usize = 8;
pub const CHECKPOINT_EARLY_INTERVAL: usize = 20;       // below CHECKPOINT_EARLY_LIMIT
pub const CHECKPOINT_EARLY_LIMIT: usize = 100;
pub const CHECKPOINT_INTERVAL: usize = 100;

// ---------------------------------------------------------------------------
// Embedded ANN
// ---------------------------------------------------------------------------
pub const NETWORK_TOPOLOGY: [usize; 3] = [FEATURE_COUNT, 9, MOTION_CLASSES];
pub const N_WEIGHTS: usize = 6 * 9 + 9 * 6;            // 108
pub const INITIAL_BIAS: f32 = 0.5;
pub const LEARNING_RATE: f32 = 0.13;                   // eta
pub const BIAS_LEARNING_RATE: f32 = 0.01;              // beta
pub const MOMENTUM: f32 = 0.25;                        // alpha
pub const RELU2_LEAK: f32 = 0.1;

/// Compiled-in starting weights, row-major per layer transition
/// (input→hidden first). Only 100 values were ever generated; the tail is zero.
#[rustfmt::skip]
pub const PRESET_WEIGHTS: [f32; N_WEIGHTS] = [
    0.982900, 0.478700, 0.926600, 0.947100, 0.939900,
    0.126900, 0.812800, 0.532500, 0.415700, 0.694800,
    0.785300, 0.685900, 0.763800, 0.324600, 0.117900,
    0.978500, 0.437700, 0.179800, 0.182300, 0.266300,
    0.742100, 0.736500, 0.533900, 0.173100, 0.726900,
    0.560400, 0.657200, 0.712500, 0.662600, 0.847500,
    0.226300, 0.316500, 0.910600, 0.783300, 0.857400,
    0.808400, 0.176500, 0.967700, 0.246800, 0.598800,
    0.655000, 0.569200, 0.319800, 0.526400, 0.805800,
    0.815800, 0.149200, 0.295100, 0.321200, 0.461400,
    0.464900, 0.707000, 0.633100, 0.137100, 0.462200,
    0.673100, 0.773000, 0.646800, 0.849000, 0.358900,
    0.229400, 0.284700, 0.778100, 0.950900, 0.527000,
    0.533100, 0.006600, 0.354300, 0.983000, 0.125600,
    0.140300, 0.385800, 0.604700, 0.123500, 0.300500,
    0.918100, 0.721200, 0.198000, 0.804200, 0.306000,
    0.393900, 0.372600, 0.512500, 0.546300, 0.188000,
    0.662900, 0.938700, 0.609700, 0.459000, 0.078900,
    0.857900, 0.020000, 0.605400, 0.784800, 0.740900,
    0.397000, 0.428300, 0.975900, 0.127500, 0.397800,
    0.0, 0.0, 0.0, 0.0, 0.0,
    0.0, 0.0, 0.0,
];

// ---------------------------------------------------------------------------
// Runtime-tunable session options
// ---------------------------------------------------------------------------

/// Learning rates for a single training step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearningRates {
    /// Weight learning rate.
    pub eta: f32,
    /// Bias learning rate.
    pub beta: f32,
    /// Momentum coefficient.
    pub alpha: f32,
}

impl Default for LearningRates {
    fn default() -> Self {
        Self {
            eta: LEARNING_RATE,
            beta: BIAS_LEARNING_RATE,
            alpha: MOMENTUM,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionOptions {
    pub rates: LearningRates,
    pub hidden_activation: Activation,
    pub output_activation: Activation,
    /// Training step budget per data cycle.
    pub training_cycles: usize,
    /// Live classifications per classification session.
    pub test_cycles: usize,
    pub normalization: Normalization,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            rates: LearningRates::default(),
            hidden_activation: Activation::Relu2,
            output_activation: Activation::Relu2,
            training_cycles: TRAINING_CYCLES,
            test_cycles: NUMBER_TEST_CYCLES,
            normalization: Normalization::UnitSphere,
        }
    }
}
