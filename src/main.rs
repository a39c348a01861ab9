// MotionCoach — Firmware Entry Point
//
// Device boot sequence:
//   1. Initialise logging and peripherals.
//   2. Bring up the MPU6050 on I2C and run its self-test.
//   3. Spawn the button task feeding the double-tap latch.
//   4. Run the training / classification session on the main thread forever.
//
// Host builds run the same session against a simulated IMU on virtual time:
// one double tap, one training session, one classification session.

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    firmware::main()
}

#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    host::main()
}

// ---------------------------------------------------------------------------
// ESP-IDF firmware
// ---------------------------------------------------------------------------
#[cfg(target_os = "espidf")]
mod firmware {
    use std::sync::Arc;
    use std::thread;

    use esp_idf_hal::gpio::{InputPin, OutputPin, PinDriver};
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::prelude::*;

    use motioncoach::clock::SystemClock;
    use motioncoach::config::*;
    use motioncoach::console::LogConsole;
    use motioncoach::drivers::imu::Mpu6050;
    use motioncoach::drivers::led::LedDriver;
    use motioncoach::input::{self, TapLatch};
    use motioncoach::{Board, Session, SessionOptions};

    pub fn main() -> anyhow::Result<()> {
        // Link esp-idf-sys runtime patches and initialise logging.
        esp_idf_svc::sys::link_patches();
        esp_idf_svc::log::EspLogger::initialize_default();
        log::info!("MotionCoach firmware starting…");

        // ---- Peripherals ------------------------------------------------------
        let peripherals = Peripherals::take()?;

        // Tap button (pull-up, active LOW).
        let button = PinDriver::input(peripherals.pins.gpio3.downgrade_input())?;
        configure_pullup();

        let led_pin = PinDriver::output(peripherals.pins.gpio4.downgrade_output())?;

        // ---- I2C bus (MPU6050) --------------------------------------------------
        let i2c_config = I2cConfig::new().baudrate(400u32.kHz().into());
        let i2c = I2cDriver::new(
            peripherals.i2c0,
            peripherals.pins.gpio6, // SDA
            peripherals.pins.gpio7, // SCL
            &i2c_config,
        )?;

        let mut imu = Mpu6050::new(i2c);
        if !imu.is_connected() {
            log::error!("Boot check FAILED — MPU6050 not responding");
            // Continue anyway: reads fall back to zero samples.
        }
        imu.init()?;

        // ---- Double-tap mailbox ---------------------------------------------------
        let tap = Arc::new(TapLatch::new());
        let button_tap = Arc::clone(&tap);
        thread::Builder::new()
            .name("button".into())
            .stack_size(STACK_BUTTON)
            .spawn(move || {
                input::button_task(button, button_tap);
            })?;

        // ---- Session (main thread) ----------------------------------------------
        let board = Board::new(imu, SystemClock::new(), LogConsole, LedDriver::new(led_pin));
        let mut session = Session::new(board, SessionOptions::default(), tap)?;
        log::info!("Boot complete — waiting for double tap");
        session.run()
    }

    /// The downgraded input pin has no pull API; set it through the raw driver.
    fn configure_pullup() {
        unsafe {
            esp_idf_sys::gpio_set_pull_mode(PIN_BUTTON, esp_idf_sys::gpio_pull_mode_t_GPIO_PULLUP_ONLY);
        }
    }
}

// ---------------------------------------------------------------------------
// Host simulator
// ---------------------------------------------------------------------------
#[cfg(not(target_os = "espidf"))]
mod host {
    use std::sync::Arc;

    use motioncoach::clock::{Clock, ManualClock};
    use motioncoach::console::LogConsole;
    use motioncoach::drivers::led::RecordingLed;
    use motioncoach::input::TapLatch;
    use motioncoach::sim::{Gesture, SimulatedImu};
    use motioncoach::{Board, Session, SessionEvent, SessionOptions};

    pub fn main() -> anyhow::Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        log::info!("MotionCoach simulator starting…");

        let board = Board::new(
            SimulatedImu::new(Gesture::exercise_set()),
            ManualClock::new(),
            LogConsole,
            RecordingLed::new(),
        );
        let tap = Arc::new(TapLatch::new());
        let mut session = Session::new(board, SessionOptions::default(), Arc::clone(&tap))?;

        tap.signal();
        while let Some(event) = session.poll() {
            match event {
                SessionEvent::Trained(outcome) => {
                    log::info!(
                        "Training {} after {} steps",
                        if outcome.converged { "converged" } else { "did not converge" },
                        outcome.steps
                    );
                }
                SessionEvent::Classified(results) => {
                    let codes: Vec<usize> = results.iter().map(|r| r.blink_code()).collect();
                    log::info!("Classified motions: {:?}", codes);
                }
            }
        }

        let board = session.board();
        log::info!(
            "Simulated {:.1} s of device time, {} LED pulses",
            board.clock.now_ms() as f64 / 1000.0,
            board.led.pulses()
        );
        Ok(())
    }
}
