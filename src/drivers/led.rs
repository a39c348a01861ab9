// MotionCoach — Status LED
//
// Small integers (motion class, training outcome) are shown as pulse counts.
// Feedback only: nothing waits on or checks the LED.

use crate::clock::Clock;
use crate::config::*;

pub trait Indicator {
    fn set(&mut self, on: bool);
}

/// Alert preamble, a pause and `count` slow pulses (skipped for 0), then an
/// alert trailer.
pub fn blink_code<L: Indicator, K: Clock>(led: &mut L, clock: &mut K, count: usize) {
    pulse(led, clock, LED_CODE_RAPID_PULSES, LED_RAPID_ON_MS, LED_RAPID_OFF_MS);

    if count != 0 {
        clock.delay_ms(LED_CODE_PAUSE_MS);
        pulse(led, clock, count, LED_SLOW_ON_MS, LED_SLOW_OFF_MS);
    }

    pulse(led, clock, LED_CODE_RAPID_PULSES, LED_RAPID_ON_MS, LED_TRAILER_OFF_MS);
}

/// `count` rapid pulses.
pub fn blink_notification<L: Indicator, K: Clock>(led: &mut L, clock: &mut K, count: usize) {
    pulse(led, clock, count, LED_RAPID_ON_MS, LED_RAPID_OFF_MS);
}

fn pulse<L: Indicator, K: Clock>(led: &mut L, clock: &mut K, count: usize, on_ms: u64, off_ms: u64) {
    for _ in 0..count {
        led.set(true);
        clock.delay_ms(on_ms);
        led.set(false);
        clock.delay_ms(off_ms);
    }
}

/// Records every state change; `pulses()` counts rising edges.
#[derive(Debug, Default, Clone)]
pub struct RecordingLed {
    pub states: Vec<bool>,
}

impl RecordingLed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pulses(&self) -> usize {
        let mut lit = false;
        let mut count = 0;
        for &on in &self.states {
            if on && !lit {
                count += 1;
            }
            lit = on;
        }
        count
    }

    pub fn is_on(&self) -> bool {
        self.states.last().copied().unwrap_or(false)
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }
}

impl Indicator for RecordingLed {
    fn set(&mut self, on: bool) {
        self.states.push(on);
    }
}

// ---------------------------------------------------------------------------
// GPIO LED (device only)
// ---------------------------------------------------------------------------
#[cfg(target_os = "espidf")]
pub use device::LedDriver;

#[cfg(target_os = "espidf")]
mod device {
    use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};

    use super::Indicator;

    /// Simple GPIO-driven LED (active HIGH).
    pub struct LedDriver<'d> {
        pin: PinDriver<'d, AnyOutputPin, Output>,
    }

    impl<'d> LedDriver<'d> {
        pub fn new(pin: PinDriver<'d, AnyOutputPin, Output>) -> Self {
            Self { pin }
        }
    }

    impl Indicator for LedDriver<'_> {
        fn set(&mut self, on: bool) {
            let result = if on { self.pin.set_high() } else { self.pin.set_low() };
            if let Err(e) = result {
                log::warn!("LED write failed: {}", e);
            }
        }
    }
}
