// MotionCoach — Board Context
//
// The four collaborators every pipeline stage talks to, bundled so they can be
// handed around as one value instead of living in globals.

use crate::clock::Clock;
use crate::console::Console;
use crate::drivers::imu::MotionSensor;
use crate::drivers::led::{self, Indicator};

pub struct Board<S, K, C, L> {
    pub sensor: S,
    pub clock: K,
    pub console: C,
    pub led: L,
}

impl<S, K, C, L> Board<S, K, C, L>
where
    S: MotionSensor,
    K: Clock,
    C: Console,
    L: Indicator,
{
    pub fn new(sensor: S, clock: K, console: C, led: L) -> Self {
        Self {
            sensor,
            clock,
            console,
            led,
        }
    }

    pub fn say(&mut self, line: &str) {
        self.console.emit_text(line);
    }

    pub fn delay_ms(&mut self, ms: u64) {
        self.clock.delay_ms(ms);
    }

    pub fn led(&mut self, on: bool) {
        self.led.set(on);
    }

    pub fn blink_code(&mut self, count: usize) {
        led::blink_code(&mut self.led, &mut self.clock, count);
    }

    pub fn blink_notification(&mut self, count: usize) {
        led::blink_notification(&mut self.led, &mut self.clock, count);
    }
}
