// MotionCoach — Double-Tap Input
//
// A debounced double-tap detector feeds a single-bit mailbox (`TapLatch`) that
// the foreground session polls and clears. A tap arriving while the latch is
// still set is dropped, not queued.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::*;

#[derive(Debug, Default)]
pub struct TapLatch {
    pending: AtomicBool,
}

impl TapLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag. Returns `false` if an earlier tap was still pending.
    pub fn signal(&self) -> bool {
        !self.pending.swap(true, Ordering::AcqRel)
    }

    /// Consume the flag.
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

/// Debounced press/release state machine; reports a double tap when a second
/// release lands within [`DOUBLE_CLICK_WINDOW_MS`] of the first.
///
/// Designed to be polled at ~100 Hz with the raw pressed level and a
/// millisecond timestamp.
pub struct DoubleTapDetector {
    // Debounce state
    last_raw: bool,
    last_debounce_ms: u64,

    button_down: bool,

    // Double-tap state machine
    waiting_for_second_tap: bool,
    first_tap_ms: u64,
}

impl DoubleTapDetector {
    pub fn new(now_ms: u64) -> Self {
        Self {
            last_raw: false,
            last_debounce_ms: now_ms,
            button_down: false,
            waiting_for_second_tap: false,
            first_tap_ms: now_ms,
        }
    }

    /// Returns `true` exactly once per completed double tap.
    pub fn update(&mut self, pressed: bool, now_ms: u64) -> bool {
        // ---- debounce filter ----
        if pressed != self.last_raw {
            self.last_debounce_ms = now_ms;
        }
        self.last_raw = pressed;

        if now_ms.saturating_sub(self.last_debounce_ms) < DEBOUNCE_MS {
            self.expire_window(now_ms);
            return false;
        }

        let mut double_tap = false;

        if pressed && !self.button_down {
            self.button_down = true;
        }

        // ---- released edge ----
        if !pressed && self.button_down {
            self.button_down = false;
            if self.waiting_for_second_tap {
                double_tap = true;
                self.waiting_for_second_tap = false;
            } else {
                self.waiting_for_second_tap = true;
                self.first_tap_ms = now_ms;
            }
        }

        self.expire_window(now_ms);
        double_tap
    }

    fn expire_window(&mut self, now_ms: u64) {
        if self.waiting_for_second_tap
            && now_ms.saturating_sub(self.first_tap_ms) > DOUBLE_CLICK_WINDOW_MS
        {
            self.waiting_for_second_tap = false;
        }
    }
}

// ---------------------------------------------------------------------------
// Button task (device only)
// ---------------------------------------------------------------------------
#[cfg(target_os = "espidf")]
pub fn button_task(
    pin: esp_idf_hal::gpio::PinDriver<'static, esp_idf_hal::gpio::AnyInputPin, esp_idf_hal::gpio::Input>,
    latch: std::sync::Arc<TapLatch>,
) {
    use std::time::{Duration, Instant};

    log::info!("Button task started");

    let start = Instant::now();
    let mut detector = DoubleTapDetector::new(0);
    let poll = Duration::from_millis(UI_POLL_INTERVAL_MS);

    loop {
        let now_ms = start.elapsed().as_millis() as u64;
        // Active LOW with pull-up.
        if detector.update(pin.is_low(), now_ms) && !latch.signal() {
            log::debug!("Double tap dropped — previous one not yet consumed");
        }
        std::thread::sleep(poll);
    }
}
