// MotionCoach — Presentation Channel
//
// Human-readable progress text. Delivery is best-effort: nothing in the
// pipeline checks whether a line arrived.

pub trait Console {
    fn emit_text(&mut self, line: &str);
}

/// Forwards every line to the `log` facade (UART on the device, stderr on
/// the host).
#[derive(Debug, Default, Clone, Copy)]
pub struct LogConsole;

impl Console for LogConsole {
    fn emit_text(&mut self, line: &str) {
        log::info!(target: "console", "{}", line);
    }
}

/// Keeps every emitted line in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingConsole {
    pub lines: Vec<String>,
}

impl RecordingConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }
}

impl Console for RecordingConsole {
    fn emit_text(&mut self, line: &str) {
        self.lines.push(line.to_owned());
    }
}
