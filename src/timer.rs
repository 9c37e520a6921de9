//! Wall-clock elapsed-time display for in-flight streamed responses.

use std::time::{Duration, Instant};

/// Label shown before any timing has occurred.
pub const TIMER_PLACEHOLDER: &str = "--:--.-";

/// Pure elapsed-time state. The periodic redraw tick lives in the UI layer;
/// this type only answers "what should the label say right now".
#[derive(Debug, Default)]
pub struct ResponseTimer {
    started_at: Option<Instant>,
    final_elapsed: Option<Duration>,
}

impl ResponseTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin timing. Restarting while already running is clean: the old
    /// start point is simply replaced.
    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
        self.final_elapsed = None;
    }

    /// Stop timing, freezing the label at the final elapsed value.
    /// Stopping when never started is a no-op.
    pub fn stop(&mut self) {
        if let Some(started_at) = self.started_at.take() {
            self.final_elapsed = Some(started_at.elapsed());
        }
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Current display label: live elapsed while running, the frozen value
    /// after a stop, the placeholder before any start.
    #[must_use]
    pub fn label(&self) -> String {
        if let Some(started_at) = self.started_at {
            return format_elapsed(started_at.elapsed());
        }
        match self.final_elapsed {
            Some(elapsed) => format_elapsed(elapsed),
            None => TIMER_PLACEHOLDER.to_string(),
        }
    }
}

/// Render an elapsed duration as `MM:SS.t` (tenth-second resolution).
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_tenths = elapsed.as_millis() / 100;
    let minutes = total_tenths / 600;
    let seconds = (total_tenths % 600) / 10;
    let tenths = total_tenths % 10;
    format!("{minutes:02}:{seconds:02}.{tenths}")
}
