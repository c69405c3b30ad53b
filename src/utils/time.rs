use chrono::{DateTime, Local};
use std::time::Duration;

/// Source of wall-clock time for log stamps and request timing
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Clock backed by the operating system
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Format used for log line timestamps
pub const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a clock reading the way log lines show it
pub fn log_stamp(clock: &dyn Clock) -> String {
    clock.now().format(LOG_TIME_FORMAT).to_string()
}

/// Time elapsed between two readings, zero if the clock went backwards
pub fn elapsed(since: DateTime<Local>, now: DateTime<Local>) -> Duration {
    (now - since).to_std().unwrap_or(Duration::ZERO)
}
