use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Source of "now" for a session
pub trait TimeSource: Send {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-driven clock for headless runs and tests; clones share the same time
#[derive(Debug, Clone)]
pub struct ManualTimeSource {
    origin: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl ManualTimeSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut offset) = self.offset.lock() {
            *offset += by;
        }
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }
}

impl Default for ManualTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Instant {
        let offset = self.offset.lock().map(|o| *o).unwrap_or_default();
        self.origin + offset
    }
}

/// How a session ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimerMode {
    /// Count down from this many seconds, end at zero
    Fixed(u32),
    /// Count up until the user finishes
    OpenEnded,
}

impl TimerMode {
    pub const PRESETS: [TimerMode; 4] = [
        TimerMode::Fixed(15),
        TimerMode::Fixed(30),
        TimerMode::Fixed(60),
        TimerMode::OpenEnded,
    ];

    pub fn is_fixed(&self) -> bool {
        matches!(self, TimerMode::Fixed(_))
    }

    /// Session length for countdowns
    pub fn seconds(&self) -> Option<u32> {
        match self {
            TimerMode::Fixed(secs) => Some(*secs),
            TimerMode::OpenEnded => None,
        }
    }

    /// Next preset, wrapping; custom durations jump back to the first preset
    pub fn next_preset(self) -> Self {
        let idx = Self::PRESETS.iter().position(|m| *m == self);
        match idx {
            Some(i) => Self::PRESETS[(i + 1) % Self::PRESETS.len()],
            None => Self::PRESETS[0],
        }
    }
}

impl Default for TimerMode {
    fn default() -> Self {
        TimerMode::Fixed(30)
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerMode::Fixed(secs) if *secs >= 60 && secs % 60 == 0 => write!(f, "{}m", secs / 60),
            TimerMode::Fixed(secs) => write!(f, "{secs}s"),
            TimerMode::OpenEnded => write!(f, "unlimited"),
        }
    }
}

impl FromStr for TimerMode {
    type Err = String;

    /// Accepts `15s`, `30s`, `1m`, bare seconds, and `unlimited`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if matches!(s.as_str(), "unlimited" | "open" | "inf" | "∞") {
            return Ok(TimerMode::OpenEnded);
        }

        let (digits, scale) = if let Some(d) = s.strip_suffix('m') {
            (d, 60)
        } else if let Some(d) = s.strip_suffix('s') {
            (d, 1)
        } else {
            (s.as_str(), 1)
        };

        let value: u32 = digits
            .parse()
            .map_err(|_| format!("invalid timer '{s}', expected e.g. 15s, 30s, 1m or unlimited"))?;
        match value.checked_mul(scale) {
            Some(0) => Err("timer must be at least one second".to_string()),
            Some(secs) => Ok(TimerMode::Fixed(secs)),
            None => Err(format!("timer '{s}' is too long")),
        }
    }
}

impl TryFrom<String> for TimerMode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimerMode> for String {
    fn from(mode: TimerMode) -> Self {
        mode.to_string()
    }
}

/// What a one-second tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSignal {
    Running,
    /// Remaining time just reached zero; reported exactly once
    Expired,
    /// The clock had already expired, nothing changed
    Stopped,
}

/// Per-session countdown or stopwatch, advanced once per wall-clock second
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClock {
    mode: TimerMode,
    remaining: u32,
    elapsed: u32,
    expired: bool,
}

impl SessionClock {
    pub fn new(mode: TimerMode) -> Self {
        Self {
            mode,
            remaining: match mode {
                TimerMode::Fixed(secs) => secs,
                TimerMode::OpenEnded => 0,
            },
            elapsed: 0,
            expired: false,
        }
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn tick(&mut self) -> ClockSignal {
        if self.expired {
            return ClockSignal::Stopped;
        }

        self.elapsed += 1;
        match self.mode {
            TimerMode::Fixed(_) => {
                self.remaining = self.remaining.saturating_sub(1);
                if self.remaining == 0 {
                    self.expired = true;
                    ClockSignal::Expired
                } else {
                    ClockSignal::Running
                }
            }
            TimerMode::OpenEnded => ClockSignal::Running,
        }
    }

    pub fn remaining(&self) -> Option<u32> {
        match self.mode {
            TimerMode::Fixed(_) => Some(self.remaining),
            TimerMode::OpenEnded => None,
        }
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn has_expired(&self) -> bool {
        self.expired
    }

    /// Seconds to show: remaining for countdowns, elapsed for stopwatches
    pub fn display_seconds(&self) -> u32 {
        self.remaining().unwrap_or(self.elapsed)
    }
}
