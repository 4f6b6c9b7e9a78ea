use crate::classifier::{LineStat, LineTracker};
use crate::clock::{SessionClock, TimerMode};
use crate::metrics::DEFAULT_SAMPLE_INTERVAL_SECS;
use crate::sentences::{Difficulty, DEFAULT_FETCH_COUNT};
use crate::window::DEFAULT_VISIBLE_LINES;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// What starts the clock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartTrigger {
    /// The start action; keystrokes before it are ignored
    #[default]
    Explicit,
    /// The first printable keystroke while idle starts the session
    FirstKeystroke,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub difficulty: Difficulty,
    pub timer: TimerMode,
    pub start_trigger: StartTrigger,
    pub sample_interval_secs: u64,
    pub visible_lines: usize,
    pub sentence_count: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            timer: TimerMode::default(),
            start_trigger: StartTrigger::default(),
            sample_interval_secs: DEFAULT_SAMPLE_INTERVAL_SECS,
            visible_lines: DEFAULT_VISIBLE_LINES,
            sentence_count: DEFAULT_FETCH_COUNT,
        }
    }
}

/// Mutable state of one session, from start to finish
#[derive(Debug, Clone)]
pub struct SessionState {
    pub started: bool,
    pub finished: bool,
    /// Abandoned without a result
    pub cancelled: bool,
    pub started_at: Option<Instant>,
    pub tracker: LineTracker,
    pub completed_lines: Vec<LineStat>,
    pub clock: SessionClock,
}

impl SessionState {
    pub fn new(timer: TimerMode) -> Self {
        Self {
            started: false,
            finished: false,
            cancelled: false,
            started_at: None,
            tracker: LineTracker::new(),
            completed_lines: Vec::new(),
            clock: SessionClock::new(timer),
        }
    }

    /// Typing is possible only between start and finish
    pub fn is_active(&self) -> bool {
        self.started && !self.finished
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(TimerMode::default())
    }
}
