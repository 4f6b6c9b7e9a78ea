use serde::{Deserialize, Serialize};

/// Seconds between marked points on the speed chart
pub const MARK_EVERY_SECS: u64 = 5;

/// One sample of the speed history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    /// Seconds since session start
    pub time: u64,
    pub wpm: f64,
    /// Rendering hint: draw a dot here
    #[serde(default)]
    pub is_mark: bool,
}

impl HistoryPoint {
    pub fn new(time: u64, wpm: f64) -> Self {
        Self {
            time,
            wpm,
            is_mark: time % MARK_EVERY_SECS == 0,
        }
    }

    pub fn origin() -> Self {
        Self::new(0, 0.0)
    }
}

impl From<HistoryPoint> for (f64, f64) {
    fn from(p: HistoryPoint) -> Self {
        (p.time as f64, p.wpm)
    }
}
