//! Folding per-line statistics into the end-of-session numbers.
//!
//! Speed is net words per minute: only correct characters count, five
//! characters make a word, and sessions shorter than a second are scored as
//! if they lasted one second.

use crate::classifier::{CharacterStats, LineStat};
use crate::time_series::HistoryPoint;
use crate::util::{mean, std_dev};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const CHARS_PER_WORD: f64 = 5.0;
pub const DEFAULT_SAMPLE_INTERVAL_SECS: u64 = 2;

/// Everything the aggregator derives at finalize time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetrics {
    pub wpm: u32,
    pub accuracy: u32,
    pub elapsed_seconds: u64,
    /// Total correct characters
    pub score: u32,
    pub history: Vec<HistoryPoint>,
    pub character_stats: CharacterStats,
    pub consistency: u32,
}

/// Round a duration to whole seconds
pub fn whole_seconds(elapsed: Duration) -> u64 {
    (elapsed.as_millis() as f64 / 1000.0).round() as u64
}

/// Unrounded net WPM for `correct` characters over `elapsed_secs`
pub fn words_per_minute(correct: u32, elapsed_secs: u64) -> f64 {
    let minutes = elapsed_secs.max(1) as f64 / 60.0;
    (correct as f64 / CHARS_PER_WORD) / minutes
}

/// Percentage of typed characters that were correct, 0 when nothing was typed
pub fn accuracy(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    ((100.0 * correct as f64 / total as f64).round() as u32).min(100)
}

/// Sample the cumulative speed every `interval_secs` from 0 up to `elapsed_secs`.
///
/// A sample at `t` counts the correct characters of every line committed at
/// or before `t`. The first point is always `{0, 0}` and the last one sits at
/// `elapsed_secs` carrying `final_wpm`. Without any committed line there is
/// nothing to sample in between, so only the two end points are produced.
pub fn resample_history(
    lines: &[LineStat],
    elapsed_secs: u64,
    final_wpm: u32,
    interval_secs: u64,
) -> Vec<HistoryPoint> {
    let mut history = vec![HistoryPoint::origin()];
    if elapsed_secs == 0 {
        return history;
    }

    if !lines.is_empty() {
        let step = interval_secs.max(1);
        let mut t = step;
        while t < elapsed_secs {
            let correct: u32 = lines
                .iter()
                .filter(|line| line.elapsed_at_completion <= t)
                .map(|line| line.correct)
                .sum();
            history.push(HistoryPoint::new(t, words_per_minute(correct, t).round()));
            t += step;
        }
    }

    history.push(HistoryPoint::new(elapsed_secs, final_wpm as f64));
    history
}

/// `100 - coefficient of variation` over the non-zero samples, clamped to 0..=100
pub fn consistency(history: &[HistoryPoint]) -> u32 {
    let speeds: Vec<f64> = history
        .iter()
        .map(|p| p.wpm)
        .filter(|wpm| *wpm > 0.0)
        .collect();

    match (mean(&speeds), std_dev(&speeds)) {
        (Some(avg), Some(sd)) if avg > 0.0 => {
            (100.0 - (100.0 * sd / avg).round()).clamp(0.0, 100.0) as u32
        }
        _ => 0,
    }
}

/// Fold the committed lines plus the unfinished line into the final metrics
pub fn finalize(
    lines: &[LineStat],
    partial_target: &str,
    partial_typed: &str,
    elapsed: Duration,
    interval_secs: u64,
) -> SessionMetrics {
    let mut character_stats = CharacterStats::default();
    let mut total_chars: u32 = 0;
    for line in lines {
        total_chars += line.total_chars;
        character_stats += line.character_stats();
    }

    if !partial_typed.is_empty() {
        let partial = LineStat::measure(partial_target, partial_typed, 0);
        total_chars += partial_typed.chars().count() as u32;
        character_stats += partial.character_stats();
    }

    let score = character_stats.correct;
    let elapsed_seconds = whole_seconds(elapsed);
    let wpm = words_per_minute(score, elapsed_seconds).round() as u32;
    let history = resample_history(lines, elapsed_seconds, wpm, interval_secs);

    SessionMetrics {
        wpm,
        accuracy: accuracy(score, total_chars),
        elapsed_seconds,
        score,
        consistency: consistency(&history),
        history,
        character_stats,
    }
}
