use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Classification of one character position of the active line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharClass {
    Correct,
    Incorrect,
    /// Typed beyond the end of the target
    Extra,
    /// Not typed yet, line still in progress
    Pending,
}

/// An atomic edit of the per-line typed buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edit {
    Append(char),
    Backspace,
}

/// Result of applying an edit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    Rejected,
    Accepted,
    /// Typed length reached the target length; the line must be committed
    LineComplete,
}

/// Totals by character category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterStats {
    pub correct: u32,
    pub incorrect: u32,
    pub extra: u32,
    pub missed: u32,
}

impl AddAssign for CharacterStats {
    fn add_assign(&mut self, rhs: Self) {
        self.correct += rhs.correct;
        self.incorrect += rhs.incorrect;
        self.extra += rhs.extra;
        self.missed += rhs.missed;
    }
}

/// Statistics of one completed line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineStat {
    pub total_chars: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub missed: u32,
    pub extra: u32,
    /// Whole seconds since session start when the line was committed
    pub elapsed_at_completion: u64,
}

impl LineStat {
    /// Compare `typed` against `target` position by position.
    ///
    /// `correct + incorrect + missed == total_chars` always holds;
    /// `extra = max(0, typed - target)`.
    pub fn measure(target: &str, typed: &str, elapsed_at_completion: u64) -> Self {
        let target: Vec<char> = target.chars().collect();
        let typed: Vec<char> = typed.chars().collect();

        let overlap = target.len().min(typed.len());
        let correct = target
            .iter()
            .zip(typed.iter())
            .filter(|(expected, actual)| expected == actual)
            .count();

        Self {
            total_chars: target.len() as u32,
            correct: correct as u32,
            incorrect: (overlap - correct) as u32,
            missed: target.len().saturating_sub(typed.len()) as u32,
            extra: typed.len().saturating_sub(target.len()) as u32,
            elapsed_at_completion,
        }
    }

    pub fn character_stats(&self) -> CharacterStats {
        CharacterStats {
            correct: self.correct,
            incorrect: self.incorrect,
            extra: self.extra,
            missed: self.missed,
        }
    }
}

/// Live per-character view of the active line
pub fn classify(target: &str, typed: &str) -> Vec<CharClass> {
    let target: Vec<char> = target.chars().collect();
    let typed: Vec<char> = typed.chars().collect();

    (0..target.len().max(typed.len()))
        .map(|i| match (target.get(i), typed.get(i)) {
            (Some(expected), Some(actual)) if expected == actual => CharClass::Correct,
            (Some(_), Some(_)) => CharClass::Incorrect,
            (Some(_), None) => CharClass::Pending,
            (None, _) => CharClass::Extra,
        })
        .collect()
}

/// Typed-so-far buffer of the active line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineTracker {
    typed: Vec<char>,
}

impl LineTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn typed(&self) -> String {
        self.typed.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.typed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.typed.is_empty()
    }

    /// Apply one edit against `target`.
    ///
    /// An empty target accepts nothing and never completes. Control
    /// characters are not typeable.
    pub fn apply(&mut self, edit: Edit, target: &str) -> EditOutcome {
        let target_len = target.chars().count();
        if target_len == 0 {
            return EditOutcome::Rejected;
        }

        match edit {
            Edit::Append(c) if c.is_control() => EditOutcome::Rejected,
            Edit::Append(c) => {
                if self.typed.len() >= target_len {
                    return EditOutcome::Rejected;
                }
                self.typed.push(c);
                if self.typed.len() == target_len {
                    EditOutcome::LineComplete
                } else {
                    EditOutcome::Accepted
                }
            }
            Edit::Backspace => {
                if self.typed.pop().is_some() {
                    EditOutcome::Accepted
                } else {
                    EditOutcome::Rejected
                }
            }
        }
    }

    /// Measure the buffer against `target` and reset it for the next line
    pub fn commit(&mut self, target: &str, elapsed_at_completion: u64) -> LineStat {
        let stat = LineStat::measure(target, &self.typed(), elapsed_at_completion);
        self.clear();
        stat
    }

    /// Positions of the buffer that match `target`
    pub fn matching(&self, target: &str) -> usize {
        target
            .chars()
            .zip(self.typed.iter())
            .filter(|(expected, actual)| expected == *actual)
            .count()
    }

    pub fn clear(&mut self) {
        self.typed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(tracker: &mut LineTracker, s: &str, target: &str) -> Vec<EditOutcome> {
        s.chars()
            .map(|c| tracker.apply(Edit::Append(c), target))
            .collect()
    }

    #[test]
    fn test_measure_perfect_line() {
        let stat = LineStat::measure("hello", "hello", 3);
        assert_eq!(
            stat,
            LineStat {
                total_chars: 5,
                correct: 5,
                incorrect: 0,
                missed: 0,
                extra: 0,
                elapsed_at_completion: 3,
            }
        );
    }

    #[test]
    fn test_measure_with_errors() {
        let stat = LineStat::measure("hello", "hxllp", 0);
        assert_eq!(stat.correct, 3);
        assert_eq!(stat.incorrect, 2);
        assert_eq!(stat.correct + stat.incorrect + stat.missed, stat.total_chars);
    }

    #[test]
    fn test_measure_short_and_long_input() {
        let short = LineStat::measure("hello", "he", 0);
        assert_eq!(short.missed, 3);
        assert_eq!(short.extra, 0);
        assert_eq!(short.correct + short.incorrect + short.missed, short.total_chars);

        let long = LineStat::measure("hi", "hiya", 0);
        assert_eq!(long.extra, 2);
        assert_eq!(long.missed, 0);
        assert_eq!(long.correct, 2);
    }

    #[test]
    fn test_measure_counts_chars_not_bytes() {
        let stat = LineStat::measure("café", "cafe", 0);
        assert_eq!(stat.total_chars, 4);
        assert_eq!(stat.correct, 3);
        assert_eq!(stat.incorrect, 1);
    }

    #[test]
    fn test_classify_live_view() {
        use CharClass::*;
        assert_eq!(
            classify("abcd", "axc"),
            vec![Correct, Incorrect, Correct, Pending]
        );
        assert_eq!(classify("ab", "abz"), vec![Correct, Correct, Extra]);
        assert!(classify("", "").is_empty());
    }

    #[test]
    fn test_completion_exactly_at_target_length() {
        let mut tracker = LineTracker::new();
        let outcomes = type_str(&mut tracker, "hi", "hi");
        assert_eq!(outcomes, vec![EditOutcome::Accepted, EditOutcome::LineComplete]);

        let stat = tracker.commit("hi", 1);
        assert_eq!(stat.extra, 0);
        assert_eq!(stat.correct, 2);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_full_buffer_rejects_more_input() {
        let mut tracker = LineTracker::new();
        type_str(&mut tracker, "ab", "ab");
        assert_eq!(tracker.apply(Edit::Append('c'), "ab"), EditOutcome::Rejected);
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_backspace() {
        let mut tracker = LineTracker::new();
        type_str(&mut tracker, "tx", "test");
        assert_eq!(tracker.apply(Edit::Backspace, "test"), EditOutcome::Accepted);
        assert_eq!(tracker.typed(), "t");

        tracker.apply(Edit::Backspace, "test");
        assert_eq!(tracker.apply(Edit::Backspace, "test"), EditOutcome::Rejected);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_empty_target_is_not_completable() {
        let mut tracker = LineTracker::new();
        assert_eq!(tracker.apply(Edit::Append('a'), ""), EditOutcome::Rejected);
        assert_eq!(tracker.apply(Edit::Backspace, ""), EditOutcome::Rejected);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_control_characters_rejected() {
        let mut tracker = LineTracker::new();
        assert_eq!(tracker.apply(Edit::Append('\n'), "abc"), EditOutcome::Rejected);
        assert_eq!(tracker.apply(Edit::Append('\t'), "abc"), EditOutcome::Rejected);
    }

    #[test]
    fn test_matching_positions() {
        let mut tracker = LineTracker::new();
        type_str(&mut tracker, "tast", "test");
        assert_eq!(tracker.matching("test"), 3);
    }

    #[test]
    fn test_character_stats_accumulate() {
        let mut totals = CharacterStats::default();
        totals += LineStat::measure("abc", "abd", 0).character_stats();
        totals += LineStat::measure("xy", "x", 0).character_stats();
        assert_eq!(
            totals,
            CharacterStats {
                correct: 3,
                incorrect: 1,
                extra: 0,
                missed: 1,
            }
        );
    }
}
