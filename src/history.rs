use crate::auth::UserId;
use crate::error::StoreError;
use crate::storage::{GameDb, StoredGame};
use itertools::Itertools;

/// Games shown on the history screen
pub const RECENT_GAMES: usize = 15;

/// A user's most recent games plus their averages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameHistory {
    /// Oldest first, at most [`RECENT_GAMES`]
    pub games: Vec<StoredGame>,
    pub average_wpm: Option<f64>,
    pub average_accuracy: Option<f64>,
    pub best_wpm: Option<u32>,
}

impl GameHistory {
    /// Summarize `games`, which must be ordered newest first
    pub fn from_newest_first(games: Vec<StoredGame>, limit: usize) -> Self {
        let games = games.into_iter().take(limit).rev().collect_vec();

        let wpms = games.iter().map(|g| g.record.wpm as f64).collect_vec();
        let accuracies = games.iter().map(|g| g.record.accuracy as f64).collect_vec();

        Self {
            average_wpm: crate::util::mean(&wpms),
            average_accuracy: crate::util::mean(&accuracies),
            best_wpm: games.iter().map(|g| g.record.wpm).max(),
            games,
        }
    }

    pub fn load(db: &GameDb, user: &UserId) -> Result<Self, StoreError> {
        Ok(Self::from_newest_first(db.games_for_user(user)?, RECENT_GAMES))
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// `(game number, wpm)` pairs for charting
    pub fn wpm_points(&self) -> Vec<(f64, f64)> {
        self.games
            .iter()
            .enumerate()
            .map(|(i, g)| ((i + 1) as f64, g.record.wpm as f64))
            .collect()
    }

    /// `(game number, accuracy)` pairs for charting
    pub fn accuracy_points(&self) -> Vec<(f64, f64)> {
        self.games
            .iter()
            .enumerate()
            .map(|(i, g)| ((i + 1) as f64, g.record.accuracy as f64))
            .collect()
    }
}
