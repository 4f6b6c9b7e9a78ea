use crate::auth::{AuthProvider, UserId};
use crate::classifier::CharacterStats;
use crate::clock::TimerMode;
use crate::error::StoreError;
use crate::metrics::SessionMetrics;
use crate::sentences::Difficulty;
use crate::time_series::HistoryPoint;
use serde::{Deserialize, Serialize};

/// Summary persisted per finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub score: u32,
    pub wpm: u32,
    pub accuracy: u32,
    pub difficulty: Difficulty,
}

/// Persistence collaborator for finished games
pub trait GameStore {
    fn save_game(&mut self, user: &UserId, record: &GameRecord) -> Result<(), StoreError>;
}

/// Full result of one session, handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub wpm: u32,
    pub accuracy: u32,
    pub elapsed_seconds: u64,
    pub score: u32,
    pub history: Vec<HistoryPoint>,
    pub character_stats: CharacterStats,
    pub consistency: u32,
    pub difficulty: Difficulty,
    pub timer: TimerMode,
}

impl ResultSummary {
    pub fn package(metrics: SessionMetrics, difficulty: Difficulty, timer: TimerMode) -> Self {
        Self {
            wpm: metrics.wpm,
            accuracy: metrics.accuracy,
            elapsed_seconds: metrics.elapsed_seconds,
            score: metrics.score,
            history: metrics.history,
            character_stats: metrics.character_stats,
            consistency: metrics.consistency,
            difficulty,
            timer,
        }
    }

    pub fn record(&self) -> GameRecord {
        GameRecord {
            score: self.score,
            wpm: self.wpm,
            accuracy: self.accuracy,
            difficulty: self.difficulty,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// What a publish attempt did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Saved,
    /// Already persisted earlier; the store was not touched
    AlreadySaved,
    /// Nobody is signed in; the result is kept for a later attempt
    SignInRequired,
    Failed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum PublishState {
    #[default]
    NotAttempted,
    Saved,
    SignInRequired,
    Failed(String),
}

/// A finished session's result and its persistence status.
///
/// The summary is computed once; publishing only ever re-sends it.
#[derive(Debug, Clone, PartialEq)]
pub struct Publication {
    summary: ResultSummary,
    state: PublishState,
}

impl Publication {
    pub fn new(summary: ResultSummary) -> Self {
        Self {
            summary,
            state: PublishState::NotAttempted,
        }
    }

    pub fn summary(&self) -> &ResultSummary {
        &self.summary
    }

    pub fn is_saved(&self) -> bool {
        self.state == PublishState::Saved
    }

    pub fn needs_sign_in(&self) -> bool {
        self.state == PublishState::SignInRequired
    }

    /// Last failure reason, if the latest attempt failed
    pub fn failure(&self) -> Option<&str> {
        match &self.state {
            PublishState::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Persist the summary for the signed-in user. One attempt, no retries.
    pub fn publish<A, S>(&mut self, auth: &A, store: &mut S) -> PublishOutcome
    where
        A: AuthProvider + ?Sized,
        S: GameStore + ?Sized,
    {
        if self.is_saved() {
            return PublishOutcome::AlreadySaved;
        }

        let Some(user) = auth.current_user() else {
            log::info!("result kept in memory until someone signs in");
            self.state = PublishState::SignInRequired;
            return PublishOutcome::SignInRequired;
        };

        let record = self.summary.record();
        match store.save_game(&user, &record) {
            Ok(()) => {
                log::info!(
                    "saved game for {user}: {} wpm, {}% acc, {}",
                    record.wpm,
                    record.accuracy,
                    record.difficulty
                );
                self.state = PublishState::Saved;
                PublishOutcome::Saved
            }
            Err(e) => {
                log::warn!("failed to save game for {user}: {e}");
                let reason = e.to_string();
                self.state = PublishState::Failed(reason.clone());
                PublishOutcome::Failed(reason)
            }
        }
    }
}
