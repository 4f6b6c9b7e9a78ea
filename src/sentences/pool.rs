use super::corpus::{Difficulty, SentenceId, SentenceItem};
use crate::auth::UserId;
use crate::error::SourceError;
use crate::storage::GameDb;
use rand::seq::SliceRandom;
use std::collections::{HashMap, HashSet};

/// Number of sentences requested per session when the caller has no preference
pub const DEFAULT_FETCH_COUNT: usize = 10;

/// A request for target text
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub difficulty: Difficulty,
    pub desired_count: usize,
    /// When set, sentences already served to this consumer are skipped until the pool runs dry
    pub consumer: Option<UserId>,
}

impl FetchRequest {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            desired_count: DEFAULT_FETCH_COUNT,
            consumer: None,
        }
    }

    pub fn with_count(mut self, desired_count: usize) -> Self {
        self.desired_count = desired_count;
        self
    }

    pub fn for_consumer(mut self, consumer: Option<UserId>) -> Self {
        self.consumer = consumer;
        self
    }
}

/// Supplier of difficulty-tagged sentences
pub trait SentenceSource {
    fn fetch(&mut self, request: &FetchRequest) -> Result<Vec<SentenceItem>, SourceError>;
}

/// Fetch once; a failing source yields an empty pool
pub fn fetch_or_empty<S: SentenceSource + ?Sized>(
    source: &mut S,
    request: &FetchRequest,
) -> Vec<SentenceItem> {
    match source.fetch(request) {
        Ok(items) => {
            log::debug!(
                "fetched {} {} sentences (asked for {})",
                items.len(),
                request.difficulty,
                request.desired_count
            );
            items
        }
        Err(e) => {
            log::warn!("sentence fetch failed, continuing with an empty pool: {e}");
            Vec::new()
        }
    }
}

/// In-memory sentence pool with per-consumer no-repeat-until-exhausted selection
#[derive(Debug, Default)]
pub struct SentencePool {
    sentences: Vec<SentenceItem>,
    used: HashMap<UserId, HashSet<SentenceId>>,
}

impl SentencePool {
    pub fn new(sentences: Vec<SentenceItem>) -> Self {
        Self {
            sentences,
            used: HashMap::new(),
        }
    }

    /// Load every stored sentence
    pub fn from_store(db: &GameDb) -> Result<Self, SourceError> {
        Ok(Self::new(db.all_sentences()?))
    }

    pub fn add(&mut self, item: SentenceItem) {
        self.sentences.push(item);
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Ids already served to `consumer` in the current cycle
    pub fn used_by(&self, consumer: &UserId) -> usize {
        self.used.get(consumer).map_or(0, HashSet::len)
    }
}

impl SentenceSource for SentencePool {
    fn fetch(&mut self, request: &FetchRequest) -> Result<Vec<SentenceItem>, SourceError> {
        let all: Vec<&SentenceItem> = self
            .sentences
            .iter()
            .filter(|s| s.difficulty == request.difficulty)
            .collect();

        if all.is_empty() {
            return Ok(Vec::new());
        }

        let mut candidates = all.clone();
        if let Some(consumer) = &request.consumer {
            let used = self.used.entry(consumer.clone()).or_default();
            candidates.retain(|s| !used.contains(&s.id));
            if candidates.is_empty() {
                log::info!(
                    "{consumer} has seen every {} sentence, starting over",
                    request.difficulty
                );
                used.clear();
                candidates = all;
            }
        }

        let mut rng = rand::thread_rng();
        let selected: Vec<SentenceItem> = candidates
            .choose_multiple(&mut rng, request.desired_count)
            .map(|s| (*s).clone())
            .collect();

        if let Some(consumer) = &request.consumer {
            let used = self.used.entry(consumer.clone()).or_default();
            used.extend(selected.iter().map(|s| s.id));
        }

        Ok(selected)
    }
}
