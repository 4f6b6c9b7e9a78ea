use crate::error::SourceError;
use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use serde_json::from_str;
use std::fmt;

static CORPUS_DIR: Dir = include_dir!("src/corpus");

/// Sentence difficulty tier
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Cycle easy -> medium -> hard -> easy
    pub fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}

/// Opaque sentence identifier assigned by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SentenceId(pub i64);

impl fmt::Display for SentenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fetched target sentence. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceItem {
    pub id: SentenceId,
    pub text: String,
    pub difficulty: Difficulty,
}

impl SentenceItem {
    pub fn new(id: i64, text: impl Into<String>, difficulty: Difficulty) -> Self {
        Self {
            id: SentenceId(id),
            text: text.into(),
            difficulty,
        }
    }
}

/// Sentence as it appears in the seed corpus, before the store assigns an id
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct SeedSentence {
    pub text: String,
    pub difficulty: Difficulty,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Corpus {
    pub name: String,
    pub sentences: Vec<SeedSentence>,
}

impl Corpus {
    /// Load the corpus compiled into the binary
    pub fn bundled() -> Result<Self, SourceError> {
        read_corpus_from_file("sentences.json")
    }

    pub fn of_difficulty(&self, difficulty: Difficulty) -> impl Iterator<Item = &SeedSentence> {
        self.sentences
            .iter()
            .filter(move |s| s.difficulty == difficulty)
    }
}

fn read_corpus_from_file(file_name: &str) -> Result<Corpus, SourceError> {
    let file = CORPUS_DIR
        .get_file(file_name)
        .ok_or_else(|| SourceError::MissingCorpus(file_name.to_string()))?;

    let file_as_str = file
        .contents_utf8()
        .ok_or_else(|| SourceError::MissingCorpus(format!("{file_name} (not utf-8)")))?;

    Ok(from_str(file_as_str)?)
}
