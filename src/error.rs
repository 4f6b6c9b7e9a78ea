use thiserror::Error;

/// Failures of the local document store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("failed to prepare store directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid sentence: {0}")]
    InvalidSentence(String),
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Failures of the sentence provider
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("sentence store unavailable: {0}")]
    Store(#[from] StoreError),
    #[error("bundled corpus is missing {0}")]
    MissingCorpus(String),
    #[error("bundled corpus is malformed: {0}")]
    MalformedCorpus(#[from] serde_json::Error),
}

/// Failures while persisting user preferences
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
