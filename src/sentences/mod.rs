pub mod corpus;
pub mod pool;

// Re-export the main types for convenience
pub use corpus::{Corpus, Difficulty, SeedSentence, SentenceId, SentenceItem};
pub use pool::{fetch_or_empty, FetchRequest, SentencePool, SentenceSource, DEFAULT_FETCH_COUNT};
