use crate::app_dirs::AppDirs;
use crate::auth::UserId;
use crate::error::StoreError;
use crate::publisher::{GameRecord, GameStore};
use crate::sentences::{Corpus, Difficulty, SentenceItem};
use chrono::{DateTime, Local};
use rusqlite::{params, Connection, Row};
use std::path::{Path, PathBuf};

/// A game result as persisted for a user
#[derive(Debug, Clone, PartialEq)]
pub struct StoredGame {
    pub id: i64,
    pub user_id: UserId,
    pub record: GameRecord,
    pub timestamp: DateTime<Local>,
}

/// Local document store for sentences and game results
#[derive(Debug)]
pub struct GameDb {
    conn: Connection,
}

impl GameDb {
    /// Open (or create) the database at the default state location
    pub fn open_default() -> Result<Self, StoreError> {
        let path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("typeline.db"));
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        log::debug!("opened game store at {}", path.display());
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let db = Self {
            conn: Connection::open_in_memory()?,
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sentences (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                text TEXT NOT NULL,
                difficulty TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_sentences_difficulty ON sentences(difficulty);

            CREATE TABLE IF NOT EXISTS games (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                score INTEGER NOT NULL,
                wpm INTEGER NOT NULL,
                accuracy INTEGER NOT NULL,
                difficulty TEXT NOT NULL,
                timestamp TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_games_user ON games(user_id, timestamp);
            "#,
        )?;
        Ok(())
    }

    /// Insert the corpus when the sentences table is empty. Returns the number inserted.
    pub fn seed_if_empty(&mut self, corpus: &Corpus) -> Result<usize, StoreError> {
        let existing: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sentences", [], |row| row.get(0))?;
        if existing > 0 {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        for sentence in &corpus.sentences {
            tx.execute(
                "INSERT INTO sentences (text, difficulty) VALUES (?1, ?2)",
                params![sentence.text, sentence.difficulty.to_string()],
            )?;
        }
        tx.commit()?;

        log::info!("seeded {} sentences from {}", corpus.sentences.len(), corpus.name);
        Ok(corpus.sentences.len())
    }

    /// Add a sentence to the corpus
    pub fn insert_sentence(
        &self,
        text: &str,
        difficulty: Difficulty,
    ) -> Result<SentenceItem, StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::InvalidSentence(
                "text and difficulty are required".to_string(),
            ));
        }
        if text.contains('\n') {
            return Err(StoreError::InvalidSentence(
                "a sentence must fit on one line".to_string(),
            ));
        }

        self.conn.execute(
            "INSERT INTO sentences (text, difficulty) VALUES (?1, ?2)",
            params![text, difficulty.to_string()],
        )?;

        Ok(SentenceItem::new(
            self.conn.last_insert_rowid(),
            text,
            difficulty,
        ))
    }

    pub fn all_sentences(&self) -> Result<Vec<SentenceItem>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, text, difficulty FROM sentences ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut sentences = Vec::new();
        for row in rows {
            let (id, text, difficulty) = row?;
            let difficulty = Difficulty::parse(&difficulty).ok_or_else(|| {
                StoreError::Corrupt(format!("sentence {id} has difficulty {difficulty:?}"))
            })?;
            sentences.push(SentenceItem::new(id, text, difficulty));
        }
        Ok(sentences)
    }

    pub fn sentences_by_difficulty(
        &self,
        difficulty: Difficulty,
    ) -> Result<Vec<SentenceItem>, StoreError> {
        Ok(self
            .all_sentences()?
            .into_iter()
            .filter(|s| s.difficulty == difficulty)
            .collect())
    }

    /// Persist one game for `user`, returning the new row id
    pub fn insert_game(&self, user: &UserId, record: &GameRecord) -> Result<i64, StoreError> {
        self.insert_game_at(user, record, Local::now())
    }

    pub fn insert_game_at(
        &self,
        user: &UserId,
        record: &GameRecord,
        timestamp: DateTime<Local>,
    ) -> Result<i64, StoreError> {
        self.conn.execute(
            r#"
            INSERT INTO games (user_id, score, wpm, accuracy, difficulty, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                user.as_str(),
                record.score,
                record.wpm,
                record.accuracy,
                record.difficulty.to_string(),
                timestamp.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All games of a user, newest first
    pub fn games_for_user(&self, user: &UserId) -> Result<Vec<StoredGame>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, user_id, score, wpm, accuracy, difficulty, timestamp
            FROM games
            WHERE user_id = ?1
            ORDER BY timestamp DESC, id DESC
            "#,
        )?;

        let rows = stmt.query_map([user.as_str()], read_game_row)?;

        let mut games = Vec::new();
        for row in rows {
            games.push(row??);
        }
        Ok(games)
    }

    pub fn game_count(&self, user: &UserId) -> Result<i64, StoreError> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM games WHERE user_id = ?1",
            [user.as_str()],
            |row| row.get(0),
        )?)
    }
}

type RawGame = Result<StoredGame, StoreError>;

fn read_game_row(row: &Row<'_>) -> rusqlite::Result<RawGame> {
    let id: i64 = row.get(0)?;
    let user_id: String = row.get(1)?;
    let difficulty: String = row.get(5)?;
    let timestamp: String = row.get(6)?;

    let Some(difficulty) = Difficulty::parse(&difficulty) else {
        return Ok(Err(StoreError::Corrupt(format!(
            "game {id} has difficulty {difficulty:?}"
        ))));
    };
    let timestamp = match DateTime::parse_from_rfc3339(&timestamp) {
        Ok(ts) => ts.with_timezone(&Local),
        Err(e) => {
            return Ok(Err(StoreError::Corrupt(format!(
                "game {id} has timestamp {timestamp:?}: {e}"
            ))))
        }
    };

    Ok(Ok(StoredGame {
        id,
        user_id: UserId::new(user_id),
        record: GameRecord {
            score: row.get(2)?,
            wpm: row.get(3)?,
            accuracy: row.get(4)?,
            difficulty,
        },
        timestamp,
    }))
}

impl GameStore for GameDb {
    fn save_game(&mut self, user: &UserId, record: &GameRecord) -> Result<(), StoreError> {
        self.insert_game(user, record).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentences::SeedSentence;
    use chrono::Duration;
    use tempfile::tempdir;

    fn record(wpm: u32, accuracy: u32) -> GameRecord {
        GameRecord {
            score: wpm * 5,
            wpm,
            accuracy,
            difficulty: Difficulty::Easy,
        }
    }

    fn small_corpus() -> Corpus {
        Corpus {
            name: "small".to_string(),
            sentences: vec![
                SeedSentence {
                    text: "one".to_string(),
                    difficulty: Difficulty::Easy,
                },
                SeedSentence {
                    text: "two".to_string(),
                    difficulty: Difficulty::Hard,
                },
            ],
        }
    }

    #[test]
    fn test_seed_only_once() {
        let mut db = GameDb::open_in_memory().unwrap();

        assert_eq!(db.seed_if_empty(&small_corpus()).unwrap(), 2);
        assert_eq!(db.seed_if_empty(&small_corpus()).unwrap(), 0);
        assert_eq!(db.all_sentences().unwrap().len(), 2);
    }

    #[test]
    fn test_insert_and_filter_sentences() {
        let db = GameDb::open_in_memory().unwrap();
        let item = db
            .insert_sentence("  Rust makes systems fun.  ", Difficulty::Medium)
            .unwrap();
        db.insert_sentence("other", Difficulty::Easy).unwrap();

        assert_eq!(item.text, "Rust makes systems fun.");
        let medium = db.sentences_by_difficulty(Difficulty::Medium).unwrap();
        assert_eq!(medium, vec![item]);
    }

    #[test]
    fn test_insert_sentence_rejects_blank_text() {
        let db = GameDb::open_in_memory().unwrap();
        assert!(matches!(
            db.insert_sentence("   ", Difficulty::Easy),
            Err(StoreError::InvalidSentence(_))
        ));
        assert!(matches!(
            db.insert_sentence("two\nlines", Difficulty::Easy),
            Err(StoreError::InvalidSentence(_))
        ));
    }

    #[test]
    fn test_games_newest_first_per_user() {
        let db = GameDb::open_in_memory().unwrap();
        let ada = UserId::new("ada");
        let bob = UserId::new("bob");
        let now = Local::now();

        db.insert_game_at(&ada, &record(40, 95), now - Duration::minutes(10))
            .unwrap();
        db.insert_game_at(&ada, &record(55, 98), now).unwrap();
        db.insert_game_at(&bob, &record(20, 80), now).unwrap();

        let games = db.games_for_user(&ada).unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].record.wpm, 55);
        assert_eq!(games[1].record.wpm, 40);
        assert_eq!(db.game_count(&bob).unwrap(), 1);
    }

    #[test]
    fn test_game_store_trait_persists() {
        let mut db = GameDb::open_in_memory().unwrap();
        let user = UserId::new("carol");

        db.save_game(&user, &record(30, 100)).unwrap();

        let games = db.games_for_user(&user).unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].record, record(30, 100));
        assert_eq!(games[0].user_id, user);
    }

    #[test]
    fn test_on_disk_store_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("typeline.db");

        {
            let db = GameDb::open(&path).unwrap();
            db.insert_game(&UserId::new("dan"), &record(10, 50)).unwrap();
        }

        let db = GameDb::open(&path).unwrap();
        assert_eq!(db.game_count(&UserId::new("dan")).unwrap(), 1);
    }
}
