//! SQLite storage for homegame.
//!
//! Provides a `Database` struct that owns the SQLite connection and hands out
//! domain stores. Every store borrows the connection for its lifetime, so
//! one store call never interleaves with another writer.

mod achievements;
mod error;
mod ledger;
mod players;
mod reader;
mod rows;
mod sessions;

pub use achievements::Achievements;
pub use error::DbError;
pub use ledger::{Ledger, LedgerLine};
pub use players::{NewPlayer, PlayerUpdate, PlayerWithSessions, Players};
pub use reader::Reader;
pub use sessions::{NewSession, RosterMember, SessionDetail, SessionUpdate, Sessions};

use homegame_core::{
    compute_achievements, compute_game_matrix, compute_player_statistics,
    compute_session_player_profit, GameRow, PlayerStatistics, SessionPlayerProfit,
};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::rows::{player_exists, session_exists};

/// Owns the SQLite connection.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the default location.
    ///
    /// The default location is `~/.local/share/homegame/homegame.db`.
    pub fn open() -> Result<Self, DbError> {
        Self::open_at(&Self::default_path())
    }

    /// Open or create a database at a specific path, creating parent
    /// directories as needed.
    pub fn open_at(path: &Path) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).ok();
            }
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        debug!(path = %path.display(), "Database opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (useful for testing).
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("homegame")
            .join("homegame.db")
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-call leaves SQLite itself consistent; keep serving.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn players(&self) -> Players<'_> {
        Players::new(self.lock())
    }

    pub fn sessions(&self) -> Sessions<'_> {
        Sessions::new(self.lock())
    }

    pub fn ledger(&self) -> Ledger<'_> {
        Ledger::new(self.lock())
    }

    pub fn achievements(&self) -> Achievements<'_> {
        Achievements::new(self.lock())
    }

    /// A `LedgerReader` that holds the connection until dropped.
    pub fn reader(&self) -> Reader<MutexGuard<'_, Connection>> {
        Reader::new(self.lock())
    }

    /// Profit for one (session, player) pair. Both must exist.
    pub fn session_player_profit(
        &self,
        session_id: &str,
        player_id: &str,
    ) -> Result<SessionPlayerProfit, DbError> {
        let reader = self.reader();
        if !session_exists(reader.conn(), session_id)? {
            return Err(DbError::not_found("Session", session_id));
        }
        if !player_exists(reader.conn(), player_id)? {
            return Err(DbError::not_found("Player", player_id));
        }
        compute_session_player_profit(&reader, session_id, player_id)
    }

    pub fn player_statistics(&self) -> Result<Vec<PlayerStatistics>, DbError> {
        compute_player_statistics(&self.reader())
    }

    pub fn game_matrix(&self) -> Result<Vec<GameRow>, DbError> {
        compute_game_matrix(&self.reader())
    }

    pub fn achievements_report(&self) -> Result<homegame_core::Achievements, DbError> {
        compute_achievements(&self.reader())
    }

    fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS players (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                nickname TEXT,
                emoji TEXT,
                has_best_combo INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                description TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS session_players (
                id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
                player_id TEXT NOT NULL REFERENCES players(id) ON DELETE CASCADE,
                UNIQUE(session_id, player_id)
            );

            CREATE TABLE IF NOT EXISTS ledger_entries (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL CHECK (kind IN ('buy_in', 'cash_out')),
                session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
                player_id TEXT NOT NULL REFERENCES players(id) ON DELETE CASCADE,
                amount TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_players_best_combo
                ON players(has_best_combo) WHERE has_best_combo = 1;
            CREATE INDEX IF NOT EXISTS idx_ledger_session_player
                ON ledger_entries(session_id, player_id);
            CREATE INDEX IF NOT EXISTS idx_ledger_player ON ledger_entries(player_id);
            CREATE INDEX IF NOT EXISTS idx_session_players_player ON session_players(player_id);
            CREATE INDEX IF NOT EXISTS idx_sessions_date ON sessions(date DESC);
            "#,
        )
    }
}
