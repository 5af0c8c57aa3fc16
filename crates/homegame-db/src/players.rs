//! Player registry.

use chrono::Utc;
use homegame_core::{normalize_optional, validate_name, Player, Session};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::sync::MutexGuard;
use tracing::info;
use uuid::Uuid;

use crate::error::DbError;
use crate::rows::{get_player, row_to_player, row_to_session, PLAYER_COLUMNS};

/// Data provided when registering a player.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewPlayer {
    pub name: String,
    pub nickname: Option<String>,
    pub emoji: Option<String>,
}

/// Replacement values for a player's editable fields.
pub type PlayerUpdate = NewPlayer;

/// A player together with the sessions they are rostered on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerWithSessions {
    #[serde(flatten)]
    pub player: Player,
    pub sessions: Vec<Session>,
}

/// Players store with a borrowed connection.
pub struct Players<'db> {
    conn: MutexGuard<'db, Connection>,
}

impl<'db> Players<'db> {
    pub(crate) fn new(conn: MutexGuard<'db, Connection>) -> Self {
        Self { conn }
    }

    /// Register a player, returning the stored record.
    pub fn create(&self, new: &NewPlayer) -> Result<Player, DbError> {
        let name = validate_name(&new.name)?;
        let nickname = normalize_optional(new.nickname.as_deref());
        let emoji = normalize_optional(new.emoji.as_deref());
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        self.conn.execute(
            r#"
            INSERT INTO players (id, name, nickname, emoji, has_best_combo, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5)
            "#,
            params![id, name, nickname, emoji, now],
        )?;

        info!(player_id = %id, name = %name, "Player created");

        get_player(&self.conn, &id)?.ok_or_else(|| DbError::not_found("Player", id))
    }

    pub fn get(&self, id: &str) -> Result<Option<Player>, DbError> {
        Ok(get_player(&self.conn, id)?)
    }

    /// Get a player and every session they are rostered on (newest first).
    pub fn get_with_sessions(&self, id: &str) -> Result<Option<PlayerWithSessions>, DbError> {
        let Some(player) = get_player(&self.conn, id)? else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(
            r#"
            SELECT s.id, s.date, s.description, s.created_at, s.updated_at
            FROM session_players sp
            JOIN sessions s ON sp.session_id = s.id
            WHERE sp.player_id = ?1
            ORDER BY s.date DESC, s.created_at DESC
            "#,
        )?;
        let rows = stmt.query_map(params![id], row_to_session)?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?);
        }

        Ok(Some(PlayerWithSessions { player, sessions }))
    }

    /// All players ordered by name.
    pub fn list(&self) -> Result<Vec<Player>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM players ORDER BY name ASC",
            PLAYER_COLUMNS
        ))?;
        let rows = stmt.query_map([], row_to_player)?;

        let mut players = Vec::new();
        for row in rows {
            players.push(row?);
        }

        Ok(players)
    }

    /// Replace name, nickname and emoji.
    pub fn update(&self, id: &str, update: &PlayerUpdate) -> Result<Player, DbError> {
        let name = validate_name(&update.name)?;
        let nickname = normalize_optional(update.nickname.as_deref());
        let emoji = normalize_optional(update.emoji.as_deref());

        let rows_affected = self.conn.execute(
            r#"
            UPDATE players SET name = ?1, nickname = ?2, emoji = ?3, updated_at = ?4
            WHERE id = ?5
            "#,
            params![name, nickname, emoji, Utc::now().to_rfc3339(), id],
        )?;

        if rows_affected == 0 {
            return Err(DbError::not_found("Player", id));
        }

        info!(player_id = %id, "Player updated");

        get_player(&self.conn, id)?.ok_or_else(|| DbError::not_found("Player", id))
    }

    /// Delete a player by ID (cascades to roster and ledger entries).
    pub fn delete(&self, id: &str) -> Result<bool, DbError> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM players WHERE id = ?1", params![id])?;

        if rows_affected > 0 {
            info!(player_id = %id, "Player deleted");
        }

        Ok(rows_affected > 0)
    }
}
