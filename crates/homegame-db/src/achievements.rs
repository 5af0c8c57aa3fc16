//! Best-combo flag. At most one player holds it.

use chrono::Utc;
use homegame_core::{validate_player_id, Player};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::MutexGuard;
use tracing::info;

use crate::error::DbError;
use crate::rows::{get_player, player_exists, row_to_player, PLAYER_COLUMNS};

/// Achievements store with a borrowed connection.
pub struct Achievements<'db> {
    conn: MutexGuard<'db, Connection>,
}

impl<'db> Achievements<'db> {
    pub(crate) fn new(conn: MutexGuard<'db, Connection>) -> Self {
        Self { conn }
    }

    /// Award the best combo to one player, taking it from whoever held it.
    pub fn set_best_combo(&self, player_id: &str) -> Result<Player, DbError> {
        let player_id = validate_player_id(player_id)?;

        let tx = self.conn.unchecked_transaction()?;
        if !player_exists(&tx, player_id)? {
            return Err(DbError::not_found("Player", player_id));
        }

        let now = Utc::now().to_rfc3339();
        tx.execute(
            "UPDATE players SET has_best_combo = 0, updated_at = ?1 WHERE has_best_combo = 1",
            params![now],
        )?;
        tx.execute(
            "UPDATE players SET has_best_combo = 1, updated_at = ?1 WHERE id = ?2",
            params![now, player_id],
        )?;
        tx.commit()?;

        info!(player_id = %player_id, "Best combo awarded");

        get_player(&self.conn, player_id)?.ok_or_else(|| DbError::not_found("Player", player_id))
    }

    /// Take the best combo away from a player. Clearing a player who does
    /// not hold it is a no-op.
    pub fn clear_best_combo(&self, player_id: &str) -> Result<Player, DbError> {
        let player_id = validate_player_id(player_id)?;

        let rows_affected = self.conn.execute(
            "UPDATE players SET has_best_combo = 0, updated_at = ?1 WHERE id = ?2 AND has_best_combo = 1",
            params![Utc::now().to_rfc3339(), player_id],
        )?;

        if rows_affected > 0 {
            info!(player_id = %player_id, "Best combo cleared");
        }

        get_player(&self.conn, player_id)?.ok_or_else(|| DbError::not_found("Player", player_id))
    }

    pub fn best_combo_holder(&self) -> Result<Option<Player>, DbError> {
        Ok(self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM players WHERE has_best_combo = 1",
                    PLAYER_COLUMNS
                ),
                [],
                row_to_player,
            )
            .optional()?)
    }
}
