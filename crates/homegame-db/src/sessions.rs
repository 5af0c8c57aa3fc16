//! Sessions store: game events and their rosters.

use chrono::Utc;
use homegame_core::{
    compute_session_bankrolls, normalize_optional, normalize_roster, parse_session_date,
    LedgerKind, PlayerBankroll, PlayerRef, Session,
};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::sync::MutexGuard;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DbError;
use crate::ledger::{list_lines, LedgerLine};
use crate::reader::Reader;
use crate::rows::{player_exists, row_to_player_ref, row_to_session, DATE_FORMAT, SESSION_COLUMNS};

/// Data provided when creating a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewSession {
    /// `YYYY-MM-DD` or an RFC 3339 timestamp.
    pub date: String,
    pub description: Option<String>,
    pub player_ids: Vec<String>,
}

/// Data provided when updating a session. A present `player_ids` replaces
/// the whole roster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionUpdate {
    pub date: String,
    pub description: Option<String>,
    pub player_ids: Option<Vec<String>>,
}

/// A roster entry joined with its player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterMember {
    pub id: String,
    pub player: PlayerRef,
}

/// A session with its roster, ledger and per-player bankroll table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetail {
    #[serde(flatten)]
    pub session: Session,
    pub players: Vec<RosterMember>,
    pub buy_ins: Vec<LedgerLine>,
    pub cash_outs: Vec<LedgerLine>,
    pub bankrolls: Vec<PlayerBankroll>,
}

/// Sessions store with a borrowed connection.
pub struct Sessions<'db> {
    conn: MutexGuard<'db, Connection>,
}

impl<'db> Sessions<'db> {
    pub(crate) fn new(conn: MutexGuard<'db, Connection>) -> Self {
        Self { conn }
    }

    /// Create a session with its initial roster.
    pub fn create(&self, new: &NewSession) -> Result<SessionDetail, DbError> {
        let date = parse_session_date(&new.date)?;
        let description = normalize_optional(new.description.as_deref());
        let roster = normalize_roster(&new.player_ids)?;
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        let tx = self.conn.unchecked_transaction()?;
        ensure_players_exist(&tx, &roster)?;

        tx.execute(
            r#"
            INSERT INTO sessions (id, date, description, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
            params![id, date.format(DATE_FORMAT).to_string(), description, now],
        )?;
        insert_roster(&tx, &id, &roster)?;
        tx.commit()?;

        info!(session_id = %id, %date, players = roster.len(), "Session created");

        self.get(&id)?.ok_or_else(|| DbError::not_found("Session", id))
    }

    /// Get a session with roster, ledger and bankrolls.
    pub fn get(&self, id: &str) -> Result<Option<SessionDetail>, DbError> {
        let session = self
            .conn
            .query_row(
                &format!("SELECT {} FROM sessions WHERE id = ?1", SESSION_COLUMNS),
                params![id],
                row_to_session,
            )
            .optional()?;

        match session {
            Some(session) => Ok(Some(self.load_detail(session)?)),
            None => Ok(None),
        }
    }

    /// All sessions with details, newest first.
    pub fn list(&self) -> Result<Vec<SessionDetail>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM sessions ORDER BY date DESC, created_at DESC",
            SESSION_COLUMNS
        ))?;
        let rows = stmt.query_map([], row_to_session)?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?);
        }
        drop(stmt);

        debug!(count = sessions.len(), "Listing sessions");

        sessions
            .into_iter()
            .map(|session| self.load_detail(session))
            .collect()
    }

    /// Update date and description; replace the roster when one is given.
    ///
    /// Roster replacement discards the old entries and inserts the new list in
    /// the same transaction as the session update.
    pub fn update(&self, id: &str, update: &SessionUpdate) -> Result<SessionDetail, DbError> {
        let date = parse_session_date(&update.date)?;
        let description = normalize_optional(update.description.as_deref());
        let roster = update
            .player_ids
            .as_deref()
            .map(normalize_roster)
            .transpose()?;

        let tx = self.conn.unchecked_transaction()?;

        let rows_affected = tx.execute(
            "UPDATE sessions SET date = ?1, description = ?2, updated_at = ?3 WHERE id = ?4",
            params![
                date.format(DATE_FORMAT).to_string(),
                description,
                Utc::now().to_rfc3339(),
                id
            ],
        )?;
        if rows_affected == 0 {
            return Err(DbError::not_found("Session", id));
        }

        if let Some(ref roster) = roster {
            ensure_players_exist(&tx, roster)?;
            tx.execute(
                "DELETE FROM session_players WHERE session_id = ?1",
                params![id],
            )?;
            insert_roster(&tx, id, roster)?;
        }

        tx.commit()?;

        info!(
            session_id = %id,
            roster_replaced = roster.is_some(),
            "Session updated"
        );

        self.get(id)?.ok_or_else(|| DbError::not_found("Session", id))
    }

    /// Delete a session by ID (cascades to roster and ledger entries).
    pub fn delete(&self, id: &str) -> Result<bool, DbError> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM sessions WHERE id = ?1", params![id])?;

        if rows_affected > 0 {
            info!(session_id = %id, "Session deleted");
        }

        Ok(rows_affected > 0)
    }

    /// Roster of a session, ordered by player name.
    pub fn roster(&self, session_id: &str) -> Result<Vec<RosterMember>, DbError> {
        roster_of(&self.conn, session_id)
    }

    fn load_detail(&self, session: Session) -> Result<SessionDetail, DbError> {
        let players = roster_of(&self.conn, &session.id)?;
        let buy_ins = list_lines(&self.conn, Some(LedgerKind::BuyIn), Some(&session.id), None)?;
        let cash_outs = list_lines(&self.conn, Some(LedgerKind::CashOut), Some(&session.id), None)?;
        let bankrolls = compute_session_bankrolls(&Reader::new(&*self.conn), &session.id)?;

        Ok(SessionDetail {
            session,
            players,
            buy_ins,
            cash_outs,
            bankrolls,
        })
    }
}

fn roster_of(conn: &Connection, session_id: &str) -> Result<Vec<RosterMember>, DbError> {
    let mut stmt = conn.prepare(
        r#"
        SELECT sp.id, p.id, p.name, p.nickname
        FROM session_players sp
        JOIN players p ON sp.player_id = p.id
        WHERE sp.session_id = ?1
        ORDER BY p.name ASC
        "#,
    )?;
    let rows = stmt.query_map(params![session_id], |row| {
        Ok(RosterMember {
            id: row.get(0)?,
            player: row_to_player_ref(row, 1)?,
        })
    })?;

    let mut members = Vec::new();
    for row in rows {
        members.push(row?);
    }

    Ok(members)
}

fn ensure_players_exist(conn: &Connection, player_ids: &[String]) -> Result<(), DbError> {
    for player_id in player_ids {
        if !player_exists(conn, player_id)? {
            return Err(DbError::not_found("Player", player_id.as_str()));
        }
    }
    Ok(())
}

fn insert_roster(conn: &Connection, session_id: &str, player_ids: &[String]) -> Result<(), DbError> {
    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO session_players (id, session_id, player_id) VALUES (?1, ?2, ?3)",
    )?;
    for player_id in player_ids {
        stmt.execute(params![Uuid::new_v4().to_string(), session_id, player_id])?;
    }
    Ok(())
}
