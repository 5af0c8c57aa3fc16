//! `LedgerReader` over a SQLite connection.

use std::ops::Deref;

use homegame_core::{LedgerEntry, LedgerKind, LedgerReader, Player, RosterEntry, Session};
use rusqlite::{params, Connection};

use crate::error::DbError;
use crate::rows::{
    kind_to_sql, row_to_entry, row_to_player, row_to_roster_entry, row_to_session,
    PLAYER_COLUMNS, SESSION_COLUMNS,
};

/// Reads through one connection handle.
///
/// Built from a `MutexGuard` by [`crate::Database::reader`], it keeps writers
/// out for its whole lifetime, so a report sees one committed state.
pub struct Reader<C> {
    conn: C,
}

impl<C: Deref<Target = Connection>> Reader<C> {
    pub(crate) fn new(conn: C) -> Self {
        Self { conn }
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// Ledger entries of one kind, optionally scoped to a session and/or player.
pub(crate) fn query_entries(
    conn: &Connection,
    kind: LedgerKind,
    session_id: Option<&str>,
    player_id: Option<&str>,
) -> Result<Vec<LedgerEntry>, rusqlite::Error> {
    let mut sql = String::from(
        "SELECT id, kind, session_id, player_id, amount, created_at FROM ledger_entries WHERE kind = ?",
    );
    let mut param_values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
    param_values.push(Box::new(kind_to_sql(kind)));

    if let Some(session_id) = session_id {
        sql.push_str(" AND session_id = ?");
        param_values.push(Box::new(session_id.to_string()));
    }

    if let Some(player_id) = player_id {
        sql.push_str(" AND player_id = ?");
        param_values.push(Box::new(player_id.to_string()));
    }

    sql.push_str(" ORDER BY created_at");

    let params: Vec<&dyn rusqlite::ToSql> = param_values.iter().map(|p| p.as_ref()).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params.as_slice(), row_to_entry)?;

    let mut entries = Vec::new();
    for row in rows {
        entries.push(row?);
    }

    Ok(entries)
}

impl<C: Deref<Target = Connection>> LedgerReader for Reader<C> {
    type Error = DbError;

    fn list_buy_ins(
        &self,
        session_id: Option<&str>,
        player_id: Option<&str>,
    ) -> Result<Vec<LedgerEntry>, DbError> {
        Ok(query_entries(&self.conn, LedgerKind::BuyIn, session_id, player_id)?)
    }

    fn list_cash_outs(
        &self,
        session_id: Option<&str>,
        player_id: Option<&str>,
    ) -> Result<Vec<LedgerEntry>, DbError> {
        Ok(query_entries(&self.conn, LedgerKind::CashOut, session_id, player_id)?)
    }

    fn list_roster_entries(&self, player_id: Option<&str>) -> Result<Vec<RosterEntry>, DbError> {
        let entries = match player_id {
            Some(player_id) => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, session_id, player_id FROM session_players WHERE player_id = ?1",
                )?;
                let rows = stmt.query_map(params![player_id], row_to_roster_entry)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = self
                    .conn
                    .prepare("SELECT id, session_id, player_id FROM session_players")?;
                let rows = stmt.query_map([], row_to_roster_entry)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };

        Ok(entries)
    }

    fn list_session_roster(&self, session_id: &str) -> Result<Vec<RosterEntry>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, player_id FROM session_players WHERE session_id = ?1",
        )?;
        let rows = stmt.query_map(params![session_id], row_to_roster_entry)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn list_sessions(&self) -> Result<Vec<Session>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM sessions ORDER BY date DESC, created_at DESC",
            SESSION_COLUMNS
        ))?;
        let rows = stmt.query_map([], row_to_session)?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?);
        }

        Ok(sessions)
    }

    fn list_players(&self) -> Result<Vec<Player>, DbError> {
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
}
