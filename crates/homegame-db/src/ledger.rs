//! Buy-ins and cash-outs.

use chrono::Utc;
use homegame_core::{validate_amount, validate_player_id, Amount, LedgerEntry, LedgerKind, PlayerRef};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::sync::MutexGuard;
use tracing::info;
use uuid::Uuid;

use crate::error::DbError;
use crate::rows::{kind_to_sql, player_exists, row_to_entry, row_to_player_ref, session_exists};

/// A ledger entry joined with its player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerLine {
    #[serde(flatten)]
    pub entry: LedgerEntry,
    pub player: PlayerRef,
}

const LINE_SELECT: &str = r#"
    SELECT e.id, e.kind, e.session_id, e.player_id, e.amount, e.created_at,
           p.id, p.name, p.nickname
    FROM ledger_entries e
    JOIN players p ON e.player_id = p.id
"#;

fn row_to_line(row: &rusqlite::Row) -> Result<LedgerLine, rusqlite::Error> {
    Ok(LedgerLine {
        entry: row_to_entry(row)?,
        player: row_to_player_ref(row, 6)?,
    })
}

/// Ledger lines, optionally filtered by kind, session and player, oldest first.
pub(crate) fn list_lines(
    conn: &Connection,
    kind: Option<LedgerKind>,
    session_id: Option<&str>,
    player_id: Option<&str>,
) -> Result<Vec<LedgerLine>, DbError> {
    let mut sql = format!("{} WHERE 1=1", LINE_SELECT);
    let mut param_values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(kind) = kind {
        sql.push_str(" AND e.kind = ?");
        param_values.push(Box::new(kind_to_sql(kind)));
    }

    if let Some(session_id) = session_id {
        sql.push_str(" AND e.session_id = ?");
        param_values.push(Box::new(session_id.to_string()));
    }

    if let Some(player_id) = player_id {
        sql.push_str(" AND e.player_id = ?");
        param_values.push(Box::new(player_id.to_string()));
    }

    sql.push_str(" ORDER BY e.created_at");

    let params: Vec<&dyn rusqlite::ToSql> = param_values.iter().map(|p| p.as_ref()).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params.as_slice(), row_to_line)?;

    let mut lines = Vec::new();
    for row in rows {
        lines.push(row?);
    }

    Ok(lines)
}

/// Ledger store with a borrowed connection.
pub struct Ledger<'db> {
    conn: MutexGuard<'db, Connection>,
}

impl<'db> Ledger<'db> {
    pub(crate) fn new(conn: MutexGuard<'db, Connection>) -> Self {
        Self { conn }
    }

    pub fn add_buy_in(
        &self,
        session_id: &str,
        player_id: &str,
        amount: Amount,
    ) -> Result<LedgerLine, DbError> {
        self.add(LedgerKind::BuyIn, session_id, player_id, amount)
    }

    pub fn add_cash_out(
        &self,
        session_id: &str,
        player_id: &str,
        amount: Amount,
    ) -> Result<LedgerLine, DbError> {
        self.add(LedgerKind::CashOut, session_id, player_id, amount)
    }

    /// Record an entry. The player does not have to be on the session's roster.
    pub fn add(
        &self,
        kind: LedgerKind,
        session_id: &str,
        player_id: &str,
        amount: Amount,
    ) -> Result<LedgerLine, DbError> {
        let player_id = validate_player_id(player_id)?;
        let amount = validate_amount(amount)?;

        if !session_exists(&self.conn, session_id)? {
            return Err(DbError::not_found("Session", session_id));
        }
        if !player_exists(&self.conn, player_id)? {
            return Err(DbError::not_found("Player", player_id));
        }

        let id = Uuid::new_v4().to_string();
        self.conn.execute(
            r#"
            INSERT INTO ledger_entries (id, kind, session_id, player_id, amount, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                id,
                kind_to_sql(kind),
                session_id,
                player_id,
                amount.to_string(),
                Utc::now().to_rfc3339(),
            ],
        )?;

        info!(
            entry_id = %id,
            %kind,
            session_id = %session_id,
            player_id = %player_id,
            %amount,
            "Ledger entry recorded"
        );

        self.get(&id)?
            .ok_or_else(|| DbError::not_found(kind.entity_name(), id))
    }

    pub fn get(&self, id: &str) -> Result<Option<LedgerLine>, DbError> {
        Ok(self
            .conn
            .query_row(
                &format!("{} WHERE e.id = ?1", LINE_SELECT),
                params![id],
                row_to_line,
            )
            .optional()?)
    }

    pub fn list(
        &self,
        kind: Option<LedgerKind>,
        session_id: Option<&str>,
        player_id: Option<&str>,
    ) -> Result<Vec<LedgerLine>, DbError> {
        list_lines(&self.conn, kind, session_id, player_id)
    }

    pub fn delete_buy_in(&self, id: &str) -> Result<bool, DbError> {
        self.delete(LedgerKind::BuyIn, id)
    }

    pub fn delete_cash_out(&self, id: &str) -> Result<bool, DbError> {
        self.delete(LedgerKind::CashOut, id)
    }

    /// Delete an entry of the given kind. An id of the other kind is left alone.
    pub fn delete(&self, kind: LedgerKind, id: &str) -> Result<bool, DbError> {
        let rows_affected = self.conn.execute(
            "DELETE FROM ledger_entries WHERE id = ?1 AND kind = ?2",
            params![id, kind_to_sql(kind)],
        )?;

        if rows_affected > 0 {
            info!(entry_id = %id, %kind, "Ledger entry deleted");
        }

        Ok(rows_affected > 0)
    }
}
