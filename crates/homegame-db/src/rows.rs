//! Column lists and row mappers shared by the stores.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use homegame_core::{Amount, LedgerEntry, LedgerKind, Player, PlayerRef, RosterEntry, Session};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(crate) const PLAYER_COLUMNS: &str =
    "id, name, nickname, emoji, has_best_combo, created_at, updated_at";

pub(crate) const SESSION_COLUMNS: &str = "id, date, description, created_at, updated_at";

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn row_to_player(row: &Row) -> Result<Player, rusqlite::Error> {
    let created_at_str: String = row.get(5)?;
    let updated_at_str: String = row.get(6)?;

    Ok(Player {
        id: row.get(0)?,
        name: row.get(1)?,
        nickname: row.get(2)?,
        emoji: row.get(3)?,
        has_best_combo: row.get::<_, i64>(4)? != 0,
        created_at: parse_timestamp(&created_at_str),
        updated_at: parse_timestamp(&updated_at_str),
    })
}

pub(crate) fn row_to_session(row: &Row) -> Result<Session, rusqlite::Error> {
    let date_str: String = row.get(1)?;
    let created_at_str: String = row.get(3)?;
    let updated_at_str: String = row.get(4)?;

    Ok(Session {
        id: row.get(0)?,
        date: NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?,
        description: row.get(2)?,
        created_at: parse_timestamp(&created_at_str),
        updated_at: parse_timestamp(&updated_at_str),
    })
}

pub(crate) fn row_to_roster_entry(row: &Row) -> Result<RosterEntry, rusqlite::Error> {
    Ok(RosterEntry {
        id: row.get(0)?,
        session_id: row.get(1)?,
        player_id: row.get(2)?,
    })
}

/// Maps `id, kind, session_id, player_id, amount, created_at` at columns 0..=5.
pub(crate) fn row_to_entry(row: &Row) -> Result<LedgerEntry, rusqlite::Error> {
    let kind_str: String = row.get(1)?;
    let amount_str: String = row.get(4)?;
    let created_at_str: String = row.get(5)?;

    Ok(LedgerEntry {
        id: row.get(0)?,
        kind: kind_from_sql(1, &kind_str)?,
        session_id: row.get(2)?,
        player_id: row.get(3)?,
        amount: Amount::from_str(&amount_str)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?,
        created_at: parse_timestamp(&created_at_str),
    })
}

/// Maps `id, name, nickname` starting at `offset`.
pub(crate) fn row_to_player_ref(row: &Row, offset: usize) -> Result<PlayerRef, rusqlite::Error> {
    Ok(PlayerRef {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        nickname: row.get(offset + 2)?,
    })
}

pub(crate) fn kind_to_sql(kind: LedgerKind) -> &'static str {
    match kind {
        LedgerKind::BuyIn => "buy_in",
        LedgerKind::CashOut => "cash_out",
    }
}

fn kind_from_sql(idx: usize, value: &str) -> Result<LedgerKind, rusqlite::Error> {
    match value {
        "buy_in" => Ok(LedgerKind::BuyIn),
        "cash_out" => Ok(LedgerKind::CashOut),
        other => Err(rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown ledger kind: {}", other).into(),
        )),
    }
}

pub(crate) fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

pub(crate) fn player_exists(conn: &Connection, id: &str) -> Result<bool, rusqlite::Error> {
    conn.query_row("SELECT 1 FROM players WHERE id = ?1", params![id], |_| Ok(()))
        .optional()
        .map(|found| found.is_some())
}

pub(crate) fn session_exists(conn: &Connection, id: &str) -> Result<bool, rusqlite::Error> {
    conn.query_row("SELECT 1 FROM sessions WHERE id = ?1", params![id], |_| Ok(()))
        .optional()
        .map(|found| found.is_some())
}

pub(crate) fn get_player(conn: &Connection, id: &str) -> Result<Option<Player>, rusqlite::Error> {
    conn.query_row(
        &format!("SELECT {} FROM players WHERE id = ?1", PLAYER_COLUMNS),
        params![id],
        row_to_player,
    )
    .optional()
}
