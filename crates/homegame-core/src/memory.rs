//! In-memory ledger, mainly for tests and embedding without SQLite.

use chrono::{NaiveDate, Utc};

use crate::engine::AmountOverflow;
use crate::reader::{matches, LedgerReader};
use crate::types::{Amount, LedgerEntry, LedgerKind, Player, RosterEntry, Session};

/// A `LedgerReader` backed by plain vectors.
///
/// Mutators do no validation; ids are sequential (`p1`, `s1`, `e1`, ...).
#[derive(Debug, Default, Clone)]
pub struct MemoryLedger {
    players: Vec<Player>,
    sessions: Vec<Session>,
    roster: Vec<RosterEntry>,
    entries: Vec<LedgerEntry>,
    next_id: usize,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{}", prefix, self.next_id)
    }

    pub fn add_player(&mut self, name: &str, nickname: Option<&str>) -> String {
        let id = self.next_id("p");
        let now = Utc::now();
        self.players.push(Player {
            id: id.clone(),
            name: name.to_string(),
            nickname: nickname.map(str::to_string),
            emoji: None,
            has_best_combo: false,
            created_at: now,
            updated_at: now,
        });
        id
    }

    pub fn add_session(&mut self, date: NaiveDate, description: Option<&str>) -> String {
        let id = self.next_id("s");
        let now = Utc::now();
        self.sessions.push(Session {
            id: id.clone(),
            date,
            description: description.map(str::to_string),
            created_at: now,
            updated_at: now,
        });
        id
    }

    /// Add a player to a session's roster. Re-adding is a no-op.
    pub fn enroll(&mut self, session_id: &str, player_id: &str) {
        let exists = self
            .roster
            .iter()
            .any(|r| r.session_id == session_id && r.player_id == player_id);
        if !exists {
            let id = self.next_id("r");
            self.roster.push(RosterEntry {
                id,
                session_id: session_id.to_string(),
                player_id: player_id.to_string(),
            });
        }
    }

    /// Replace a session's roster wholesale.
    pub fn replace_roster(&mut self, session_id: &str, player_ids: &[&str]) {
        self.roster.retain(|r| r.session_id != session_id);
        for player_id in player_ids {
            self.enroll(session_id, player_id);
        }
    }

    pub fn buy_in(&mut self, session_id: &str, player_id: &str, amount: Amount) -> String {
        self.record(LedgerKind::BuyIn, session_id, player_id, amount)
    }

    pub fn cash_out(&mut self, session_id: &str, player_id: &str, amount: Amount) -> String {
        self.record(LedgerKind::CashOut, session_id, player_id, amount)
    }

    fn record(
        &mut self,
        kind: LedgerKind,
        session_id: &str,
        player_id: &str,
        amount: Amount,
    ) -> String {
        let id = self.next_id("e");
        self.entries.push(LedgerEntry {
            id: id.clone(),
            kind,
            session_id: session_id.to_string(),
            player_id: player_id.to_string(),
            amount,
            created_at: Utc::now(),
        });
        id
    }

    pub fn set_best_combo(&mut self, player_id: &str) {
        for player in &mut self.players {
            player.has_best_combo = player.id == player_id;
        }
    }

    /// Remove a session together with its roster and ledger entries.
    pub fn remove_session(&mut self, session_id: &str) {
        self.sessions.retain(|s| s.id != session_id);
        self.roster.retain(|r| r.session_id != session_id);
        self.entries.retain(|e| e.session_id != session_id);
    }

    /// Remove a player together with their roster and ledger entries.
    pub fn remove_player(&mut self, player_id: &str) {
        self.players.retain(|p| p.id != player_id);
        self.roster.retain(|r| r.player_id != player_id);
        self.entries.retain(|e| e.player_id != player_id);
    }

    fn list_kind(
        &self,
        kind: LedgerKind,
        session_id: Option<&str>,
        player_id: Option<&str>,
    ) -> Vec<LedgerEntry> {
        self.entries
            .iter()
            .filter(|e| e.kind == kind)
            .filter(|e| matches(session_id, &e.session_id) && matches(player_id, &e.player_id))
            .cloned()
            .collect()
    }
}

impl LedgerReader for MemoryLedger {
    /// Reads never fail; only summing unvalidated amounts can.
    type Error = AmountOverflow;

    fn list_buy_ins(
        &self,
        session_id: Option<&str>,
        player_id: Option<&str>,
    ) -> Result<Vec<LedgerEntry>, Self::Error> {
        Ok(self.list_kind(LedgerKind::BuyIn, session_id, player_id))
    }

    fn list_cash_outs(
        &self,
        session_id: Option<&str>,
        player_id: Option<&str>,
    ) -> Result<Vec<LedgerEntry>, Self::Error> {
        Ok(self.list_kind(LedgerKind::CashOut, session_id, player_id))
    }

    fn list_roster_entries(
        &self,
        player_id: Option<&str>,
    ) -> Result<Vec<RosterEntry>, Self::Error> {
        Ok(self
            .roster
            .iter()
            .filter(|r| matches(player_id, &r.player_id))
            .cloned()
            .collect())
    }

    fn list_sessions(&self) -> Result<Vec<Session>, Self::Error> {
        Ok(self.sessions.clone())
    }

    fn list_players(&self) -> Result<Vec<Player>, Self::Error> {
        Ok(self.players.clone())
    }
}
