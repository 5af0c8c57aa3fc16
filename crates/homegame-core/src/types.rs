//! Entity value types shared by the store and the reports.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Monetary amount. Exact base-10, never rounded during summation.
pub type Amount = Decimal;

/// A registered player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub name: String,
    pub nickname: Option<String>,
    pub emoji: Option<String>,
    pub has_best_combo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Player {
    /// Identity projection used inside report rows.
    pub fn to_ref(&self) -> PlayerRef {
        PlayerRef {
            id: self.id.clone(),
            name: self.name.clone(),
            nickname: self.nickname.clone(),
        }
    }
}

/// The slice of a player that reports and ledger listings carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRef {
    pub id: String,
    pub name: String,
    pub nickname: Option<String>,
}

/// A single game event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Membership of one player in one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub id: String,
    pub session_id: String,
    pub player_id: String,
}

/// Which side of the ledger an entry sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    BuyIn,
    CashOut,
}

impl LedgerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerKind::BuyIn => "buy-in",
            LedgerKind::CashOut => "cash-out",
        }
    }

    /// Capitalized name for messages such as "Buy-in not found".
    pub fn entity_name(&self) -> &'static str {
        match self {
            LedgerKind::BuyIn => "Buy-in",
            LedgerKind::CashOut => "Cash-out",
        }
    }
}

impl std::fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A buy-in or cash-out. Written once, never updated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: String,
    pub kind: LedgerKind,
    pub session_id: String,
    pub player_id: String,
    pub amount: Amount,
    pub created_at: DateTime<Utc>,
}
