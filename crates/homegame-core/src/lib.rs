//! # homegame-core
//!
//! Ledger types and profit aggregation for home poker games.
//!
//! ## Key Types
//!
//! - [`LedgerReader`] - Read contract over buy-ins, cash-outs, rosters and registries
//! - [`SessionPlayerProfit`] / [`Outcome`] - Per (session, player) totals and classification
//! - [`PlayerStatistics`] / [`GameRow`] - Cross-session reports
//! - [`MemoryLedger`] - In-memory reader
//!
//! Nothing here performs I/O. Reports read everything they need through one
//! reader and either return a complete result or the reader's error.

mod achievements;
mod engine;
mod memory;
mod reader;
mod report;
mod types;
mod validation;

pub use achievements::{compute_achievements, Achievements, PlayerTotal};
pub use engine::{compute_session_player_profit, AmountOverflow, Outcome, SessionPlayerProfit};
pub use memory::MemoryLedger;
pub use reader::LedgerReader;
pub use report::{
    compute_game_matrix, compute_player_statistics, compute_session_bankrolls, win_rate, GameRow,
    PlayerBankroll, PlayerStatistics, SessionProfit,
};
pub use types::{Amount, LedgerEntry, LedgerKind, Player, PlayerRef, RosterEntry, Session};
pub use validation::{
    normalize_optional, normalize_roster, parse_session_date, validate_amount, validate_name,
    validate_player_id, ValidationError, AMOUNT_SCALE, MAX_AMOUNT,
};
