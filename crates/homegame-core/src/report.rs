//! Cross-session rollups: the player leaderboard and the game matrix.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::{LedgerIndex, Outcome, SessionPlayerProfit};
use crate::reader::LedgerReader;
use crate::types::{Amount, LedgerEntry, Player, PlayerRef, Session};

/// One rostered session in a player's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionProfit {
    pub session_id: String,
    pub date: NaiveDate,
    pub profit: Amount,
    pub outcome: Outcome,
}

/// All-time summary for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatistics {
    pub player: PlayerRef,
    pub total_buy_ins: Amount,
    pub total_cash_outs: Amount,
    pub profit: Amount,
    pub sessions_count: usize,
    pub winning_sessions: usize,
    pub losing_sessions: usize,
    pub breakeven_sessions: usize,
    /// Percentage of rostered sessions won. Losses and breakevens both count
    /// against it.
    pub win_rate: f64,
    pub session_stats: Vec<SessionProfit>,
}

/// One player's column inside a session row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerBankroll {
    pub player_id: String,
    pub player_name: String,
    pub player_nickname: Option<String>,
    pub rostered: bool,
    pub buy_ins: Amount,
    pub cash_outs: Amount,
    pub bankroll: Amount,
}

/// One session with a bankroll for every player in the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRow {
    pub session_id: String,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub players: Vec<PlayerBankroll>,
}

/// Everything a report needs, pulled through one reader.
struct Snapshot {
    players: Vec<Player>,
    sessions: Vec<Session>,
    rostered: HashSet<(String, String)>,
    index: LedgerIndex,
}

impl Snapshot {
    fn load<R: LedgerReader>(reader: &R) -> Result<Self, R::Error> {
        let players = reader.list_players()?;
        let sessions = reader.list_sessions()?;
        let roster = reader.list_roster_entries(None)?;
        let buy_ins = reader.list_buy_ins(None, None)?;
        let cash_outs = reader.list_cash_outs(None, None)?;

        debug!(
            players = players.len(),
            sessions = sessions.len(),
            roster_entries = roster.len(),
            ledger_entries = buy_ins.len() + cash_outs.len(),
            "Loaded ledger snapshot"
        );

        let rostered = roster
            .into_iter()
            .map(|r| (r.session_id, r.player_id))
            .collect();
        let entries: Vec<&LedgerEntry> = buy_ins.iter().chain(cash_outs.iter()).collect();

        Ok(Self {
            players,
            sessions,
            rostered,
            index: LedgerIndex::build(entries)?,
        })
    }

    fn is_rostered(&self, session_id: &str, player_id: &str) -> bool {
        self.rostered
            .contains(&(session_id.to_string(), player_id.to_string()))
    }

    fn bankroll(&self, session_id: &str, player: &Player) -> PlayerBankroll {
        PlayerBankroll::new(
            player,
            self.is_rostered(session_id, &player.id),
            self.index.session_player(session_id, &player.id),
        )
    }
}

impl PlayerBankroll {
    fn new(player: &Player, rostered: bool, totals: SessionPlayerProfit) -> Self {
        Self {
            player_id: player.id.clone(),
            player_name: player.name.clone(),
            player_nickname: player.nickname.clone(),
            rostered,
            buy_ins: totals.buy_ins,
            cash_outs: totals.cash_outs,
            bankroll: totals.profit,
        }
    }
}

/// Per-player statistics across every session each player is rostered on,
/// sorted by all-time profit, highest first.
///
/// Totals are global: ledger entries on sessions the player is not rostered
/// on still count. Outcome tallies only cover rostered sessions, each one
/// summed on its own.
pub fn compute_player_statistics<R: LedgerReader>(
    reader: &R,
) -> Result<Vec<PlayerStatistics>, R::Error> {
    let snapshot = Snapshot::load(reader)?;

    let sessions_by_id: HashMap<&str, &Session> = snapshot
        .sessions
        .iter()
        .map(|s| (s.id.as_str(), s))
        .collect();

    let mut roster_by_player: HashMap<&str, BTreeSet<&str>> = HashMap::new();
    for (session_id, player_id) in &snapshot.rostered {
        if sessions_by_id.contains_key(session_id.as_str()) {
            roster_by_player
                .entry(player_id.as_str())
                .or_default()
                .insert(session_id.as_str());
        }
    }

    let mut stats: Vec<PlayerStatistics> = snapshot
        .players
        .iter()
        .map(|player| {
            let totals = snapshot.index.player(&player.id);

            let mut session_stats: Vec<SessionProfit> = roster_by_player
                .get(player.id.as_str())
                .into_iter()
                .flatten()
                .filter_map(|session_id| sessions_by_id.get(session_id))
                .map(|session| {
                    let profit = snapshot.index.session_player(&session.id, &player.id).profit;
                    SessionProfit {
                        session_id: session.id.clone(),
                        date: session.date,
                        profit,
                        outcome: Outcome::classify(profit),
                    }
                })
                .collect();
            session_stats.sort_by(|a, b| a.date.cmp(&b.date));

            let count_of =
                |outcome: Outcome| session_stats.iter().filter(|s| s.outcome == outcome).count();
            let winning_sessions = count_of(Outcome::Win);
            let losing_sessions = count_of(Outcome::Loss);
            let breakeven_sessions = count_of(Outcome::Breakeven);
            let sessions_count = session_stats.len();

            PlayerStatistics {
                player: player.to_ref(),
                total_buy_ins: totals.buy_ins,
                total_cash_outs: totals.cash_outs,
                profit: totals.profit,
                sessions_count,
                winning_sessions,
                losing_sessions,
                breakeven_sessions,
                win_rate: win_rate(winning_sessions, sessions_count),
                session_stats,
            }
        })
        .collect();

    stats.sort_by(|a, b| b.profit.cmp(&a.profit));
    Ok(stats)
}

/// `wins / sessions * 100`, or 0 when there are no sessions.
pub fn win_rate(winning_sessions: usize, sessions_count: usize) -> f64 {
    if sessions_count == 0 {
        return 0.0;
    }
    winning_sessions as f64 / sessions_count as f64 * 100.0
}

/// Dense session x player matrix: every session (newest first) with a
/// bankroll for every player in the system (by name), rostered or not.
pub fn compute_game_matrix<R: LedgerReader>(reader: &R) -> Result<Vec<GameRow>, R::Error> {
    let mut snapshot = Snapshot::load(reader)?;
    snapshot.sessions.sort_by(|a, b| b.date.cmp(&a.date));
    snapshot.players.sort_by(|a, b| a.name.cmp(&b.name));

    let rows = snapshot
        .sessions
        .iter()
        .map(|session| GameRow {
            session_id: session.id.clone(),
            date: session.date,
            description: session.description.clone(),
            players: snapshot
                .players
                .iter()
                .map(|player| snapshot.bankroll(&session.id, player))
                .collect(),
        })
        .collect();

    Ok(rows)
}

/// Bankroll table for one session, highest bankroll first.
///
/// Covers every rostered player (zeros when they have no entries yet) and
/// every player with entries on the session, rostered or not. Only that
/// session's roster and ledger entries are read.
pub fn compute_session_bankrolls<R: LedgerReader>(
    reader: &R,
    session_id: &str,
) -> Result<Vec<PlayerBankroll>, R::Error> {
    let roster = reader.list_session_roster(session_id)?;
    let buy_ins = reader.list_buy_ins(Some(session_id), None)?;
    let cash_outs = reader.list_cash_outs(Some(session_id), None)?;
    let index = LedgerIndex::build(buy_ins.iter().chain(cash_outs.iter()))?;

    let rostered: HashSet<&str> = roster.iter().map(|r| r.player_id.as_str()).collect();

    let mut table: Vec<PlayerBankroll> = reader
        .list_players()?
        .iter()
        .filter_map(|player| {
            let on_roster = rostered.contains(player.id.as_str());
            if !on_roster && !index.has_player(&player.id) {
                return None;
            }
            let totals = index.session_player(session_id, &player.id);
            Some(PlayerBankroll::new(player, on_roster, totals))
        })
        .collect();
    table.sort_by(|a, b| b.bankroll.cmp(&a.bankroll));

    Ok(table)
}
