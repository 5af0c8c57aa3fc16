//! Terminal formatting and argument resolution shared by the commands.

use anyhow::Result;
use colored::{ColoredString, Colorize};
use rust_decimal::{Decimal, RoundingStrategy};

use homegame_core::{parse_session_date, Amount, Outcome, Player};
use homegame_db::{Database, SessionDetail};

/// Amounts are stored exactly and rounded only here.
pub fn money(amount: Amount) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}

/// Signed, colored amount: green for profit, red for loss.
pub fn signed(amount: Amount) -> ColoredString {
    if amount > Decimal::ZERO {
        format!("+{}", money(amount)).bright_green()
    } else if amount < Decimal::ZERO {
        money(amount).bright_red()
    } else {
        money(amount).dimmed()
    }
}

pub fn outcome(outcome: Outcome) -> ColoredString {
    match outcome {
        Outcome::Win => "win".bright_green(),
        Outcome::Loss => "loss".bright_red(),
        Outcome::Breakeven => "even".bright_yellow(),
    }
}

pub fn player_label(name: &str, nickname: Option<&str>) -> String {
    match nickname {
        Some(nickname) => format!("{} ({})", name, nickname),
        None => name.to_string(),
    }
}

pub fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() > max {
        let cut: String = value.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        value.to_string()
    }
}

/// Find a player by ID, or by a unique case-insensitive name or nickname.
pub fn resolve_player(db: &Database, key: &str) -> Result<Player> {
    let by_id = db.players().get(key)?;
    if let Some(player) = by_id {
        return Ok(player);
    }

    let needle = key.trim().to_lowercase();
    let mut matches: Vec<Player> = db
        .players()
        .list()?
        .into_iter()
        .filter(|p| {
            p.name.to_lowercase() == needle
                || p.nickname.as_deref().map(str::to_lowercase).as_deref() == Some(needle.as_str())
        })
        .collect();

    match matches.len() {
        0 => anyhow::bail!("No player matches '{}'", key),
        1 => Ok(matches.remove(0)),
        n => anyhow::bail!("'{}' matches {} players; use the player ID", key, n),
    }
}

/// Find a session by ID, or by date when exactly one session falls on it.
pub fn resolve_session(db: &Database, key: &str) -> Result<SessionDetail> {
    let by_id = db.sessions().get(key)?;
    if let Some(session) = by_id {
        return Ok(session);
    }

    let Ok(date) = parse_session_date(key) else {
        anyhow::bail!("No session with ID '{}'", key);
    };

    let mut matches: Vec<SessionDetail> = db
        .sessions()
        .list()?
        .into_iter()
        .filter(|s| s.session.date == date)
        .collect();

    match matches.len() {
        0 => anyhow::bail!("No session on {}", date),
        1 => Ok(matches.remove(0)),
        n => anyhow::bail!("{} sessions on {}; use the session ID", n, date),
    }
}
