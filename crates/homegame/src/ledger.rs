use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use homegame_core::{Amount, LedgerKind};
use homegame_db::Database;

use crate::display::{money, player_label, resolve_player, resolve_session};

#[derive(Subcommand, Debug)]
pub enum LedgerAction {
    /// Record chips bought by a player
    BuyIn {
        /// Session ID, or a date with exactly one session
        session: String,

        /// Player ID, name or nickname
        player: String,

        /// Amount, e.g. 50 or 12.50
        amount: Amount,
    },

    /// Record chips a player cashed out
    CashOut {
        /// Session ID, or a date with exactly one session
        session: String,

        /// Player ID, name or nickname
        player: String,

        /// Amount, e.g. 50 or 12.50
        amount: Amount,
    },

    /// List buy-ins and cash-outs, oldest first
    List {
        /// Only entries for this session (ID or date)
        #[arg(long)]
        session: Option<String>,

        /// Only entries for this player (ID, name or nickname)
        #[arg(long)]
        player: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a buy-in by ID
    RemoveBuyIn { id: String },

    /// Delete a cash-out by ID
    RemoveCashOut { id: String },
}

pub fn handle_ledger_command(db: &Database, action: LedgerAction) -> Result<()> {
    match action {
        LedgerAction::BuyIn {
            session,
            player,
            amount,
        } => record(db, LedgerKind::BuyIn, &session, &player, amount),
        LedgerAction::CashOut {
            session,
            player,
            amount,
        } => record(db, LedgerKind::CashOut, &session, &player, amount),
        LedgerAction::List {
            session,
            player,
            json,
        } => list(db, session.as_deref(), player.as_deref(), json),
        LedgerAction::RemoveBuyIn { id } => remove(db, LedgerKind::BuyIn, &id),
        LedgerAction::RemoveCashOut { id } => remove(db, LedgerKind::CashOut, &id),
    }
}

fn record(db: &Database, kind: LedgerKind, session: &str, player: &str, amount: Amount) -> Result<()> {
    let session = resolve_session(db, session)?;
    let player = resolve_player(db, player)?;

    let rostered = session.players.iter().any(|m| m.player.id == player.id);
    if !rostered {
        eprintln!(
            "{} {} is not on the roster for {}; recording anyway",
            "!".bright_yellow(),
            player.name,
            session.session.date
        );
    }

    let line = db.ledger().add(kind, &session.session.id, &player.id, amount)?;
    println!(
        "{} {} {} for {} on {} {}",
        "✓".bright_green(),
        kind,
        money(line.entry.amount).bold(),
        player_label(&line.player.name, line.player.nickname.as_deref()),
        session.session.date,
        format!("({})", line.entry.id).dimmed()
    );

    Ok(())
}

fn list(db: &Database, session: Option<&str>, player: Option<&str>, json: bool) -> Result<()> {
    let session_id = session
        .map(|key| resolve_session(db, key).map(|s| s.session.id))
        .transpose()?;
    let player_id = player
        .map(|key| resolve_player(db, key).map(|p| p.id))
        .transpose()?;

    let lines = db
        .ledger()
        .list(None, session_id.as_deref(), player_id.as_deref())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&lines)?);
        return Ok(());
    }
    if lines.is_empty() {
        println!("{}", "No ledger entries.".dimmed());
        return Ok(());
    }

    println!(
        "{:<17} {:<9} {:<28} {:>10}  {}",
        "RECORDED".dimmed(),
        "KIND".dimmed(),
        "PLAYER".dimmed(),
        "AMOUNT".dimmed(),
        "ID".dimmed(),
    );
    for line in &lines {
        let kind = match line.entry.kind {
            LedgerKind::BuyIn => line.entry.kind.as_str().bright_red(),
            LedgerKind::CashOut => line.entry.kind.as_str().bright_green(),
        };
        println!(
            "{:<17} {:<9} {:<28} {:>10}  {}",
            line.entry.created_at.format("%Y-%m-%d %H:%M").to_string(),
            kind,
            player_label(&line.player.name, line.player.nickname.as_deref()),
            money(line.entry.amount),
            line.entry.id
        );
    }

    Ok(())
}

fn remove(db: &Database, kind: LedgerKind, id: &str) -> Result<()> {
    if !db.ledger().delete(kind, id)? {
        anyhow::bail!("No {} with ID '{}'", kind, id);
    }
    println!("{} Removed {} {}", "✓".bright_green(), kind, id.dimmed());
    Ok(())
}
