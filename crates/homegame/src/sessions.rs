use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use homegame_db::{Database, LedgerLine, NewSession, SessionDetail, SessionUpdate};

use crate::display::{money, player_label, resolve_player, resolve_session, signed, truncate};

#[derive(Subcommand, Debug)]
pub enum SessionsAction {
    /// List all sessions, newest first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show roster, ledger and bankrolls for a session
    Show {
        /// Session ID, or a date with exactly one session
        session: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a session
    Create {
        /// Date (YYYY-MM-DD)
        date: String,

        /// Player ID, name or nickname (repeat for each player)
        #[arg(short, long = "player", required = true)]
        players: Vec<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Edit a session; any --player replaces the whole roster
    Edit {
        /// Session ID, or a date with exactly one session
        session: String,

        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// New description (empty string clears it)
        #[arg(long)]
        description: Option<String>,

        /// Player ID, name or nickname (repeat for each player)
        #[arg(short, long = "player")]
        players: Vec<String>,
    },

    /// Remove a session with its roster, buy-ins and cash-outs
    Remove {
        /// Session ID, or a date with exactly one session
        session: String,
    },
}

pub fn handle_sessions_command(db: &Database, action: SessionsAction) -> Result<()> {
    match action {
        SessionsAction::List { json } => {
            let sessions = db.sessions().list()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&sessions)?);
            } else if sessions.is_empty() {
                println!("{}", "No sessions yet.".dimmed());
            } else {
                print_sessions_table(&sessions);
            }
        }
        SessionsAction::Show { session, json } => {
            let detail = resolve_session(db, &session)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&detail)?);
            } else {
                print_session_detail(&detail);
            }
        }
        SessionsAction::Create {
            date,
            players,
            description,
        } => {
            let player_ids = resolve_players(db, &players)?;
            let detail = db.sessions().create(&NewSession {
                date,
                description,
                player_ids,
            })?;
            println!(
                "{} Created session on {} with {} player(s) {}",
                "✓".bright_green(),
                detail.session.date.to_string().bold(),
                detail.players.len(),
                format!("({})", detail.session.id).dimmed()
            );
        }
        SessionsAction::Edit {
            session,
            date,
            description,
            players,
        } => {
            let current = resolve_session(db, &session)?;
            let player_ids = if players.is_empty() {
                None
            } else {
                Some(resolve_players(db, &players)?)
            };
            let update = SessionUpdate {
                date: date.unwrap_or_else(|| current.session.date.to_string()),
                description: description.or(current.session.description),
                player_ids,
            };
            let detail = db.sessions().update(&current.session.id, &update)?;
            println!(
                "{} Updated session on {}",
                "✓".bright_green(),
                detail.session.date.to_string().bold()
            );
        }
        SessionsAction::Remove { session } => {
            let detail = resolve_session(db, &session)?;
            db.sessions().delete(&detail.session.id)?;
            println!(
                "{} Removed session on {}",
                "✓".bright_green(),
                detail.session.date.to_string().bold()
            );
        }
    }

    Ok(())
}

fn resolve_players(db: &Database, keys: &[String]) -> Result<Vec<String>> {
    keys.iter()
        .map(|key| resolve_player(db, key).map(|p| p.id))
        .collect()
}

fn print_sessions_table(sessions: &[SessionDetail]) {
    println!(
        "{:<12} {:<38} {:<8} {:<12} {}",
        "DATE".dimmed(),
        "ID".dimmed(),
        "PLAYERS".dimmed(),
        "POT".dimmed(),
        "DESCRIPTION".dimmed(),
    );

    for s in sessions {
        let pot: homegame_core::Amount = s.buy_ins.iter().map(|l| l.entry.amount).sum();
        println!(
            "{:<12} {:<38} {:<8} {:<12} {}",
            s.session.date.format("%Y-%m-%d").to_string(),
            s.session.id,
            s.players.len(),
            money(pot),
            truncate(s.session.description.as_deref().unwrap_or(""), 40)
        );
    }
}

fn print_session_detail(detail: &SessionDetail) {
    println!("{}", "=== Session ===".bright_blue().bold());
    println!("{}  {}", "ID:".dimmed(), detail.session.id);
    println!("{}  {}", "Date:".dimmed(), detail.session.date.format("%Y-%m-%d"));
    if let Some(ref description) = detail.session.description {
        println!("{}  {}", "Description:".dimmed(), description);
    }

    println!();
    println!(
        "{}",
        format!("--- Bankrolls ({}) ---", detail.bankrolls.len()).dimmed()
    );
    if detail.bankrolls.is_empty() {
        println!("  {}", "No players.".dimmed());
    }
    for b in &detail.bankrolls {
        let note = if b.rostered { "" } else { " (not rostered)" };
        println!(
            "  {:<28} in {:>10}  out {:>10}  {}{}",
            player_label(&b.player_name, b.player_nickname.as_deref()),
            money(b.buy_ins),
            money(b.cash_outs),
            signed(b.bankroll),
            note.yellow()
        );
    }

    print_ledger_lines("Buy-ins", &detail.buy_ins);
    print_ledger_lines("Cash-outs", &detail.cash_outs);
}

fn print_ledger_lines(title: &str, lines: &[LedgerLine]) {
    if lines.is_empty() {
        return;
    }

    println!();
    println!("{}", format!("--- {} ({}) ---", title, lines.len()).dimmed());
    for line in lines {
        println!(
            "  {}  {:<28} {:>10}  {}",
            line.entry.created_at.format("%H:%M"),
            player_label(&line.player.name, line.player.nickname.as_deref()),
            money(line.entry.amount),
            line.entry.id.dimmed()
        );
    }
}
