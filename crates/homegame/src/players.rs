use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use homegame_core::Player;
use homegame_db::{Database, NewPlayer, PlayerUpdate, PlayerWithSessions};

use crate::display::{resolve_player, truncate};

#[derive(Subcommand, Debug)]
pub enum PlayersAction {
    /// List all players
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Register a player
    Add {
        /// Display name
        name: String,

        #[arg(long)]
        nickname: Option<String>,

        #[arg(long)]
        emoji: Option<String>,
    },

    /// Show a player and the sessions they played
    Show {
        /// Player ID, name or nickname
        player: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit a player (pass an empty string to clear nickname or emoji)
    Edit {
        /// Player ID, name or nickname
        player: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        nickname: Option<String>,

        #[arg(long)]
        emoji: Option<String>,
    },

    /// Remove a player with their roster entries, buy-ins and cash-outs
    Remove {
        /// Player ID, name or nickname
        player: String,
    },
}

pub fn handle_players_command(db: &Database, action: PlayersAction) -> Result<()> {
    match action {
        PlayersAction::List { json } => {
            let players = db.players().list()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&players)?);
            } else if players.is_empty() {
                println!("{}", "No players yet.".dimmed());
            } else {
                print_players_table(&players);
            }
        }
        PlayersAction::Add {
            name,
            nickname,
            emoji,
        } => {
            let player = db.players().create(&NewPlayer {
                name,
                nickname,
                emoji,
            })?;
            println!(
                "{} Added {} {}",
                "✓".bright_green(),
                player.name.bold(),
                format!("({})", player.id).dimmed()
            );
        }
        PlayersAction::Show { player, json } => {
            let player = resolve_player(db, &player)?;
            let detail = db
                .players()
                .get_with_sessions(&player.id)?
                .ok_or_else(|| anyhow::anyhow!("Player not found: {}", player.id))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&detail)?);
            } else {
                print_player_detail(&detail);
            }
        }
        PlayersAction::Edit {
            player,
            name,
            nickname,
            emoji,
        } => {
            let current = resolve_player(db, &player)?;
            let update = PlayerUpdate {
                name: name.unwrap_or(current.name),
                nickname: nickname.or(current.nickname),
                emoji: emoji.or(current.emoji),
            };
            let player = db.players().update(&current.id, &update)?;
            println!("{} Updated {}", "✓".bright_green(), player.name.bold());
        }
        PlayersAction::Remove { player } => {
            let player = resolve_player(db, &player)?;
            db.players().delete(&player.id)?;
            println!("{} Removed {}", "✓".bright_green(), player.name.bold());
        }
    }

    Ok(())
}

fn print_players_table(players: &[Player]) {
    println!(
        "{:<38} {:<20} {:<16} {:<6} {}",
        "ID".dimmed(),
        "NAME".dimmed(),
        "NICKNAME".dimmed(),
        "EMOJI".dimmed(),
        "BEST COMBO".dimmed(),
    );

    for p in players {
        println!(
            "{:<38} {:<20} {:<16} {:<6} {}",
            p.id,
            truncate(&p.name, 20),
            truncate(p.nickname.as_deref().unwrap_or("-"), 16),
            p.emoji.as_deref().unwrap_or(""),
            if p.has_best_combo {
                "★".bright_yellow().to_string()
            } else {
                String::new()
            }
        );
    }
}

fn print_player_detail(detail: &PlayerWithSessions) {
    let p = &detail.player;
    println!("{}", "=== Player ===".bright_blue().bold());
    println!("{}  {}", "ID:".dimmed(), p.id);
    println!("{}  {}", "Name:".dimmed(), p.name);
    if let Some(ref nickname) = p.nickname {
        println!("{}  {}", "Nickname:".dimmed(), nickname);
    }
    if let Some(ref emoji) = p.emoji {
        println!("{}  {}", "Emoji:".dimmed(), emoji);
    }
    if p.has_best_combo {
        println!("{}  {}", "Best combo:".dimmed(), "★".bright_yellow());
    }
    println!(
        "{}  {}",
        "Since:".dimmed(),
        p.created_at.format("%Y-%m-%d")
    );

    println!();
    if detail.sessions.is_empty() {
        println!("{}", "Not on any session roster.".dimmed());
        return;
    }

    println!(
        "{}",
        format!("--- Sessions ({}) ---", detail.sessions.len()).dimmed()
    );
    for s in &detail.sessions {
        println!(
            "  {}  {}",
            s.date.format("%Y-%m-%d").to_string().bright_blue(),
            s.description.as_deref().unwrap_or("")
        );
    }
}
