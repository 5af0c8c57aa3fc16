use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use homegame_core::{Achievements, GameRow, PlayerStatistics};
use homegame_db::Database;

use crate::display::{money, outcome, player_label, resolve_player, signed, truncate};

#[derive(Subcommand, Debug)]
pub enum BestComboAction {
    /// Award the best combo (takes it from the current holder)
    Set {
        /// Player ID, name or nickname
        player: String,
    },

    /// Take the best combo away from a player
    Clear {
        /// Player ID, name or nickname
        player: String,
    },
}

pub fn handle_stats_command(db: &Database, json: bool, verbose: bool) -> Result<()> {
    let stats = db.player_statistics()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else if stats.is_empty() {
        println!("{}", "No players yet.".dimmed());
    } else {
        print_leaderboard(&stats, verbose);
    }

    Ok(())
}

pub fn handle_games_command(db: &Database, json: bool) -> Result<()> {
    let games = db.game_matrix()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&games)?);
    } else if games.is_empty() {
        println!("{}", "No sessions yet.".dimmed());
    } else {
        print_game_matrix(&games);
    }

    Ok(())
}

pub fn handle_achievements_command(db: &Database, json: bool) -> Result<()> {
    let achievements = db.achievements_report()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&achievements)?);
    } else {
        print_achievements(&achievements);
    }

    Ok(())
}

pub fn handle_best_combo_command(db: &Database, action: BestComboAction) -> Result<()> {
    match action {
        BestComboAction::Set { player } => {
            let player = resolve_player(db, &player)?;
            let player = db.achievements().set_best_combo(&player.id)?;
            println!(
                "{} Best combo awarded to {}",
                "★".bright_yellow(),
                player.name.bold()
            );
        }
        BestComboAction::Clear { player } => {
            let player = resolve_player(db, &player)?;
            let player = db.achievements().clear_best_combo(&player.id)?;
            println!("{} Best combo cleared for {}", "✓".bright_green(), player.name.bold());
        }
    }

    Ok(())
}

fn print_leaderboard(stats: &[PlayerStatistics], verbose: bool) {
    println!("{}", "=== Leaderboard ===".bright_blue().bold());
    println!(
        "{:<4} {:<28} {:>8} {:>12} {:>7} {:>12} {:>12} {:>12}",
        "#".dimmed(),
        "PLAYER".dimmed(),
        "SESSIONS".dimmed(),
        "W/L/E".dimmed(),
        "WIN %".dimmed(),
        "BUY-INS".dimmed(),
        "CASH-OUTS".dimmed(),
        "PROFIT".dimmed(),
    );

    for (rank, s) in stats.iter().enumerate() {
        let record = format!(
            "{}/{}/{}",
            s.winning_sessions, s.losing_sessions, s.breakeven_sessions
        );
        println!(
            "{:<4} {:<28} {:>8} {:>12} {:>6.1}% {:>12} {:>12} {:>12}",
            rank + 1,
            truncate(&player_label(&s.player.name, s.player.nickname.as_deref()), 28),
            s.sessions_count,
            record,
            s.win_rate,
            money(s.total_buy_ins),
            money(s.total_cash_outs),
            signed(s.profit)
        );

        if verbose {
            for session in &s.session_stats {
                println!(
                    "     {}  {:<5} {}",
                    session.date.format("%Y-%m-%d").to_string().dimmed(),
                    outcome(session.outcome),
                    signed(session.profit)
                );
            }
        }
    }
}

fn print_game_matrix(games: &[GameRow]) {
    // Every row carries the same players in the same order.
    let Some(first) = games.first() else {
        return;
    };
    let width = 12;

    print!("{:<12}", "DATE".dimmed());
    for p in &first.players {
        print!(" {:>width$}", truncate(&p.player_name, width).dimmed(), width = width);
    }
    println!();

    for game in games {
        print!("{:<12}", game.date.format("%Y-%m-%d").to_string());
        for p in &game.players {
            if p.rostered || !p.bankroll.is_zero() || !p.buy_ins.is_zero() {
                print!(" {:>width$}", signed(p.bankroll), width = width);
            } else {
                print!(" {:>width$}", "-".dimmed(), width = width);
            }
        }
        println!();
    }
}

fn print_achievements(achievements: &Achievements) {
    println!("{}", "=== Achievements ===".bright_blue().bold());

    match &achievements.top_cash_out_player {
        Some(top) => println!(
            "{}  {} ({})",
            "Biggest cash-outs:".dimmed(),
            player_label(&top.player.name, top.player.nickname.as_deref()).bold(),
            money(top.total)
        ),
        None => println!("{}  {}", "Biggest cash-outs:".dimmed(), "-".dimmed()),
    }

    match &achievements.top_buy_in_player {
        Some(top) => println!(
            "{}  {} ({})",
            "Biggest buy-ins:".dimmed(),
            player_label(&top.player.name, top.player.nickname.as_deref()).bold(),
            money(top.total)
        ),
        None => println!("{}  {}", "Biggest buy-ins:".dimmed(), "-".dimmed()),
    }

    match &achievements.best_combo_player {
        Some(player) => println!(
            "{}  {} {}",
            "Best combo:".dimmed(),
            player_label(&player.name, player.nickname.as_deref()).bold(),
            "★".bright_yellow()
        ),
        None => println!("{}  {}", "Best combo:".dimmed(), "-".dimmed()),
    }
}
