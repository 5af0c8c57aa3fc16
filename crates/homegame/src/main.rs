use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

use homegame::config::Config;
use homegame::server::{self, ServeOptions};
use homegame_db::Database;
use homegame_logging::{init_tracing, LogFormat};

mod display;
mod ledger;
mod players;
mod reports;
mod sessions;

use ledger::LedgerAction;
use players::PlayersAction;
use reports::BestComboAction;
use sessions::SessionsAction;

#[derive(Parser, Debug)]
#[command(
    name = "homegame",
    about = "Bankroll and statistics tracker for home poker games",
    version,
    author
)]
struct Cli {
    /// Path to homegame.toml (default: ./homegame.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the SQLite database
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormatChoice>,

    /// Log level filter, e.g. "debug" or "homegame_db=trace" (RUST_LOG wins)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to bind
        #[arg(long)]
        bind: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage players
    Players {
        #[command(subcommand)]
        action: PlayersAction,
    },

    /// Manage sessions and their rosters
    Sessions {
        #[command(subcommand)]
        action: SessionsAction,
    },

    /// Record and remove buy-ins and cash-outs
    Ledger {
        #[command(subcommand)]
        action: LedgerAction,
    },

    /// Per-player leaderboard
    Stats {
        /// Show each player's session results
        #[arg(short, long)]
        verbose: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Bankroll matrix: one row per session, one column per player
    Games {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Biggest cash-outs, biggest buy-ins and the best combo holder
    Achievements {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Award or clear the best combo
    BestCombo {
        #[command(subcommand)]
        action: BestComboAction,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let working_dir = std::env::current_dir().context("Failed to get current directory")?;
    let config = Config::resolve(cli.config.as_deref(), &working_dir)?;

    // Commands print to stdout; keep their logs quiet unless asked.
    let fallback_level = match cli.command {
        Commands::Serve { .. } => "info",
        _ => "warn",
    };
    let level = config
        .logging
        .level(cli.log_level.as_deref(), fallback_level);
    let format = config.logging.format(cli.log_format.map(Into::into));
    let _guard = init_tracing(&level, format, config.logging.dir.as_deref())
        .context("Failed to initialize logging")?;

    let db_path = config.database.path(cli.db.as_deref());
    debug!(path = %db_path.display(), "Opening database");
    let db = Database::open_at(&db_path)
        .with_context(|| format!("Failed to open database at {}", db_path.display()))?;

    match cli.command {
        Commands::Serve { bind, port } => {
            let options = ServeOptions {
                bind: config.server.bind(bind.as_deref()),
                port: config.server.port(port),
                credentials: config.auth.credentials(),
            };
            server::serve(Arc::new(db), options).await
        }
        Commands::Players { action } => players::handle_players_command(&db, action),
        Commands::Sessions { action } => sessions::handle_sessions_command(&db, action),
        Commands::Ledger { action } => ledger::handle_ledger_command(&db, action),
        Commands::Stats { verbose, json } => reports::handle_stats_command(&db, json, verbose),
        Commands::Games { json } => reports::handle_games_command(&db, json),
        Commands::Achievements { json } => reports::handle_achievements_command(&db, json),
        Commands::BestCombo { action } => reports::handle_best_combo_command(&db, action),
    }
}
