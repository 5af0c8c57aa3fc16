//! Runs the HTTP API until Ctrl+C.

use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::{info, warn};

use homegame_db::Database;

use crate::api::{self, Credentials};

pub struct ServeOptions {
    pub bind: String,
    pub port: u16,
    pub credentials: Option<Credentials>,
}

pub async fn serve(db: Arc<Database>, options: ServeOptions) -> Result<()> {
    if options.credentials.is_none() {
        warn!("No [auth] credentials configured; the API is open to anyone who can reach it");
    }

    let router = api::create_router(db, options.credentials);

    let addr = format!("{}:{}", options.bind, options.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind API server to {}", addr))?;

    info!(%addr, "API server listening");
    eprintln!();
    eprintln!(
        "  {} {}",
        "->".bright_green(),
        format!("Serving http://{}", addr).bold()
    );
    eprintln!("  {} Press {} to stop", "->".dimmed(), "Ctrl+C".bold());
    eprintln!();

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    eprintln!("\nShutting down...");
}
