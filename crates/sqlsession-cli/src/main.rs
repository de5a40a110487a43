//! sqlsession - maintenance CLI for SQL-backed session tables.
//!
//! Opens an existing SQLite database and drives the session store's
//! lifecycle operations, typically `gc` from a cron job.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Inspect and maintain a SQL session table
#[derive(Parser)]
#[command(name = "sqlsession")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file with a [store] section and optional database path
    #[arg(long, global = true, env = "SQLSESSION_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite database file (must already contain the session table)
    #[arg(long, global = true, env = "SQLSESSION_DATABASE")]
    pub database: Option<PathBuf>,

    /// Session table name (overrides the config file)
    #[arg(long, global = true)]
    pub table: Option<String>,

    /// Probability of clearing superseded rows on write (overrides the config file)
    #[arg(long, global = true)]
    pub cleanup_rate: Option<f64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the current payload for a session
    Read(commands::ReadArgs),

    /// Store a payload for a session
    Write(commands::WriteArgs),

    /// Delete every stored payload for a session
    Destroy(commands::DestroyArgs),

    /// Delete payloads older than the given lifetime
    Gc(commands::GcArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries session payloads.
    use tracing_subscriber::prelude::*;
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("sqlsession=debug,sqlsession_cli=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .init();

    let ctx = commands::Context::resolve(&cli)?;

    match cli.command {
        Commands::Read(args) => commands::read(args, &ctx),
        Commands::Write(args) => commands::write(args, &ctx),
        Commands::Destroy(args) => commands::destroy(args, &ctx),
        Commands::Gc(args) => commands::gc(args, &ctx),
    }
}
