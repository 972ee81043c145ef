//! # Swapmart Admin
//!
//! Database maintenance for a Swapmart deployment.
//!
//! ## Usage
//! ```bash
//! # Apply pending migrations
//! cargo run -p swapmart-engine --bin swapmart-admin -- migrate
//!
//! # Show migration state and row counts
//! cargo run -p swapmart-engine --bin swapmart-admin -- status
//!
//! # Point at another database (overrides DATABASE_PATH)
//! cargo run -p swapmart-engine --bin swapmart-admin -- status --db ./data/swapmart.db
//! ```
//!
//! Configuration comes from the environment and a local `.env` file.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context};
use swapmart_db::migrations::migration_status;
use swapmart_db::Database;
use swapmart_engine::telemetry::init_tracing;
use swapmart_engine::MarketConfig;
use tracing::info;

const HELP: &str = "\
Swapmart Admin

Usage: swapmart-admin <COMMAND> [OPTIONS]

Commands:
  migrate            Apply pending migrations
  status             Show migration status and table counts

Options:
  -d, --db <PATH>    Database file path (default: $DATABASE_PATH or ./swapmart.db)
  -h, --help         Show this help message";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Migrate,
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let mut config = MarketConfig::load().context("loading configuration")?;
    if let Err(e) = init_tracing(&config.log_filter) {
        eprintln!("tracing already initialized: {e}");
    }

    let args: Vec<String> = env::args().skip(1).collect();
    let mut command = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "migrate" => command = Some(Command::Migrate),
            "status" => command = Some(Command::Status),
            "--db" | "-d" => {
                let Some(path) = args.get(i + 1) else {
                    bail!("--db requires a path");
                };
                config.database_path = PathBuf::from(path);
                i += 1;
            }
            "--help" | "-h" => {
                println!("{HELP}");
                return Ok(());
            }
            other => bail!("unknown argument: {other}\n\n{HELP}"),
        }
        i += 1;
    }

    let Some(command) = command else {
        println!("{HELP}");
        return Ok(());
    };

    let db_config = config.db_config().run_migrations(command == Command::Migrate);
    let db = Database::new(db_config)
        .await
        .with_context(|| format!("opening {}", config.database_path.display()))?;

    match command {
        Command::Migrate => {
            let status = migration_status(db.pool()).await?;
            info!(applied = status.applied, total = status.total, "Migrations up to date");
            println!("✓ {} of {} migrations applied", status.applied, status.total);
        }
        Command::Status => {
            let status = migration_status(db.pool()).await?;
            println!("Database:   {}", config.database_path.display());
            println!(
                "Migrations: {}/{}{}",
                status.applied,
                status.total,
                if status.is_up_to_date() { "" } else { " (pending, run `migrate`)" }
            );

            if status.is_up_to_date() {
                let counts = db.table_counts().await?;
                println!();
                println!("users           {:>8}", counts.users);
                println!("categories      {:>8}", counts.categories);
                println!("items           {:>8}", counts.items);
                println!("swap_requests   {:>8}", counts.swap_requests);
                println!("ledger_entries  {:>8}", counts.ledger_entries);
            }
        }
    }

    db.close().await;
    Ok(())
}
