//! CLI administration tool for currency-rates.
//!
//! Inspects stored rates, flushes cached query results and performs a
//! one-off provider fetch without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Check database connection
//! cargo run --bin admin -- db check
//!
//! # Show observation counts per currency
//! cargo run --bin admin -- stats
//!
//! # Drop every cached currency query
//! cargo run --bin admin -- cache flush
//!
//! # Fetch the latest snapshot from the provider and print it (nothing is stored)
//! cargo run --bin admin -- fetch
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required for `db` and `stats`)
//! - `REDIS_URL` (required for `cache flush`)
//! - `CURRENCY_API_ENDPOINT`, `CURRENCY_API_KEY`, `CURRENCY_API_TIMEOUT` (for `fetch`)

use currency_rates::domain::provider::RatesProvider;
use currency_rates::domain::repositories::RateRepository;
use currency_rates::infrastructure::cache::{RedisCache, invalidate_rate_queries};
use currency_rates::infrastructure::persistence::PgRateRepository;
use currency_rates::infrastructure::provider::CurrencyApiClient;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// Provider timeout used when `CURRENCY_API_TIMEOUT` is unset.
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// CLI tool for managing currency-rates.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Show observation counts per currency
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },

    /// Cache operations
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Fetch the latest rates from the provider and print them
    Fetch,
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

/// Cache operation subcommands.
#[derive(Subcommand)]
enum CacheAction {
    /// Delete every cached currency query
    Flush {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Stats => handle_stats(&connect_database().await?).await?,
        Commands::Db { action } => handle_db_action(action, &connect_database().await?).await?,
        Commands::Cache { action } => handle_cache_action(action).await?,
        Commands::Fetch => handle_fetch().await?,
    }

    Ok(())
}

async fn connect_database() -> Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")
}

/// Displays per-currency statistics.
///
/// # Output Format
///
/// ```text
/// 📊 Statistics
///
///   Code       Observations  Latest
///   ─────────────────────────────────────────────
///   EUR        1440          2024-02-19 12:00
///   USD        1440          2024-02-19 12:00
///
///   Total: 2880
/// ```
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let repo = PgRateRepository::new(Arc::new(pool.clone()));

    let total = repo
        .count_observations()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to count observations: {}", e))?;

    let stats = repo
        .stats_by_code()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load statistics: {}", e))?;

    if stats.is_empty() {
        println!("{}", "  No observations stored yet".yellow());
        println!();
        return Ok(());
    }

    println!(
        "  {:<10} {:<13} {:<20}",
        "Code".bright_white().bold(),
        "Observations".bright_white().bold(),
        "Latest".bright_white().bold()
    );
    println!("  {}", "─".repeat(45).bright_black());

    for row in &stats {
        println!(
            "  {:<10} {:<13} {}",
            row.code.cyan(),
            row.observations.to_string(),
            row.latest_observed_at
                .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string())
                .bright_black()
        );
    }

    println!();
    println!("  Currencies: {}", stats.len().to_string().bright_white().bold());
    println!("  Total:      {}", total.to_string().bright_green().bold());
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("{}", "✅ Database connection OK".green().bold());
            println!("  PostgreSQL: {}", version.bright_white());
        }
    }

    Ok(())
}

/// Handles cache commands.
///
/// Flushing asks for confirmation (default: No) unless `--yes` is passed.
async fn handle_cache_action(action: CacheAction) -> Result<()> {
    match action {
        CacheAction::Flush { yes } => {
            let redis_url = std::env::var("REDIS_URL").context("REDIS_URL must be set")?;

            let cache = RedisCache::connect(&redis_url)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to Redis: {}", e))?;

            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt("Delete every cached currency query?")
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("{}", "❌ Cancelled".red());
                    return Ok(());
                }
            }

            let deleted = invalidate_rate_queries(&cache)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to flush cache: {}", e))?;

            println!(
                "{} {}",
                "✅ Cache flushed, entries deleted:".green().bold(),
                deleted.to_string().bright_white().bold()
            );
        }
    }

    Ok(())
}

/// Fetches the latest snapshot and prints it without persisting anything.
async fn handle_fetch() -> Result<()> {
    println!("{}", "🌐 Fetching latest rates...".bright_blue());
    println!();

    let timeout_secs = std::env::var("CURRENCY_API_TIMEOUT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS);

    let client = CurrencyApiClient::new(
        Duration::from_secs(timeout_secs),
        std::env::var("CURRENCY_API_ENDPOINT").ok(),
        std::env::var("CURRENCY_API_KEY").ok(),
    )?;

    let snapshot = client.fetch_latest().await?;

    println!(
        "  Provider updated: {}",
        snapshot.provider_updated_at.to_rfc3339().bright_white()
    );
    println!("  Currencies:       {}", snapshot.len().to_string().bright_white().bold());
    println!();

    for (code, value) in &snapshot.rates {
        println!("  {:<10} {}", code.cyan(), value);
    }
    println!();

    Ok(())
}
