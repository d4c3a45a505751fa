//! Importer - bulk-loads a dispatch spreadsheet from disk
//!
//! Runs the same ingestion pipeline as the upload API, for operator-driven
//! backfills that never touch HTTP.
//!
//! Usage:
//!   # Best-effort multi-sheet import:
//!   cargo run --bin importer -- --file bookings.xlsx --actor ops@example.com
//!
//!   # All-or-nothing import of a full-layout export:
//!   cargo run --bin importer -- --file records.csv --mode strict --actor ops
//!
//!   # Parse and validate without writing anything:
//!   cargo run --bin importer -- --file bookings.xlsx --actor ops --dry-run

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ingest::{IngestMode, IngestionResult, MemoryStore, PgRecordStore};
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;
use tokio::fs;

#[derive(Parser, Debug)]
#[command(name = "importer", about = "Bulk-loads dispatch records from a spreadsheet")]
struct Args {
    /// Path to the .csv/.xlsx/.xls file
    #[arg(long)]
    file: PathBuf,

    /// Upload policy: strict rejects the whole file on any bad row, smart
    /// saves every row it can
    #[arg(long, value_enum, default_value = "smart")]
    mode: Mode,

    /// Actor recorded as createdBy on every committed record
    #[arg(long)]
    actor: String,

    /// Dry run - parse and validate but don't save to database
    #[arg(long, default_value = "false")]
    dry_run: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Strict,
    Smart,
}

impl From<Mode> for IngestMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Strict => IngestMode::Strict,
            Mode::Smart => IngestMode::Smart,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();
    let args = Args::parse();

    let filename = args
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .context("file path has no filename")?
        .to_string();
    let bytes = fs::read(&args.file)
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    println!("=== Dispatch Importer ===");
    println!("File: {}", args.file.display());
    println!("Mode: {:?}", args.mode);
    println!("Run:  {}", if args.dry_run { "dry-run" } else { "live" });

    let result = if args.dry_run {
        let store = MemoryStore::new();
        ingest::ingest(&filename, &bytes, args.mode.into(), &args.actor, &store).await?
    } else {
        let db_url = std::env::var("DB_URL").context("DB_URL env var missing")?;
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await
            .context("Failed to connect to database")?;
        PgRecordStore::ensure_schema(&pool).await?;
        let store = PgRecordStore::new(pool);
        ingest::ingest(&filename, &bytes, args.mode.into(), &args.actor, &store).await?
    };

    print_summary(&result, args.dry_run);
    Ok(())
}

fn print_summary(result: &IngestionResult, dry_run: bool) {
    println!("\n=== Import Complete ===");
    if dry_run {
        println!("(dry run - nothing was written)");
    }
    println!("Saved:  {}", result.success);
    println!("Failed: {}", result.failed);
    if !result.sheets_processed.is_empty() {
        println!("Sheets: {}", result.sheets_processed.join(", "));
    }
    if !result.errors.is_empty() {
        println!("Errors ({}):", result.errors.len());
        for (i, err) in result.errors.iter().take(5).enumerate() {
            println!("  [{}] {}", i + 1, err);
        }
        if result.errors.len() > 5 {
            println!("  ... and {} more", result.errors.len() - 5);
        }
    }
}
