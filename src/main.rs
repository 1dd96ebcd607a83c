//! evallog - offline logbook for perception-model evaluations
//!
//! Records manual evaluation sessions (ground-truth, true-positive and
//! prediction counts), derives accuracy metrics, and keeps everything in a
//! local file-backed store with JSON backup/restore and CSV export.
//!
//! # Environment Variables
//! - `EVALLOG_COUNTER_MODE` - 'predicted' or 'false-positives' (default: predicted)
//! - `EVALLOG_DATA_DIR` - storage directory (default: ~/.evallog)
//! - `EVALLOG_OWNER` - owner tag for records created here (default: local)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use evallog::application::csv_export;
use evallog::application::snapshot::SnapshotService;
use evallog::application::store::EvaluationStore;
use evallog::application::users::UserDirectory;
use evallog::config::Config;
use evallog::domain::metrics;
use evallog::domain::types::RecordDraft;
use evallog::infrastructure::storage::FileStorage;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about = "Offline logbook for perception-model evaluations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate counters, derive metrics and save a new evaluation record
    Add {
        /// Model name or version under evaluation
        #[arg(short, long)]
        model: String,

        /// Test scenario label
        #[arg(short, long, default_value = "")]
        scenario: String,

        /// Model confidence score
        #[arg(short, long, default_value = "")]
        confidence: String,

        /// Ground-truth object count
        #[arg(long)]
        gt: String,

        /// True-positive count
        #[arg(long)]
        tp: String,

        /// Total predictions, or false positives in false-positives mode
        #[arg(long)]
        secondary: String,
    },

    /// List stored records, most recent first
    List {
        /// Show records for every owner, not just the configured one
        #[arg(long)]
        all_owners: bool,
    },

    /// Delete one record by id
    Delete { id: i64 },

    /// Remove all records belonging to the configured owner
    Clear,

    /// Write the full store (records and users) to a snapshot file
    Backup { path: String },

    /// Replace the full store with a snapshot file's contents
    Restore { path: String },

    /// Export all records as CSV
    ExportCsv { path: String },

    /// Register a user account
    AddUser {
        username: String,

        #[arg(long)]
        email: Option<String>,
    },

    /// List registered accounts
    Users,
}

/// Boundary coercion: empty or unparseable numeric input becomes 0 before
/// it ever reaches the validation gate.
fn parse_counter(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or(0)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with(stdout_layer)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let storage = Arc::new(FileStorage::new(&config.data_dir).await?);
    let store = EvaluationStore::new(storage.clone(), config.counter_mode);

    match cli.command {
        Commands::Add {
            model,
            scenario,
            confidence,
            gt,
            tp,
            secondary,
        } => {
            let gt = parse_counter(&gt);
            let tp = parse_counter(&tp);
            let secondary = parse_counter(&secondary);

            if let Err(err) = metrics::validate(config.counter_mode, gt, tp, secondary) {
                eprintln!("Rejected: {err}");
                std::process::exit(1);
            }

            let record = store
                .insert(RecordDraft {
                    owner_id: config.owner.clone(),
                    model_name: model,
                    confidence: confidence.trim().parse().unwrap_or(0.0),
                    scenario,
                    gt_total: gt,
                    tp,
                    secondary,
                })
                .await?;

            println!(
                "Saved record {} (precision {:.4}, recall {:.4}, F1 {:.4}, FAR {:.4})",
                record.id, record.precision, record.recall, record.f1_score, record.far
            );
        }

        Commands::List { all_owners } => {
            let owner = if all_owners {
                None
            } else {
                Some(config.owner.as_str())
            };
            let records = store.get_all(owner).await?;

            if records.is_empty() {
                println!("No records.");
            }
            for r in &records {
                println!(
                    "{:>14}  {}  {:<24} {:<16} GT={} TP={} FP={} FN={}  P={:.4} R={:.4} F1={:.4} FAR={:.4}",
                    r.id,
                    r.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    r.model_name,
                    r.scenario,
                    r.gt_total,
                    r.tp,
                    r.false_positives,
                    r.false_negatives,
                    r.precision,
                    r.recall,
                    r.f1_score,
                    r.far
                );
            }
        }

        Commands::Delete { id } => {
            if store.delete(id).await? {
                println!("Deleted record {id}.");
            } else {
                println!("No record with id {id}.");
            }
        }

        Commands::Clear => {
            let removed = store.clear_all(&config.owner).await?;
            println!("Removed {removed} record(s) for '{}'.", config.owner);
        }

        Commands::Backup { path } => {
            let snapshot = SnapshotService::new(storage.clone()).export().await?;
            let json =
                serde_json::to_string_pretty(&snapshot).context("Failed to serialize snapshot")?;
            tokio::fs::write(&path, json)
                .await
                .with_context(|| format!("Failed to write {path}"))?;
            println!(
                "Backed up {} record(s) and {} user(s) to {path}.",
                snapshot.records.len(),
                snapshot.users.len()
            );
        }

        Commands::Restore { path } => {
            let json = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {path}"))?;

            match SnapshotService::new(storage.clone()).import(&json).await {
                Ok(snapshot) => println!(
                    "Restored {} record(s) and {} user(s).",
                    snapshot.records.len(),
                    snapshot.users.len()
                ),
                Err(err) => {
                    eprintln!("Restore failed: {err}");
                    std::process::exit(1);
                }
            }
        }

        Commands::ExportCsv { path } => {
            let records = store.get_all(None).await?;
            let file = std::fs::File::create(&path)
                .with_context(|| format!("Failed to create {path}"))?;
            csv_export::write_csv(&records, file)?;
            println!("Exported {} record(s) to {path}.", records.len());
        }

        Commands::AddUser { username, email } => {
            let user = UserDirectory::new(storage.clone())
                .register(&username, email.as_deref())
                .await?;
            println!("Registered '{}' ({}).", user.username, user.id);
        }

        Commands::Users => {
            let users = UserDirectory::new(storage.clone()).list().await?;
            if users.is_empty() {
                println!("No registered users.");
            }
            for u in &users {
                println!(
                    "{}  {:<20} {}",
                    u.id,
                    u.username,
                    u.email.as_deref().unwrap_or("-")
                );
            }
        }
    }

    Ok(())
}
