// src/bin/hmac_migrate.rs
//! hmac-migrate: encrypt, decrypt or re-encrypt every HMAC secret key in place

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use hmac_secret_migrate::{
    load_config, ConsoleReporter, Direction, HmacEncrypter, IdentityType, Migrator, RunSummary,
    SqliteIdentityStore,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Encrypt/Decrypt secret keys of HMAC identities.
///
/// Encryption should only be run on existing raw secret keys. Runs are
/// idempotent: records already in the target state are skipped, so an
/// interrupted run can simply be started again.
#[derive(Parser, Debug)]
#[command(name = "hmac-migrate")]
#[command(version, about, long_about = None)]
struct Cli {
    /// encrypt: encrypt all raw secret keys | decrypt: decrypt all encrypted
    /// secret keys | reencrypt: re-encrypt secret keys with the current key
    action: String,

    /// Config file (default: $HMAC_MIGRATE_CONFIG or ./hmac-migrate.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Identity database path, overrides the config file
    #[arg(long)]
    db: Option<PathBuf>,

    /// Records fetched per page
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Exit with status 2 if any record failed
    #[arg(long)]
    strict: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hmac_secret_migrate=info,hmac_migrate=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(summary) if cli.strict && summary.has_failures() => ExitCode::from(2),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<RunSummary> {
    // Reject unknown actions before anything is opened
    let direction: Direction = cli.action.parse()?;

    let mut config =
        load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(db) = &cli.db {
        config.database.path = db.clone();
    }
    if let Some(chunk_size) = cli.chunk_size {
        config.migration.chunk_size = chunk_size;
    }
    config.validate()?;

    let cipher =
        HmacEncrypter::from_config(&config.encryption).context("Failed to set up encryption keys")?;
    let store = SqliteIdentityStore::open(&config.database).with_context(|| {
        format!(
            "Failed to open identity database {}: is HMAC_MIGRATE_DB_KEY set?",
            config.database.path.display()
        )
    })?;

    info!(
        %direction,
        records = store.count(IdentityType::HmacSha256)?,
        current_key = cipher.keyring().current_name(),
        "starting migration"
    );

    let migrator = Migrator::new(&store, &cipher).with_chunk_size(config.migration.chunk_size)?;
    let mut reporter = ConsoleReporter::stdio();
    let summary = migrator.run(direction, &mut reporter)?;

    println!("{summary}");
    Ok(summary)
}
