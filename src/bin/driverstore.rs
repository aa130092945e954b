//! driverstore CLI
//!
//! Lists, filters and creates driver records in a repository file.
//! Results go to stdout as JSON; logs go to stderr.

use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use driverstore::record::DATE_FORMAT;
use driverstore::{Config, Driver, DriverRepository, FileDriverRepository, SyncStrategy};

/// driverstore CLI
#[derive(Parser, Debug)]
#[command(name = "driverstore")]
#[command(about = "Append-only record store for drivers")]
#[command(version)]
struct Args {
    /// Directory holding the repository file
    #[arg(short, long, default_value = ".")]
    data_dir: String,

    /// Repository file name
    #[arg(short, long, default_value = "drivers.txt")]
    file: String,

    /// fsync after every append
    #[arg(long)]
    sync_every_write: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List all drivers
    List,

    /// List drivers created strictly after a date
    ListAfter {
        /// Cutoff date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
    },

    /// Create and store a new driver
    Create {
        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        /// Date of birth (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        date_of_birth: NaiveDate,

        /// Creation date (YYYY-MM-DD), defaults to today
        #[arg(long, value_parser = parse_date)]
        creation_date: Option<NaiveDate>,
    },

    /// Check that ids strictly increase through the file
    Verify,
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| format!("invalid date {:?} (expected YYYY-MM-DD): {}", value, e))
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,driverstore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!("driverstore v{}", driverstore::VERSION);

    let sync_strategy = if args.sync_every_write {
        SyncStrategy::EveryWrite
    } else {
        SyncStrategy::OsBuffered
    };

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .repository_filename(&args.file)
        .sync_strategy(sync_strategy)
        .build();

    let repository = match FileDriverRepository::open(&config) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("Failed to open repository: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&repository, args.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(code = e.code(), "{}", e);
            if let Ok(json) = serde_json::to_string(&e.to_error_msg()) {
                eprintln!("{}", json);
            }
            if e.is_bad_input() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run(repository: &FileDriverRepository, command: Commands) -> driverstore::Result<()> {
    match command {
        Commands::List => print_json(&repository.find_all().await?),
        Commands::ListAfter { date } => print_json(&repository.find_created_after(date).await?),
        Commands::Create {
            first_name,
            last_name,
            date_of_birth,
            creation_date,
        } => {
            let mut driver = Driver::new(first_name, last_name, date_of_birth);
            if let Some(date) = creation_date {
                driver = driver.with_creation_date(date);
            }
            print_json(&repository.save(driver).await?)
        }
        Commands::Verify => {
            let report = repository.verify().await?;
            if !report.is_monotonic() {
                tracing::warn!(out_of_order = report.out_of_order, "ids are not strictly increasing");
            }
            print_json(&report)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> driverstore::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{}", json);
    Ok(())
}
