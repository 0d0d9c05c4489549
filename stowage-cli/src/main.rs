//! Stowage command-line tool
//!
//! Inspects and edits a container store from the shell. Every command prints
//! its result as pretty JSON on stdout.
//!
//! Usage:
//!   stowage --db catalog.db service s3 S3
//!   stowage --db catalog.db create request.json
//!   stowage --db catalog.db history s3.bucket

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use stowage_cli::{CliConfig, open_repository};
use stowage_types::TimeRange;
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "stowage")]
#[command(about = "Container catalog store")]
struct Args {
    /// Database file; overrides the config
    #[arg(long)]
    db: Option<PathBuf>,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// User recorded on writes
    #[arg(short, long, default_value = "admin")]
    user: String,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a storage service
    Service { name: String, service_type: String },
    /// Create a container from a JSON request file
    Create { request: PathBuf },
    /// List containers
    List {
        #[arg(long)]
        deleted: bool,
    },
    /// Show one container
    Show {
        fqn: String,
        /// Comma-separated fields, or "*"
        #[arg(long, default_value = "")]
        fields: String,
    },
    /// Version history, newest first
    History { fqn: String },
    /// Stored extensions and their sizes
    Extensions { fqn: String },
    /// Record a profiler run from a JSON file
    Profile { fqn: String, run: PathBuf },
    /// Table and system profiles in a time range
    Profiles {
        fqn: String,
        #[arg(long, default_value_t = 0)]
        start: i64,
        #[arg(long, default_value_t = i64::MAX)]
        end: i64,
    },
    /// Sample data
    Sample {
        fqn: String,
        #[arg(long)]
        authorized: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = match &args.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    }
    .with_db(args.db.clone());
    debug!(path = ?config.store.path, "opening store");
    let repo = open_repository(&config)?;

    match args.command {
        Command::Service { name, service_type } => {
            print(&repo.create_service(&name, &service_type, &args.user)?)
        }
        Command::Create { request } => {
            print(&stowage_cli::create_container(&repo, &request, &args.user)?)
        }
        Command::List { deleted } => print(&stowage_cli::list_containers(&repo, deleted)?),
        Command::Show { fqn, fields } => print(&stowage_cli::show(&repo, &fqn, &fields)?),
        Command::History { fqn } => print(&stowage_cli::history(&repo, &fqn)?),
        Command::Extensions { fqn } => print(&stowage_cli::extensions(&repo, &fqn)?),
        Command::Profile { fqn, run } => print(&stowage_cli::add_profile(&repo, &fqn, &run)?),
        Command::Profiles { fqn, start, end } => {
            let range = TimeRange::new(start, end)?;
            print(&stowage_cli::profiles(&repo, &fqn, range)?)
        }
        Command::Sample { fqn, authorized } => {
            print(&stowage_cli::sample(&repo, &fqn, authorized)?)
        }
    }
}

fn print<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to render output")?;
    println!("{out}");
    Ok(())
}
