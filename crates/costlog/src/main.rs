// SPDX-FileCopyrightText: 2026 Costlog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Costlog - report on LLM API spend.
//!
//! This is the binary entry point. It reads the cost logs written by
//! `costlog-ledger` and prints totals, per-model and per-period spend.

mod report;

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use costlog_config::CostLogConfig;
use costlog_core::CostLogError;
use costlog_report::Bucket;
use tracing::debug;

use crate::report::Output;

/// Costlog - report on LLM API spend.
#[derive(Parser, Debug)]
#[command(name = "costlog", version, about, long_about = None)]
struct Cli {
    /// Folder holding the cost logs (defaults to `ledger.log_folder`).
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output JSON for scripting.
    #[arg(long, global = true)]
    json: bool,

    /// Disable colors.
    #[arg(long, global = true)]
    plain: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Total cost across all logs.
    Total,
    /// Cost per served model.
    Models,
    /// Cost per day of experiment creation.
    Daily {
        /// Only show the most recent N days.
        #[arg(long)]
        last: Option<NonZeroUsize>,
    },
    /// Cost per month of experiment creation.
    Monthly {
        /// Only show the most recent N months.
        #[arg(long)]
        last: Option<NonZeroUsize>,
    },
    /// Summary of a single log file.
    Show {
        /// Path of the log file.
        file: PathBuf,
    },
    /// Print the effective configuration.
    Config,
}

fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => costlog_config::load_and_validate_path(path),
        None => costlog_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            costlog_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level);

    if let Err(e) = run(cli, &config) {
        eprintln!("costlog: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli, config: &CostLogConfig) -> Result<(), CostLogError> {
    let dir = cli
        .dir
        .unwrap_or_else(|| PathBuf::from(&config.ledger.log_folder));
    let out = Output::detect(cli.json, cli.plain);
    debug!(dir = %dir.display(), "reporting on cost logs");

    let rendered = match cli.command {
        Some(Commands::Total) => report::total(&dir, out)?,
        Some(Commands::Models) => report::models(&dir, out)?,
        Some(Commands::Daily { last }) => {
            report::buckets(&dir, Bucket::Daily, last.map(NonZeroUsize::get), out)?
        }
        Some(Commands::Monthly { last }) => {
            report::buckets(&dir, Bucket::Monthly, last.map(NonZeroUsize::get), out)?
        }
        Some(Commands::Show { file }) => report::show(&file, out)?,
        Some(Commands::Config) => costlog_config::to_toml_string(config)
            .map_err(|e| CostLogError::Config(e.to_string()))?,
        None => "costlog: use --help for available commands".to_string(),
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
///
/// Logs go to stderr so `--json` output stays parseable.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("costlog={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
