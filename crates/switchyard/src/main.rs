// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Switchyard - hybrid news classifier.
//!
//! This is the binary entry point: it loads configuration once, installs
//! logging, and dispatches to a subcommand.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod commands;
mod doctor;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{RunArgs, StrategyChoice};

/// Switchyard - hybrid news classifier.
#[derive(Parser, Debug)]
#[command(name = "switchyard", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify the test set and print a summary per strategy.
    Run {
        #[arg(long, value_enum, default_value_t = StrategyChoice::Both)]
        strategy: StrategyChoice,
        /// Test CSV (overrides dataset.test_path).
        #[arg(long)]
        test: Option<PathBuf>,
        /// Training CSV (overrides dataset.train_path).
        #[arg(long)]
        train: Option<PathBuf>,
        /// Classify at most this many test rows.
        #[arg(long)]
        limit: Option<usize>,
        /// Write per-strategy stats as JSON.
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Build and calibrate the routes, then print the chosen thresholds.
    Calibrate {
        #[arg(long)]
        train: Option<PathBuf>,
    },
    /// Print the reference / validation / held-out split sizes.
    Partition {
        #[arg(long)]
        train: Option<PathBuf>,
    },
    /// Check configuration, datasets, and collaborators.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => switchyard_config::load_and_validate_path(path),
        None => switchyard_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            switchyard_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log.level);

    let result = match cli.command {
        Some(Commands::Run {
            strategy,
            test,
            train,
            limit,
            json,
        }) => {
            let args = RunArgs {
                strategy,
                test,
                train,
                limit,
                json,
            };
            commands::run(&config, args).await
        }
        Some(Commands::Calibrate { train }) => commands::calibrate(&config, train).await,
        Some(Commands::Partition { train }) => commands::partition(&config, train),
        Some(Commands::Doctor { plain }) => {
            doctor::run_doctor(&config, plain).await;
            Ok(())
        }
        None => {
            println!("switchyard: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("switchyard: {e}");
        std::process::exit(1);
    }
}

/// Initialize the tracing subscriber with an env filter.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("switchyard={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
