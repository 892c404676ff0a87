//! # Main: CLI Entry Point
//!
//! Routes subcommands to the prover, the registry verifier and the
//! certificate importer.
//!
//! ## Subcommands
//!
//! - `prove <N>`: build a dependency-closed certificate chain for N, check
//!   it, and write it as JSON.
//! - `verify <FILE>...`: load registries and check each one.
//! - `fetch --curve <NAME>`: import a published certificate chain from a
//!   SafeCurves-style site and write `<NAME>.json`.
//!
//! ## Global Options
//!
//! - `--config` / `PRIMECERT_CONFIG`: TOML prover configuration.
//! - `--mr-rounds`, `--max-base`: override the configuration file.
//! - `LOG_FORMAT=json`: structured JSON logs instead of human-readable ones.

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use primecert::scrape::SAFECURVES_URL;
use std::path::PathBuf;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "primecert", about = "Build and verify Pocklington primality certificates")]
struct Cli {
    /// Path to a TOML prover configuration (or set PRIMECERT_CONFIG env var)
    #[arg(long, env = "PRIMECERT_CONFIG")]
    config: Option<PathBuf>,

    /// Miller-Rabin rounds for the compositeness pre-filter (overrides config)
    #[arg(long)]
    mr_rounds: Option<u32>,

    /// Largest witness base the general prover tries (overrides config)
    #[arg(long)]
    max_base: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prove N prime and emit a self-contained certificate registry
    Prove {
        /// The integer to certify, in decimal
        n: String,
        /// Try the Proth fast path (N = k*2^m + 1, k < 2^m) for each node
        #[arg(long)]
        proth: bool,
        /// Write the registry here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Verify one or more registry JSON files
    Verify {
        /// Registry files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Also reject circular dependencies
        #[arg(long)]
        strict: bool,
    },
    /// Import published certificates for a curve from a SafeCurves-style site
    Fetch {
        /// Curve name as it appears in the index table (e.g. Curve25519)
        #[arg(long, required = true)]
        curve: Vec<String>,
        /// Base URL of the site
        #[arg(long, default_value = SAFECURVES_URL)]
        url_base: String,
        /// Directory for the `<curve>.json` files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // Initialize structured logging: LOG_FORMAT=json for machine consumption, human-readable otherwise
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();
    let config = cli::load_config(&cli)?;

    match &cli.command {
        Commands::Prove { n, proth, output } => {
            cli::run_prove(&config, n, *proth, output.as_deref())
        }
        Commands::Verify { files, strict } => cli::run_verify(files, *strict),
        Commands::Fetch {
            curve,
            url_base,
            output_dir,
        } => cli::run_fetch(url_base, curve, output_dir),
    }
}
