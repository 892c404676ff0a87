//! # CLI Execution Functions
//!
//! Extracted from `main.rs` to keep the entry point slim. Contains the execution
//! logic for each subcommand and the configuration layering (defaults, then
//! TOML file, then command-line overrides).

use anyhow::{bail, Context, Result};
use primecert::{certificate::parse_decimal, prove, registry, scrape, ProverConfig};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, info_span, warn};

use super::Cli;

/// Resolve the prover configuration for this invocation.
pub fn load_config(cli: &Cli) -> Result<ProverConfig> {
    let mut config = match &cli.config {
        Some(path) => ProverConfig::load(path)?,
        None => ProverConfig::default(),
    };
    if let Some(rounds) = cli.mr_rounds {
        config.mr_rounds = rounds;
    }
    if let Some(max_base) = cli.max_base {
        config.max_base = max_base;
    }
    config.validate()?;
    Ok(config)
}

// ── Prove ───────────────────────────────────────────────────────

/// Build the certificate chain for `n`, re-verify it, and write it out.
pub fn run_prove(config: &ProverConfig, n: &str, proth: bool, output: Option<&Path>) -> Result<()> {
    let n = parse_decimal(n.trim()).with_context(|| format!("invalid integer {:?}", n))?;
    let config = ProverConfig {
        try_proth: config.try_proth || proth,
        ..config.clone()
    };
    let _span = info_span!("prove", bits = n.significant_bits()).entered();

    let start = std::time::Instant::now();
    let chain = prove::prove_chain(&n, &config)?;
    // A chain that does not verify is a prover bug; never emit it.
    chain
        .check()
        .context("generated certificate chain failed verification")?;
    info!(
        proofs = chain.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "certificate chain built"
    );

    match output {
        Some(path) => {
            registry::save(path, &chain)?;
            info!(path = %path.display(), "wrote certificate chain");
        }
        None => println!("{}", chain.to_json_pretty()?),
    }
    Ok(())
}

// ── Verify ──────────────────────────────────────────────────────

fn verify_file(path: &Path, strict: bool) -> Result<usize> {
    let registry = registry::load(path)?;
    if strict {
        registry.check_well_founded()?;
    } else {
        registry.check()?;
    }
    Ok(registry.len())
}

/// Check every file in parallel. Fails if any file fails.
pub fn run_verify(files: &[PathBuf], strict: bool) -> Result<()> {
    let results: Vec<(&PathBuf, Result<usize>)> = files
        .par_iter()
        .map(|path| (path, verify_file(path, strict)))
        .collect();

    let mut failed = 0usize;
    for (path, result) in &results {
        match result {
            Ok(count) => info!(path = %path.display(), proofs = count, "verified"),
            Err(e) => {
                warn!(path = %path.display(), error = %format!("{:#}", e), "verification failed");
                failed += 1;
            }
        }
    }

    eprintln!(
        "\nSummary: {} verified, {} failed",
        results.len() - failed,
        failed
    );
    if failed > 0 {
        bail!("{} of {} registries failed verification", failed, results.len());
    }
    Ok(())
}

// ── Fetch ───────────────────────────────────────────────────────

/// Import, verify and save the published chain of each curve.
pub fn run_fetch(url_base: &str, curves: &[String], output_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;
    for curve in curves {
        let _span = info_span!("fetch", curve = curve.as_str()).entered();
        let registry = scrape::fetch_registry(url_base, curve)?;
        registry
            .check()
            .with_context(|| format!("published certificates for {} do not verify", curve))?;
        let path = output_dir.join(format!("{}.json", curve));
        registry::save(&path, &registry)?;
        info!(proofs = registry.len(), path = %path.display(), "saved verified chain");
    }
    Ok(())
}
