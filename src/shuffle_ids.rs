/*
cargo run --bin shuffle_ids -- --source Meta --target FullMetadata

cargo run --bin shuffle_ids -- \
    --source Meta \
    --target FullMetadata \
    --id-space-max 30000 \
    --seed 7 \
    --mapping FullMetadata_mapping.json
*/

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use meta_tools::config::{ConfigOverrides, ToolConfig};
use meta_tools::shuffle::{shuffle_files, shuffle_files_with_rng};
use meta_tools::report::write_json_report;
use meta_tools::{logging, progress};

/// Copy every <digits>.json file under a new random ID (no ID used twice).
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(short, long, value_name = "PATH")]
    source: Option<PathBuf>,

    #[arg(short, long, value_name = "PATH")]
    target: Option<PathBuf>,

    /// New IDs are drawn from 1..=N
    #[arg(long)]
    id_space_max: Option<u32>,

    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Fixed RNG seed, for a reproducible assignment
    #[arg(long)]
    seed: Option<u64>,

    /// Write the old-name → new-ID mapping as JSON here
    #[arg(long, value_name = "PATH")]
    mapping: Option<PathBuf>,

    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = ToolConfig::resolve(
        cli.config.as_deref(),
        ConfigOverrides {
            source_dir: cli.source,
            target_dir: cli.target,
            id_space_max: cli.id_space_max,
            ..Default::default()
        },
    )?;
    logging::init(&cli.log_dir, "shuffle_ids")?;
    info!(
        "Started - source: {:?}, target: {:?}, id_space_max: {}, seed: {:?}",
        cfg.source_dir, cfg.target_dir, cfg.id_space_max, cli.seed
    );

    let bar = progress::file_bar(0, !cli.quiet);
    let report = match cli.seed {
        Some(seed) => shuffle_files_with_rng(
            &cfg.source_dir,
            &cfg.target_dir,
            cfg.id_space_max,
            &mut StdRng::seed_from_u64(seed),
            &bar,
        ),
        None => shuffle_files(&cfg.source_dir, &cfg.target_dir, cfg.id_space_max, &bar),
    }
    .with_context(|| format!("Shuffling {} failed", cfg.source_dir.display()))?;

    if let Some(path) = &cli.mapping {
        write_json_report(path, &report.assignments)
            .with_context(|| format!("Cannot write {}", path.display()))?;
        println!("Mapping written → {}", path.display());
    }

    for name in &report.overwritten {
        println!("overwritten: {}", cfg.target_dir.join(name).display());
    }
    if report.preexisting > 0 {
        println!(
            "{} already held {} JSON files before this run",
            cfg.target_dir.display(),
            report.preexisting
        );
    }
    println!(
        "Shuffled {} files from {} to {} with new random names ({} skipped).",
        report.copied(),
        cfg.source_dir.display(),
        cfg.target_dir.display(),
        report.skipped
    );
    Ok(())
}
