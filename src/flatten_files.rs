/*
cargo run --bin flatten_files -- --source Meta --target Meta

cargo run --bin flatten_files -- \
    --source Meta_batches \
    --target Meta \
    --prune-empty-dirs
*/

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use meta_tools::config::{ConfigOverrides, ToolConfig};
use meta_tools::flatten::{flatten_dir, FlattenOptions};
use meta_tools::{logging, progress};

/// Move every file below SOURCE into TARGET, dropping the folder structure.
/// Files sharing a name overwrite each other (the last one visited wins).
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Root of the tree to flatten
    #[arg(short, long, value_name = "PATH")]
    source: Option<PathBuf>,

    /// Directory that receives the files (may equal --source)
    #[arg(short, long, value_name = "PATH")]
    target: Option<PathBuf>,

    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Delete subdirectories left empty afterwards
    #[arg(long)]
    prune_empty_dirs: bool,

    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    /// No progress bar
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
            ..Default::default()
        },
    )?;
    logging::init(&cli.log_dir, "flatten_files")?;
    info!("Started - source: {:?}, target: {:?}", cfg.source_dir, cfg.target_dir);

    let bar = progress::file_bar(0, !cli.quiet);
    let report = flatten_dir(
        &cfg.source_dir,
        &cfg.target_dir,
        FlattenOptions { prune_empty_dirs: cli.prune_empty_dirs },
        &bar,
    )
    .with_context(|| format!("Flattening {} failed", cfg.source_dir.display()))?;

    for o in &report.overwritten {
        println!("overwritten: {} (by {})", o.destination.display(), o.replaced_by.display());
    }
    println!(
        "All files from {} have been moved to {} ({} moved, {} already in place, {} overwritten, {} dirs pruned)",
        cfg.source_dir.display(),
        cfg.target_dir.display(),
        report.moved,
        report.already_in_place,
        report.overwritten.len(),
        report.pruned_dirs
    );
    Ok(())
}
