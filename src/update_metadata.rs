/*
cargo run --bin update_metadata -- \
    --dir FullMetadata \
    --image-prefix "ipfs://bafy.../"

cargo run --bin update_metadata -- --config tools.json --skip-errors
*/

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;

use meta_tools::config::{ConfigOverrides, ToolConfig};
use meta_tools::patch::{patch_dir, ErrorPolicy, PatchOptions};
use meta_tools::{logging, progress};

/// Set "name" to the file ID and prefix "image" in every <id>.json of a directory.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Directory holding the metadata files (config key: target_dir)
    #[arg(short, long, value_name = "PATH")]
    dir: Option<PathBuf>,

    /// Prepended to every "image" value
    #[arg(long)]
    image_prefix: Option<String>,

    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Prefix "image" even when it already starts with the prefix
    #[arg(long)]
    allow_double_prefix: bool,

    /// Log and skip files that fail instead of stopping at the first one
    #[arg(long)]
    skip_errors: bool,

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
            target_dir: cli.dir,
            image_prefix: cli.image_prefix,
            ..Default::default()
        },
    )?;
    logging::init(&cli.log_dir, "update_metadata")?;
    info!("Started - dir: {:?}, prefix: {:?}", cfg.target_dir, cfg.image_prefix);

    let opts = PatchOptions {
        image_prefix: cfg.image_prefix.clone(),
        skip_prefixed: !cli.allow_double_prefix,
        on_error: if cli.skip_errors { ErrorPolicy::Skip } else { ErrorPolicy::Abort },
    };

    let bar = progress::file_bar(0, !cli.quiet);
    let report = patch_dir(&cfg.target_dir, &opts, &bar)
        .with_context(|| format!("Updating {} failed", cfg.target_dir.display()))?;

    println!(
        "Updated {} JSON files in {} ({} already prefixed, {} skipped without numeric ID).",
        report.patched,
        cfg.target_dir.display(),
        report.already_prefixed,
        report.skipped.len()
    );
    if !report.failures.is_empty() {
        for f in &report.failures {
            eprintln!("{}: {}", f.file, f.error);
        }
        bail!("{} file(s) could not be updated", report.failures.len());
    }
    Ok(())
}
