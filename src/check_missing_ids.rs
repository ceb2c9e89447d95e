/*
cargo run --bin check_missing_ids -- --dir Meta

cargo run --bin check_missing_ids -- \
    --dir Meta \
    --id-space-max 30000 \
    --report Meta_report/integrity.json
*/

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use meta_tools::config::{ConfigOverrides, ToolConfig};
use meta_tools::integrity::check_ids;
use meta_tools::logging;
use meta_tools::report::write_json_report;

/// Report missing and duplicate IDs in a directory of <id>.json files.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Directory to scan (config key: source_dir)
    #[arg(short, long, value_name = "PATH")]
    dir: Option<PathBuf>,

    /// Highest expected ID; the range checked is 1..=N
    #[arg(long)]
    id_space_max: Option<u32>,

    /// JSON config file with source_dir / target_dir / id_space_max / image_prefix
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Also write the full report as JSON here
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    /// Exit with status 2 when anything is missing, duplicated or out of range
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = ToolConfig::resolve(
        cli.config.as_deref(),
        ConfigOverrides {
            source_dir: cli.dir,
            id_space_max: cli.id_space_max,
            ..Default::default()
        },
    )?;
    let log_path = logging::init(&cli.log_dir, "check_missing_ids")?;
    info!("Started - dir: {:?}, id_space_max: {}", cfg.source_dir, cfg.id_space_max);

    let report = check_ids(&cfg.source_dir, cfg.id_space_max)
        .with_context(|| format!("Checking {} failed", cfg.source_dir.display()))?;

    for line in report.summary_lines() {
        println!("{line}");
    }
    println!(
        "({} files, {} distinct IDs, expected 1..={})",
        report.found, report.distinct, report.id_space_max
    );

    if let Some(path) = &cli.report {
        write_json_report(path, &report)
            .with_context(|| format!("Cannot write {}", path.display()))?;
        println!("Report written → {}", path.display());
    }

    info!("Finished, log at {:?}", log_path);
    if cli.strict && !report.is_clean() {
        process::exit(2);
    }
    Ok(())
}
