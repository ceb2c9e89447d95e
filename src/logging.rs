use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use simplelog::{
    ColorChoice, CombinedLogger, Config, LevelFilter, TermLogger, TerminalMode, WriteLogger,
};

/// Log to `<log_dir>/<tool>_<timestamp>.log` at Info, and warnings to stderr.
/// Returns the log file path.
pub fn init(log_dir: &Path, tool: &str) -> Result<PathBuf> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Cannot create log directory {}", log_dir.display()))?;

    let ts = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let log_path = log_dir.join(format!("{tool}_{ts}.log"));
    let file = File::create(&log_path)
        .with_context(|| format!("Cannot open log file {}", log_path.display()))?;

    CombinedLogger::init(vec![
        TermLogger::new(LevelFilter::Warn, Config::default(), TerminalMode::Stderr, ColorChoice::Auto),
        WriteLogger::new(LevelFilter::Info, Config::default(), file),
    ])
    .context("Failed to initialise logger")?;

    Ok(log_path)
}
