use anyhow::{Result, anyhow};
use ftail::Ftail;
use log::{LevelFilter, info};
use std::env;
use std::fs;
use std::path::PathBuf;

const LOGS_DIR: &str = ".logs";
const LOG_DIR_ENV: &str = "NEWS_LOG_DIR";
const PKG_NAME: &str = env!("CARGO_PKG_NAME");

/// Where the log file goes: `$NEWS_LOG_DIR` if set, otherwise `$HOME/.logs/naver-news`.
pub fn logs_dir<F>(home: Option<PathBuf>, lookup: F) -> Result<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = lookup(LOG_DIR_ENV).filter(|d| !d.trim().is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    match home {
        Some(home) => Ok(home.join(LOGS_DIR).join(PKG_NAME)),
        None => Err(anyhow!("Could not determine $HOME, set {LOG_DIR_ENV} instead")),
    }
}

/// Console only shows warnings and up so the article listings stay readable;
/// the file keeps the per-page progress.
pub fn init_logger() -> Result<()> {
    let logs_path = logs_dir(env::home_dir(), |key| env::var(key).ok())?;
    let logs_file = logs_path.join(format!("{PKG_NAME}.log"));

    // idempotent, fine on every start
    fs::create_dir_all(&logs_path)
        .map_err(|e| anyhow!("Could not create logs dir at {}: {}", logs_path.display(), e))?;

    Ftail::new()
        .console(LevelFilter::Warn)
        .single_file(&logs_file, true, LevelFilter::Info)
        .init()
        .map_err(|e| anyhow!("Could not initialize logger: {}", e))?;

    info!("Logging to {}", logs_file.display());
    Ok(())
}
