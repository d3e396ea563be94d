use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{prelude::*, EnvFilter};

pub fn log_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|p| p.join("numring").join("numring.log"))
}

/// `RUST_LOG` when set, otherwise the configured directive.
fn filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Log to stderr. Used by the headless modes.
pub fn init_stderr(default_directive: &str) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr))
        .with(filter(default_directive))
        .init();
}

/// Log to the data-dir log file so the dashboard owns the terminal.
pub fn init_file(default_directive: &str) -> Result<PathBuf> {
    let path = log_path().context("no data dir for log file")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)
        .with_context(|| format!("opening {}", path.display()))?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_ansi(false)
            .with_writer(Mutex::new(file)))
        .with(filter(default_directive))
        .init();
    Ok(path)
}
