//! Process-wide tracing setup: stdout plus an append-only log file.

use std::fs::OpenOptions;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogConfig;

static INIT: OnceCell<()> = OnceCell::new();

/// Install the global subscriber. First call wins; later calls are no-ops so
/// binaries and tests can call this unconditionally at startup.
pub fn init(cfg: &LogConfig) -> anyhow::Result<()> {
    INIT.get_or_try_init(|| -> anyhow::Result<()> {
        let filter = EnvFilter::try_new(&cfg.level).unwrap_or_else(|_| EnvFilter::new("info"));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&cfg.file)?;

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .with(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
            .try_init()?;
        Ok(())
    })?;
    Ok(())
}
