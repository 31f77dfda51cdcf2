//! Configuration module
//!
//! Combines environment settings with command-line overrides.

use anyhow::{Context, Result};
use overseer_monitor::MonitorConfig;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend connection and polling cadences
    pub monitor: MonitorConfig,
}

impl Config {
    /// Loads settings from the environment, then applies the `--backend-url` flag
    pub fn load(backend_url: String) -> Result<Self> {
        let monitor = MonitorConfig::from_env()
            .context("Invalid OVERSEER_* environment settings")?
            .with_backend_url(backend_url);
        monitor.validate()?;
        Ok(Self { monitor })
    }
}
