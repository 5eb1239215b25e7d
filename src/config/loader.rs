use std::fs;
use std::path::Path;

use anyhow::{bail, Result};

use crate::config::ServiceConfig;
use crate::utils::constants::{CHECK_INTERVAL_SECONDS, REFRESH_BUFFER_SECONDS};

/// Load and validate config from YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ServiceConfig> {
    let raw = fs::read_to_string(path)?;
    parse_config(&raw)
}

pub fn parse_config(raw: &str) -> Result<ServiceConfig> {
    let mut config: ServiceConfig = serde_yaml::from_str(raw)?;

    // Apply defaults
    if config.settings.refresh_buffer_seconds.is_none() {
        config.settings.refresh_buffer_seconds = Some(REFRESH_BUFFER_SECONDS);
    }
    if config.settings.check_interval_seconds.is_none() {
        config.settings.check_interval_seconds = Some(CHECK_INTERVAL_SECONDS);
    }

    // Validate
    if config.provider.url.is_empty() {
        bail!("provider.url must not be empty");
    }
    let buffer = config.settings.refresh_buffer_seconds.unwrap_or_default();
    let interval = config.settings.check_interval_seconds.unwrap_or_default();
    if interval == 0 {
        bail!("settings.check_interval_seconds must be positive");
    }
    if interval > buffer {
        bail!(
            "settings.check_interval_seconds ({}) must not exceed refresh_buffer_seconds ({})",
            interval,
            buffer
        );
    }

    Ok(config)
}
