mod config;

pub use config::{Config, EngagementConfig, FilterConfig, SourceConfig};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the data directory, creating it if needed.
///
/// Resolution order:
/// 1. `BATTERY_CAMPAIGN_HOME`, used as-is
/// 2. `~/.config/battery-campaign-dev/` when `BATTERY_CAMPAIGN_ENV=dev`
/// 3. `~/.config/battery-campaign/`
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("BATTERY_CAMPAIGN_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("BATTERY_CAMPAIGN_ENV")
                .unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("battery-campaign-dev")
            } else {
                base_dir.join("battery-campaign")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DirUnavailable(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
